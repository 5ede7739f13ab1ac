//! `PostgreSQL` ledger store implementation.

use super::{
    models::{
        HistoryRow, InvocationRow, NewHistoryRow, NewInvocationRow, NewSessionRow, SessionRow,
    },
    schema::{agent_invocations, history, sessions},
};
use crate::capability::domain::AgentName;
use crate::ledger::{
    domain::{
        HistoryMessage, InvocationParams, InvocationRecord, PersistedSession, Role, Session,
        SessionId, UserId,
    },
    ports::{LedgerStore, LedgerStoreError, LedgerStoreResult},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by the ledger adapter.
pub type LedgerPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed ledger store.
///
/// Invocation records are written in a serialisable transaction together
/// with the session update; serialisation failures, lock timeouts and pool
/// exhaustion surface as [`LedgerStoreError::Contention`].
#[derive(Debug, Clone)]
pub struct PostgresLedgerStore {
    pool: LedgerPgPool,
}

impl PostgresLedgerStore {
    /// Creates a store from a connection pool.
    #[must_use]
    pub const fn new(pool: LedgerPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> LedgerStoreResult<T>
    where
        F: FnOnce(&mut PgConnection) -> LedgerStoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool
                .get()
                .map_err(|err| LedgerStoreError::Contention(err.to_string()))?;
            f(&mut connection)
        })
        .await
        .map_err(LedgerStoreError::persistence)?
    }
}

#[async_trait]
impl LedgerStore for PostgresLedgerStore {
    async fn create_session(&self, session: &Session) -> LedgerStoreResult<()> {
        let session_id = session.id();
        let row = NewSessionRow {
            id: session_id.into_inner(),
            user_id: session.user_id().as_str().to_owned(),
            created_at: session.created_at(),
            updated_at: session.updated_at(),
        };

        self.run_blocking(move |connection| {
            diesel::insert_into(sessions::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        LedgerStoreError::DuplicateSession(session_id)
                    }
                    other => map_diesel_error(other),
                })?;
            Ok(())
        })
        .await
    }

    async fn find_session(&self, id: SessionId) -> LedgerStoreResult<Option<Session>> {
        self.run_blocking(move |connection| {
            let row = sessions::table
                .filter(sessions::id.eq(id.into_inner()))
                .select(SessionRow::as_select())
                .first::<SessionRow>(connection)
                .optional()
                .map_err(map_diesel_error)?;
            row.map(row_to_session).transpose()
        })
        .await
    }

    async fn record_invocation(&self, record: &InvocationRecord) -> LedgerStoreResult<()> {
        let session_id = record.session_id();
        let row = NewInvocationRow {
            session_id: session_id.into_inner(),
            agent_name: record.agent_name().as_str().to_owned(),
            query: record.query().to_owned(),
            response_excerpt: record.response_excerpt().to_owned(),
            success: record.success(),
            duration_ms: i64::try_from(record.duration_ms()).unwrap_or(i64::MAX),
            created_at: record.timestamp(),
        };

        self.run_blocking(move |connection| {
            connection
                .build_transaction()
                .serializable()
                .run::<_, LedgerStoreError, _>(|tx| {
                    let updated = diesel::update(
                        sessions::table.filter(sessions::id.eq(session_id.into_inner())),
                    )
                    .set((
                        sessions::last_agent_called.eq(Some(row.agent_name.as_str())),
                        sessions::last_query.eq(Some(row.query.as_str())),
                        sessions::last_response_excerpt.eq(Some(row.response_excerpt.as_str())),
                        sessions::updated_at.eq(row.created_at),
                    ))
                    .execute(tx)?;
                    if updated == 0 {
                        return Err(LedgerStoreError::SessionNotFound(session_id));
                    }
                    diesel::insert_into(agent_invocations::table)
                        .values(&row)
                        .execute(tx)?;
                    Ok(())
                })
        })
        .await
    }

    async fn append_history(&self, message: &HistoryMessage) -> LedgerStoreResult<()> {
        let session_id = message.session_id();
        let row = NewHistoryRow {
            session_id: session_id.into_inner(),
            role: message.role().as_str().to_owned(),
            content: message.content().to_owned(),
            created_at: message.timestamp(),
        };

        self.run_blocking(move |connection| {
            connection.transaction::<_, LedgerStoreError, _>(|tx| {
                let updated = diesel::update(
                    sessions::table
                        .filter(sessions::id.eq(session_id.into_inner()))
                        .filter(sessions::updated_at.lt(row.created_at)),
                )
                .set(sessions::updated_at.eq(row.created_at))
                .execute(tx)?;
                if updated == 0 && !session_exists(tx, session_id)? {
                    return Err(LedgerStoreError::SessionNotFound(session_id));
                }
                diesel::insert_into(history::table)
                    .values(&row)
                    .execute(tx)?;
                Ok(())
            })
        })
        .await
    }

    async fn history(&self, id: SessionId, limit: usize) -> LedgerStoreResult<Vec<HistoryMessage>> {
        let row_limit = i64::try_from(limit).unwrap_or(i64::MAX);
        self.run_blocking(move |connection| {
            let mut rows = history::table
                .filter(history::session_id.eq(id.into_inner()))
                .order(history::id.desc())
                .limit(row_limit)
                .select(HistoryRow::as_select())
                .load::<HistoryRow>(connection)
                .map_err(map_diesel_error)?;
            rows.reverse();
            rows.into_iter().map(row_to_history).collect()
        })
        .await
    }

    async fn invocations(&self, id: SessionId) -> LedgerStoreResult<Vec<InvocationRecord>> {
        self.run_blocking(move |connection| {
            let rows = agent_invocations::table
                .filter(agent_invocations::session_id.eq(id.into_inner()))
                .order(agent_invocations::id.asc())
                .select(InvocationRow::as_select())
                .load::<InvocationRow>(connection)
                .map_err(map_diesel_error)?;
            rows.into_iter().map(row_to_invocation).collect()
        })
        .await
    }

    async fn delete_sessions_updated_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> LedgerStoreResult<usize> {
        self.run_blocking(move |connection| {
            diesel::delete(sessions::table.filter(sessions::updated_at.lt(cutoff)))
                .execute(connection)
                .map_err(map_diesel_error)
        })
        .await
    }
}

impl From<DieselError> for LedgerStoreError {
    fn from(err: DieselError) -> Self {
        map_diesel_error(err)
    }
}

fn map_diesel_error(err: DieselError) -> LedgerStoreError {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::SerializationFailure, ref info) => {
            LedgerStoreError::Contention(info.message().to_owned())
        }
        DieselError::DatabaseError(DatabaseErrorKind::Unknown, ref info)
            if is_lock_conflict(info.as_ref()) =>
        {
            LedgerStoreError::Contention(info.message().to_owned())
        }
        other => LedgerStoreError::persistence(other),
    }
}

fn is_lock_conflict(info: &dyn DatabaseErrorInformation) -> bool {
    let message = info.message();
    message.contains("lock timeout") || message.contains("deadlock detected")
}

fn session_exists(connection: &mut PgConnection, id: SessionId) -> LedgerStoreResult<bool> {
    diesel::select(diesel::dsl::exists(
        sessions::table.filter(sessions::id.eq(id.into_inner())),
    ))
    .get_result(connection)
    .map_err(map_diesel_error)
}

fn row_to_session(row: SessionRow) -> LedgerStoreResult<Session> {
    let SessionRow {
        id,
        user_id,
        created_at,
        updated_at,
        last_agent_called,
        last_query,
        last_response_excerpt,
    } = row;

    let parsed_user = UserId::new(user_id).map_err(LedgerStoreError::persistence)?;
    let parsed_agent = last_agent_called
        .map(AgentName::new)
        .transpose()
        .map_err(LedgerStoreError::persistence)?;

    Ok(Session::from_persisted(PersistedSession {
        id: SessionId::from_uuid(id),
        user_id: parsed_user,
        created_at,
        updated_at,
        last_agent_called: parsed_agent,
        last_query,
        last_response_excerpt,
    }))
}

fn row_to_invocation(row: InvocationRow) -> LedgerStoreResult<InvocationRecord> {
    let agent_name = AgentName::new(row.agent_name).map_err(LedgerStoreError::persistence)?;
    let duration_ms = u64::try_from(row.duration_ms).map_err(LedgerStoreError::persistence)?;
    Ok(InvocationRecord::new(InvocationParams {
        session_id: SessionId::from_uuid(row.session_id),
        agent_name,
        query: row.query,
        response_excerpt: row.response_excerpt,
        success: row.success,
        duration_ms,
        timestamp: row.created_at,
    }))
}

fn row_to_history(row: HistoryRow) -> LedgerStoreResult<HistoryMessage> {
    let role = Role::try_from(row.role.as_str()).map_err(LedgerStoreError::persistence)?;
    Ok(HistoryMessage::new(
        SessionId::from_uuid(row.session_id),
        role,
        row.content,
        row.created_at,
    ))
}
