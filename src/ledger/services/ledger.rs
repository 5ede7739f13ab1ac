//! Session ledger service.
//!
//! Serialises writes per session, retries contended store operations with
//! exponential backoff and truncates reply excerpts before they are stored.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::RetryPolicy;
use crate::capability::domain::AgentName;
use crate::ledger::{
    domain::{
        DEFAULT_EXCERPT_CHARS, HistoryMessage, InvocationParams, InvocationRecord,
        LedgerDomainError, Role, Session, SessionId, UserId, truncate_excerpt,
    },
    ports::{LedgerStore, LedgerStoreError, LedgerStoreResult},
};

/// Ledger settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Backoff for contended writes.
    pub retry: RetryPolicy,
    /// Maximum stored reply excerpt length, in characters.
    pub excerpt_chars: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            excerpt_chars: DEFAULT_EXCERPT_CHARS,
        }
    }
}

/// Service-level errors for ledger operations.
#[derive(Debug, Clone, Error)]
pub enum LedgerError {
    /// Input validation failed.
    #[error(transparent)]
    Domain(#[from] LedgerDomainError),

    /// No session exists with the given id.
    #[error("session not found: {0}")]
    SessionNotFound(SessionId),

    /// The store stayed contended for every retry attempt.
    #[error("ledger {operation} still contended after {attempts} attempts")]
    Transient {
        /// Operation that gave up.
        operation: &'static str,
        /// Attempts made.
        attempts: u32,
    },

    /// Non-retryable store failure.
    #[error(transparent)]
    Store(LedgerStoreError),
}

impl From<LedgerStoreError> for LedgerError {
    fn from(err: LedgerStoreError) -> Self {
        match err {
            LedgerStoreError::SessionNotFound(id) => Self::SessionNotFound(id),
            other => Self::Store(other),
        }
    }
}

/// Result type for ledger service operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Input for [`SessionLedger::record_invocation`].
#[derive(Debug, Clone)]
pub struct RecordInvocationRequest {
    /// Session the invocation belongs to.
    pub session_id: SessionId,
    /// Invoked agent.
    pub agent_name: AgentName,
    /// Query sent to the agent.
    pub query: String,
    /// Full reply, or a failure description.
    pub response: String,
    /// Whether the agent answered.
    pub success: bool,
    /// Wall-clock duration of the call.
    pub duration: Duration,
}

type SessionLock = Arc<tokio::sync::Mutex<()>>;

/// Durable session, invocation and history store.
pub struct SessionLedger<L, C>
where
    L: LedgerStore,
    C: Clock + Send + Sync,
{
    store: Arc<L>,
    clock: Arc<C>,
    config: LedgerConfig,
    locks: parking_lot::Mutex<HashMap<SessionId, SessionLock>>,
}

impl<L, C> SessionLedger<L, C>
where
    L: LedgerStore,
    C: Clock + Send + Sync,
{
    /// Creates a ledger service.
    #[must_use]
    pub fn new(store: Arc<L>, clock: Arc<C>, config: LedgerConfig) -> Self {
        Self {
            store,
            clock,
            config,
            locks: parking_lot::Mutex::new(HashMap::new()),
        }
    }

    /// Starts a new session for a user.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Domain`] for an invalid user id or a store
    /// error when the session cannot be written.
    pub async fn create_session(&self, user_id: &str) -> LedgerResult<SessionId> {
        let session = Session::new(UserId::new(user_id)?, &*self.clock);
        self.with_retry("create_session", || self.store.create_session(&session))
            .await?;
        info!(session_id = %session.id(), user_id = %session.user_id(), "session created");
        Ok(session.id())
    }

    /// Returns a session with its last-turn fields.
    ///
    /// # Errors
    ///
    /// Returns a store error when the lookup fails.
    pub async fn get_session(&self, id: SessionId) -> LedgerResult<Option<Session>> {
        self.with_retry("get_session", || self.store.find_session(id))
            .await
    }

    /// Appends an invocation record and updates the session's last-turn
    /// fields. The reply is truncated to the configured excerpt length.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::SessionNotFound`] for unknown sessions or
    /// [`LedgerError::Transient`] when contention outlasts the retries.
    pub async fn record_invocation(
        &self,
        request: RecordInvocationRequest,
    ) -> LedgerResult<InvocationRecord> {
        let record = InvocationRecord::new(InvocationParams {
            session_id: request.session_id,
            agent_name: request.agent_name,
            response_excerpt: truncate_excerpt(&request.response, self.config.excerpt_chars),
            query: request.query,
            success: request.success,
            duration_ms: u64::try_from(request.duration.as_millis()).unwrap_or(u64::MAX),
            timestamp: self.clock.utc(),
        });

        self.serialised(record.session_id(), || {
            self.with_retry("record_invocation", || self.store.record_invocation(&record))
        })
        .await?;
        debug!(
            session_id = %record.session_id(),
            agent = %record.agent_name(),
            success = record.success(),
            "invocation recorded"
        );
        Ok(record)
    }

    /// Appends a message to a session's history.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::SessionNotFound`] for unknown sessions or
    /// [`LedgerError::Transient`] when contention outlasts the retries.
    pub async fn append_history(
        &self,
        session_id: SessionId,
        role: Role,
        content: impl Into<String>,
    ) -> LedgerResult<HistoryMessage> {
        let message = HistoryMessage::new(session_id, role, content, self.clock.utc());
        self.serialised(session_id, || {
            self.with_retry("append_history", || self.store.append_history(&message))
        })
        .await?;
        Ok(message)
    }

    /// Returns up to `limit` most recent history messages, oldest first.
    ///
    /// # Errors
    ///
    /// Returns a store error when the lookup fails.
    pub async fn get_history(
        &self,
        session_id: SessionId,
        limit: usize,
    ) -> LedgerResult<Vec<HistoryMessage>> {
        self.with_retry("get_history", || self.store.history(session_id, limit))
            .await
    }

    /// Returns the session's invocation audit trail in append order.
    ///
    /// # Errors
    ///
    /// Returns a store error when the lookup fails.
    pub async fn invocations(&self, session_id: SessionId) -> LedgerResult<Vec<InvocationRecord>> {
        self.with_retry("invocations", || self.store.invocations(session_id))
            .await
    }

    /// Deletes sessions not updated within `older_than`, with their records.
    ///
    /// # Errors
    ///
    /// Returns a store error when the deletion fails.
    pub async fn cleanup(&self, older_than: Duration) -> LedgerResult<usize> {
        let cutoff = cutoff_before(self.clock.utc(), older_than);
        let removed = self
            .with_retry("cleanup", || self.store.delete_sessions_updated_before(cutoff))
            .await?;
        info!(removed, %cutoff, "stale sessions removed");
        Ok(removed)
    }

    /// Runs `op` while holding the session's write lock.
    async fn serialised<T, F, Fut>(&self, session_id: SessionId, op: F) -> LedgerResult<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = LedgerResult<T>>,
    {
        let lock = self.session_lock(session_id);
        let result = {
            let _guard = lock.lock().await;
            op().await
        };
        self.release_lock(session_id, &lock);
        result
    }

    #[cfg(test)]
    pub(crate) fn tracked_locks(&self) -> usize {
        self.locks.lock().len()
    }

    fn session_lock(&self, session_id: SessionId) -> SessionLock {
        Arc::clone(self.locks.lock().entry(session_id).or_default())
    }

    /// Drops the table entry once no other writer holds a handle to it.
    fn release_lock(&self, session_id: SessionId, lock: &SessionLock) {
        let mut locks = self.locks.lock();
        if Arc::strong_count(lock) == 2
            && locks
                .get(&session_id)
                .is_some_and(|entry| Arc::ptr_eq(entry, lock))
        {
            locks.remove(&session_id);
        }
    }

    async fn with_retry<T, F, Fut>(&self, operation: &'static str, mut attempt_op: F) -> LedgerResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = LedgerStoreResult<T>>,
    {
        let policy = self.config.retry;
        let mut attempt = 1;
        loop {
            match attempt_op().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() && attempt < policy.max_attempts => {
                    let delay = policy.delay_after(attempt);
                    debug!(operation, attempt, ?delay, error = %err, "ledger contended, retrying");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) if err.is_transient() => {
                    warn!(operation, attempts = attempt, error = %err, "ledger contention exhausted retries");
                    return Err(LedgerError::Transient {
                        operation,
                        attempts: attempt,
                    });
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
}

fn cutoff_before(now: DateTime<Utc>, older_than: Duration) -> DateTime<Utc> {
    TimeDelta::from_std(older_than)
        .ok()
        .and_then(|span| now.checked_sub_signed(span))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}
