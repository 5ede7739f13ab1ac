//! Ledger store port.

use crate::ledger::domain::{HistoryMessage, InvocationRecord, Session, SessionId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for ledger store operations.
pub type LedgerStoreResult<T> = Result<T, LedgerStoreError>;

/// Durable storage for sessions, invocation records and history.
///
/// # Implementation Notes
///
/// Implementations must ensure:
/// - `record_invocation` appends the record and updates the session's
///   denormalised fields in one atomic step
/// - history and invocations are returned in append order
/// - deleting a session deletes its records and history
/// - transient conflicts (serialisation failures, lock timeouts, pool
///   exhaustion) are reported as [`LedgerStoreError::Contention`]
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Persists a new session.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerStoreError::DuplicateSession`] when the id exists.
    async fn create_session(&self, session: &Session) -> LedgerStoreResult<()>;

    /// Finds a session by id.
    async fn find_session(&self, id: SessionId) -> LedgerStoreResult<Option<Session>>;

    /// Appends an invocation record and updates the session's last-turn
    /// fields.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerStoreError::SessionNotFound`] for unknown sessions.
    async fn record_invocation(&self, record: &InvocationRecord) -> LedgerStoreResult<()>;

    /// Appends a history message and advances the session's update time.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerStoreError::SessionNotFound`] for unknown sessions.
    async fn append_history(&self, message: &HistoryMessage) -> LedgerStoreResult<()>;

    /// Returns up to `limit` most recent messages, oldest first.
    async fn history(&self, id: SessionId, limit: usize) -> LedgerStoreResult<Vec<HistoryMessage>>;

    /// Returns every invocation record of a session in append order.
    async fn invocations(&self, id: SessionId) -> LedgerStoreResult<Vec<InvocationRecord>>;

    /// Deletes sessions last updated before `cutoff`, returning the count.
    async fn delete_sessions_updated_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> LedgerStoreResult<usize>;
}

/// Errors returned by ledger store implementations.
#[derive(Debug, Clone, Error)]
pub enum LedgerStoreError {
    /// No session exists with the given id.
    #[error("session not found: {0}")]
    SessionNotFound(SessionId),

    /// A session with the same id already exists.
    #[error("duplicate session: {0}")]
    DuplicateSession(SessionId),

    /// A transient conflict; the operation may succeed if retried.
    #[error("ledger store contention: {0}")]
    Contention(String),

    /// Persistence layer failure.
    #[error("ledger persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl LedgerStoreError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }

    /// Returns `true` when retrying may succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Contention(_))
    }
}
