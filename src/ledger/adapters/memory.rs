//! In-memory ledger store for tests and single-process deployments.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

use crate::ledger::{
    domain::{HistoryMessage, InvocationRecord, Session, SessionId},
    ports::{LedgerStore, LedgerStoreError, LedgerStoreResult},
};

/// Thread-safe in-memory ledger store.
///
/// Contention can be injected to exercise retry behaviour: the next
/// `n` write operations fail with [`LedgerStoreError::Contention`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryLedgerStore {
    state: Arc<Mutex<LedgerState>>,
}

#[derive(Debug, Default)]
struct LedgerState {
    sessions: HashMap<SessionId, Session>,
    invocations: HashMap<SessionId, Vec<InvocationRecord>>,
    history: HashMap<SessionId, Vec<HistoryMessage>>,
    contended_writes: usize,
    write_attempts: usize,
}

impl LedgerState {
    fn begin_write(&mut self) -> LedgerStoreResult<()> {
        self.write_attempts += 1;
        if self.contended_writes > 0 {
            self.contended_writes -= 1;
            return Err(LedgerStoreError::Contention(
                "injected write conflict".to_owned(),
            ));
        }
        Ok(())
    }
}

impl InMemoryLedgerStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `count` writes fail with contention.
    pub fn contend_next_writes(&self, count: usize) {
        self.state.lock().contended_writes = count;
    }

    /// Returns how many writes were attempted, including contended ones.
    #[must_use]
    pub fn write_attempts(&self) -> usize {
        self.state.lock().write_attempts
    }

    /// Returns the number of stored sessions.
    #[must_use]
    pub fn session_count(&self) -> usize {
        self.state.lock().sessions.len()
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn create_session(&self, session: &Session) -> LedgerStoreResult<()> {
        let mut state = self.state.lock();
        state.begin_write()?;
        if state.sessions.contains_key(&session.id()) {
            return Err(LedgerStoreError::DuplicateSession(session.id()));
        }
        state.sessions.insert(session.id(), session.clone());
        Ok(())
    }

    async fn find_session(&self, id: SessionId) -> LedgerStoreResult<Option<Session>> {
        Ok(self.state.lock().sessions.get(&id).cloned())
    }

    async fn record_invocation(&self, record: &InvocationRecord) -> LedgerStoreResult<()> {
        let mut state = self.state.lock();
        state.begin_write()?;
        let id = record.session_id();
        let session = state
            .sessions
            .get_mut(&id)
            .ok_or(LedgerStoreError::SessionNotFound(id))?;
        session.apply_invocation(record);
        state.invocations.entry(id).or_default().push(record.clone());
        Ok(())
    }

    async fn append_history(&self, message: &HistoryMessage) -> LedgerStoreResult<()> {
        let mut state = self.state.lock();
        state.begin_write()?;
        let id = message.session_id();
        let session = state
            .sessions
            .get_mut(&id)
            .ok_or(LedgerStoreError::SessionNotFound(id))?;
        session.touch(message.timestamp());
        state.history.entry(id).or_default().push(message.clone());
        Ok(())
    }

    async fn history(&self, id: SessionId, limit: usize) -> LedgerStoreResult<Vec<HistoryMessage>> {
        let state = self.state.lock();
        let messages = state.history.get(&id).map_or(&[][..], Vec::as_slice);
        let skip = messages.len().saturating_sub(limit);
        Ok(messages.iter().skip(skip).cloned().collect())
    }

    async fn invocations(&self, id: SessionId) -> LedgerStoreResult<Vec<InvocationRecord>> {
        Ok(self
            .state
            .lock()
            .invocations
            .get(&id)
            .cloned()
            .unwrap_or_default())
    }

    async fn delete_sessions_updated_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> LedgerStoreResult<usize> {
        let mut state = self.state.lock();
        state.begin_write()?;
        let stale: Vec<SessionId> = state
            .sessions
            .values()
            .filter(|session| session.updated_at() < cutoff)
            .map(Session::id)
            .collect();
        for id in &stale {
            state.sessions.remove(id);
            state.invocations.remove(id);
            state.history.remove(id);
        }
        Ok(stale.len())
    }
}
