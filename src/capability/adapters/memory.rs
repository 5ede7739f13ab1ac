//! In-memory snapshot store for tests.
//!
//! Slots hold raw document text so tests can plant corrupt snapshots, and
//! failures can be injected into the next saves or backups.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;

use crate::capability::{
    domain::RegistrySnapshot,
    ports::{
        SnapshotSlot, SnapshotStore, SnapshotStoreError, SnapshotStoreResult, decode_snapshot,
        encode_snapshot,
    },
};

/// Thread-safe in-memory snapshot store.
#[derive(Debug, Clone, Default)]
pub struct InMemorySnapshotStore {
    state: Arc<Mutex<MemoryState>>,
}

#[derive(Debug, Default)]
struct MemoryState {
    primary: Option<String>,
    backup: Option<String>,
    failing_saves: usize,
    failing_backups: usize,
    saves: usize,
}

impl InMemorySnapshotStore {
    /// Creates a store with both slots empty.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the raw primary document.
    pub fn set_primary_text(&self, text: impl Into<String>) {
        self.state.lock().primary = Some(text.into());
    }

    /// Replaces the raw backup document.
    pub fn set_backup_text(&self, text: impl Into<String>) {
        self.state.lock().backup = Some(text.into());
    }

    /// Returns the raw primary document, if any.
    #[must_use]
    pub fn primary_text(&self) -> Option<String> {
        self.state.lock().primary.clone()
    }

    /// Returns the raw backup document, if any.
    #[must_use]
    pub fn backup_text(&self) -> Option<String> {
        self.state.lock().backup.clone()
    }

    /// Makes the next `count` saves fail with a storage error.
    pub fn fail_next_saves(&self, count: usize) {
        self.state.lock().failing_saves = count;
    }

    /// Makes the next `count` backups fail with a storage error.
    pub fn fail_next_backups(&self, count: usize) {
        self.state.lock().failing_backups = count;
    }

    /// Returns the number of successful saves.
    #[must_use]
    pub fn save_count(&self) -> usize {
        self.state.lock().saves
    }
}

#[async_trait]
impl SnapshotStore for InMemorySnapshotStore {
    async fn load(&self, slot: SnapshotSlot) -> SnapshotStoreResult<Option<RegistrySnapshot>> {
        let text = {
            let state = self.state.lock();
            match slot {
                SnapshotSlot::Primary => state.primary.clone(),
                SnapshotSlot::Backup => state.backup.clone(),
            }
        };
        text.map(|document| decode_snapshot(slot, &document))
            .transpose()
    }

    async fn backup(&self, snapshot: &RegistrySnapshot) -> SnapshotStoreResult<()> {
        let document = encode_snapshot(snapshot)?;
        let mut state = self.state.lock();
        if state.failing_backups > 0 {
            state.failing_backups -= 1;
            return Err(injected("backup"));
        }
        state.backup = Some(document);
        Ok(())
    }

    async fn save(&self, snapshot: &RegistrySnapshot) -> SnapshotStoreResult<()> {
        let document = encode_snapshot(snapshot)?;
        let mut state = self.state.lock();
        if state.failing_saves > 0 {
            state.failing_saves -= 1;
            return Err(injected("save"));
        }
        state.primary = Some(document);
        state.saves += 1;
        Ok(())
    }
}

fn injected(operation: &str) -> SnapshotStoreError {
    SnapshotStoreError::io(std::io::Error::other(format!(
        "injected {operation} failure"
    )))
}
