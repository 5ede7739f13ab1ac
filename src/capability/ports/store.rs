//! Snapshot store port for registry persistence.

use crate::capability::domain::RegistrySnapshot;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Result type for snapshot store operations.
pub type SnapshotStoreResult<T> = Result<T, SnapshotStoreError>;

/// Which persisted copy of the registry to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SnapshotSlot {
    /// The authoritative snapshot.
    Primary,
    /// The last known-good snapshot, written before each mutation.
    Backup,
}

impl fmt::Display for SnapshotSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primary => f.write_str("primary"),
            Self::Backup => f.write_str("backup"),
        }
    }
}

/// Durable storage for registry snapshots.
///
/// # Implementation Notes
///
/// Implementations must ensure:
/// - `save` replaces the primary atomically so readers never observe a
///   partially written snapshot
/// - `backup` writes the snapshot it is given, never a copy of the primary,
///   so a corrupt primary cannot overwrite a good backup
/// - `load` reports an absent slot as `Ok(None)` rather than an error
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Reads and decodes a snapshot slot.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotStoreError::Corrupt`] when the slot exists but does
    /// not decode to a valid snapshot, or [`SnapshotStoreError::Io`] when the
    /// slot cannot be read.
    async fn load(&self, slot: SnapshotSlot) -> SnapshotStoreResult<Option<RegistrySnapshot>>;

    /// Atomically replaces the backup slot with `snapshot`.
    ///
    /// Callers pass the last snapshot known to be good, which is not
    /// necessarily what the primary slot holds.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotStoreError`] when encoding or writing fails. The
    /// previous backup is left intact on error.
    async fn backup(&self, snapshot: &RegistrySnapshot) -> SnapshotStoreResult<()>;

    /// Atomically replaces the primary snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotStoreError`] when encoding or writing fails. The
    /// previous primary is left intact on error.
    async fn save(&self, snapshot: &RegistrySnapshot) -> SnapshotStoreResult<()>;
}

/// Errors returned by snapshot store implementations.
#[derive(Debug, Clone, Error)]
pub enum SnapshotStoreError {
    /// The slot exists but does not hold a valid snapshot.
    #[error("{slot} registry snapshot is corrupt: {reason}")]
    Corrupt {
        /// Slot that failed to decode.
        slot: SnapshotSlot,
        /// Parse or validation failure description.
        reason: String,
    },

    /// The snapshot could not be encoded.
    #[error("registry snapshot could not be encoded: {0}")]
    Encoding(String),

    /// Underlying storage failure.
    #[error("registry storage error: {0}")]
    Io(Arc<dyn std::error::Error + Send + Sync>),
}

impl SnapshotStoreError {
    /// Wraps a storage error.
    pub fn io(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Io(Arc::new(err))
    }
}

/// Decodes and validates a persisted snapshot document.
///
/// # Errors
///
/// Returns [`SnapshotStoreError::Corrupt`] when the text is not a valid JSON
/// snapshot or violates snapshot invariants.
pub fn decode_snapshot(slot: SnapshotSlot, text: &str) -> SnapshotStoreResult<RegistrySnapshot> {
    let snapshot: RegistrySnapshot =
        serde_json::from_str(text).map_err(|err| SnapshotStoreError::Corrupt {
            slot,
            reason: err.to_string(),
        })?;
    snapshot
        .validate()
        .map_err(|err| SnapshotStoreError::Corrupt {
            slot,
            reason: err.to_string(),
        })?;
    Ok(snapshot)
}

/// Encodes a snapshot as a pretty-printed JSON document.
///
/// # Errors
///
/// Returns [`SnapshotStoreError::Encoding`] when serialisation fails.
pub fn encode_snapshot(snapshot: &RegistrySnapshot) -> SnapshotStoreResult<String> {
    serde_json::to_string_pretty(snapshot).map_err(|err| SnapshotStoreError::Encoding(err.to_string()))
}
