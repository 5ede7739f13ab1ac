//! Port contracts for the capability registry.
//!
//! Ports define infrastructure-agnostic interfaces used by registry
//! services.

pub mod store;

pub use store::{
    SnapshotSlot, SnapshotStore, SnapshotStoreError, SnapshotStoreResult, decode_snapshot,
    encode_snapshot,
};
