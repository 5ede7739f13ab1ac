//! Snapshot store adapters for the capability registry.
//!
//! - [`fs::FileSnapshotStore`]: JSON files with atomic replace and a sibling
//!   backup, for production use
//! - [`memory::InMemorySnapshotStore`]: raw text slots with failure
//!   injection, for tests

pub mod fs;
pub mod memory;

pub use fs::FileSnapshotStore;
pub use memory::InMemorySnapshotStore;
