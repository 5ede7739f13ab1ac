//! Port contracts for session ledger persistence.

pub mod store;

pub use store::{LedgerStore, LedgerStoreError, LedgerStoreResult};
