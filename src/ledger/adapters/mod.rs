//! Ledger store adapters.
//!
//! - [`memory::InMemoryLedgerStore`]: process-local store with contention
//!   injection
//! - `postgres::PostgresLedgerStore`: Diesel-backed store, behind the
//!   `postgres` feature

pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;

pub use memory::InMemoryLedgerStore;
