//! `PostgreSQL` adapter for session ledger persistence.

mod models;
mod repository;
mod schema;

pub use repository::{LedgerPgPool, PostgresLedgerStore};
