//! Domain model for the session ledger.
//!
//! Sessions carry denormalised last-turn fields used as routing context.
//! Invocation records and history messages are append-only and ordered
//! within a session.

mod error;
mod history;
mod ids;
mod record;
mod session;

pub use error::LedgerDomainError;
pub use history::{HistoryMessage, Role};
pub use ids::{SessionId, UserId};
pub use record::{DEFAULT_EXCERPT_CHARS, InvocationParams, InvocationRecord, truncate_excerpt};
pub use session::{PersistedSession, Session};
