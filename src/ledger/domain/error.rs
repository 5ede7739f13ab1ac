//! Error types for ledger domain validation.

use thiserror::Error;

/// Errors returned while constructing ledger domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LedgerDomainError {
    /// The user identifier is empty after trimming.
    #[error("user id must not be empty")]
    EmptyUserId,

    /// The user identifier exceeds the 255-character limit.
    #[error("user id exceeds 255 character limit")]
    UserIdTooLong,

    /// A persisted role string is not recognised.
    #[error("unknown history role: {0}")]
    UnknownRole(String),
}
