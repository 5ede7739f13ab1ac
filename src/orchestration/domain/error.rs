//! Agent invocation failures.

use std::time::Duration;
use thiserror::Error;

/// Why a single agent call failed.
///
/// A failure is isolated to the agent's own section of the turn; it never
/// fails the turn as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvocationError {
    /// No invoker is registered for the descriptor's transport.
    #[error("no invoker registered for transport '{0}'")]
    UnsupportedTransport(String),

    /// The agent did not answer within the per-agent timeout.
    #[error("agent timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// The agent answered with an error.
    #[error("agent call failed: {0}")]
    Failed(String),

    /// The invocation task panicked or was aborted.
    #[error("agent task aborted: {0}")]
    Aborted(String),
}
