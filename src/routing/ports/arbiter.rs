//! Arbitration collaborator port.

use crate::routing::domain::{ArbitrationRequest, ArbitrationVerdict};
use crate::routing::ports::ReasoningModelError;
use async_trait::async_trait;
use thiserror::Error;

/// Result type for arbiter calls.
pub type ArbiterResult<T> = Result<T, ArbiterError>;

/// Chooses among ambiguous stage-1 candidates.
///
/// Implementations return the raw verdict; range checking and fallback are
/// handled by [`crate::routing::services::ArbitrationEngine`].
#[async_trait]
pub trait Arbiter: Send + Sync {
    /// Selects candidate indices for the request.
    ///
    /// # Errors
    ///
    /// Returns [`ArbiterError`] when the arbiter cannot produce a verdict.
    async fn arbitrate(&self, request: &ArbitrationRequest) -> ArbiterResult<ArbitrationVerdict>;
}

/// Errors returned by arbiters.
#[derive(Debug, Clone, Error)]
pub enum ArbiterError {
    /// The prompt template failed to render.
    #[error("arbitration prompt could not be rendered: {0}")]
    Prompt(String),

    /// The reasoning model failed.
    #[error(transparent)]
    Model(#[from] ReasoningModelError),

    /// The reply did not contain a valid verdict.
    #[error("arbitration reply is malformed: {0}")]
    MalformedReply(String),

    /// The arbiter is unavailable for another reason.
    #[error("arbiter unavailable: {0}")]
    Unavailable(String),
}
