//! Reasoning model port used by prompt-based arbiters.

use async_trait::async_trait;
use thiserror::Error;

/// Text completion backend.
#[async_trait]
pub trait ReasoningModel: Send + Sync {
    /// Completes a prompt, returning the raw reply text.
    ///
    /// # Errors
    ///
    /// Returns [`ReasoningModelError`] when the backend fails.
    async fn complete(&self, prompt: &str) -> Result<String, ReasoningModelError>;
}

/// Errors returned by reasoning model backends.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReasoningModelError {
    /// The request to the backend failed.
    #[error("reasoning model request failed: {0}")]
    Request(String),

    /// The backend returned an empty reply.
    #[error("reasoning model returned an empty reply")]
    EmptyReply,
}
