//! Agent invocation port.

use crate::capability::domain::InvocationHandle;
use crate::orchestration::domain::{AgentRequest, InvocationError};
use async_trait::async_trait;

/// Result type for agent invocations.
pub type InvocationResult<T> = Result<T, InvocationError>;

/// Calls an agent through its invocation handle.
///
/// Implementations own the wire format for their transport. Timing and
/// success accounting are done by the caller.
#[async_trait]
pub trait Invocable: Send + Sync {
    /// Sends the request to the agent behind `handle` and returns its reply.
    ///
    /// # Errors
    ///
    /// Returns [`InvocationError`] when the agent cannot be reached or
    /// answers with an error.
    async fn invoke(
        &self,
        handle: &InvocationHandle,
        request: &AgentRequest,
    ) -> InvocationResult<String>;
}
