//! Transport-keyed dispatch.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::capability::domain::InvocationHandle;
use crate::orchestration::{
    domain::{AgentRequest, InvocationError},
    ports::{Invocable, InvocationResult},
};

/// Routes each call to the [`Invocable`] registered for the handle's
/// transport.
#[derive(Clone, Default)]
pub struct TransportDispatcher {
    transports: HashMap<String, Arc<dyn Invocable>>,
}

impl TransportDispatcher {
    /// Creates a dispatcher with no transports.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an invoker for a transport, replacing any previous one.
    #[must_use]
    pub fn with_transport(mut self, transport: &str, invoker: Arc<dyn Invocable>) -> Self {
        self.transports
            .insert(transport.trim().to_lowercase(), invoker);
        self
    }

    /// Returns the registered transport names, sorted.
    #[must_use]
    pub fn transports(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.transports.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[async_trait]
impl Invocable for TransportDispatcher {
    async fn invoke(
        &self,
        handle: &InvocationHandle,
        request: &AgentRequest,
    ) -> InvocationResult<String> {
        let invoker = self
            .transports
            .get(handle.transport())
            .ok_or_else(|| InvocationError::UnsupportedTransport(handle.transport().to_owned()))?;
        debug!(%handle, "dispatching agent call");
        invoker.invoke(handle, request).await
    }
}
