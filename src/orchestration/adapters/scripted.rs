//! Scripted agents for tests and offline runs.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::capability::domain::InvocationHandle;
use crate::orchestration::{
    domain::{AgentRequest, InvocationError},
    ports::{Invocable, InvocationResult},
};

#[derive(Debug, Clone)]
enum Behaviour {
    Reply(String),
    Fail(String),
    Slow(Duration, String),
}

#[derive(Debug, Default)]
struct ScriptState {
    behaviours: HashMap<String, Behaviour>,
    calls: Vec<(String, AgentRequest)>,
}

/// Invoker that answers from a table keyed by handle target.
///
/// Targets without a scripted behaviour fail with
/// [`InvocationError::Failed`].
#[derive(Debug, Clone, Default)]
pub struct ScriptedAgents {
    state: Arc<Mutex<ScriptState>>,
}

impl ScriptedAgents {
    /// Creates an invoker with no scripted agents.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `target` answer with `reply`.
    #[must_use]
    pub fn replying(self, target: &str, reply: impl Into<String>) -> Self {
        self.script(target, Behaviour::Reply(reply.into()))
    }

    /// Makes `target` fail with `message`.
    #[must_use]
    pub fn failing(self, target: &str, message: impl Into<String>) -> Self {
        self.script(target, Behaviour::Fail(message.into()))
    }

    /// Makes `target` answer with `reply` after `delay`.
    #[must_use]
    pub fn slow(self, target: &str, delay: Duration, reply: impl Into<String>) -> Self {
        self.script(target, Behaviour::Slow(delay, reply.into()))
    }

    /// Returns the number of calls received.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.state.lock().calls.len()
    }

    /// Returns the targets called, in arrival order.
    #[must_use]
    pub fn called_targets(&self) -> Vec<String> {
        self.state
            .lock()
            .calls
            .iter()
            .map(|(target, _)| target.clone())
            .collect()
    }

    /// Returns the requests received, in arrival order.
    #[must_use]
    pub fn requests(&self) -> Vec<AgentRequest> {
        self.state
            .lock()
            .calls
            .iter()
            .map(|(_, request)| request.clone())
            .collect()
    }

    fn script(self, target: &str, behaviour: Behaviour) -> Self {
        self.state
            .lock()
            .behaviours
            .insert(target.to_owned(), behaviour);
        self
    }
}

#[async_trait]
impl Invocable for ScriptedAgents {
    async fn invoke(
        &self,
        handle: &InvocationHandle,
        request: &AgentRequest,
    ) -> InvocationResult<String> {
        let behaviour = {
            let mut state = self.state.lock();
            state
                .calls
                .push((handle.target().to_owned(), request.clone()));
            state.behaviours.get(handle.target()).cloned()
        };
        match behaviour {
            Some(Behaviour::Reply(reply)) => Ok(reply),
            Some(Behaviour::Slow(delay, reply)) => {
                tokio::time::sleep(delay).await;
                Ok(reply)
            }
            Some(Behaviour::Fail(message)) => Err(InvocationError::Failed(message)),
            None => Err(InvocationError::Failed(format!(
                "no scripted reply for '{}'",
                handle.target()
            ))),
        }
    }
}
