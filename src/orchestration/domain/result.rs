//! Per-agent invocation results.

use std::time::Duration;

use super::InvocationError;
use crate::capability::domain::AgentName;

/// Outcome of invoking one selected agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentResult {
    agent: AgentName,
    outcome: Result<String, InvocationError>,
    duration: Duration,
}

impl AgentResult {
    /// Records a successful reply.
    #[must_use]
    pub fn answered(agent: AgentName, reply: impl Into<String>, duration: Duration) -> Self {
        Self {
            agent,
            outcome: Ok(reply.into()),
            duration,
        }
    }

    /// Records a failed call.
    #[must_use]
    pub const fn failed(agent: AgentName, error: InvocationError, duration: Duration) -> Self {
        Self {
            agent,
            outcome: Err(error),
            duration,
        }
    }

    /// Returns the invoked agent.
    #[must_use]
    pub const fn agent(&self) -> &AgentName {
        &self.agent
    }

    /// Returns the reply when the agent answered.
    #[must_use]
    pub fn reply(&self) -> Option<&str> {
        self.outcome.as_deref().ok()
    }

    /// Returns the failure when the agent did not answer.
    #[must_use]
    pub const fn error(&self) -> Option<&InvocationError> {
        match &self.outcome {
            Ok(_) => None,
            Err(err) => Some(err),
        }
    }

    /// Returns `true` when the agent answered.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    /// Returns the measured call duration.
    #[must_use]
    pub const fn duration(&self) -> Duration {
        self.duration
    }

    /// Returns the text stored in the ledger: the reply, or the failure.
    #[must_use]
    pub fn ledger_text(&self) -> String {
        match &self.outcome {
            Ok(reply) => reply.clone(),
            Err(err) => err.to_string(),
        }
    }
}
