//! Conversation context carried into routing.

use crate::capability::domain::AgentName;

/// What the router knows about the previous turn of a session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoutingContext {
    last_agent: Option<AgentName>,
    last_query: Option<String>,
}

impl RoutingContext {
    /// Creates an empty context for a fresh session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the agent that handled the previous turn.
    #[must_use]
    pub fn with_last_agent(mut self, agent: AgentName) -> Self {
        self.last_agent = Some(agent);
        self
    }

    /// Records the previous query.
    #[must_use]
    pub fn with_last_query(mut self, query: impl Into<String>) -> Self {
        self.last_query = Some(query.into());
        self
    }

    /// Returns the agent that handled the previous turn.
    #[must_use]
    pub const fn last_agent(&self) -> Option<&AgentName> {
        self.last_agent.as_ref()
    }

    /// Returns the previous query.
    #[must_use]
    pub fn last_query(&self) -> Option<&str> {
        self.last_query.as_deref()
    }

    /// Renders a one-line summary for the arbiter prompt.
    #[must_use]
    pub fn summary(&self) -> String {
        match (&self.last_agent, &self.last_query) {
            (Some(agent), Some(query)) => {
                format!("The previous turn was handled by {agent} for the request \"{query}\".")
            }
            (Some(agent), None) => format!("The previous turn was handled by {agent}."),
            (None, Some(query)) => format!("The previous request was \"{query}\"."),
            (None, None) => "This is the first turn of the session.".to_owned(),
        }
    }
}
