//! Request handed to an agent.

use crate::ledger::domain::SessionId;
use crate::routing::domain::RoutingContext;

/// Everything an agent receives for one turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentRequest {
    session_id: SessionId,
    query: String,
    context_summary: String,
}

impl AgentRequest {
    /// Builds a request from the turn's query and routing context.
    #[must_use]
    pub fn new(session_id: SessionId, query: impl Into<String>, context: &RoutingContext) -> Self {
        Self {
            session_id,
            query: query.into(),
            context_summary: context.summary(),
        }
    }

    /// Returns the session the request belongs to.
    #[must_use]
    pub const fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// Returns the user's query.
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Returns a one-line summary of the prior turn.
    #[must_use]
    pub fn context_summary(&self) -> &str {
        &self.context_summary
    }
}
