//! Append-only invocation audit records.

use super::SessionId;
use crate::capability::domain::AgentName;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum excerpt length, in characters, kept by default.
pub const DEFAULT_EXCERPT_CHARS: usize = 500;

/// One agent invocation within a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationRecord {
    session_id: SessionId,
    agent_name: AgentName,
    query: String,
    response_excerpt: String,
    success: bool,
    duration_ms: u64,
    timestamp: DateTime<Utc>,
}

/// Parameters for building an [`InvocationRecord`].
#[derive(Debug, Clone)]
pub struct InvocationParams {
    /// Session the invocation belongs to.
    pub session_id: SessionId,
    /// Invoked agent.
    pub agent_name: AgentName,
    /// Query sent to the agent.
    pub query: String,
    /// Reply, or a failure description, already truncated.
    pub response_excerpt: String,
    /// Whether the agent answered.
    pub success: bool,
    /// Wall-clock duration of the call.
    pub duration_ms: u64,
    /// When the invocation completed.
    pub timestamp: DateTime<Utc>,
}

impl InvocationRecord {
    /// Builds a record from its parameters.
    #[must_use]
    pub fn new(params: InvocationParams) -> Self {
        Self {
            session_id: params.session_id,
            agent_name: params.agent_name,
            query: params.query,
            response_excerpt: params.response_excerpt,
            success: params.success,
            duration_ms: params.duration_ms,
            timestamp: params.timestamp,
        }
    }

    /// Returns the owning session.
    #[must_use]
    pub const fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// Returns the invoked agent.
    #[must_use]
    pub const fn agent_name(&self) -> &AgentName {
        &self.agent_name
    }

    /// Returns the query sent to the agent.
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Returns the truncated reply.
    #[must_use]
    pub fn response_excerpt(&self) -> &str {
        &self.response_excerpt
    }

    /// Returns whether the agent answered.
    #[must_use]
    pub const fn success(&self) -> bool {
        self.success
    }

    /// Returns the call duration in milliseconds.
    #[must_use]
    pub const fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    /// Returns when the invocation completed.
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Truncates text to at most `max_chars` characters on a char boundary.
#[must_use]
pub fn truncate_excerpt(text: &str, max_chars: usize) -> String {
    text.char_indices()
        .nth(max_chars)
        .map_or_else(|| text.to_owned(), |(end, _)| text.get(..end).unwrap_or(text).to_owned())
}
