//! Session aggregate with denormalised last-turn fields.

use super::{InvocationRecord, SessionId, UserId};
use crate::capability::domain::AgentName;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// A user's conversation session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    id: SessionId,
    user_id: UserId,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    last_agent_called: Option<AgentName>,
    last_query: Option<String>,
    last_response_excerpt: Option<String>,
}

/// Parameters for reconstructing a session from storage.
#[derive(Debug, Clone)]
pub struct PersistedSession {
    /// Session identifier.
    pub id: SessionId,
    /// Owning user.
    pub user_id: UserId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Latest write timestamp.
    pub updated_at: DateTime<Utc>,
    /// Agent invoked most recently.
    pub last_agent_called: Option<AgentName>,
    /// Query of the most recent invocation.
    pub last_query: Option<String>,
    /// Truncated reply of the most recent invocation.
    pub last_response_excerpt: Option<String>,
}

impl Session {
    /// Starts a new session for a user.
    #[must_use]
    pub fn new(user_id: UserId, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        Self {
            id: SessionId::new(),
            user_id,
            created_at: timestamp,
            updated_at: timestamp,
            last_agent_called: None,
            last_query: None,
            last_response_excerpt: None,
        }
    }

    /// Reconstructs a session from persisted data.
    #[must_use]
    pub fn from_persisted(data: PersistedSession) -> Self {
        Self {
            id: data.id,
            user_id: data.user_id,
            created_at: data.created_at,
            updated_at: data.updated_at,
            last_agent_called: data.last_agent_called,
            last_query: data.last_query,
            last_response_excerpt: data.last_response_excerpt,
        }
    }

    /// Returns the session identifier.
    #[must_use]
    pub const fn id(&self) -> SessionId {
        self.id
    }

    /// Returns the owning user.
    #[must_use]
    pub const fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest write timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns the agent invoked most recently.
    #[must_use]
    pub const fn last_agent_called(&self) -> Option<&AgentName> {
        self.last_agent_called.as_ref()
    }

    /// Returns the query of the most recent invocation.
    #[must_use]
    pub fn last_query(&self) -> Option<&str> {
        self.last_query.as_deref()
    }

    /// Returns the truncated reply of the most recent invocation.
    #[must_use]
    pub fn last_response_excerpt(&self) -> Option<&str> {
        self.last_response_excerpt.as_deref()
    }

    /// Copies the denormalised fields from an invocation record.
    pub fn apply_invocation(&mut self, record: &InvocationRecord) {
        self.last_agent_called = Some(record.agent_name().clone());
        self.last_query = Some(record.query().to_owned());
        self.last_response_excerpt = Some(record.response_excerpt().to_owned());
        self.updated_at = record.timestamp();
    }

    /// Advances the latest write timestamp.
    pub fn touch(&mut self, at: DateTime<Utc>) {
        if at > self.updated_at {
            self.updated_at = at;
        }
    }
}
