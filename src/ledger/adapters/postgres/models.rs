//! Diesel row models for session ledger persistence.

use super::schema::{agent_invocations, history, sessions};
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for sessions.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = sessions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SessionRow {
    /// Session identifier.
    pub id: uuid::Uuid,
    /// Owning user.
    pub user_id: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Latest write timestamp.
    pub updated_at: DateTime<Utc>,
    /// Agent invoked most recently.
    pub last_agent_called: Option<String>,
    /// Query of the most recent invocation.
    pub last_query: Option<String>,
    /// Truncated reply of the most recent invocation.
    pub last_response_excerpt: Option<String>,
}

/// Insert model for sessions.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = sessions)]
pub struct NewSessionRow {
    /// Session identifier.
    pub id: uuid::Uuid,
    /// Owning user.
    pub user_id: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Latest write timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Query result row for invocation records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = agent_invocations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct InvocationRow {
    /// Append sequence.
    pub id: i64,
    /// Owning session.
    pub session_id: uuid::Uuid,
    /// Invoked agent.
    pub agent_name: String,
    /// Query sent to the agent.
    pub query: String,
    /// Truncated reply.
    pub response_excerpt: String,
    /// Whether the agent answered.
    pub success: bool,
    /// Call duration in milliseconds.
    pub duration_ms: i64,
    /// Completion timestamp.
    pub created_at: DateTime<Utc>,
}

/// Insert model for invocation records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = agent_invocations)]
pub struct NewInvocationRow {
    /// Owning session.
    pub session_id: uuid::Uuid,
    /// Invoked agent.
    pub agent_name: String,
    /// Query sent to the agent.
    pub query: String,
    /// Truncated reply.
    pub response_excerpt: String,
    /// Whether the agent answered.
    pub success: bool,
    /// Call duration in milliseconds.
    pub duration_ms: i64,
    /// Completion timestamp.
    pub created_at: DateTime<Utc>,
}

/// Query result row for history messages.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = history)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct HistoryRow {
    /// Append sequence.
    pub id: i64,
    /// Owning session.
    pub session_id: uuid::Uuid,
    /// Author role.
    pub role: String,
    /// Message text.
    pub content: String,
    /// Append timestamp.
    pub created_at: DateTime<Utc>,
}

/// Insert model for history messages.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = history)]
pub struct NewHistoryRow {
    /// Owning session.
    pub session_id: uuid::Uuid,
    /// Author role.
    pub role: String,
    /// Message text.
    pub content: String,
    /// Append timestamp.
    pub created_at: DateTime<Utc>,
}
