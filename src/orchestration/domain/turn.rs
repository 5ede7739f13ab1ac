//! Turn requests, responses and lifecycle states.

use std::fmt;

use super::AgentResult;
use crate::ledger::domain::SessionId;
use crate::routing::domain::ArbitrationOutcome;

/// One user turn to be handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnRequest {
    user_id: String,
    query: String,
    session_id: Option<SessionId>,
}

impl TurnRequest {
    /// Creates a request that starts a new session.
    #[must_use]
    pub fn new(user_id: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            query: query.into(),
            session_id: None,
        }
    }

    /// Continues an existing session.
    #[must_use]
    pub const fn in_session(mut self, session_id: SessionId) -> Self {
        self.session_id = Some(session_id);
        self
    }

    /// Returns the requesting user.
    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Returns the query text.
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Returns the session to continue, if any.
    #[must_use]
    pub const fn session_id(&self) -> Option<SessionId> {
        self.session_id
    }
}

/// Lifecycle state of a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TurnState {
    /// Accepted, session not yet resolved.
    Received,
    /// Scoring and arbitration in progress.
    Routing,
    /// No agent matched. Terminal.
    NoMatch,
    /// Selected agents are being called.
    Invoking,
    /// Replies are being combined.
    Aggregating,
    /// Invocations and history are being written.
    Persisting,
    /// A response was produced. Terminal.
    Responded,
}

impl TurnState {
    /// Returns `true` when no further transition is allowed.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::NoMatch | Self::Responded)
    }

    /// Returns `true` when `next` may follow `self`.
    ///
    /// Any non-terminal state may jump to [`Self::Responded`] when a fault
    /// ends the turn early.
    #[must_use]
    pub const fn can_advance_to(self, next: Self) -> bool {
        match (self, next) {
            (Self::NoMatch | Self::Responded, _) => false,
            (_, Self::Responded)
            | (Self::Received, Self::Routing)
            | (Self::Routing, Self::NoMatch | Self::Invoking)
            | (Self::Invoking, Self::Aggregating)
            | (Self::Aggregating, Self::Persisting) => true,
            _ => false,
        }
    }

    /// Returns the state name in upper snake case.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Received => "RECEIVED",
            Self::Routing => "ROUTING",
            Self::NoMatch => "NO_MATCH",
            Self::Invoking => "INVOKING",
            Self::Aggregating => "AGGREGATING",
            Self::Persisting => "PERSISTING",
            Self::Responded => "RESPONDED",
        }
    }
}

impl fmt::Display for TurnState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a turn ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// At least one agent was invoked and the response aggregates replies.
    Answered,
    /// Stage 1 produced no candidate; nothing was invoked.
    NoCapableAgent,
    /// An infrastructure fault ended the turn with an error-shaped body.
    Failed,
}

/// Parameters for building a [`TurnResponse`].
#[derive(Debug, Clone)]
pub struct TurnResponseParts {
    /// Session the turn belongs to, when one was resolved.
    pub session_id: Option<SessionId>,
    /// How the turn ended.
    pub outcome: TurnOutcome,
    /// Response body shown to the user.
    pub body: String,
    /// Per-agent results in selection order.
    pub results: Vec<AgentResult>,
    /// Stage-2 trace, when arbitration ran.
    pub arbitration: Option<ArbitrationOutcome>,
    /// Whether invocations and history were written to the ledger.
    pub persisted: bool,
    /// States visited, in order.
    pub states: Vec<TurnState>,
}

/// Result of handling one turn.
#[derive(Debug, Clone)]
pub struct TurnResponse {
    session_id: Option<SessionId>,
    outcome: TurnOutcome,
    body: String,
    results: Vec<AgentResult>,
    arbitration: Option<ArbitrationOutcome>,
    persisted: bool,
    states: Vec<TurnState>,
}

impl TurnResponse {
    /// Builds a response from its parts.
    #[must_use]
    pub fn new(parts: TurnResponseParts) -> Self {
        Self {
            session_id: parts.session_id,
            outcome: parts.outcome,
            body: parts.body,
            results: parts.results,
            arbitration: parts.arbitration,
            persisted: parts.persisted,
            states: parts.states,
        }
    }

    /// Returns the session id, absent only when session resolution failed.
    #[must_use]
    pub const fn session_id(&self) -> Option<SessionId> {
        self.session_id
    }

    /// Returns how the turn ended.
    #[must_use]
    pub const fn outcome(&self) -> TurnOutcome {
        self.outcome
    }

    /// Returns the response body.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Returns per-agent results in selection order.
    #[must_use]
    pub fn results(&self) -> &[AgentResult] {
        &self.results
    }

    /// Returns the arbitration trace when stage 2 ran.
    #[must_use]
    pub const fn arbitration(&self) -> Option<&ArbitrationOutcome> {
        self.arbitration.as_ref()
    }

    /// Returns `true` when the turn was written to the ledger.
    #[must_use]
    pub const fn persisted(&self) -> bool {
        self.persisted
    }

    /// Returns the states the turn passed through.
    #[must_use]
    pub fn states(&self) -> &[TurnState] {
        &self.states
    }
}

/// Ordered record of the states a turn has visited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnProgress {
    visited: Vec<TurnState>,
}

impl TurnProgress {
    /// Starts a turn in [`TurnState::Received`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            visited: vec![TurnState::Received],
        }
    }

    /// Returns the current state.
    #[must_use]
    pub fn current(&self) -> TurnState {
        self.visited.last().copied().unwrap_or(TurnState::Received)
    }

    /// Moves to `next` when the transition is allowed.
    ///
    /// Returns `false` and stays put otherwise.
    pub fn advance(&mut self, next: TurnState) -> bool {
        if !self.current().can_advance_to(next) {
            return false;
        }
        self.visited.push(next);
        true
    }

    /// Consumes the tracker, returning the visited states.
    #[must_use]
    pub fn into_states(self) -> Vec<TurnState> {
        self.visited
    }
}

impl Default for TurnProgress {
    fn default() -> Self {
        Self::new()
    }
}
