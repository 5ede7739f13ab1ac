//! Domain types for per-turn orchestration.

mod aggregate;
mod error;
mod request;
mod result;
mod turn;

pub use aggregate::{NO_CAPABLE_AGENT_MESSAGE, TURN_FAILED_MESSAGE, UNAVAILABLE_NOTICE, aggregate};
pub use error::InvocationError;
pub use request::AgentRequest;
pub use result::AgentResult;
pub use turn::{
    TurnOutcome, TurnProgress, TurnRequest, TurnResponse, TurnResponseParts, TurnState,
};
