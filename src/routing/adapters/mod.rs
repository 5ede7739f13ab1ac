//! Arbiter adapters.
//!
//! - [`reasoning::ReasoningArbiter`]: renders a prompt and parses the JSON
//!   reply of a [`crate::routing::ports::ReasoningModel`]
//! - [`scripted::ScriptedArbiter`]: canned replies with a call counter

pub mod reasoning;
pub mod scripted;

pub use reasoning::{DEFAULT_ARBITRATION_TEMPLATE, ReasoningArbiter, parse_verdict};
pub use scripted::{ScriptedArbiter, ScriptedReply};
