//! Invocation adapters.

pub mod dispatcher;
pub mod scripted;

pub use dispatcher::TransportDispatcher;
pub use scripted::ScriptedAgents;
