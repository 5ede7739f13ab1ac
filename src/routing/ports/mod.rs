//! Port contracts for routing collaborators.

pub mod arbiter;
pub mod reasoning;

pub use arbiter::{Arbiter, ArbiterError, ArbiterResult};
pub use reasoning::{ReasoningModel, ReasoningModelError};
