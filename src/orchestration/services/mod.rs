//! Turn coordinator.

mod coordinator;

pub use coordinator::{InvocationConfig, OrchestrationCoordinator};
