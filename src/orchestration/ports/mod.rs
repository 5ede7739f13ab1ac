//! Port definitions for agent invocation.

mod invocable;

pub use invocable::{Invocable, InvocationResult};
