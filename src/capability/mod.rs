//! Capability registry for the concierge.
//!
//! Holds the durable directory of agent descriptors: what each agent can
//! handle and how to reach it. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Registry service in [`services`]
//!
//! The compiled-in fallback agent set lives in [`defaults`].

pub mod adapters;
pub mod defaults;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
