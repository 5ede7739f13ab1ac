//! Concierge: capability routing for multi-agent assistants.
//!
//! Routes natural-language requests to specialised agents, tracks session
//! state and keeps a durable directory of the agents it knows about.
//!
//! # Architecture
//!
//! Each subsystem follows hexagonal architecture:
//!
//! - **Domain**: validated types and pure logic
//! - **Ports**: async traits for storage, reasoning and agent invocation
//! - **Adapters**: in-memory, filesystem, `PostgreSQL` and scripted
//!   implementations of the ports
//! - **Services**: the operations callers use
//!
//! # Modules
//!
//! - [`capability`]: durable agent registry with backup and default fallback
//! - [`routing`]: stage-1 scoring and stage-2 arbitration
//! - [`ledger`]: sessions, invocation records and history
//! - [`orchestration`]: per-turn control flow and agent fan-out
//! - [`config`]: layered configuration
//! - [`telemetry`]: tracing subscriber setup

pub mod capability;
pub mod config;
pub mod ledger;
pub mod orchestration;
pub mod routing;
pub mod telemetry;
