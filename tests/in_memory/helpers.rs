//! Shared fixtures for in-memory integration tests.

use std::sync::Arc;

use concierge::capability::{
    adapters::InMemorySnapshotStore,
    domain::CapabilityProfile,
    services::{CapabilityRegistry, RegisterAgentRequest},
};
use concierge::ledger::{
    adapters::InMemoryLedgerStore,
    services::{LedgerConfig, SessionLedger},
};
use concierge::orchestration::{
    adapters::{ScriptedAgents, TransportDispatcher},
    services::{InvocationConfig, OrchestrationCoordinator},
};
use concierge::routing::{
    adapters::ScriptedArbiter,
    services::{ArbitrationConfig, Router, ScoringConfig},
};
use mockable::DefaultClock;

/// Registry type used across the suite.
pub type TestRegistry = CapabilityRegistry<InMemorySnapshotStore, DefaultClock>;

/// Ledger type used across the suite.
pub type TestLedger = SessionLedger<InMemoryLedgerStore, DefaultClock>;

/// Coordinator type used across the suite.
pub type TestCoordinator = OrchestrationCoordinator<
    InMemorySnapshotStore,
    ScriptedArbiter,
    InMemoryLedgerStore,
    TransportDispatcher,
    DefaultClock,
>;

/// A fully wired in-memory deployment.
pub struct Stack {
    /// Shared registry.
    pub registry: Arc<TestRegistry>,
    /// Shared ledger service.
    pub ledger: Arc<TestLedger>,
    /// Arbiter handle for call assertions.
    pub arbiter: Arc<ScriptedArbiter>,
    /// Agents reached over the `local` transport.
    pub local_agents: ScriptedAgents,
    /// Agents reached over the `http` transport.
    pub http_agents: ScriptedAgents,
    /// Coordinator under test.
    pub coordinator: TestCoordinator,
}

/// Builds an empty registry with no compiled-in defaults.
pub async fn empty_registry() -> TestRegistry {
    let registry = CapabilityRegistry::with_defaults(
        Arc::new(InMemorySnapshotStore::new()),
        Arc::new(DefaultClock),
        Vec::new(),
    );
    registry.load().await;
    registry
}

/// Registration request for an agent covering one domain.
pub fn domain_agent(name: &str, transport: &str, domains: &[&str]) -> RegisterAgentRequest {
    RegisterAgentRequest::new(name, format!("{name} answers questions"), transport, name)
        .with_profile(
            CapabilityProfile::new()
                .with_domains(domains.iter().copied())
                .with_entities(domains.iter().copied()),
        )
}

/// Wires a stack with the tickets agent on `local` and the courses agent on
/// `http`.
pub async fn stack(arbiter: ScriptedArbiter) -> Stack {
    let registry = Arc::new(empty_registry().await);
    for request in [
        domain_agent("TicketsAgent", "local", &["tickets"]),
        domain_agent("OxygenAgent", "http", &["courses"]),
    ] {
        registry.register(request).await.expect("agent registers");
    }

    let local_agents = ScriptedAgents::new().replying("TicketsAgent", "Ticket #42 is open.");
    let http_agents = ScriptedAgents::new().replying("OxygenAgent", "Rust 101 is 80% done.");
    let dispatcher = TransportDispatcher::new()
        .with_transport("local", Arc::new(local_agents.clone()))
        .with_transport("http", Arc::new(http_agents.clone()));

    let arbiter = Arc::new(arbiter);
    let ledger = Arc::new(SessionLedger::new(
        Arc::new(InMemoryLedgerStore::new()),
        Arc::new(DefaultClock),
        LedgerConfig::default(),
    ));
    let coordinator = OrchestrationCoordinator::new(
        Arc::clone(&registry),
        Router::new(
            Arc::clone(&arbiter),
            ScoringConfig::default(),
            &ArbitrationConfig::default(),
        ),
        Arc::clone(&ledger),
        Arc::new(dispatcher),
        InvocationConfig::default(),
    );

    Stack {
        registry,
        ledger,
        arbiter,
        local_agents,
        http_agents,
        coordinator,
    }
}
