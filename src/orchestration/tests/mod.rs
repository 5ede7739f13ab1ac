//! Unit tests for per-turn orchestration.

mod domain_tests;

use std::sync::Arc;

use mockable::DefaultClock;

use crate::capability::{adapters::memory::InMemorySnapshotStore, services::CapabilityRegistry};
use crate::ledger::{
    adapters::InMemoryLedgerStore,
    services::{LedgerConfig, SessionLedger},
};
use crate::orchestration::{
    adapters::{ScriptedAgents, TransportDispatcher},
    services::{InvocationConfig, OrchestrationCoordinator},
};
use crate::routing::{
    adapters::scripted::ScriptedArbiter,
    services::{ArbitrationConfig, Router, ScoringConfig},
};

type TestCoordinator = OrchestrationCoordinator<
    InMemorySnapshotStore,
    ScriptedArbiter,
    InMemoryLedgerStore,
    TransportDispatcher,
    DefaultClock,
>;

struct Harness {
    coordinator: TestCoordinator,
    arbiter: Arc<ScriptedArbiter>,
    agents: ScriptedAgents,
    ledger_store: InMemoryLedgerStore,
    ledger: Arc<SessionLedger<InMemoryLedgerStore, DefaultClock>>,
}

fn builtin_agents() -> ScriptedAgents {
    ScriptedAgents::new()
        .replying("TicketsAgent", "You have 2 open tickets.")
        .replying("CostAnalyticsAgent", "Spend is on budget.")
        .replying("OxygenAgent", "You are enrolled in 3 courses.")
}

/// Builds a coordinator over the built-in agents, all on the local
/// transport.
async fn harness_with(
    arbiter: ScriptedArbiter,
    agents: ScriptedAgents,
    invocation: InvocationConfig,
) -> Harness {
    let clock = Arc::new(DefaultClock);
    let registry = Arc::new(CapabilityRegistry::new(
        Arc::new(InMemorySnapshotStore::new()),
        Arc::clone(&clock),
    ));
    registry.load().await;

    let arbiter = Arc::new(arbiter);
    let router = Router::new(
        Arc::clone(&arbiter),
        ScoringConfig::default(),
        &ArbitrationConfig::default(),
    );
    let ledger_store = InMemoryLedgerStore::new();
    let ledger = Arc::new(SessionLedger::new(
        Arc::new(ledger_store.clone()),
        clock,
        LedgerConfig::default(),
    ));
    let dispatcher = TransportDispatcher::new().with_transport("local", Arc::new(agents.clone()));

    Harness {
        coordinator: OrchestrationCoordinator::new(
            registry,
            router,
            Arc::clone(&ledger),
            Arc::new(dispatcher),
            invocation,
        ),
        arbiter,
        agents,
        ledger_store,
        ledger,
    }
}

async fn harness() -> Harness {
    harness_with(
        ScriptedArbiter::selecting([0, 1]),
        builtin_agents(),
        InvocationConfig::default(),
    )
    .await
}
