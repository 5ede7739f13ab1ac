//! Shared world state for routing BDD scenarios.

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
    domain::TurnResponse,
    services::{InvocationConfig, OrchestrationCoordinator},
};
use concierge::routing::{
    adapters::ScriptedArbiter,
    services::{ArbitrationConfig, Router, ScoringConfig},
};
use mockable::DefaultClock;
use rstest::fixture;

/// Coordinator type assembled by the world.
pub type ScenarioCoordinator = OrchestrationCoordinator<
    InMemorySnapshotStore,
    ScriptedArbiter,
    InMemoryLedgerStore,
    TransportDispatcher,
    DefaultClock,
>;

/// Scenario world for routing behaviour tests.
pub struct RoutingWorld {
    /// Registry the agents are registered in.
    pub registry: Arc<CapabilityRegistry<InMemorySnapshotStore, DefaultClock>>,
    /// Ledger the turns are recorded in.
    pub ledger: Arc<SessionLedger<InMemoryLedgerStore, DefaultClock>>,
    /// Scripted agents on the `local` transport.
    pub agents: ScriptedAgents,
    /// Arbiter, set by a Given step.
    pub arbiter: Option<Arc<ScriptedArbiter>>,
    /// Coordinator, built lazily on the first turn.
    pub coordinator: Option<ScenarioCoordinator>,
    /// Response to the latest turn.
    pub last_response: Option<TurnResponse>,
}

impl RoutingWorld {
    /// Creates a world with empty registry and ledger.
    #[must_use]
    pub fn new() -> Self {
        let clock = Arc::new(DefaultClock);
        Self {
            registry: Arc::new(CapabilityRegistry::with_defaults(
                Arc::new(InMemorySnapshotStore::new()),
                Arc::clone(&clock),
                Vec::new(),
            )),
            ledger: Arc::new(SessionLedger::new(
                Arc::new(InMemoryLedgerStore::new()),
                clock,
                LedgerConfig::default(),
            )),
            agents: ScriptedAgents::new(),
            arbiter: None,
            coordinator: None,
            last_response: None,
        }
    }

    /// Returns the coordinator, building it on first use.
    ///
    /// # Errors
    ///
    /// Returns an error when no arbiter was configured.
    pub fn coordinator(&mut self) -> Result<&ScenarioCoordinator, eyre::Report> {
        if self.coordinator.is_none() {
            let arbiter = self
                .arbiter
                .clone()
                .ok_or_else(|| eyre::eyre!("scenario did not configure an arbiter"))?;
            let dispatcher =
                TransportDispatcher::new().with_transport("local", Arc::new(self.agents.clone()));
            self.coordinator = Some(OrchestrationCoordinator::new(
                Arc::clone(&self.registry),
                Router::new(arbiter, ScoringConfig::default(), &ArbitrationConfig::default()),
                Arc::clone(&self.ledger),
                Arc::new(dispatcher),
                InvocationConfig::default(),
            ));
        }
        self.coordinator
            .as_ref()
            .ok_or_else(|| eyre::eyre!("coordinator missing after construction"))
    }

    /// Returns the latest turn response.
    ///
    /// # Errors
    ///
    /// Returns an error when no turn has run yet.
    pub fn response(&self) -> Result<&TurnResponse, eyre::Report> {
        self.last_response
            .as_ref()
            .ok_or_else(|| eyre::eyre!("no turn has been handled"))
    }
}

impl Default for RoutingWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> RoutingWorld {
    RoutingWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}

/// Builds a registration for an agent whose domain and entity is `topic`.
pub fn topic_agent(name: &str, topic: &str) -> RegisterAgentRequest {
    RegisterAgentRequest::new(name, format!("{name} knows about {topic}"), "local", name)
        .with_profile(
            CapabilityProfile::new()
                .with_domains([topic])
                .with_entities([topic]),
        )
}
