//! Two-stage routing pipeline.

use std::sync::Arc;

use tracing::debug;

use crate::capability::domain::RegistrySnapshot;
use crate::routing::{
    domain::{ArbitrationOutcome, RoutingContext, ScoredCandidate},
    ports::Arbiter,
    services::{ArbitrationConfig, ArbitrationEngine, CapabilityScorer, ScoringConfig},
};

/// Where a query was routed.
#[derive(Debug, Clone, PartialEq)]
pub enum RoutingDecision {
    /// No enabled agent scored above the threshold.
    NoMatch,
    /// Exactly one candidate survived stage 1; arbitration was skipped.
    Direct(ScoredCandidate),
    /// Two or more candidates went through arbitration.
    Arbitrated(ArbitrationOutcome),
}

impl RoutingDecision {
    /// Returns the selected candidates in stage-1 rank order.
    #[must_use]
    pub fn selected(&self) -> &[ScoredCandidate] {
        match self {
            Self::NoMatch => &[],
            Self::Direct(candidate) => std::slice::from_ref(candidate),
            Self::Arbitrated(outcome) => outcome.selected(),
        }
    }

    /// Returns the arbitration outcome when stage 2 ran.
    #[must_use]
    pub const fn arbitration(&self) -> Option<&ArbitrationOutcome> {
        match self {
            Self::Arbitrated(outcome) => Some(outcome),
            Self::NoMatch | Self::Direct(_) => None,
        }
    }
}

/// Runs stage-1 scoring and, when needed, stage-2 arbitration.
pub struct Router<A>
where
    A: Arbiter,
{
    scorer: CapabilityScorer,
    engine: ArbitrationEngine<A>,
}

impl<A> Router<A>
where
    A: Arbiter,
{
    /// Creates a router.
    #[must_use]
    pub const fn new(
        arbiter: Arc<A>,
        scoring: ScoringConfig,
        arbitration: &ArbitrationConfig,
    ) -> Self {
        Self {
            scorer: CapabilityScorer::new(scoring),
            engine: ArbitrationEngine::new(arbiter, arbitration),
        }
    }

    /// Returns the stage-1 scorer.
    #[must_use]
    pub const fn scorer(&self) -> &CapabilityScorer {
        &self.scorer
    }

    /// Routes a query against a registry snapshot.
    pub async fn route(
        &self,
        snapshot: &RegistrySnapshot,
        query: &str,
        context: &RoutingContext,
    ) -> RoutingDecision {
        let mut candidates = self.scorer.score(snapshot, query, context);
        if candidates.len() > 1 {
            return RoutingDecision::Arbitrated(
                self.engine.arbitrate(query, context, candidates).await,
            );
        }
        candidates.pop().map_or_else(
            || {
                debug!("no capable agent for query");
                RoutingDecision::NoMatch
            },
            |candidate| {
                debug!(agent = %candidate.name(), "single candidate, skipping arbitration");
                RoutingDecision::Direct(candidate)
            },
        )
    }
}
