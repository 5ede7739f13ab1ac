//! Stage-2 arbitration with graceful degradation.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::routing::{
    domain::{
        ArbitrationOutcome, ArbitrationRequest, ArbitrationVerdict, DegradeReason, RoutingContext,
        ScoredCandidate,
    },
    ports::{Arbiter, ArbiterError},
};

/// Arbitration settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArbitrationConfig {
    /// Maximum time to wait for the arbiter, in milliseconds.
    pub timeout_ms: u64,
}

impl ArbitrationConfig {
    /// Returns the arbitration timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for ArbitrationConfig {
    fn default() -> Self {
        Self { timeout_ms: 8_000 }
    }
}

/// Narrows ambiguous stage-1 rankings through an [`Arbiter`].
///
/// Never fails: timeouts, arbiter errors, malformed replies and unusable
/// selections all fall back to the top stage-1 candidate, with the reason
/// recorded on the outcome.
pub struct ArbitrationEngine<A>
where
    A: Arbiter,
{
    arbiter: Arc<A>,
    timeout: Duration,
}

impl<A> ArbitrationEngine<A>
where
    A: Arbiter,
{
    /// Creates an engine.
    #[must_use]
    pub const fn new(arbiter: Arc<A>, config: &ArbitrationConfig) -> Self {
        Self {
            arbiter,
            timeout: config.timeout(),
        }
    }

    /// Selects one or more candidates from a stage-1 ranking.
    ///
    /// Rankings with fewer than two candidates are returned as-is without
    /// calling the arbiter.
    pub async fn arbitrate(
        &self,
        query: &str,
        context: &RoutingContext,
        candidates: Vec<ScoredCandidate>,
    ) -> ArbitrationOutcome {
        if candidates.len() < 2 {
            return ArbitrationOutcome::accepted(
                candidates,
                ArbitrationVerdict::default(),
                Vec::new(),
            );
        }

        let request = ArbitrationRequest::new(query, context, &candidates);
        let verdict = match tokio::time::timeout(self.timeout, self.arbiter.arbitrate(&request))
            .await
        {
            Ok(Ok(verdict)) => verdict,
            Ok(Err(err)) => return degrade(candidates, None, reason_for(&err), Vec::new()),
            Err(_) => {
                return degrade(candidates, None, DegradeReason::Timeout, Vec::new());
            }
        };

        let (valid, dropped) = partition_indices(&verdict.selected_indices, candidates.len());
        if !dropped.is_empty() {
            warn!(?dropped, "arbiter returned out-of-range indices, ignoring them");
        }
        if verdict.selected_indices.is_empty() {
            return degrade(candidates, Some(verdict), DegradeReason::EmptySelection, dropped);
        }
        if valid.is_empty() {
            return degrade(candidates, Some(verdict), DegradeReason::NoValidIndices, dropped);
        }

        let selected: Vec<ScoredCandidate> = candidates
            .into_iter()
            .enumerate()
            .filter(|(index, _)| valid.contains(index))
            .map(|(_, candidate)| candidate)
            .collect();
        info!(
            selected = ?selected.iter().map(|c| c.name().as_str()).collect::<Vec<_>>(),
            "arbitration selected agents"
        );
        debug!(reasoning = %verdict.reasoning, analysis = %verdict.analysis, "arbitration trace");
        ArbitrationOutcome::accepted(selected, verdict, dropped)
    }
}

fn reason_for(err: &ArbiterError) -> DegradeReason {
    match err {
        ArbiterError::MalformedReply(reason) => DegradeReason::MalformedReply(reason.clone()),
        other => DegradeReason::Unavailable(other.to_string()),
    }
}

/// Splits indices into a deduplicated in-range set and the out-of-range
/// remainder.
fn partition_indices(indices: &[usize], len: usize) -> (BTreeSet<usize>, Vec<usize>) {
    let mut valid = BTreeSet::new();
    let mut dropped = BTreeSet::new();
    for &index in indices {
        if index < len {
            valid.insert(index);
        } else {
            dropped.insert(index);
        }
    }
    (valid, dropped.into_iter().collect())
}

fn degrade(
    candidates: Vec<ScoredCandidate>,
    verdict: Option<ArbitrationVerdict>,
    reason: DegradeReason,
    dropped: Vec<usize>,
) -> ArbitrationOutcome {
    let top: Vec<ScoredCandidate> = candidates.into_iter().take(1).collect();
    warn!(
        %reason,
        fallback = ?top.first().map(|c| c.name().as_str()),
        "arbitration degraded to top stage-1 candidate"
    );
    ArbitrationOutcome::degraded(top, verdict, reason, dropped)
}
