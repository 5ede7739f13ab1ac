//! Stage-2 arbitration request, verdict and outcome types.

use super::{RoutingContext, ScoredCandidate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One survivor of stage 1 as presented to the arbiter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateSummary {
    /// Zero-based position in stage-1 rank order.
    pub index: usize,
    /// Agent name.
    pub name: String,
    /// Agent description.
    pub description: String,
}

/// Input handed to an [`crate::routing::ports::Arbiter`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArbitrationRequest {
    /// The user's query.
    pub query: String,
    /// One-line summary of the session context.
    pub context: String,
    /// Ranked candidates.
    pub candidates: Vec<CandidateSummary>,
}

impl ArbitrationRequest {
    /// Builds a request from ranked stage-1 candidates.
    #[must_use]
    pub fn new(query: &str, context: &RoutingContext, candidates: &[ScoredCandidate]) -> Self {
        Self {
            query: query.to_owned(),
            context: context.summary(),
            candidates: candidates
                .iter()
                .enumerate()
                .map(|(index, candidate)| CandidateSummary {
                    index,
                    name: candidate.name().to_string(),
                    description: candidate.descriptor().description().to_owned(),
                })
                .collect(),
        }
    }
}

/// Parsed arbiter reply.
///
/// Reasoning and analysis are kept for observability and never affect the
/// selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArbitrationVerdict {
    /// Chosen candidate indices.
    #[serde(default)]
    pub selected_indices: Vec<usize>,
    /// Why the arbiter chose these candidates.
    #[serde(default)]
    pub reasoning: String,
    /// Free-form analysis of the request.
    #[serde(default)]
    pub analysis: String,
}

impl ArbitrationVerdict {
    /// Creates a verdict selecting the given indices.
    #[must_use]
    pub fn selecting(indices: impl IntoIterator<Item = usize>) -> Self {
        Self {
            selected_indices: indices.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Attaches reasoning text.
    #[must_use]
    pub fn with_reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.reasoning = reasoning.into();
        self
    }
}

/// Why arbitration fell back to the top stage-1 candidate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DegradeReason {
    /// The arbiter did not answer within the arbitration timeout.
    #[error("arbiter timed out")]
    Timeout,
    /// The arbiter failed or was unreachable.
    #[error("arbiter unavailable: {0}")]
    Unavailable(String),
    /// The arbiter reply could not be parsed.
    #[error("arbiter reply malformed: {0}")]
    MalformedReply(String),
    /// The arbiter selected nothing.
    #[error("arbiter selected no candidates")]
    EmptySelection,
    /// Every selected index was out of range.
    #[error("arbiter selected only out-of-range indices")]
    NoValidIndices,
}

/// Result of stage 2.
#[derive(Debug, Clone, PartialEq)]
pub struct ArbitrationOutcome {
    selected: Vec<ScoredCandidate>,
    verdict: Option<ArbitrationVerdict>,
    degraded: Option<DegradeReason>,
    dropped_indices: Vec<usize>,
}

impl ArbitrationOutcome {
    pub(crate) const fn accepted(
        selected: Vec<ScoredCandidate>,
        verdict: ArbitrationVerdict,
        dropped_indices: Vec<usize>,
    ) -> Self {
        Self {
            selected,
            verdict: Some(verdict),
            degraded: None,
            dropped_indices,
        }
    }

    pub(crate) const fn degraded(
        selected: Vec<ScoredCandidate>,
        verdict: Option<ArbitrationVerdict>,
        reason: DegradeReason,
        dropped_indices: Vec<usize>,
    ) -> Self {
        Self {
            selected,
            verdict,
            degraded: Some(reason),
            dropped_indices,
        }
    }

    /// Returns the selected candidates in stage-1 rank order.
    #[must_use]
    pub fn selected(&self) -> &[ScoredCandidate] {
        &self.selected
    }

    /// Returns the arbiter verdict, when one was received.
    #[must_use]
    pub const fn verdict(&self) -> Option<&ArbitrationVerdict> {
        self.verdict.as_ref()
    }

    /// Returns the degradation reason, when the fallback was used.
    #[must_use]
    pub const fn degraded_reason(&self) -> Option<&DegradeReason> {
        self.degraded.as_ref()
    }

    /// Returns `true` when the fallback candidate was used.
    #[must_use]
    pub const fn is_degraded(&self) -> bool {
        self.degraded.is_some()
    }

    /// Returns out-of-range indices that were discarded.
    #[must_use]
    pub fn dropped_indices(&self) -> &[usize] {
        &self.dropped_indices
    }

    /// Consumes the outcome, returning the selected candidates.
    #[must_use]
    pub fn into_selected(self) -> Vec<ScoredCandidate> {
        self.selected
    }
}
