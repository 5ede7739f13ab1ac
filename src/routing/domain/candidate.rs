//! Stage-1 scoring results.

use crate::capability::domain::{AgentDescriptor, AgentName};

/// Per-component contributions to a candidate's score.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScoreBreakdown {
    /// Weighted domain overlap.
    pub domain: f64,
    /// Weighted entity overlap.
    pub entity: f64,
    /// Weighted keyword and operation overlap.
    pub keyword: f64,
    /// Context boost for the previous turn's agent.
    pub boost: f64,
}

impl ScoreBreakdown {
    /// Returns the lexical part of the score, capped at `1.0`.
    #[must_use]
    #[expect(clippy::float_arithmetic, reason = "scores are weighted sums")]
    pub fn lexical(&self) -> f64 {
        (self.domain + self.entity + self.keyword).min(1.0)
    }

    /// Returns the final score: capped lexical part plus boost.
    #[must_use]
    #[expect(clippy::float_arithmetic, reason = "scores are weighted sums")]
    pub fn total(&self) -> f64 {
        self.lexical() + self.boost
    }
}

/// An enabled agent that survived stage-1 filtering.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    descriptor: AgentDescriptor,
    breakdown: ScoreBreakdown,
}

impl ScoredCandidate {
    /// Pairs a descriptor with its score breakdown.
    #[must_use]
    pub const fn new(descriptor: AgentDescriptor, breakdown: ScoreBreakdown) -> Self {
        Self {
            descriptor,
            breakdown,
        }
    }

    /// Returns the scored descriptor.
    #[must_use]
    pub const fn descriptor(&self) -> &AgentDescriptor {
        &self.descriptor
    }

    /// Returns the agent name.
    #[must_use]
    pub const fn name(&self) -> &AgentName {
        self.descriptor.name()
    }

    /// Returns the final score.
    #[must_use]
    pub fn score(&self) -> f64 {
        self.breakdown.total()
    }

    /// Returns the score breakdown.
    #[must_use]
    pub const fn breakdown(&self) -> &ScoreBreakdown {
        &self.breakdown
    }

    /// Consumes the candidate, returning the descriptor.
    #[must_use]
    pub fn into_descriptor(self) -> AgentDescriptor {
        self.descriptor
    }
}
