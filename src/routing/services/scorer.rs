//! Stage-1 deterministic scoring.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::capability::domain::{AgentDescriptor, RegistrySnapshot};
use crate::routing::domain::{QueryTerms, RoutingContext, ScoreBreakdown, ScoredCandidate};

/// Follow-up vocabulary used when none is configured.
pub const DEFAULT_FOLLOW_UP_TERMS: &[&str] = &[
    "a", "about", "again", "all", "and", "any", "breakdown", "can", "continue", "detail",
    "details", "elaborate", "else", "expand", "explain", "full", "give", "go", "how", "i", "info",
    "information", "it", "me", "more", "on", "please", "same", "see", "show", "tell", "that",
    "the", "them", "these", "this", "those", "what", "why", "you",
];

/// Weights and thresholds for stage-1 scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Weight applied when any domain term matches.
    pub domain_weight: f64,
    /// Weight applied when any entity term matches.
    pub entity_weight: f64,
    /// Weight applied when any keyword or operation term matches.
    pub keyword_weight: f64,
    /// Bonus for the agent that handled the previous turn.
    pub context_boost: f64,
    /// Words that make up a content-free follow-up such as "show me the
    /// details". A query made only of these boosts the previous agent even
    /// though it matches none of its terms.
    pub follow_up_terms: Vec<String>,
    /// Candidates scoring below this are dropped.
    pub min_score: f64,
    /// Maximum number of candidates returned.
    pub top_k: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            domain_weight: 0.4,
            entity_weight: 0.3,
            keyword_weight: 0.3,
            context_boost: 0.3,
            follow_up_terms: DEFAULT_FOLLOW_UP_TERMS
                .iter()
                .map(|term| (*term).to_owned())
                .collect(),
            min_score: 0.1,
            top_k: 10,
        }
    }
}

/// Ranks enabled agents against a query.
#[derive(Debug, Clone, Default)]
pub struct CapabilityScorer {
    config: ScoringConfig,
}

impl CapabilityScorer {
    /// Creates a scorer with the given configuration.
    #[must_use]
    pub const fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    /// Returns the scoring configuration.
    #[must_use]
    pub const fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Scores every enabled agent in the snapshot.
    ///
    /// Returns at most `top_k` candidates at or above `min_score`, sorted by
    /// score, then priority (higher first), then registration order. An
    /// empty query yields no candidates. The previous agent is boosted only
    /// when it matches the query or the query is a pure follow-up, so a
    /// query that overlaps nothing still yields no candidates mid-session.
    #[must_use]
    pub fn score(
        &self,
        snapshot: &RegistrySnapshot,
        query: &str,
        context: &RoutingContext,
    ) -> Vec<ScoredCandidate> {
        let terms = QueryTerms::parse(query);
        if terms.is_empty() {
            debug!("query has no terms, no candidates");
            return Vec::new();
        }

        let follow_up = terms.all_within(&self.config.follow_up_terms);
        let mut candidates: Vec<ScoredCandidate> = snapshot
            .enabled_in_registration_order()
            .into_iter()
            .map(|descriptor| {
                let breakdown = self.breakdown(descriptor, &terms, context, follow_up);
                ScoredCandidate::new(descriptor.clone(), breakdown)
            })
            .filter(|candidate| candidate.score() >= self.config.min_score)
            .collect();

        candidates.sort_by(rank_order);
        candidates.truncate(self.config.top_k);

        debug!(
            terms = terms.len(),
            candidates = candidates.len(),
            top = ?candidates.first().map(|c| c.name().as_str()),
            "stage-1 scoring complete"
        );
        candidates
    }

    fn breakdown(
        &self,
        descriptor: &AgentDescriptor,
        terms: &QueryTerms,
        context: &RoutingContext,
        follow_up: bool,
    ) -> ScoreBreakdown {
        let profile = descriptor.profile();
        let domain_matches = terms.count_matches(profile.domains());
        let entity_matches = terms.count_matches(profile.entities());
        let keyword_matches = terms.count_matches(profile.keywords())
            + terms.count_matches(profile.operations());
        let relevant = domain_matches + entity_matches + keyword_matches > 0;
        let is_last_agent = context.last_agent() == Some(descriptor.name());

        ScoreBreakdown {
            domain: weighted(domain_matches, self.config.domain_weight),
            entity: weighted(entity_matches, self.config.entity_weight),
            keyword: weighted(keyword_matches, self.config.keyword_weight),
            boost: if is_last_agent && (relevant || follow_up) {
                self.config.context_boost
            } else {
                0.0
            },
        }
    }
}

/// Each overlap contributes `min(matches, 1)` times its weight.
const fn weighted(matches: usize, weight: f64) -> f64 {
    if matches > 0 { weight } else { 0.0 }
}

fn rank_order(left: &ScoredCandidate, right: &ScoredCandidate) -> Ordering {
    right
        .score()
        .total_cmp(&left.score())
        .then_with(|| {
            right
                .descriptor()
                .profile()
                .priority()
                .cmp(&left.descriptor().profile().priority())
        })
        .then_with(|| {
            left.descriptor()
                .registration_order()
                .cmp(&right.descriptor().registration_order())
        })
}
