//! Routing services: stage-1 scoring, stage-2 arbitration and the pipeline
//! that composes them.

mod arbitration;
mod router;
mod scorer;

pub use arbitration::{ArbitrationConfig, ArbitrationEngine};
pub use router::{Router, RoutingDecision};
pub use scorer::{CapabilityScorer, DEFAULT_FOLLOW_UP_TERMS, ScoringConfig};
