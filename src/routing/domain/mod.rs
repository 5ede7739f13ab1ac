//! Domain types for two-stage routing.
//!
//! Stage 1 turns a query and session context into ranked
//! [`ScoredCandidate`]s; stage 2 narrows ambiguous rankings into an
//! [`ArbitrationOutcome`].

mod arbitration;
mod candidate;
mod context;
mod query;

pub use arbitration::{
    ArbitrationOutcome, ArbitrationRequest, ArbitrationVerdict, CandidateSummary, DegradeReason,
};
pub use candidate::{ScoreBreakdown, ScoredCandidate};
pub use context::RoutingContext;
pub use query::{QueryTerms, tokenise};
