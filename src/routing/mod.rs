//! Two-stage routing of user queries to agents.
//!
//! Stage 1 ([`services::CapabilityScorer`]) ranks enabled agents by lexical
//! overlap with the query plus a context boost. Stage 2
//! ([`services::ArbitrationEngine`]) asks an [`ports::Arbiter`] to choose
//! among ambiguous rankings and falls back to the top candidate when the
//! arbiter cannot help.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
