//! Per-turn orchestration.
//!
//! Resolves the session, routes the query, fans out to the selected agents
//! under per-agent timeouts and records the turn in the session ledger.
//! Agent failures are isolated to their own section of the response.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
