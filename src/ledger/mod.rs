//! Durable session ledger.
//!
//! Records sessions, the agents invoked on each turn and the conversation
//! history. Writes to one session are totally ordered; contended store
//! operations are retried with exponential backoff before degrading.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
