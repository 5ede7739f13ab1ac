//! Exponential backoff for transient ledger conflicts.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Retry settings for contended ledger writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Delay before the second attempt, in milliseconds. Doubles after
    /// every further failure.
    pub base_delay_ms: u64,
}

impl RetryPolicy {
    /// Returns the delay to wait after failed attempt number `attempt`
    /// (1-based).
    #[must_use]
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = 2_u64.saturating_pow(attempt.saturating_sub(1));
        Duration::from_millis(self.base_delay_ms.saturating_mul(factor))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 100,
        }
    }
}
