//! Bounded exponential backoff for remote page fetches.

use std::time::Duration;

use crate::config::SyncConfig;

/// Retry policy for one remote call.
///
/// `max_attempts` counts the first call, so the default of 3 means one call
/// plus two retries, waiting 1s then 2s.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Policy with the given bounds. `max_attempts` is at least 1.
    #[must_use]
    pub fn new(max_attempts: u32, initial_backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_backoff,
        }
    }

    /// Delay to wait after the failed `attempt` (1-based) before the next one.
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.initial_backoff.saturating_mul(1 << exponent)
    }

    /// Whether another attempt is allowed after `attempt` calls.
    #[must_use]
    pub const fn can_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }
}

impl From<&SyncConfig> for RetryPolicy {
    fn from(config: &SyncConfig) -> Self {
        Self::new(config.max_attempts, config.initial_backoff)
    }
}
