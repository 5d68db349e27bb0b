//! Backoff between gateway retries.

use std::time::Duration;

use crate::config::GatewayConfig;

/// Doubling delay schedule, capped at `max`. The schedule is deterministic:
/// retry `n` always waits the same time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    pub initial: Duration,
    pub max: Duration,
}

impl Backoff {
    pub fn from_config(config: &GatewayConfig) -> Self {
        Self {
            initial: Duration::from_millis(config.retry_initial_delay_ms),
            max: Duration::from_millis(config.retry_max_delay_ms),
        }
    }

    /// Delay before retry number `attempt` (0-indexed): `initial * 2^attempt`.
    pub fn delay(&self, attempt: u32) -> Duration {
        2u32.checked_pow(attempt)
            .and_then(|factor| self.initial.checked_mul(factor))
            .map_or(self.max, |d| d.min(self.max))
    }
}
