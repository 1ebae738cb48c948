//! Exponential backoff with jitter for transient access API failures.

use std::time::Duration;

use rand::Rng;

use crate::config::schema::RetryConfig;

/// Backoff schedule: `base * 2^(failure - 1)`, capped at `max`, plus up to
/// 10% jitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    base_ms: u64,
    max_ms: u64,
}

impl Backoff {
    pub fn new(base_ms: u64, max_ms: u64) -> Self {
        Self { base_ms, max_ms }
    }

    /// Delay before the retry following the `failure`-th consecutive failure.
    /// Zero failures means no delay.
    pub fn delay(&self, failure: u32) -> Duration {
        if failure == 0 {
            return Duration::ZERO;
        }

        let factor = 2u64.saturating_pow(failure - 1);
        let capped = self.base_ms.saturating_mul(factor).min(self.max_ms);

        let jitter_range = capped / 10;
        let jitter = if jitter_range > 0 {
            rand::thread_rng().gen_range(0..jitter_range)
        } else {
            0
        };

        Duration::from_millis(capped.saturating_add(jitter))
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for Backoff {
    fn from(config: &RetryConfig) -> Self {
        Self::new(config.base_delay_ms, config.max_delay_ms)
    }
}
