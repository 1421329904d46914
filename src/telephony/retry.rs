//! Bounded retry for connect-level failures.
//!
//! A call-creation request that reached Twilio may already have placed a
//! call, so only failures where no connection was ever established are
//! retried. Timeouts, resets after send, and HTTP error statuses are terminal.

use std::time::Duration;

const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(200);
const MAX_DELAY: Duration = Duration::from_secs(2);

/// Retry policy for requests that failed before reaching the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectRetryPolicy {
    /// Retries after the initial attempt
    pub max_retries: u32,
    /// Delay before the first retry; doubles on each subsequent retry
    pub base_delay: Duration,
}

impl Default for ConnectRetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay: DEFAULT_BASE_DELAY,
        }
    }
}

impl ConnectRetryPolicy {
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Default::default()
        }
    }

    /// Delay before retry number `retry` (1-based), capped at two seconds
    pub fn delay_for(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1).min(16);
        self.base_delay
            .saturating_mul(1u32 << exponent)
            .min(MAX_DELAY)
    }

    /// Whether a failed attempt may be retried
    ///
    /// `retries_done` counts retries already performed, not the initial attempt.
    pub fn should_retry(&self, error: &reqwest::Error, retries_done: u32) -> bool {
        retries_done < self.max_retries && error.is_connect() && !error.is_timeout()
    }
}
