//! Waiting policy for identity lookups.
//!
//! Two situations make a lookup wait before trying again:
//!
//! - the service reports a rate limit with a reset time, and the resolver
//!   polls the clock in bounded slices until that time has passed,
//! - the request itself fails, and the resolver backs off exponentially
//!   for a limited number of attempts.

use chrono::{DateTime, Utc};
use std::time::Duration;
use tracing::debug;

use crate::clock::Clock;
use crate::constants::{
    DEFAULT_LOOKUP_ATTEMPTS, DEFAULT_MAX_POLL_INTERVAL, MAX_BACKOFF_DELAY_MS,
    MIN_RATE_LIMIT_WAIT, STARTING_BACKOFF_DELAY_MS,
};

/// Waiting behavior for rate limits and transport failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Longest single sleep while waiting for a rate-limit reset.
    pub max_poll_interval: Duration,
    /// Attempts made for a request that keeps failing, first one included.
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_poll_interval: DEFAULT_MAX_POLL_INTERVAL,
            max_attempts: DEFAULT_LOOKUP_ATTEMPTS,
        }
    }
}

impl RetryPolicy {
    /// Sleep in slices of at most `max_poll_interval` until `clock` reaches `reset_at`.
    ///
    /// Always sleeps at least [`MIN_RATE_LIMIT_WAIT`], so a reset time in the
    /// past still spaces out the retries.
    pub async fn wait_until(&self, clock: &dyn Clock, reset_at: DateTime<Utc>) {
        loop {
            let remaining = (reset_at - clock.now()).to_std().unwrap_or(Duration::ZERO);
            let slice = remaining.min(self.max_poll_interval).max(MIN_RATE_LIMIT_WAIT);
            debug!(
                target: "identity",
                "Rate limited until {}, sleeping {:?} ({:?} remaining)",
                reset_at,
                slice,
                remaining
            );
            clock.sleep(slice).await;

            if clock.now() >= reset_at {
                return;
            }
        }
    }

    /// Delay before retry number `attempt` (0-based) of a failed request.
    ///
    /// Doubles from the starting delay and is capped at the maximum delay.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let factor = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
        let delay = STARTING_BACKOFF_DELAY_MS.saturating_mul(factor).min(MAX_BACKOFF_DELAY_MS);
        Duration::from_millis(delay)
    }
}
