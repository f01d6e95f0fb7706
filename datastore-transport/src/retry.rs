//! Retry configuration and jittered backoff.

use rand::Rng;
use std::time::Duration;

/// Retry configuration for transient transport failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Maximum number of retry attempts.
    pub max_attempts: u32,
    /// Base wait between attempts; the actual sleep is jittered below it.
    pub base_wait: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_wait: Duration::from_millis(2500),
        }
    }
}

impl RetryConfig {
    /// Create a retry config.
    pub fn new(max_attempts: u32, base_wait: Duration) -> Self {
        Self {
            max_attempts,
            base_wait,
        }
    }

    /// Create a retry config that never sleeps between attempts.
    pub fn immediate(max_attempts: u32) -> Self {
        Self::new(max_attempts, Duration::ZERO)
    }

    /// Whether another attempt may follow the given 0-indexed attempt.
    pub fn has_attempt_after(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }

    /// Whether the executor should sleep after the given 0-indexed attempt.
    ///
    /// No sleep follows the last two attempts.
    pub fn should_wait_after(&self, attempt: u32) -> bool {
        attempt.saturating_add(1) < self.max_attempts
    }

    /// Draw a backoff delay in `[0.5, 1.0)` of the base wait.
    pub fn backoff_delay(&self) -> Duration {
        jittered(self.base_wait, rand::rng().random::<f64>())
    }
}

/// Scale `base` by `0.5 + sample / 2`, with `sample` drawn from `[0, 1)`.
pub fn jittered(base: Duration, sample: f64) -> Duration {
    let sample = sample.clamp(0.0, 1.0);
    let delay = base.mul_f64(0.5 + sample / 2.0);

    // upper bound stays exclusive even when the float product rounds up
    if !base.is_zero() && delay >= base {
        base - Duration::from_nanos(1)
    } else {
        delay
    }
}
