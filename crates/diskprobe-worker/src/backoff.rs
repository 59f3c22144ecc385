//! Delay between two polls of the same path.

use std::time::Duration;

use diskprobe_core::Config;

/// Linear error backoff: `base_interval + error_backoff * consecutive_errors`.
///
/// Growth is unbounded unless a `max_delay` is set; the cap never goes below
/// `base_interval`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BackoffPolicy {
    base_interval: Duration,
    error_backoff: Duration,
    max_delay: Option<Duration>,
}

impl BackoffPolicy {
    pub fn new(base_interval: Duration, error_backoff: Duration) -> Self {
        Self {
            base_interval,
            error_backoff,
            max_delay: None,
        }
    }

    pub fn with_max_delay(mut self, max_delay: Option<Duration>) -> Self {
        self.max_delay = max_delay;
        self
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.poll_interval(), config.error_backoff())
            .with_max_delay(config.max_backoff())
    }

    pub fn base_interval(&self) -> Duration {
        self.base_interval
    }

    /// Delay before the next poll of a task with `consecutive_errors` failures.
    pub fn delay_for(&self, consecutive_errors: u32) -> Duration {
        let delay = self
            .error_backoff
            .checked_mul(consecutive_errors)
            .and_then(|penalty| self.base_interval.checked_add(penalty))
            .unwrap_or(Duration::MAX);

        match self.max_delay {
            Some(cap) => delay.min(cap.max(self.base_interval)),
            None => delay,
        }
    }
}
