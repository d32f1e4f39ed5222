//! Capped exponential backoff.

use super::strategy::BackoffStrategy;
use std::time::Duration;

/// Exponential backoff that defers to server hints.
///
/// # Mathematical Formula
///
/// For attempt `n` (0-indexed, the attempt that just failed):
/// ```text
/// hint present  => delay = hint
/// otherwise     => delay = min(initial_delay * multiplier^n, max_delay)
/// ```
///
/// With the defaults (`initial_delay = 1s`, `multiplier = 2`, `max_delay = 60s`)
/// this is `min(2^n * 1000, 60000)` milliseconds. There is no jitter: the
/// sequence is fully deterministic.
///
/// # Examples
///
/// ```rust
/// use turbonotion_core::retry::{BackoffStrategy, ExponentialBackoff};
/// use std::time::Duration;
///
/// let backoff = ExponentialBackoff::builder()
///     .max_retries(5)
///     .initial_delay(Duration::from_millis(500))
///     .max_delay(Duration::from_secs(10))
///     .build();
///
/// assert_eq!(backoff.next_delay(0, None), Duration::from_millis(500));
/// assert_eq!(backoff.next_delay(10, None), Duration::from_secs(10));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ExponentialBackoff {
    max_retries: u32,
    initial_delay: Duration,
    max_delay: Duration,
    multiplier: u32,
}

impl ExponentialBackoff {
    /// Create a new builder for configuring exponential backoff.
    pub fn builder() -> ExponentialBackoffBuilder {
        ExponentialBackoffBuilder::default()
    }

    /// Delay computed purely from the attempt index, ignoring hints.
    pub fn exponential_delay(&self, attempt: u32) -> Duration {
        let factor = self.multiplier.checked_pow(attempt).unwrap_or(u32::MAX);
        self.initial_delay
            .checked_mul(factor)
            .map_or(self.max_delay, |delay| delay.min(self.max_delay))
    }
}

impl Default for ExponentialBackoff {
    /// Defaults:
    /// - `max_retries`: 3
    /// - `initial_delay`: 1s
    /// - `max_delay`: 60s
    /// - `multiplier`: 2 (doubles each time)
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
            multiplier: 2,
        }
    }
}

impl BackoffStrategy for ExponentialBackoff {
    fn next_delay(&self, attempt: u32, hint: Option<Duration>) -> Duration {
        // Server authority wins, uncapped
        hint.unwrap_or_else(|| self.exponential_delay(attempt))
    }

    fn max_retries(&self) -> u32 {
        self.max_retries
    }
}

/// Builder for configuring [`ExponentialBackoff`].
///
/// Unset parameters fall back to the [`Default`] values.
#[derive(Debug, Default)]
pub struct ExponentialBackoffBuilder {
    max_retries: Option<u32>,
    initial_delay: Option<Duration>,
    max_delay: Option<Duration>,
    multiplier: Option<u32>,
}

impl ExponentialBackoffBuilder {
    /// Set the maximum number of retry attempts.
    ///
    /// Default: 3
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    /// Set the delay before the first retry.
    ///
    /// Default: 1s
    pub fn initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = Some(delay);
        self
    }

    /// Set the cap applied to computed delays. Server hints are not capped.
    ///
    /// Default: 60s
    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = Some(delay);
        self
    }

    /// Set the growth factor between attempts. Values below 1 are raised to 1.
    ///
    /// Default: 2
    pub fn multiplier(mut self, multiplier: u32) -> Self {
        self.multiplier = Some(multiplier.max(1));
        self
    }

    /// Build the [`ExponentialBackoff`] instance.
    pub fn build(self) -> ExponentialBackoff {
        let defaults = ExponentialBackoff::default();
        ExponentialBackoff {
            max_retries: self.max_retries.unwrap_or(defaults.max_retries),
            initial_delay: self.initial_delay.unwrap_or(defaults.initial_delay),
            max_delay: self.max_delay.unwrap_or(defaults.max_delay),
            multiplier: self.multiplier.unwrap_or(defaults.multiplier),
        }
    }
}
