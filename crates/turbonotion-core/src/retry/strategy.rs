//! The backoff trait and the attempt loop built on it.

use std::future::Future;
use std::time::Duration;

/// A policy that decides how long to wait before the next attempt.
///
/// Implementations are pure: given the same attempt index and hint they
/// return the same delay, which keeps retry timing deterministic under test.
///
/// # Examples
///
/// ```rust
/// use turbonotion_core::retry::{BackoffStrategy, ExponentialBackoff};
/// use std::time::Duration;
///
/// let backoff = ExponentialBackoff::default();
///
/// // No hint: capped exponential growth
/// assert_eq!(backoff.next_delay(1, None), Duration::from_secs(2));
///
/// // A server hint wins over the computed delay
/// let hint = Some(Duration::from_millis(3000));
/// assert_eq!(backoff.next_delay(1, hint), Duration::from_millis(3000));
/// ```
pub trait BackoffStrategy: Send + Sync {
    /// Calculate the delay before the next attempt.
    ///
    /// # Parameters
    /// - `attempt`: 0-based index of the attempt that just failed
    /// - `hint`: server-requested wait, if the failure carried one
    fn next_delay(&self, attempt: u32, hint: Option<Duration>) -> Duration;

    /// Maximum number of retries after the initial attempt.
    ///
    /// If `max_retries() == 3`, the operation runs at most 4 times.
    fn max_retries(&self) -> u32;
}

/// What the classifier decided about a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Wait and try again, preferring `hint` over the strategy's own delay.
    Retry {
        /// Server-supplied wait time, if any
        hint: Option<Duration>,
    },
    /// Propagate the failure immediately.
    Fail,
}

impl RetryDecision {
    /// Retry with the strategy's computed delay.
    pub const fn retry() -> Self {
        RetryDecision::Retry { hint: None }
    }

    /// Retry after the given server hint.
    pub const fn retry_after(hint: Option<Duration>) -> Self {
        RetryDecision::Retry { hint }
    }
}

/// Run `operation` until it succeeds, the classifier refuses a retry, or the
/// strategy's retry budget is spent.
///
/// `operation` receives the 0-based attempt index. When every attempt fails
/// the error from the last attempt is returned unchanged, never a wrapper.
///
/// Dropping the returned future cancels the whole sequence, including any
/// backoff sleep in progress.
///
/// # Examples
///
/// ```rust
/// use turbonotion_core::retry::{ExponentialBackoff, RetryDecision, retry_with};
/// use std::sync::atomic::{AtomicU32, Ordering};
///
/// # async fn example() {
/// let backoff = ExponentialBackoff::builder().max_retries(2).build();
/// let calls = AtomicU32::new(0);
///
/// let result: Result<(), &str> = retry_with(
///     &backoff,
///     |_| {
///         calls.fetch_add(1, Ordering::SeqCst);
///         async { Err("permanent") }
///     },
///     |_| RetryDecision::Fail,
/// )
/// .await;
///
/// assert_eq!(result, Err("permanent"));
/// assert_eq!(calls.load(Ordering::SeqCst), 1);
/// # }
/// ```
pub async fn retry_with<S, F, Fut, T, E, C>(
    strategy: &S,
    mut operation: F,
    mut classify: C,
) -> Result<T, E>
where
    S: BackoffStrategy + ?Sized,
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    C: FnMut(&E) -> RetryDecision,
{
    let mut attempt = 0;
    loop {
        let err = match operation(attempt).await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        let hint = match classify(&err) {
            RetryDecision::Fail => return Err(err),
            RetryDecision::Retry { hint } => hint,
        };

        if attempt >= strategy.max_retries() {
            #[cfg(feature = "tracing")]
            tracing::debug!(attempts = attempt + 1, "Retry budget exhausted");
            return Err(err);
        }

        let delay = strategy.next_delay(attempt, hint);

        #[cfg(feature = "tracing")]
        tracing::debug!(
            attempt,
            delay_ms = delay.as_millis() as u64,
            server_hint = hint.is_some(),
            "Backing off before retry"
        );

        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::ExponentialBackoff;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;

    #[derive(Debug, PartialEq)]
    enum TestError {
        Transient(Option<Duration>),
        Permanent,
    }

    fn assert_elapsed(start: Instant, expected: Duration) {
        let elapsed = start.elapsed();
        assert!(
            elapsed >= expected && elapsed < expected + Duration::from_millis(50),
            "expected ~{:?}, got {:?}",
            expected,
            elapsed
        );
    }

    fn classify(err: &TestError) -> RetryDecision {
        match err {
            TestError::Transient(hint) => RetryDecision::retry_after(*hint),
            TestError::Permanent => RetryDecision::Fail,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_on_third_attempt() {
        let backoff = ExponentialBackoff::builder().max_retries(5).build();
        let calls = AtomicU32::new(0);
        let start = Instant::now();

        let result = retry_with(
            &backoff,
            |_| {
                let current = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if current < 2 {
                        Err(TestError::Transient(None))
                    } else {
                        Ok(42)
                    }
                }
            },
            classify,
        )
        .await;

        assert_eq!(result, Ok(42));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // 1s after the first failure, 2s after the second
        assert_elapsed(start, Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_returns_last_error() {
        let backoff = ExponentialBackoff::builder().max_retries(2).build();
        let calls = AtomicU32::new(0);

        let result: Result<(), _> = retry_with(
            &backoff,
            |attempt| {
                calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    Err(TestError::Transient(Some(Duration::from_millis(
                        u64::from(attempt) + 1,
                    ))))
                }
            },
            classify,
        )
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(
            result,
            Err(TestError::Transient(Some(Duration::from_millis(3))))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_permanent_error_not_retried() {
        let backoff = ExponentialBackoff::default();
        let calls = AtomicU32::new(0);

        let result: Result<(), _> = retry_with(
            &backoff,
            |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(TestError::Permanent) }
            },
            classify,
        )
        .await;

        assert_eq!(result, Err(TestError::Permanent));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hint_overrides_exponential_delay() {
        let backoff = ExponentialBackoff::default();
        let calls = AtomicU32::new(0);
        let start = Instant::now();

        let result = retry_with(
            &backoff,
            |_| {
                let current = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if current == 0 {
                        Err(TestError::Transient(Some(Duration::from_secs(3))))
                    } else {
                        Ok("done")
                    }
                }
            },
            classify,
        )
        .await;

        assert_eq!(result, Ok("done"));
        assert_elapsed(start, Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_retries_runs_once() {
        let backoff = ExponentialBackoff::builder().max_retries(0).build();
        let calls = AtomicU32::new(0);

        let result: Result<(), _> = retry_with(
            &backoff,
            |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(TestError::Transient(None)) }
            },
            classify,
        )
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_immediate_success() {
        let backoff = ExponentialBackoff::default();
        let result = tokio_test::block_on(retry_with(
            &backoff,
            |_| async { Ok::<_, TestError>(7) },
            classify,
        ));
        assert_eq!(result, Ok(7));
    }
}
