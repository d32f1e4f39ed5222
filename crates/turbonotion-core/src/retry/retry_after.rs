//! `Retry-After` header parsing.

use std::time::Duration;

/// Parse a `Retry-After` header value expressed in seconds.
///
/// The value must parse to a finite, non-negative number. Fractional values
/// round up to the next whole second, so a retry never fires before the
/// requested window has fully elapsed. Anything else (HTTP dates, negative
/// numbers, garbage) yields `None` and the caller falls back to its own
/// backoff.
///
/// # Examples
///
/// ```rust
/// use turbonotion_core::retry::parse_retry_after;
/// use std::time::Duration;
///
/// assert_eq!(parse_retry_after("3"), Some(Duration::from_millis(3000)));
/// assert_eq!(parse_retry_after("1.5"), Some(Duration::from_millis(2000)));
/// assert_eq!(parse_retry_after("-1"), None);
/// assert_eq!(parse_retry_after("soon"), None);
/// ```
pub fn parse_retry_after(value: &str) -> Option<Duration> {
    let seconds: f64 = value.trim().parse().ok()?;
    if !seconds.is_finite() || seconds < 0.0 {
        return None;
    }
    // `as` saturates for out-of-range floats
    let whole_seconds = seconds.ceil() as u64;
    Some(Duration::from_millis(whole_seconds.saturating_mul(1000)))
}
