#![deny(unsafe_code)]
#![warn(missing_docs)]

//! Core abstractions for the TurboNotion ecosystem.
//!
//! This crate holds the pieces of the resilience engine that know nothing
//! about HTTP:
//!
//! - **Backoff policy** via the [`BackoffStrategy`](retry::BackoffStrategy) trait
//!   - Capped exponential backoff (`min(2^attempt * 1s, 60s)`)
//!   - Server hints (`Retry-After`) take precedence over the computed delay
//! - **Retry loop** via [`retry_with`](retry::retry_with), driven by a
//!   classifier that decides per failure whether to retry and with which hint
//!
//! # Examples
//!
//! ```rust
//! use turbonotion_core::prelude::*;
//! use std::time::Duration;
//!
//! let backoff = ExponentialBackoff::default();
//! assert_eq!(backoff.next_delay(0, None), Duration::from_secs(1));
//! assert_eq!(backoff.next_delay(2, None), Duration::from_secs(4));
//! assert_eq!(
//!     backoff.next_delay(2, Some(Duration::from_secs(3))),
//!     Duration::from_secs(3)
//! );
//! ```

pub mod retry;

/// Convenient re-exports of commonly used items.
///
/// ```rust
/// use turbonotion_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::retry::{
        BackoffStrategy, ExponentialBackoff, ExponentialBackoffBuilder, RetryDecision,
        parse_retry_after, retry_with,
    };
}
