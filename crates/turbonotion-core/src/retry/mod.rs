//! Retry strategies and backoff implementations.
//!
//! # Key Types
//!
//! - [`BackoffStrategy`] - Core trait for delay computation
//! - [`ExponentialBackoff`] - Capped exponential backoff that defers to server hints
//! - [`retry_with`] - The attempt loop shared by every caller
//! - [`parse_retry_after`] - `Retry-After` header parsing
//!
//! # Examples
//!
//! ```rust
//! use turbonotion_core::retry::{ExponentialBackoff, RetryDecision, retry_with};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), std::io::Error> {
//! let backoff = ExponentialBackoff::builder().max_retries(2).build();
//!
//! let value = retry_with(
//!     &backoff,
//!     |_attempt| async { Ok::<_, std::io::Error>(42) },
//!     |_err: &std::io::Error| RetryDecision::Fail,
//! )
//! .await?;
//! assert_eq!(value, 42);
//! # Ok(())
//! # }
//! ```

mod exponential;
mod retry_after;
mod strategy;

pub use exponential::{ExponentialBackoff, ExponentialBackoffBuilder};
pub use retry_after::parse_retry_after;
pub use strategy::{BackoffStrategy, RetryDecision, retry_with};
