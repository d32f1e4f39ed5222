//! Centralized observability utilities for structured logging
//!
//! Every attempt made by the executor is logged through this layer, as are
//! rate-limit retries and pre-flight validation failures.

use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// HTTP request metadata for structured logging
#[derive(Debug, Clone)]
pub struct RequestMetadata {
    /// HTTP method (GET, POST, etc.)
    pub method: String,
    /// Request path
    pub path: String,
    /// Request body size in bytes (optional)
    pub body_size: Option<usize>,
}

impl RequestMetadata {
    /// Create new request metadata
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            body_size: None,
        }
    }

    /// Set the request body size
    pub fn with_body_size(mut self, size: usize) -> Self {
        self.body_size = Some(size);
        self
    }

    /// Log an attempt being sent
    pub fn log_request(&self, attempt: u32) {
        debug!(
            method = %self.method,
            path = %self.path,
            body_size = self.body_size,
            attempt,
            "Sending HTTP request"
        );
    }

    /// Log a rate-limited attempt that is about to be retried
    pub fn log_rate_limit_retry(&self, attempt: u32, delay: Duration, server_hint: bool) {
        warn!(
            method = %self.method,
            path = %self.path,
            attempt,
            delay_ms = delay.as_millis() as u64,
            server_hint,
            "Rate limited, retrying"
        );
    }
}

/// HTTP response metadata for structured logging
#[derive(Debug, Clone)]
pub struct ResponseMetadata {
    /// HTTP status code, absent when no response arrived
    pub status: Option<u16>,
    /// Response body size in bytes (optional)
    pub body_size: Option<usize>,
    /// Time elapsed for the attempt
    pub elapsed: Duration,
    /// Number of retries that preceded this attempt
    pub retries: u32,
}

impl ResponseMetadata {
    /// Create metadata for an attempt that received a response
    pub fn new(status: u16, elapsed: Duration) -> Self {
        Self {
            status: Some(status),
            body_size: None,
            elapsed,
            retries: 0,
        }
    }

    /// Create metadata for an attempt that never received a response
    pub fn without_response(elapsed: Duration) -> Self {
        Self {
            status: None,
            body_size: None,
            elapsed,
            retries: 0,
        }
    }

    /// Set the response body size
    pub fn with_body_size(mut self, size: usize) -> Self {
        self.body_size = Some(size);
        self
    }

    /// Set the number of retries
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Log successful response
    pub fn log_success(&self, request: &RequestMetadata) {
        info!(
            method = %request.method,
            path = %request.path,
            status = self.status,
            elapsed_ms = self.elapsed.as_millis() as u64,
            body_size = self.body_size,
            retries = self.retries,
            "HTTP request succeeded"
        );
    }

    /// Log failed attempt
    pub fn log_error(&self, request: &RequestMetadata, error: &str) {
        warn!(
            method = %request.method,
            path = %request.path,
            status = self.status,
            elapsed_ms = self.elapsed.as_millis() as u64,
            error = %error,
            retries = self.retries,
            "HTTP request failed"
        );
    }
}

/// Timer for measuring request duration
///
/// Uses the tokio clock, so paused-time tests see virtual durations.
pub struct RequestTimer {
    start: Instant,
}

impl RequestTimer {
    /// Start a new timer
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Get elapsed duration
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

/// Log validation error
pub fn log_validation_error(label: &str, reason: &str) {
    debug!(
        field = %label,
        reason = %reason,
        "Request validation failed"
    );
}

/// Log pagination progress after each page
pub fn log_page_fetched(page: usize, items: usize, has_next: bool) {
    debug!(page, items, has_next, "Fetched page");
}

/// Install a global `tracing` subscriber filtered by `RUST_LOG`.
///
/// Falls back to `turbonotion=info` when `RUST_LOG` is unset. Calling it a
/// second time is a no-op.
#[cfg(feature = "trace")]
#[cfg_attr(docsrs, doc(cfg(feature = "trace")))]
pub fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("turbonotion=info"));

    let _ = fmt().with_env_filter(filter).try_init();
}
