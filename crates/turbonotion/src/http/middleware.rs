//! HTTP middleware for request/response processing
//!
//! Middleware runs once per attempt: retried attempts pass through the stack
//! again, so a rate limiter spaces out retries too. The per-attempt timeout
//! covers only the transport exchange, not time spent waiting here.

use crate::config::RateLimitConfig;
use crate::error::Result;
use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;
use turbonotion_transport::{HttpRequest, HttpResponse};

/// Trait for HTTP middleware.
#[async_trait]
pub trait Middleware: Send + Sync {
    /// Process a request before sending.
    async fn process_request(&self, request: HttpRequest) -> Result<HttpRequest> {
        Ok(request)
    }

    /// Process a response after receiving.
    async fn process_response(&self, response: HttpResponse) -> Result<HttpResponse> {
        Ok(response)
    }
}

/// Middleware that adds logging/tracing.
pub struct TracingMiddleware;

#[async_trait]
impl Middleware for TracingMiddleware {
    async fn process_request(&self, request: HttpRequest) -> Result<HttpRequest> {
        tracing::trace!(method = %request.method, url = %request.url, "Dispatching request");
        Ok(request)
    }

    async fn process_response(&self, response: HttpResponse) -> Result<HttpResponse> {
        tracing::trace!(status = response.status, "Received response");
        Ok(response)
    }
}

/// Client-side token bucket that holds requests until a slot is free.
///
/// The API enforces an average of three requests per second per
/// integration; throttling locally avoids burning retries on 429s.
pub struct RateLimitMiddleware {
    governor: Arc<DefaultDirectRateLimiter>,
}

impl RateLimitMiddleware {
    /// Create a new rate limit middleware.
    ///
    /// Zero values for either setting are treated as 1.
    pub fn new(requests_per_second: u32, burst_size: u32) -> Self {
        let rate = NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN);
        let burst = NonZeroU32::new(burst_size).unwrap_or(NonZeroU32::MIN);

        let quota = Quota::per_second(rate).allow_burst(burst);

        Self {
            governor: Arc::new(RateLimiter::direct(quota)),
        }
    }

    /// Create a rate limiter from client configuration.
    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.requests_per_second, config.burst_size)
    }
}

#[async_trait]
impl Middleware for RateLimitMiddleware {
    async fn process_request(&self, request: HttpRequest) -> Result<HttpRequest> {
        self.governor.until_ready().await;
        Ok(request)
    }
}

/// Composite middleware that chains multiple middleware.
pub struct MiddlewareStack {
    middlewares: Vec<Box<dyn Middleware>>,
}

impl Default for MiddlewareStack {
    fn default() -> Self {
        Self::new()
    }
}

impl MiddlewareStack {
    /// Create a new middleware stack.
    pub fn new() -> Self {
        Self {
            middlewares: Vec::new(),
        }
    }

    /// Add a middleware to the stack.
    pub fn push(&mut self, middleware: Box<dyn Middleware>) {
        self.middlewares.push(middleware);
    }

    /// Number of middleware in the stack.
    pub fn len(&self) -> usize {
        self.middlewares.len()
    }

    /// Whether the stack is empty.
    pub fn is_empty(&self) -> bool {
        self.middlewares.is_empty()
    }
}

#[async_trait]
impl Middleware for MiddlewareStack {
    async fn process_request(&self, mut request: HttpRequest) -> Result<HttpRequest> {
        for middleware in &self.middlewares {
            request = middleware.process_request(request).await?;
        }
        Ok(request)
    }

    async fn process_response(&self, mut response: HttpResponse) -> Result<HttpResponse> {
        // Process in reverse order for responses
        for middleware in self.middlewares.iter().rev() {
            response = middleware.process_response(response).await?;
        }
        Ok(response)
    }
}
