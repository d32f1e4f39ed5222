//! Request executor: single attempts, response handling, and the
//! rate-limit retry loop.

use super::middleware::{Middleware, MiddlewareStack, RateLimitMiddleware, TracingMiddleware};
use super::request::Request;
use crate::config::ClientConfig;
use crate::error::{ApiError, Error, Result};
use crate::observability::{RequestMetadata, RequestTimer, ResponseMetadata};
use secrecy::ExposeSecret;
use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use turbonotion_core::retry::{
    BackoffStrategy, ExponentialBackoff, RetryDecision, parse_retry_after, retry_with,
};
use turbonotion_transport::{HttpRequest, HttpResponse, Transport};
use url::Url;

/// Turns [`Request`] descriptors into HTTP exchanges.
///
/// Holds only immutable state built from [`ClientConfig`]; every call keeps
/// its own attempt counter and deadline, so concurrent calls do not
/// interfere.
pub(crate) struct Executor {
    transport: Arc<dyn Transport>,
    base_url: Url,
    headers: Vec<(String, String)>,
    timeout: Duration,
    retry_on_rate_limit: bool,
    backoff: ExponentialBackoff,
    middleware: MiddlewareStack,
}

impl Executor {
    /// Build an executor from configuration.
    ///
    /// # Errors
    ///
    /// - [`Error::MissingConfig`] without a credential
    /// - [`Error::InvalidUrl`] for a bad base URL
    /// - [`Error::InvalidHeaderValue`] for a credential or default header that
    ///   cannot be sent
    pub(crate) fn new(config: &ClientConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        let token = config
            .auth
            .as_ref()
            .map(|secret| secret.expose_secret().trim())
            .filter(|token| !token.is_empty())
            .ok_or_else(|| Error::MissingConfig("auth token".to_string()))?;

        let base_url = config.resolved_base_url()?;

        let authorization = format!("Bearer {}", token);
        if http::HeaderValue::from_str(&authorization).is_err() {
            return Err(Error::InvalidHeaderValue("Authorization".to_string()));
        }

        let mut headers = vec![
            ("Authorization".to_string(), authorization),
            ("Content-Type".to_string(), "application/json".to_string()),
            (
                "Notion-Version".to_string(),
                config.resolved_notion_version().to_string(),
            ),
        ];
        for (name, value) in &config.default_headers {
            let value = value
                .to_str()
                .map_err(|_| Error::InvalidHeaderValue(name.to_string()))?;
            headers.push((name.to_string(), value.to_string()));
        }

        let backoff = ExponentialBackoff::builder()
            .max_retries(config.max_retries)
            .build();

        let mut middleware = MiddlewareStack::new();
        middleware.push(Box::new(TracingMiddleware));
        if let Some(rate_limit) = &config.rate_limit {
            middleware.push(Box::new(RateLimitMiddleware::from_config(rate_limit)));
        }

        Ok(Self {
            transport,
            base_url,
            headers,
            timeout: config.timeout,
            retry_on_rate_limit: config.retry_on_rate_limit,
            backoff,
            middleware,
        })
    }

    pub(crate) fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub(crate) fn transport_name(&self) -> &'static str {
        self.transport.name()
    }

    /// Run `request` to completion, retrying rate-limited attempts.
    ///
    /// Up to `max_retries + 1` attempts are made. Only API failures with code
    /// `rate_limited` are retried, and only when rate-limit retries are
    /// enabled; everything else surfaces on first occurrence. When attempts
    /// run out the last failure is returned.
    pub(crate) async fn execute(&self, request: &Request) -> Result<Value> {
        let url = request.url(&self.base_url)?;
        let body = request
            .body_value()
            .map(serde_json::to_vec)
            .transpose()
            .map_err(Error::Serialization)?;

        let mut metadata = RequestMetadata::new(request.method().as_str(), url.path());
        if let Some(body) = &body {
            metadata = metadata.with_body_size(body.len());
        }

        let current_attempt = AtomicU32::new(0);
        let (url, body, metadata, current_attempt) = (&url, &body, &metadata, &current_attempt);

        retry_with(
            &self.backoff,
            move |attempt| {
                current_attempt.store(attempt, Ordering::Relaxed);
                self.attempt(request, url, body.clone(), metadata, attempt)
            },
            move |err| self.classify(err, metadata, current_attempt.load(Ordering::Relaxed)),
        )
        .await
    }

    /// Rate-limited API failures are retried; nothing else is.
    fn classify(&self, err: &Error, metadata: &RequestMetadata, attempt: u32) -> RetryDecision {
        let Some(api) = err.as_api() else {
            return RetryDecision::Fail;
        };
        if !self.retry_on_rate_limit || !api.is_rate_limited() {
            return RetryDecision::Fail;
        }

        if attempt < self.backoff.max_retries() {
            let delay = self.backoff.next_delay(attempt, api.retry_after);
            metadata.log_rate_limit_retry(attempt, delay, api.retry_after.is_some());
        }

        RetryDecision::retry_after(api.retry_after)
    }

    /// One exchange under its own deadline.
    async fn attempt(
        &self,
        request: &Request,
        url: &Url,
        body: Option<Vec<u8>>,
        metadata: &RequestMetadata,
        attempt: u32,
    ) -> Result<Value> {
        let mut http_request = HttpRequest::new(request.method().as_str(), url.as_str());
        for (name, value) in &self.headers {
            http_request = http_request.with_header(name.as_str(), value.as_str());
        }
        if let Some(body) = body {
            http_request = http_request.with_body(body);
        }
        let http_request = self.middleware.process_request(http_request).await?;

        metadata.log_request(attempt);
        let timer = RequestTimer::start();

        // Dropping the transport future on expiry cancels the exchange
        let outcome = match tokio::time::timeout(
            self.timeout,
            self.transport.send_http(http_request),
        )
        .await
        {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(err)) => Err(Error::Network(err)),
            Err(_) => Err(Error::Timeout(self.timeout)),
        };

        let response = match outcome {
            Ok(response) => response,
            Err(err) => {
                ResponseMetadata::without_response(timer.elapsed())
                    .with_retries(attempt)
                    .log_error(metadata, &err.to_string());
                return Err(err);
            }
        };

        let response = self.middleware.process_response(response).await?;
        let status = response.status;
        let body_size = response.body.len();

        let result = handle_response(response);

        let response_metadata = ResponseMetadata::new(status, timer.elapsed())
            .with_body_size(body_size)
            .with_retries(attempt);
        match &result {
            Ok(_) => response_metadata.log_success(metadata),
            Err(err) => response_metadata.log_error(metadata, &err.to_string()),
        }

        result
    }
}

/// Interpret a completed exchange.
///
/// - 204: empty object, body not read
/// - other 2xx: body parsed as JSON
/// - non-2xx: [`ApiError`] from the error body, with the `Retry-After` hint
///   attached when the failure is a rate limit
pub(crate) fn handle_response(response: HttpResponse) -> Result<Value> {
    if response.status == 204 {
        return Ok(Value::Object(serde_json::Map::new()));
    }

    if !response.is_success() {
        let mut error =
            ApiError::from_response(response.status, response.status_text(), &response.body);
        if error.is_rate_limited() {
            let hint = response.get_header("retry-after").and_then(parse_retry_after);
            error = error.with_retry_after(hint);
        }
        return Err(error.into());
    }

    serde_json::from_slice(&response.body).map_err(Error::Decode)
}
