//! Error types for the TurboNotion client
//!
//! Four failure kinds reach callers:
//!
//! - [`Error::Validation`] - a local pre-flight check rejected the payload;
//!   nothing was sent
//! - [`Error::Api`] - the server answered with a non-2xx status
//! - [`Error::Timeout`] - the per-attempt deadline elapsed
//! - [`Error::Network`] - the transport could not complete the exchange
//!
//! The remaining variants cover configuration and encoding problems that are
//! detected before or after the exchange.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use turbonotion_transport::TransportError;

/// Result type alias for operations that can fail with a TurboNotion error.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the TurboNotion client.
#[derive(Debug, Error)]
pub enum Error {
    /// Pre-flight validation failed; the request never reached the transport.
    #[error("{0}")]
    Validation(String),

    /// The server rejected the request or reported a problem.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The per-attempt deadline elapsed.
    #[error("Request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// The transport could not complete the exchange (DNS, reset, I/O).
    #[error("Network error: {0}")]
    Network(#[source] TransportError),

    /// A successful response did not decode into the requested shape.
    #[error("Failed to decode API response: {0}")]
    Decode(#[source] serde_json::Error),

    /// The request body could not be serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[source] serde_json::Error),

    /// Invalid base URL or request path.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Invalid HTTP header name.
    #[error("Invalid HTTP header name: {0}")]
    InvalidHeaderName(String),

    /// Invalid HTTP header value.
    #[error("Invalid HTTP header value: {0}")]
    InvalidHeaderValue(String),

    /// HTTP client configuration or initialization error.
    #[error("HTTP client error: {0}")]
    HttpClient(String),

    /// Missing required configuration.
    #[error("Missing required configuration: {0}")]
    MissingConfig(String),
}

impl Error {
    /// The API failure inside this error, if it is one.
    pub fn as_api(&self) -> Option<&ApiError> {
        match self {
            Error::Api(api) => Some(api),
            _ => None,
        }
    }

    /// `true` for an API failure with code `rate_limited`.
    pub fn is_rate_limited(&self) -> bool {
        self.as_api().is_some_and(ApiError::is_rate_limited)
    }

    /// `true` for an API failure with code `unauthorized`.
    pub fn is_unauthorized(&self) -> bool {
        self.as_api().is_some_and(ApiError::is_unauthorized)
    }

    /// `true` for an API failure with code `object_not_found`.
    pub fn is_not_found(&self) -> bool {
        self.as_api().is_some_and(ApiError::is_not_found)
    }

    /// `true` for an API failure with code `validation_error`.
    ///
    /// Local pre-flight failures are [`Error::Validation`], not this.
    pub fn is_validation_error(&self) -> bool {
        self.as_api().is_some_and(ApiError::is_validation_error)
    }

    /// `true` for an API failure with a 5xx status.
    pub fn is_server_error(&self) -> bool {
        self.as_api().is_some_and(ApiError::is_server_error)
    }

    /// `true` when the API classifies the failure as transient.
    ///
    /// Timeouts and network failures report `false`: whether to retry them
    /// is the caller's policy.
    pub fn is_retryable(&self) -> bool {
        self.as_api().is_some_and(ApiError::is_retryable)
    }

    /// `true` for a per-attempt deadline expiry.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout(_))
    }

    /// `true` for a transport-level failure.
    pub fn is_network(&self) -> bool {
        matches!(self, Error::Network(_))
    }

    /// Server-requested backoff, present only on rate-limit failures that
    /// carried a valid `Retry-After` header.
    pub fn retry_after(&self) -> Option<Duration> {
        self.as_api().and_then(|api| api.retry_after)
    }
}

/// Closed set of error codes returned by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorCode {
    /// Body could not be decoded as JSON (400)
    InvalidJson,
    /// Request URL is not valid (400)
    InvalidRequestUrl,
    /// Request is not supported (400)
    InvalidRequest,
    /// Body does not match the expected schema (400)
    ValidationError,
    /// `Notion-Version` header missing (400)
    MissingVersion,
    /// Bearer token is not valid (401)
    Unauthorized,
    /// Token lacks permission for this operation (403)
    RestrictedResource,
    /// Resource does not exist or is not shared (404)
    ObjectNotFound,
    /// Transaction conflict (409)
    ConflictError,
    /// Request rate exceeded (429)
    RateLimited,
    /// Unexpected server error (500)
    InternalServerError,
    /// Server unavailable (503)
    ServiceUnavailable,
    /// Database unreachable (503)
    DatabaseConnectionUnavailable,
    /// Upstream timeout (504)
    GatewayTimeout,
}

impl ApiErrorCode {
    /// Wire representation of the code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiErrorCode::InvalidJson => "invalid_json",
            ApiErrorCode::InvalidRequestUrl => "invalid_request_url",
            ApiErrorCode::InvalidRequest => "invalid_request",
            ApiErrorCode::ValidationError => "validation_error",
            ApiErrorCode::MissingVersion => "missing_version",
            ApiErrorCode::Unauthorized => "unauthorized",
            ApiErrorCode::RestrictedResource => "restricted_resource",
            ApiErrorCode::ObjectNotFound => "object_not_found",
            ApiErrorCode::ConflictError => "conflict_error",
            ApiErrorCode::RateLimited => "rate_limited",
            ApiErrorCode::InternalServerError => "internal_server_error",
            ApiErrorCode::ServiceUnavailable => "service_unavailable",
            ApiErrorCode::DatabaseConnectionUnavailable => "database_connection_unavailable",
            ApiErrorCode::GatewayTimeout => "gateway_timeout",
        }
    }

    /// Best-fit code for a status whose body carried no usable code.
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => ApiErrorCode::Unauthorized,
            403 => ApiErrorCode::RestrictedResource,
            404 => ApiErrorCode::ObjectNotFound,
            409 => ApiErrorCode::ConflictError,
            429 => ApiErrorCode::RateLimited,
            503 => ApiErrorCode::ServiceUnavailable,
            504 => ApiErrorCode::GatewayTimeout,
            500..=599 => ApiErrorCode::InternalServerError,
            _ => ApiErrorCode::InvalidRequest,
        }
    }
}

impl fmt::Display for ApiErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A non-2xx answer from the API.
///
/// Built once when the response is observed and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("API error {status} ({code}): {message}")]
pub struct ApiError {
    /// HTTP status code
    pub status: u16,
    /// Error code reported by the server (or derived from the status)
    pub code: ApiErrorCode,
    /// Human-readable message
    pub message: String,
    /// Server-requested backoff from a valid `Retry-After` header
    pub retry_after: Option<Duration>,
}

impl ApiError {
    /// Create an API error without a retry hint.
    pub fn new(status: u16, code: ApiErrorCode, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            retry_after: None,
        }
    }

    /// Attach a server-requested backoff.
    pub fn with_retry_after(mut self, retry_after: Option<Duration>) -> Self {
        self.retry_after = retry_after;
        self
    }

    /// Build an API error from a non-2xx status and its raw body.
    ///
    /// A body of the form `{ "status", "code", "message" }` supplies code and
    /// message. Anything else (HTML, truncated JSON, unknown code) yields a
    /// generic failure derived from the status and its reason phrase.
    pub fn from_response(status: u16, status_text: &str, body: &[u8]) -> Self {
        match serde_json::from_slice::<ApiErrorBody>(body) {
            Ok(parsed) => {
                let code = parsed
                    .code
                    .and_then(|code| serde_json::from_value(serde_json::Value::String(code)).ok())
                    .unwrap_or_else(|| ApiErrorCode::from_status(status));
                let message = parsed
                    .message
                    .unwrap_or_else(|| synthesized_message(status, status_text));
                Self::new(status, code, message)
            }
            Err(_) => Self::new(
                status,
                ApiErrorCode::from_status(status),
                synthesized_message(status, status_text),
            ),
        }
    }

    /// `code == rate_limited`
    pub fn is_rate_limited(&self) -> bool {
        self.code == ApiErrorCode::RateLimited
    }

    /// `code == unauthorized`
    pub fn is_unauthorized(&self) -> bool {
        self.code == ApiErrorCode::Unauthorized
    }

    /// `code == object_not_found`
    pub fn is_not_found(&self) -> bool {
        self.code == ApiErrorCode::ObjectNotFound
    }

    /// `code == validation_error`
    pub fn is_validation_error(&self) -> bool {
        self.code == ApiErrorCode::ValidationError
    }

    /// `500 <= status < 600`
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.status)
    }

    /// Rate limited or a server error.
    ///
    /// The executor itself only retries rate limiting; this predicate exists
    /// for callers layering their own policy.
    pub fn is_retryable(&self) -> bool {
        self.is_rate_limited() || self.is_server_error()
    }
}

fn synthesized_message(status: u16, status_text: &str) -> String {
    if status_text.is_empty() {
        format!("HTTP {}", status)
    } else {
        format!("HTTP {}: {}", status, status_text)
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}
