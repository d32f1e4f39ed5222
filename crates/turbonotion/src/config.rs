//! Configuration for the Notion client

use crate::error::{Error, Result};
use http::HeaderMap;
use secrecy::SecretString;
use std::time::Duration;
use url::Url;

/// Default per-attempt timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Default number of retries after the initial attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Configuration for the Notion client.
///
/// Captured once at client construction and never modified afterwards;
/// concurrent calls on one client share it read-only.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Integration token sent as a bearer credential
    pub auth: Option<SecretString>,

    /// Base URL for the API (defaults to [`DEFAULT_BASE_URL`](crate::DEFAULT_BASE_URL))
    pub base_url: Option<String>,

    /// `Notion-Version` header value (defaults to [`DEFAULT_NOTION_VERSION`](crate::DEFAULT_NOTION_VERSION))
    pub notion_version: Option<String>,

    /// Deadline for a single attempt
    pub timeout: Duration,

    /// Maximum number of retries for rate-limited requests
    pub max_retries: u32,

    /// Whether rate-limited requests are retried at all
    pub retry_on_rate_limit: bool,

    /// Custom headers to include with every request
    pub default_headers: HeaderMap,

    /// Client-side rate limiting; off when `None`
    pub rate_limit: Option<RateLimitConfig>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            auth: None,
            base_url: None,
            notion_version: None,
            timeout: DEFAULT_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_on_rate_limit: true,
            default_headers: HeaderMap::new(),
            rate_limit: None,
        }
    }
}

impl ClientConfig {
    /// Create a new configuration with an integration token.
    pub fn with_auth(token: impl Into<String>) -> Self {
        Self {
            auth: Some(SecretString::new(token.into().into_boxed_str())),
            ..Default::default()
        }
    }

    /// Create a new builder.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }

    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is loaded first, if present.
    /// This will look for:
    /// - `NOTION_TOKEN` for authentication (required)
    /// - `NOTION_BASE_URL` for the API base URL
    /// - `NOTION_VERSION` for the `Notion-Version` header
    /// - `NOTION_TIMEOUT_MS` for the per-attempt timeout (in milliseconds)
    /// - `NOTION_MAX_RETRIES` for maximum retry attempts
    /// - `NOTION_RETRY_ON_RATE_LIMIT` (`true`/`false`/`1`/`0`)
    ///
    /// Unparsable numeric or boolean values are ignored and the default kept.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingConfig`] when `NOTION_TOKEN` is not set.
    #[cfg(feature = "env")]
    #[cfg_attr(docsrs, doc(cfg(feature = "env")))]
    pub fn from_env() -> Result<Self> {
        use std::env;

        let _ = dotenvy::dotenv();

        let mut config = Self::default();

        // Authentication
        match env::var("NOTION_TOKEN") {
            Ok(token) if !token.trim().is_empty() => {
                config.auth = Some(SecretString::new(token.into_boxed_str()));
            }
            _ => return Err(Error::MissingConfig("NOTION_TOKEN".to_string())),
        }

        // Base URL
        if let Ok(base_url) = env::var("NOTION_BASE_URL") {
            config.base_url = Some(base_url);
        }

        // API version
        if let Ok(version) = env::var("NOTION_VERSION") {
            config.notion_version = Some(version);
        }

        // Timeout
        if let Ok(timeout_str) = env::var("NOTION_TIMEOUT_MS")
            && let Ok(timeout_ms) = timeout_str.trim().parse::<u64>()
        {
            config.timeout = Duration::from_millis(timeout_ms);
        }

        // Max retries
        if let Ok(max_retries_str) = env::var("NOTION_MAX_RETRIES")
            && let Ok(max_retries) = max_retries_str.trim().parse::<u32>()
        {
            config.max_retries = max_retries;
        }

        // Rate-limit retries
        if let Ok(flag) = env::var("NOTION_RETRY_ON_RATE_LIMIT")
            && let Some(enabled) = parse_flag(&flag)
        {
            config.retry_on_rate_limit = enabled;
        }

        Ok(config)
    }

    /// Merge this configuration with another, with the other taking precedence.
    ///
    /// Fields of `other` still at their default value do not override.
    pub fn merge(mut self, other: ClientConfig) -> Self {
        if other.auth.is_some() {
            self.auth = other.auth;
        }
        if other.base_url.is_some() {
            self.base_url = other.base_url;
        }
        if other.notion_version.is_some() {
            self.notion_version = other.notion_version;
        }
        if other.timeout != DEFAULT_TIMEOUT {
            self.timeout = other.timeout;
        }
        if other.max_retries != DEFAULT_MAX_RETRIES {
            self.max_retries = other.max_retries;
        }
        if !other.retry_on_rate_limit {
            self.retry_on_rate_limit = false;
        }
        for (key, value) in other.default_headers.iter() {
            self.default_headers.insert(key.clone(), value.clone());
        }
        if other.rate_limit.is_some() {
            self.rate_limit = other.rate_limit;
        }

        self
    }

    /// Parsed base URL, falling back to the public API.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] for an empty, unparsable, or non-HTTP(S) URL.
    pub fn resolved_base_url(&self) -> Result<Url> {
        let raw = self.base_url.as_deref().unwrap_or(crate::DEFAULT_BASE_URL);

        if raw.trim().is_empty() {
            return Err(Error::InvalidUrl("Base URL cannot be empty".to_string()));
        }

        let url = Url::parse(raw.trim()).map_err(|e| Error::InvalidUrl(format!("{}", e)))?;

        match url.scheme() {
            "http" | "https" => Ok(url),
            scheme => Err(Error::InvalidUrl(format!(
                "Invalid URL scheme '{}'. Only 'http' and 'https' are supported.",
                scheme
            ))),
        }
    }

    /// `Notion-Version` header value in effect.
    pub fn resolved_notion_version(&self) -> &str {
        self.notion_version
            .as_deref()
            .unwrap_or(crate::DEFAULT_NOTION_VERSION)
    }
}

#[cfg(feature = "env")]
fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

/// Configuration for client-side rate limiting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Sustained requests per second
    pub requests_per_second: u32,

    /// Burst size for token bucket
    pub burst_size: u32,
}

impl Default for RateLimitConfig {
    /// Three requests per second, matching the API's documented average.
    fn default() -> Self {
        Self {
            requests_per_second: 3,
            burst_size: 3,
        }
    }
}

/// Builder for creating ClientConfig with a fluent API.
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the integration token.
    pub fn auth(mut self, token: impl Into<String>) -> Self {
        self.config.auth = Some(SecretString::new(token.into().into_boxed_str()));
        self
    }

    /// Set the base URL.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = Some(base_url.into());
        self
    }

    /// Set the `Notion-Version` header value.
    pub fn notion_version(mut self, version: impl Into<String>) -> Self {
        self.config.notion_version = Some(version.into());
        self
    }

    /// Set the per-attempt timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the maximum number of retries.
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.config.max_retries = max_retries;
        self
    }

    /// Enable or disable retrying rate-limited requests.
    pub fn retry_on_rate_limit(mut self, enabled: bool) -> Self {
        self.config.retry_on_rate_limit = enabled;
        self
    }

    /// Add a default header.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is invalid according to HTTP specifications.
    pub fn default_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Result<Self> {
        let (key, value) = parse_header(key.into(), value.into())?;
        self.config.default_headers.insert(key, value);
        Ok(self)
    }

    /// Enable rate limiting with default configuration.
    pub fn with_rate_limiting(mut self) -> Self {
        self.config.rate_limit = Some(RateLimitConfig::default());
        self
    }

    /// Set custom rate limiting configuration.
    pub fn rate_limit(mut self, config: RateLimitConfig) -> Self {
        self.config.rate_limit = Some(config);
        self
    }

    /// Build the configuration.
    pub fn build(self) -> ClientConfig {
        self.config
    }
}

pub(crate) fn parse_header(
    key: String,
    value: String,
) -> Result<(http::HeaderName, http::HeaderValue)> {
    let name: http::HeaderName = key
        .parse()
        .map_err(|_| Error::InvalidHeaderName(key.clone()))?;
    let value: http::HeaderValue = value
        .parse()
        .map_err(|_| Error::InvalidHeaderValue(value.clone()))?;
    Ok((name, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use secrecy::ExposeSecret;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.timeout, Duration::from_millis(60_000));
        assert_eq!(config.max_retries, 3);
        assert!(config.retry_on_rate_limit);
        assert!(config.auth.is_none());
        assert!(config.rate_limit.is_none());
        assert_eq!(config.resolved_notion_version(), "2022-06-28");
        assert_eq!(
            config.resolved_base_url().unwrap().as_str(),
            "https://api.notion.com/"
        );
    }

    #[test]
    fn test_config_builder() {
        let config = ClientConfigBuilder::new()
            .auth("secret_test")
            .base_url("https://example.com")
            .notion_version("2025-09-03")
            .timeout(Duration::from_secs(30))
            .max_retries(5)
            .retry_on_rate_limit(false)
            .with_rate_limiting()
            .build();

        assert_eq!(
            config.auth.as_ref().map(|s| s.expose_secret().to_string()),
            Some("secret_test".to_string())
        );
        assert_eq!(config.base_url, Some("https://example.com".to_string()));
        assert_eq!(config.resolved_notion_version(), "2025-09-03");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.max_retries, 5);
        assert!(!config.retry_on_rate_limit);
        assert_eq!(config.rate_limit, Some(RateLimitConfig::default()));
    }

    #[test]
    fn test_default_header_validation() {
        let builder = ClientConfigBuilder::new()
            .default_header("x-trace-id", "abc")
            .unwrap();
        assert_eq!(builder.build().default_headers["x-trace-id"], "abc");

        let result = ClientConfigBuilder::new().default_header("bad header", "v");
        assert_matches!(result, Err(Error::InvalidHeaderName(name)) if name == "bad header");

        let result = ClientConfigBuilder::new().default_header("x-ok", "line\nbreak");
        assert_matches!(result, Err(Error::InvalidHeaderValue(_)));
    }

    #[test]
    fn test_config_merge() {
        let base = ClientConfig::with_auth("token-1");
        let overrides = ClientConfigBuilder::new()
            .base_url("https://example.com")
            .timeout(Duration::from_secs(30))
            .retry_on_rate_limit(false)
            .build();

        let merged = base.merge(overrides);
        assert!(merged.auth.is_some());
        assert_eq!(merged.base_url, Some("https://example.com".to_string()));
        assert_eq!(merged.timeout, Duration::from_secs(30));
        assert_eq!(merged.max_retries, DEFAULT_MAX_RETRIES);
        assert!(!merged.retry_on_rate_limit);
    }

    #[test]
    fn test_resolved_base_url_rejects_bad_input() {
        let empty = ClientConfigBuilder::new().base_url("   ").build();
        assert_matches!(empty.resolved_base_url(), Err(Error::InvalidUrl(msg)) if msg.contains("empty"));

        let ftp = ClientConfigBuilder::new().base_url("ftp://files.example.com").build();
        assert_matches!(
            ftp.resolved_base_url(),
            Err(Error::InvalidUrl(msg)) if msg.contains("ftp") && msg.contains("https")
        );

        let garbage = ClientConfigBuilder::new().base_url("not a url").build();
        assert_matches!(garbage.resolved_base_url(), Err(Error::InvalidUrl(_)));
    }

    #[cfg(feature = "env")]
    mod env {
        use super::*;

        const VARS: [&str; 6] = [
            "NOTION_TOKEN",
            "NOTION_BASE_URL",
            "NOTION_VERSION",
            "NOTION_TIMEOUT_MS",
            "NOTION_MAX_RETRIES",
            "NOTION_RETRY_ON_RATE_LIMIT",
        ];

        #[test]
        fn test_from_env_reads_all_variables() {
            temp_env::with_vars(
                [
                    ("NOTION_TOKEN", Some("secret_from_env")),
                    ("NOTION_BASE_URL", Some("http://localhost:9000")),
                    ("NOTION_VERSION", Some("2025-09-03")),
                    ("NOTION_TIMEOUT_MS", Some("2500")),
                    ("NOTION_MAX_RETRIES", Some("7")),
                    ("NOTION_RETRY_ON_RATE_LIMIT", Some("false")),
                ],
                || {
                    let config = ClientConfig::from_env().unwrap();
                    assert_eq!(
                        config.auth.as_ref().map(|s| s.expose_secret().to_string()),
                        Some("secret_from_env".to_string())
                    );
                    assert_eq!(config.base_url.as_deref(), Some("http://localhost:9000"));
                    assert_eq!(config.resolved_notion_version(), "2025-09-03");
                    assert_eq!(config.timeout, Duration::from_millis(2500));
                    assert_eq!(config.max_retries, 7);
                    assert!(!config.retry_on_rate_limit);
                },
            );
        }

        #[test]
        fn test_from_env_ignores_unparsable_values() {
            temp_env::with_vars(
                [
                    ("NOTION_TOKEN", Some("secret_from_env")),
                    ("NOTION_BASE_URL", None),
                    ("NOTION_VERSION", None),
                    ("NOTION_TIMEOUT_MS", Some("soon")),
                    ("NOTION_MAX_RETRIES", Some("-1")),
                    ("NOTION_RETRY_ON_RATE_LIMIT", Some("maybe")),
                ],
                || {
                    let config = ClientConfig::from_env().unwrap();
                    assert_eq!(config.timeout, DEFAULT_TIMEOUT);
                    assert_eq!(config.max_retries, DEFAULT_MAX_RETRIES);
                    assert!(config.retry_on_rate_limit);
                    assert!(config.base_url.is_none());
                },
            );
        }

        #[test]
        fn test_from_env_requires_token() {
            temp_env::with_vars_unset(VARS, || {
                assert_matches!(
                    ClientConfig::from_env(),
                    Err(Error::MissingConfig(name)) if name == "NOTION_TOKEN"
                );
            });
        }
    }
}
