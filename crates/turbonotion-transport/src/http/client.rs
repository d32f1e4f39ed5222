//! HTTP transport client implementation
//!
//! Implements the Transport trait on top of a pooled reqwest client.

use crate::error::{Result, TransportError};
use crate::traits::{HttpRequest, HttpResponse, Transport};
use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// HTTP transport implementation
///
/// Handles HTTP requests with:
/// - Connection pooling
/// - Connect timeout
///
/// It performs one exchange per call. The per-attempt deadline is owned by
/// the caller, so no overall request timeout is set on the reqwest client.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: Arc<ReqwestClient>,
}

impl HttpTransport {
    /// Create a new HTTP transport with default configuration
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Connection`] if the TLS backend cannot be initialized.
    pub fn new() -> Result<Self> {
        Self::with_config(HttpTransportConfig::default())
    }

    /// Create a new HTTP transport with custom configuration
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Connection`] if the client cannot be built.
    pub fn with_config(config: HttpTransportConfig) -> Result<Self> {
        let mut builder = ReqwestClient::builder()
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host);

        if let Some(user_agent) = config.user_agent {
            builder = builder.user_agent(user_agent);
        }

        let client = builder
            .build()
            .map_err(|e| TransportError::Connection(e.to_string()))?;

        Ok(Self {
            client: Arc::new(client),
        })
    }

    /// Get a reference to the underlying reqwest client
    pub fn reqwest_client(&self) -> Arc<ReqwestClient> {
        self.client.clone()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send_http(&self, request: HttpRequest) -> Result<HttpResponse> {
        let method = reqwest::Method::from_bytes(request.method.to_uppercase().as_bytes())
            .map_err(|_| {
                TransportError::Http(format!("Unsupported HTTP method: {}", request.method))
            })?;

        let mut req = self.client.request(method, &request.url);

        for (key, value) in &request.headers {
            req = req.header(key.as_str(), value.as_str());
        }

        if let Some(body) = request.body {
            req = req.body(body);
        }

        let response = req.send().await?;

        let status = response.status().as_u16();
        let mut headers = HashMap::new();
        for (key, value) in response.headers() {
            if let Ok(v) = value.to_str() {
                headers.insert(key.to_string(), v.to_string());
            }
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::Http(e.to_string()))?
            .to_vec();

        tracing::trace!(status, body_size = body.len(), "Transport exchange complete");

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }

    fn name(&self) -> &'static str {
        "reqwest"
    }
}

/// HTTP transport configuration
#[derive(Clone, Debug)]
pub struct HttpTransportConfig {
    /// Connection timeout
    pub connect_timeout: Duration,

    /// Maximum idle connections per host
    pub pool_max_idle_per_host: usize,

    /// User-Agent header sent with every request
    pub user_agent: Option<String>,
}

impl Default for HttpTransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            pool_max_idle_per_host: 10,
            user_agent: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_transport_creation() {
        let transport = HttpTransport::new().expect("Failed to create transport");
        assert_eq!(transport.name(), "reqwest");
    }

    #[test]
    fn test_http_transport_with_config() {
        let config = HttpTransportConfig {
            connect_timeout: Duration::from_secs(5),
            pool_max_idle_per_host: 2,
            user_agent: Some("turbonotion-test/0.0".to_string()),
        };

        assert!(HttpTransport::with_config(config).is_ok());
    }

    #[tokio::test]
    async fn test_unsupported_method_rejected() {
        let transport = HttpTransport::new().unwrap();
        let result = transport
            .send_http(HttpRequest::new("NOT A METHOD", "http://127.0.0.1:1/"))
            .await;
        assert!(matches!(result, Err(TransportError::Http(_))));
    }
}
