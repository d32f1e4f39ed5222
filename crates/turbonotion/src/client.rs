//! Main client implementation for the Notion API

use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use secrecy::SecretString;
use serde::de::DeserializeOwned;
use serde_json::Value;
use turbonotion_transport::{HttpTransport, HttpTransportConfig, Transport};

use crate::{
    config::{ClientConfig, RateLimitConfig, parse_header},
    error::{Error, Result},
    http::{Executor, Request},
    pagination::{Page, PaginatedCollection, Paginator, collect_paginated_with_meta},
};

/// Main client for interacting with the Notion API.
///
/// Cheap to clone: clones share one immutable configuration and one
/// transport. Each call owns its retry counter and deadlines, so concurrent
/// calls through the same client are independent.
///
/// # Example
///
/// ```rust,no_run
/// use turbonotion::{Client, Request};
///
/// # async fn example() -> turbonotion::Result<()> {
/// let client = Client::new("secret_...")?;
///
/// let me = client.execute(&Request::get("/users/me")).await?;
/// println!("{}", me["name"]);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    config: ClientConfig,
    executor: Executor,
}

impl Client {
    /// Create a client with an integration token and default settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is empty or the HTTP transport cannot be
    /// initialized.
    pub fn new(token: impl Into<String>) -> Result<Self> {
        Self::builder().auth(token).build()
    }

    /// Create a new client builder for advanced configuration.
    pub fn builder() -> NotionClientBuilder {
        NotionClientBuilder::default()
    }

    /// Create a client from a configuration object, using the default
    /// reqwest transport.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No credential is configured
    /// - The base URL is empty or not HTTP(S)
    /// - HTTP client configuration fails
    pub fn from_config(config: ClientConfig) -> Result<Self> {
        let transport = HttpTransport::with_config(HttpTransportConfig {
            user_agent: Some(format!("turbonotion/{}", crate::VERSION)),
            ..HttpTransportConfig::default()
        })
        .map_err(|e| Error::HttpClient(e.to_string()))?;

        Self::with_transport(config, Arc::new(transport))
    }

    /// Create a client that sends every exchange through `transport`.
    ///
    /// # Errors
    ///
    /// Same configuration checks as [`from_config`](Self::from_config).
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        let executor = Executor::new(&config, transport)?;

        tracing::debug!(
            base_url = %executor.base_url(),
            transport = executor.transport_name(),
            max_retries = config.max_retries,
            timeout_ms = config.timeout.as_millis() as u64,
            "Notion client created"
        );

        Ok(Self {
            inner: Arc::new(ClientInner { config, executor }),
        })
    }

    /// Create a client from `NOTION_*` environment variables.
    ///
    /// See [`ClientConfig::from_env`].
    #[cfg(feature = "env")]
    #[cfg_attr(docsrs, doc(cfg(feature = "env")))]
    pub fn from_env() -> Result<Self> {
        Self::from_config(ClientConfig::from_env()?)
    }

    /// Configuration this client was built with.
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Execute a request and return the raw JSON result.
    ///
    /// A 204 response yields an empty object. Rate-limited attempts are
    /// retried per the configuration; every other failure is returned as
    /// soon as it happens.
    ///
    /// # Errors
    ///
    /// [`Error::Api`], [`Error::Timeout`], [`Error::Network`], or
    /// [`Error::Decode`] for a 2xx body that is not JSON.
    pub async fn execute(&self, request: &Request) -> Result<Value> {
        self.inner.executor.execute(request).await
    }

    /// Execute a request and decode the result into `T`.
    ///
    /// A decode failure is reported as [`Error::Decode`] and never retried.
    pub async fn execute_as<T: DeserializeOwned>(&self, request: &Request) -> Result<T> {
        let value = self.execute(request).await?;
        serde_json::from_value(value).map_err(Error::Decode)
    }

    /// Lazily page through a list endpoint.
    ///
    /// `request` is the first-page request; each later page is the same
    /// request positioned with [`Request::with_start_cursor`].
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use turbonotion::{Client, Request};
    /// use serde_json::Value;
    ///
    /// # async fn example(client: Client) -> turbonotion::Result<()> {
    /// let mut users = client.paginate::<Value>(Request::get("/users").query("page_size", 100u32));
    /// while let Some(user) = users.next().await {
    ///     println!("{}", user?["name"]);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub fn paginate<T>(
        &self,
        request: Request,
    ) -> Paginator<T, impl FnMut(Option<String>) -> BoxFuture<'static, Result<Page<T>>> + use<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let client = self.clone();
        Paginator::new(move |cursor: Option<String>| {
            let client = client.clone();
            let request = request.with_start_cursor(cursor.as_deref());
            let fetch: BoxFuture<'static, Result<Page<T>>> =
                Box::pin(async move { client.execute_as::<Page<T>>(&request).await });
            fetch
        })
    }

    /// Fetch every page of a list endpoint and return all items.
    pub async fn collect_all<T: DeserializeOwned>(&self, request: &Request) -> Result<Vec<T>> {
        self.collect_all_with_meta(request)
            .await
            .map(|collection| collection.items)
    }

    /// Fetch every page of a list endpoint, with page and item counts.
    pub async fn collect_all_with_meta<T: DeserializeOwned>(
        &self,
        request: &Request,
    ) -> Result<PaginatedCollection<T>> {
        collect_paginated_with_meta(|cursor: Option<String>| {
            let request = request.with_start_cursor(cursor.as_deref());
            async move { self.execute_as::<Page<T>>(&request).await }
        })
        .await
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.inner.executor.base_url().as_str())
            .field("transport", &self.inner.executor.transport_name())
            .finish_non_exhaustive()
    }
}

/// Builder for [`Client`].
#[derive(Default)]
pub struct NotionClientBuilder {
    config: ClientConfig,
    transport: Option<Arc<dyn Transport>>,
}

impl NotionClientBuilder {
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
    /// Returns an error if the header name or value is invalid.
    pub fn default_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Result<Self> {
        let (key, value) = parse_header(key.into(), value.into())?;
        self.config.default_headers.insert(key, value);
        Ok(self)
    }

    /// Enable client-side rate limiting.
    pub fn rate_limit(mut self, config: RateLimitConfig) -> Self {
        self.config.rate_limit = Some(config);
        self
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Send exchanges through a custom transport instead of reqwest.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<Client> {
        match self.transport {
            Some(transport) => Client::with_transport(self.config, transport),
            None => Client::from_config(self.config),
        }
    }
}
