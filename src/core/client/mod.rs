//! Public client surface + builder.
//! Defaults live in `constants`; retry/backoff/cache-mode knobs in `retry`.

mod constants;
mod retry;

pub use retry::{Backoff, CacheMode, FetchOptions, RetryConfig};

use crate::core::{
    CatalogError, Product,
    breaker::{BreakerConfig, CircuitBreaker},
    cache::ProductCache,
};
use constants::{
    DEFAULT_BASE_URL, DEFAULT_CACHE_CAPACITY, DEFAULT_CACHE_TTL, DEFAULT_CONNECT_TIMEOUT,
    DEFAULT_MAX_BODY_BYTES, DEFAULT_MAX_CONNECTIONS_PER_HOST, DEFAULT_POOL_IDLE_TIMEOUT,
    DEFAULT_POOL_MAX_IDLE_PER_HOST, DEFAULT_TCP_KEEPALIVE, DEFAULT_TIMEOUT, USER_AGENT,
};
use reqwest::Client;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use url::Url;

/// Resilient client for the remote product catalog.
///
/// Cloning is cheap: clones share the connection pool, the cache and the circuit breaker,
/// so build one per upstream at startup and hand clones to whoever needs it.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    http: Client,
    base_url: Url,
    retry: RetryConfig,
    max_body_bytes: usize,
    /// One permit per in-flight connection to the catalog host.
    connection_slots: Arc<Semaphore>,
    cache: Arc<ProductCache>,
    breaker: Arc<CircuitBreaker>,
}

impl Default for CatalogClient {
    fn default() -> Self {
        Self::builder().build().expect("default client")
    }
}

impl CatalogClient {
    /// Create a new builder.
    pub fn builder() -> CatalogClientBuilder {
        CatalogClientBuilder::default()
    }

    /// Fetch a product: cache, then breaker gate, then the network.
    ///
    /// Dropping the returned future aborts the request without touching the breaker.
    ///
    /// # Errors
    ///
    /// `NotFound` when the catalog has no such product, `Unavailable` when the breaker is
    /// open, `Transport` when every attempt failed, `Protocol` for unexpected statuses or
    /// payloads.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    pub async fn fetch(&self, id: u64) -> Result<Product, CatalogError> {
        crate::product::fetch_product(self, id, &FetchOptions::default(), std::future::pending())
            .await
    }

    /// Like [`fetch`](Self::fetch) with per-call cache and retry overrides.
    ///
    /// # Errors
    ///
    /// See [`fetch`](Self::fetch).
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, options), err))]
    pub async fn fetch_with(
        &self,
        id: u64,
        options: &FetchOptions,
    ) -> Result<Product, CatalogError> {
        crate::product::fetch_product(self, id, options, std::future::pending()).await
    }

    /// Like [`fetch`](Self::fetch), but gives up with [`CatalogError::Cancelled`] as soon as
    /// `cancel` resolves while the request is in flight.
    ///
    /// # Errors
    ///
    /// See [`fetch`](Self::fetch), plus `Cancelled`.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, cancel), err))]
    pub async fn fetch_until<C>(&self, id: u64, cancel: C) -> Result<Product, CatalogError>
    where
        C: Future<Output = ()>,
    {
        crate::product::fetch_product(self, id, &FetchOptions::default(), cancel).await
    }

    /* -------- internal getters used by other modules -------- */

    pub(crate) fn http(&self) -> &Client {
        &self.http
    }
    pub(crate) fn retry_config(&self) -> &RetryConfig {
        &self.retry
    }
    pub(crate) fn max_body_bytes(&self) -> usize {
        self.max_body_bytes
    }
    pub(crate) fn connection_slots(&self) -> Arc<Semaphore> {
        Arc::clone(&self.connection_slots)
    }
    pub(crate) fn cache(&self) -> &ProductCache {
        &self.cache
    }
    pub(crate) fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    pub(crate) fn product_url(&self, id: u64) -> Result<Url, CatalogError> {
        Ok(self.base_url.join(&format!("products/{id}"))?)
    }

    /// The catalog root every product URL is resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }
}

/* ----------------------- Builder ----------------------- */

#[derive(Default)]
pub struct CatalogClientBuilder {
    base_url: Option<Url>,
    user_agent: Option<String>,
    custom_client: Option<Client>,

    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    tcp_keepalive: Option<Duration>,
    pool_idle_timeout: Option<Duration>,
    pool_max_idle_per_host: Option<usize>,
    max_connections_per_host: Option<usize>,

    retry: Option<RetryConfig>,
    retry_enabled: Option<bool>,
    max_body_bytes: Option<usize>,

    breaker: Option<BreakerConfig>,
    cache_ttl: Option<Duration>,
    cache_capacity: Option<usize>,
}

impl CatalogClientBuilder {
    /// Override the catalog root (e.g., `https://fakestoreapi.com/`).
    pub fn base_url(mut self, url: Url) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Override the User-Agent.
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Use a preconfigured `reqwest::Client`.
    ///
    /// Timeouts, pool limits and the User-Agent are then whatever that client was built with;
    /// the corresponding builder settings are ignored.
    pub fn custom_client(mut self, client: Client) -> Self {
        self.custom_client = Some(client);
        self
    }

    /// Overall deadline per attempt. Default: 3s.
    pub fn timeout(mut self, dur: Duration) -> Self {
        self.timeout = Some(dur);
        self
    }

    /// Connect deadline, TLS handshake included. Default: 3s.
    pub fn connect_timeout(mut self, dur: Duration) -> Self {
        self.connect_timeout = Some(dur);
        self
    }

    /// TCP keepalive interval for pooled connections. Default: 30s.
    pub fn tcp_keepalive(mut self, dur: Duration) -> Self {
        self.tcp_keepalive = Some(dur);
        self
    }

    /// How long an idle pooled connection is kept. Default: 90s.
    pub fn pool_idle_timeout(mut self, dur: Duration) -> Self {
        self.pool_idle_timeout = Some(dur);
        self
    }

    /// Idle connections kept per host. Default: 10.
    pub fn pool_max_idle_per_host(mut self, max: usize) -> Self {
        self.pool_max_idle_per_host = Some(max);
        self
    }

    /// Concurrent connections opened to the catalog host. Further requests wait for a
    /// free slot. Default: 20.
    pub fn max_connections_per_host(mut self, max: usize) -> Self {
        self.max_connections_per_host = Some(max);
        self
    }

    /// Replace the retry policy for transport errors. Default: 2 attempts, 100ms apart.
    pub fn retry_config(mut self, cfg: RetryConfig) -> Self {
        self.retry = Some(cfg);
        self
    }

    /// Shorthand for toggling [`RetryConfig::enabled`].
    pub fn retry_enabled(mut self, enabled: bool) -> Self {
        self.retry_enabled = Some(enabled);
        self
    }

    /// Cap on the bytes read from a success body. Default: 1 MiB.
    pub fn max_body_bytes(mut self, max: usize) -> Self {
        self.max_body_bytes = Some(max);
        self
    }

    /// Tune the circuit breaker. Default: 5 failures, 60s cooldown, 2 trials.
    pub fn breaker_config(mut self, cfg: BreakerConfig) -> Self {
        self.breaker = Some(cfg);
        self
    }

    /// How long a cached product is served before it is fetched again. Default: 15 minutes.
    pub fn cache_ttl(mut self, dur: Duration) -> Self {
        self.cache_ttl = Some(dur);
        self
    }

    /// Maximum cached products. Default: 1024.
    pub fn cache_capacity(mut self, entries: usize) -> Self {
        self.cache_capacity = Some(entries);
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` for out-of-range settings, `Url` if the default base URL
    /// cannot be parsed, or `Http` if the HTTP client cannot be created.
    pub fn build(self) -> Result<CatalogClient, CatalogError> {
        let mut base_url = match self.base_url {
            Some(url) => url,
            None => Url::parse(DEFAULT_BASE_URL)?,
        };
        if base_url.cannot_be_a_base() {
            return Err(CatalogError::InvalidConfig(format!(
                "base url {base_url} cannot be a base"
            )));
        }
        // `join` replaces the last segment unless the path ends in '/'.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let max_body_bytes = self.max_body_bytes.unwrap_or(DEFAULT_MAX_BODY_BYTES);
        if max_body_bytes == 0 {
            return Err(CatalogError::InvalidConfig(
                "max_body_bytes must be at least 1".into(),
            ));
        }
        let cache_capacity = self.cache_capacity.unwrap_or(DEFAULT_CACHE_CAPACITY);
        if cache_capacity == 0 {
            return Err(CatalogError::InvalidConfig(
                "cache_capacity must be at least 1".into(),
            ));
        }
        let max_connections = self
            .max_connections_per_host
            .unwrap_or(DEFAULT_MAX_CONNECTIONS_PER_HOST);
        if max_connections == 0 {
            return Err(CatalogError::InvalidConfig(
                "max_connections_per_host must be at least 1".into(),
            ));
        }
        let breaker = self.breaker.unwrap_or_default();
        if breaker.failure_threshold == 0 || breaker.half_open_max_retries == 0 {
            return Err(CatalogError::InvalidConfig(
                "breaker thresholds must be at least 1".into(),
            ));
        }

        let mut retry = self.retry.unwrap_or_default();
        if let Some(enabled) = self.retry_enabled {
            retry.enabled = enabled;
        }

        let http = match self.custom_client {
            Some(client) => client,
            None => reqwest::Client::builder()
                .user_agent(self.user_agent.as_deref().unwrap_or(USER_AGENT))
                .timeout(self.timeout.unwrap_or(DEFAULT_TIMEOUT))
                .connect_timeout(self.connect_timeout.unwrap_or(DEFAULT_CONNECT_TIMEOUT))
                .tcp_keepalive(self.tcp_keepalive.unwrap_or(DEFAULT_TCP_KEEPALIVE))
                .pool_idle_timeout(self.pool_idle_timeout.unwrap_or(DEFAULT_POOL_IDLE_TIMEOUT))
                .pool_max_idle_per_host(
                    self.pool_max_idle_per_host
                        .unwrap_or(DEFAULT_POOL_MAX_IDLE_PER_HOST),
                )
                .build()?,
        };

        Ok(CatalogClient {
            http,
            base_url,
            retry,
            max_body_bytes,
            connection_slots: Arc::new(Semaphore::new(max_connections)),
            cache: Arc::new(ProductCache::new(
                self.cache_ttl.unwrap_or(DEFAULT_CACHE_TTL),
                cache_capacity,
            )),
            breaker: Arc::new(CircuitBreaker::new(breaker)),
        })
    }
}
