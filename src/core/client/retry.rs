use std::time::Duration;

use reqwest::header::ACCEPT;
use tokio::sync::OwnedSemaphorePermit;
use url::Url;

use crate::core::CatalogError;

/// Specifies the backoff strategy for retrying failed requests.
#[derive(Clone, Debug, PartialEq)]
pub enum Backoff {
    /// Uses a fixed delay between retries.
    Fixed(Duration),
    /// Uses an exponential delay between retries.
    /// The delay is calculated as `base * (factor ^ attempt)`, capped at `max`.
    Exponential {
        /// The initial backoff duration.
        base: Duration,
        /// The multiplicative factor for each subsequent retry.
        factor: f64,
        /// The maximum duration to wait between retries.
        max: Duration,
    },
}

impl Backoff {
    /// Delay before retry number `attempt + 1` (`attempt` is zero-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        match *self {
            Self::Fixed(d) => d,
            Self::Exponential { base, factor, max } => {
                let exp = i32::try_from(attempt).unwrap_or(i32::MAX);
                let secs = base.as_secs_f64() * factor.powi(exp);
                if !secs.is_finite() || secs >= max.as_secs_f64() {
                    max
                } else {
                    Duration::from_secs_f64(secs.max(0.0))
                }
            }
        }
    }
}

/// Configuration for the automatic retry mechanism.
///
/// Only transport errors are retried. Once the upstream answers with any status the
/// attempt is final.
#[derive(Clone, Debug, PartialEq)]
pub struct RetryConfig {
    /// Enables or disables the retry mechanism.
    pub enabled: bool,
    /// The maximum number of retries to attempt. The total number of attempts will be `max_retries + 1`.
    pub max_retries: u32,
    /// The backoff strategy to use between retries.
    pub backoff: Backoff,
    /// Whether to retry on request timeouts.
    pub retry_on_timeout: bool,
    /// Whether to retry on connection errors.
    pub retry_on_connect: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_retries: 1,
            backoff: Backoff::Fixed(Duration::from_millis(100)),
            retry_on_timeout: true,
            retry_on_connect: true,
        }
    }
}

impl RetryConfig {
    fn should_retry(&self, err: &reqwest::Error, attempt: u32) -> bool {
        if !self.enabled || attempt >= self.max_retries || err.is_builder() {
            return false;
        }
        if err.is_timeout() {
            self.retry_on_timeout
        } else if err.is_connect() {
            self.retry_on_connect
        } else {
            true
        }
    }
}

/// Defines the behavior of the in-memory cache for a fetch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CacheMode {
    /// Read from the cache if a non-expired entry is present; otherwise, fetch from the network
    /// and write the response to the cache. (Default)
    #[default]
    Use,
    /// Always fetch from the network, bypassing any cached entry, and write the new response to the cache.
    Refresh,
    /// Always fetch from the network and do not read from or write to the cache.
    Bypass,
}

/// Per-call overrides for [`CatalogClient::fetch_with`](super::CatalogClient::fetch_with).
#[derive(Clone, Debug, Default)]
pub struct FetchOptions {
    pub cache_mode: CacheMode,
    /// Replaces the client-wide [`RetryConfig`] for this call.
    pub retry_override: Option<RetryConfig>,
}

impl super::CatalogClient {
    /// `GET url` with `Accept: application/json`, retrying transport errors per `cfg`.
    ///
    /// Each attempt first takes a connection slot; the slot is returned with the response and
    /// must be held until its body has been read. Returns the first response received,
    /// whatever its status.
    pub(crate) async fn send_with_retry(
        &self,
        url: &Url,
        cfg: &RetryConfig,
    ) -> Result<(reqwest::Response, OwnedSemaphorePermit), CatalogError> {
        let mut attempt = 0u32;
        loop {
            // The semaphore is owned by the client and never closed.
            let permit = self
                .connection_slots()
                .acquire_owned()
                .await
                .map_err(|_| CatalogError::Unavailable)?;

            let req = self
                .http()
                .get(url.clone())
                .header(ACCEPT, "application/json");
            match req.send().await {
                Ok(resp) => return Ok((resp, permit)),
                Err(err) => {
                    drop(permit);
                    if !cfg.should_retry(&err, attempt) {
                        return Err(CatalogError::Transport {
                            url: url.to_string(),
                            source: err,
                        });
                    }
                    let delay = cfg.backoff.delay(attempt);
                    #[cfg(feature = "tracing")]
                    tracing::debug!(
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "transport error; retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}
