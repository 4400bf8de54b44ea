use thiserror::Error;

/// The primary error type for all fallible operations in this crate.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The remote catalog authoritatively reported that the product does not exist.
    ///
    /// Returned for HTTP 404 and for a well-formed payload carrying a zero identifier.
    #[error("product {id} not found in remote catalog")]
    NotFound {
        /// The requested product identifier.
        id: u64,
    },

    /// The circuit breaker is open; no request was attempted.
    #[error("product catalog temporarily unavailable (circuit open)")]
    Unavailable,

    /// Every attempt failed at the transport level (connect, timeout, reset, body read).
    #[error("transport failure calling {url}: {source}")]
    Transport {
        /// The URL that was requested.
        url: String,
        /// The error from the last attempt.
        #[source]
        source: reqwest::Error,
    },

    /// The remote service answered, but not in a way this client understands.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The caller's cancellation signal fired while the request was in flight.
    #[error("request cancelled by caller")]
    Cancelled,

    /// The HTTP client could not be constructed.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// A provided URL could not be parsed.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// A builder setting was out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Unexpected status codes and malformed payloads.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The server returned a status outside `200..300` other than 404.
    #[error("Unexpected response status: {status} at {url}")]
    Status {
        /// The HTTP status code.
        status: u16,
        /// The URL that returned the error.
        url: String,
    },

    /// The body was not a JSON product object.
    #[error("malformed product payload from {url}: {source}")]
    Decode {
        /// The URL that returned the payload.
        url: String,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// The body decoded but violates the product model (e.g. a negative price).
    #[error("invalid product payload from {url}: {reason}")]
    InvalidProduct {
        /// The URL that returned the payload.
        url: String,
        /// What was wrong with it.
        reason: String,
    },
}

impl CatalogError {
    /// `true` for [`CatalogError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// `true` when the breaker rejected the call without touching the network.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable)
    }

    /// Whether a caller-level retry later on could plausibly succeed.
    ///
    /// Configuration errors and `NotFound` are permanent; everything else is transient.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Unavailable | Self::Transport { .. } | Self::Protocol(_) | Self::Cancelled
        )
    }
}
