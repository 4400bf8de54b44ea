//! Centralized defaults for the upstream endpoint, UA and transport limits.

use std::time::Duration;

/// Fixed user agent so upstream operators can identify this client.
pub(crate) const USER_AGENT: &str = concat!("catalog-rs/", env!("CARGO_PKG_VERSION"));

/// Public catalog root (`products/{id}` is appended).
pub(crate) const DEFAULT_BASE_URL: &str = "https://fakestoreapi.com/";

/// Overall per-attempt deadline.
pub(crate) const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

/// TCP connect + TLS handshake.
pub(crate) const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

pub(crate) const DEFAULT_TCP_KEEPALIVE: Duration = Duration::from_secs(30);

/// Idle pooled connections are closed after this long.
pub(crate) const DEFAULT_POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);

pub(crate) const DEFAULT_POOL_MAX_IDLE_PER_HOST: usize = 10;

/// In-flight connections allowed to the catalog host at once.
pub(crate) const DEFAULT_MAX_CONNECTIONS_PER_HOST: usize = 20;

/// Cap on a success body; anything past it is discarded before decoding.
pub(crate) const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

pub(crate) const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(15 * 60);

pub(crate) const DEFAULT_CACHE_CAPACITY: usize = 1024;
