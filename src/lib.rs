//! catalog-rs: resilient client for a remote product catalog.
//!
//! [`CatalogClient`] fronts a flaky, rate-limited HTTP catalog with:
//! - a TTL-enforcing in-memory [`ProductCache`],
//! - a consecutive-failure [`CircuitBreaker`] with a half-open trial window,
//! - bounded retries of transport errors under explicit timeouts.
//!
//! ```no_run
//! # async fn run() -> Result<(), catalog_rs::CatalogError> {
//! let client = catalog_rs::CatalogClient::builder().build()?;
//! match client.fetch(1).await {
//!     Ok(product) => println!("{} costs {}", product.title(), product.price()),
//!     Err(e) if e.is_not_found() => println!("no such product"),
//!     Err(e) => println!("catalog degraded: {e}"),
//! }
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod enrich;
pub(crate) mod product;

pub use crate::core::{
    Backoff, BreakerConfig, BreakerState, CacheMode, CatalogClient, CatalogClientBuilder,
    CatalogError, CircuitBreaker, FetchOptions, Product, ProductCache, ProductService,
    ProtocolError, RetryConfig,
};
pub use crate::enrich::{EnrichedFavorite, Lookup, enrich_favorites, validate_product};

/// Install a `fmt` subscriber honoring `RUST_LOG`, writing through the test harness.
///
/// Safe to call from every test; only the first call installs.
#[cfg(feature = "tracing-subscriber")]
pub fn init_tracing_for_tests() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
