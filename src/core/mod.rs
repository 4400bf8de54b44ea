//! Core components of the `catalog-rs` client.
//!
//! This module contains the foundational building blocks of the library, including:
//! - The main [`CatalogClient`] and its builder.
//! - The primary [`CatalogError`] type.
//! - The [`Product`] model and its wire shape.
//! - The product cache and circuit breaker shared by every fetch.

/// The circuit breaker guarding the upstream.
pub mod breaker;
/// The TTL-enforcing product cache.
pub mod cache;
/// The main client (`CatalogClient`), builder, and configuration.
pub mod client;
/// The primary error type (`CatalogError`) for the crate.
pub mod error;
/// The `Product` model.
pub mod models;
/// Service trait for abstracting product lookup.
pub mod services;
pub(crate) mod wire;

pub(crate) mod net;

// convenient re-exports so most code can just `use crate::core::CatalogClient`
pub use breaker::{BreakerConfig, BreakerState, CircuitBreaker};
pub use cache::ProductCache;
pub use client::{
    Backoff, CacheMode, CatalogClient, CatalogClientBuilder, FetchOptions, RetryConfig,
};
pub use error::{CatalogError, ProtocolError};
pub use models::Product;
pub use services::ProductService;
