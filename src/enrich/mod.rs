//! Favorites enrichment: attach live product data to favorite product ids.
//!
//! Upstream never fails a favorites listing because the catalog is down. A lookup that ends in
//! `Unavailable`, a transport or a protocol error is kept as [`Lookup::Degraded`] so the
//! favorite can still be rendered without live data.

use futures::future::join_all;

use crate::core::{CatalogError, Product, ProductService};

/// Outcome of looking up one favorite's product.
#[derive(Debug)]
pub enum Lookup {
    /// Live product data.
    Live(Product),
    /// The catalog says the product no longer exists.
    Missing,
    /// The catalog could not be consulted; carries the reason.
    Degraded(CatalogError),
}

/// A favorite product id paired with its lookup outcome.
#[derive(Debug)]
pub struct EnrichedFavorite {
    pub product_id: u64,
    pub lookup: Lookup,
}

impl EnrichedFavorite {
    /// The live product, if one was fetched.
    pub fn product(&self) -> Option<&Product> {
        match &self.lookup {
            Lookup::Live(p) => Some(p),
            _ => None,
        }
    }
}

/// Look up every id concurrently. The result has one entry per input, in input order.
///
/// Duplicate ids are looked up once per occurrence; the client cache absorbs repeats that
/// arrive after the first fetch completes.
pub async fn enrich_favorites<S, I>(service: &S, ids: I) -> Vec<EnrichedFavorite>
where
    S: ProductService + ?Sized,
    I: IntoIterator<Item = u64>,
{
    let futs = ids.into_iter().map(|product_id| async move {
        let lookup = match service.fetch_product(product_id).await {
            Ok(product) => Lookup::Live(product),
            Err(err) if err.is_not_found() => Lookup::Missing,
            Err(err) => Lookup::Degraded(err),
        };
        EnrichedFavorite { product_id, lookup }
    });
    join_all(futs).await
}

/// The add-favorite check: the product must exist. Returns its title for the favorite record.
///
/// # Errors
///
/// Propagates the lookup error unchanged, including `NotFound`.
pub async fn validate_product<S>(service: &S, product_id: u64) -> Result<String, CatalogError>
where
    S: ProductService + ?Sized,
{
    let product = service.fetch_product(product_id).await?;
    Ok(product.title().to_string())
}
