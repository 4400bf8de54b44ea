use crate::core::{CatalogClient, CatalogError, Product};

/// The product lookup that upstream business logic depends on.
///
/// Implemented by [`CatalogClient`]; favorites code takes `&dyn ProductService` (or a generic)
/// so it can be exercised against a stand-in.
pub trait ProductService: Send + Sync {
    /// Fetch one product by id.
    fn fetch_product<'a>(
        &'a self,
        id: u64,
    ) -> core::pin::Pin<
        Box<dyn core::future::Future<Output = Result<Product, CatalogError>> + Send + 'a>,
    >;
}

impl ProductService for CatalogClient {
    fn fetch_product<'a>(
        &'a self,
        id: u64,
    ) -> core::pin::Pin<
        Box<dyn core::future::Future<Output = Result<Product, CatalogError>> + Send + 'a>,
    > {
        Box::pin(self.fetch(id))
    }
}
