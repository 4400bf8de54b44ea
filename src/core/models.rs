use rust_decimal::Decimal;
use serde::Serialize;

/// A catalog item as decoded from the remote product service.
///
/// Values are only produced by a successful decode of a remote response and are immutable
/// afterwards; the cache hands out clones.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Product {
    id: u64,
    title: String,
    image: String,
    price: Decimal,
}

impl Product {
    pub(crate) fn from_parts(id: u64, title: String, image: String, price: Decimal) -> Self {
        Self {
            id,
            title,
            image,
            price,
        }
    }

    /// The positive catalog identifier.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Display title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Image reference, usually an absolute URI.
    pub fn image(&self) -> &str {
        &self.image
    }

    /// Non-negative price.
    pub fn price(&self) -> Decimal {
        self.price
    }
}
