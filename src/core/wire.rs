use rust_decimal::Decimal;
use serde::Deserialize;
use url::Url;

use crate::core::{error::ProtocolError, models::Product};

/// Shape of `GET /products/{id}`. Missing and `null` fields decode to their zero value.
#[derive(Deserialize)]
pub(crate) struct ProductNode {
    #[serde(default)]
    pub(crate) id: Option<u64>,
    #[serde(default)]
    pub(crate) title: Option<String>,
    #[serde(default)]
    pub(crate) image: Option<String>,
    #[serde(default)]
    pub(crate) price: Option<Decimal>,
}

/// Decode a product body.
///
/// `Ok(None)` means the payload was well-formed but carried a zero id (or was a bare
/// `null`), which the upstream uses as an implicit "not found".
pub(crate) fn decode_product(body: &[u8], url: &Url) -> Result<Option<Product>, ProtocolError> {
    let node: Option<ProductNode> =
        serde_json::from_slice(body).map_err(|source| ProtocolError::Decode {
            url: url.to_string(),
            source,
        })?;

    let Some(node) = node else {
        return Ok(None);
    };
    let id = node.id.unwrap_or_default();
    if id == 0 {
        return Ok(None);
    }
    let price = node.price.unwrap_or_default();
    if price.is_sign_negative() && !price.is_zero() {
        return Err(ProtocolError::InvalidProduct {
            url: url.to_string(),
            reason: format!("negative price {price}"),
        });
    }

    Ok(Some(Product::from_parts(
        id,
        node.title.unwrap_or_default(),
        node.image.unwrap_or_default(),
        price,
    )))
}
