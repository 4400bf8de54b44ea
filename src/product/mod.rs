//! Product lookup orchestration: cache → breaker gate → request with retry → classify.
//!
//! Each call performs at most one cache write and reports exactly one outcome (success or
//! failure) to the breaker once the network is reached; a cache hit, a rejected call or a
//! cancelled call reports nothing. Neither lock is held while the request is in flight.

use std::future::Future;

use reqwest::StatusCode;
use url::Url;

use crate::core::{
    CatalogClient, CatalogError, Product, ProtocolError,
    client::{CacheMode, FetchOptions},
    net, wire,
};

/// What came back from the upstream before any breaker bookkeeping.
struct Reply {
    status: StatusCode,
    /// Capped body; only read for success statuses.
    body: Vec<u8>,
}

pub(crate) async fn fetch_product<C>(
    client: &CatalogClient,
    id: u64,
    options: &FetchOptions,
    cancel: C,
) -> Result<Product, CatalogError>
where
    C: Future<Output = ()>,
{
    if options.cache_mode == CacheMode::Use
        && let Some(product) = client.cache().get(id).await
    {
        return Ok(product);
    }

    let url = client.product_url(id)?;

    if client.breaker().is_open() {
        return Err(CatalogError::Unavailable);
    }

    let exchanged = tokio::select! {
        biased;
        () = cancel => {
            #[cfg(feature = "tracing")]
            tracing::debug!(id, "fetch cancelled by caller");
            return Err(CatalogError::Cancelled);
        }
        res = exchange(client, &url, options) => res,
    };

    let reply = match exchanged {
        Ok(reply) => reply,
        Err(err) => {
            client.breaker().record_failure();
            return Err(err);
        }
    };

    if reply.status == StatusCode::NOT_FOUND {
        // An authoritative "no such product" is a healthy answer.
        client.breaker().record_success();
        return Err(CatalogError::NotFound { id });
    }

    if !reply.status.is_success() {
        client.breaker().record_failure();
        return Err(ProtocolError::Status {
            status: reply.status.as_u16(),
            url: url.to_string(),
        }
        .into());
    }

    match wire::decode_product(&reply.body, &url) {
        Err(err) => {
            client.breaker().record_failure();
            Err(err.into())
        }
        Ok(None) => {
            client.breaker().record_success();
            Err(CatalogError::NotFound { id })
        }
        Ok(Some(product)) => {
            if options.cache_mode != CacheMode::Bypass {
                client.cache().put(id, product.clone()).await;
            }
            client.breaker().record_success();
            Ok(product)
        }
    }
}

/// The cancellable part of a fetch: attempts, backoff and the body read.
async fn exchange(
    client: &CatalogClient,
    url: &Url,
    options: &FetchOptions,
) -> Result<Reply, CatalogError> {
    let retry = options
        .retry_override
        .as_ref()
        .unwrap_or_else(|| client.retry_config());

    let (resp, _slot) = client.send_with_retry(url, retry).await?;
    let status = resp.status();
    if !status.is_success() {
        return Ok(Reply {
            status,
            body: Vec::new(),
        });
    }

    let body = net::read_capped(resp, client.max_body_bytes())
        .await
        .map_err(|source| CatalogError::Transport {
            url: url.to_string(),
            source,
        })?;
    Ok(Reply { status, body })
}
