use std::time::Duration;

use catalog_rs::{Backoff, CatalogError, FetchOptions, RetryConfig};

use crate::common::{Mode, Upstream};

#[tokio::test]
async fn transport_error_is_retried_once() {
    let upstream = Upstream::start(Mode::Reset).await;
    let client = upstream.client().build().unwrap();

    match client.fetch(1).await.unwrap_err() {
        CatalogError::Transport { url, .. } => assert!(url.ends_with("/products/1")),
        other => panic!("expected Transport, got {other:?}"),
    }
    assert_eq!(upstream.accepted(), 2);
}

#[tokio::test]
async fn second_attempt_can_succeed() {
    let upstream = Upstream::start(Mode::Reset).await;
    let client = upstream
        .client()
        .retry_config(RetryConfig {
            backoff: Backoff::Fixed(Duration::from_millis(150)),
            ..RetryConfig::default()
        })
        .build()
        .unwrap();

    let fetch = tokio::spawn({
        let client = client.clone();
        async move { client.fetch(3).await }
    });
    // Flip the upstream while the client is backing off.
    tokio::time::sleep(Duration::from_millis(60)).await;
    upstream.set_mode(Mode::Serve);

    let product = fetch.await.unwrap().unwrap();
    assert_eq!(product.id(), 3);
    assert_eq!(upstream.accepted(), 2);
}

#[tokio::test]
async fn retry_disabled_makes_a_single_attempt() {
    let upstream = Upstream::start(Mode::Reset).await;
    let client = upstream.client().retry_enabled(false).build().unwrap();

    assert!(matches!(
        client.fetch(1).await.unwrap_err(),
        CatalogError::Transport { .. }
    ));
    assert_eq!(upstream.accepted(), 1);
}

#[tokio::test]
async fn timeouts_are_retried_and_reported() {
    let upstream = Upstream::start(Mode::Hang).await;
    let client = upstream
        .client()
        .timeout(Duration::from_millis(100))
        .build()
        .unwrap();

    match client.fetch(1).await.unwrap_err() {
        CatalogError::Transport { source, .. } => assert!(source.is_timeout()),
        other => panic!("expected Transport, got {other:?}"),
    }
    assert_eq!(upstream.accepted(), 2);
}

#[tokio::test]
async fn timeouts_not_retried_when_disabled() {
    let upstream = Upstream::start(Mode::Hang).await;
    let client = upstream
        .client()
        .timeout(Duration::from_millis(100))
        .retry_config(RetryConfig {
            retry_on_timeout: false,
            ..crate::common::fast_retry()
        })
        .build()
        .unwrap();

    assert!(client.fetch(1).await.is_err());
    assert_eq!(upstream.accepted(), 1);
}

#[tokio::test]
async fn per_call_retry_override() {
    let upstream = Upstream::start(Mode::Reset).await;
    let client = upstream.client().build().unwrap();

    let options = FetchOptions {
        retry_override: Some(RetryConfig {
            max_retries: 3,
            ..crate::common::fast_retry()
        }),
        ..FetchOptions::default()
    };
    assert!(client.fetch_with(1, &options).await.is_err());
    assert_eq!(upstream.accepted(), 4);
}
