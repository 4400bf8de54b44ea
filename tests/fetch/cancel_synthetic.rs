use std::time::{Duration, Instant};

use catalog_rs::{Backoff, CatalogError, RetryConfig};

use crate::common::{Mode, Upstream, breaker};

#[tokio::test]
async fn cancel_aborts_in_flight_request_without_penalty() {
    let upstream = Upstream::start(Mode::Hang).await;
    let client = upstream
        .client()
        .breaker_config(breaker(1, Duration::from_secs(60)))
        .build()
        .unwrap();

    let started = Instant::now();
    let err = client
        .fetch_until(1, tokio::time::sleep(Duration::from_millis(50)))
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::Cancelled), "got {err:?}");
    assert!(started.elapsed() < Duration::from_secs(1));
    assert_eq!(upstream.accepted(), 1);

    // Threshold is 1, so a counted failure would have opened the breaker.
    upstream.set_mode(Mode::Serve);
    assert_eq!(client.fetch(2).await.unwrap().id(), 2);
}

#[tokio::test]
async fn cancel_during_backoff_skips_the_retry() {
    let upstream = Upstream::start(Mode::Reset).await;
    let client = upstream
        .client()
        .retry_config(RetryConfig {
            backoff: Backoff::Fixed(Duration::from_millis(400)),
            ..RetryConfig::default()
        })
        .build()
        .unwrap();

    let err = client
        .fetch_until(1, tokio::time::sleep(Duration::from_millis(100)))
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::Cancelled));

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(upstream.accepted(), 1);
}

#[tokio::test]
async fn uncancelled_signal_does_not_interfere() {
    let upstream = Upstream::start(Mode::Serve).await;
    let client = upstream.client().build().unwrap();

    let product = client
        .fetch_until(5, tokio::time::sleep(Duration::from_secs(30)))
        .await
        .unwrap();
    assert_eq!(product.title(), "Recovered");
}
