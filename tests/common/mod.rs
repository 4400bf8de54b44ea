#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::time::Duration;

use catalog_rs::{Backoff, BreakerConfig, CatalogClient, CatalogClientBuilder, RetryConfig};
use httpmock::MockServer;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use url::Url;

pub const UA: &str = concat!("catalog-rs/", env!("CARGO_PKG_VERSION"));

pub fn product_body(id: u64, title: &str, price: &str) -> String {
    format!(
        r#"{{"id":{id},"title":"{title}","price":{price},"description":"desc","category":"misc","image":"https://img.test/{id}.jpg"}}"#
    )
}

/// Retries as configured by default, minus the 100ms wait.
pub fn fast_retry() -> RetryConfig {
    RetryConfig {
        backoff: Backoff::Fixed(Duration::from_millis(1)),
        ..RetryConfig::default()
    }
}

pub fn breaker(threshold: u32, cooldown: Duration) -> BreakerConfig {
    BreakerConfig {
        failure_threshold: threshold,
        cooldown,
        ..BreakerConfig::default()
    }
}

pub fn builder_for(base: &str) -> CatalogClientBuilder {
    CatalogClient::builder()
        .base_url(Url::parse(base).unwrap())
        .retry_config(fast_retry())
}

pub fn mock_client(server: &MockServer) -> CatalogClientBuilder {
    builder_for(&server.base_url())
}

#[derive(Clone, Copy, Debug)]
#[repr(u8)]
pub enum Mode {
    /// Accept, then close without answering.
    Reset = 0,
    /// Accept and never answer.
    Hang = 1,
    /// Answer every `GET /products/{id}` with a product.
    Serve = 2,
}

/// Raw TCP upstream that counts accepted connections, one per request attempt.
pub struct Upstream {
    pub base_url: String,
    accepted: Arc<AtomicUsize>,
    mode: Arc<AtomicU8>,
}

impl Upstream {
    pub async fn start(mode: Mode) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let accepted = Arc::new(AtomicUsize::new(0));
        let mode_cell = Arc::new(AtomicU8::new(mode as u8));

        let (count, current) = (accepted.clone(), mode_cell.clone());
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                count.fetch_add(1, Ordering::SeqCst);
                tokio::spawn(handle(stream, current.load(Ordering::SeqCst)));
            }
        });

        Self {
            base_url: format!("http://{addr}/"),
            accepted,
            mode: mode_cell,
        }
    }

    pub fn accepted(&self) -> usize {
        self.accepted.load(Ordering::SeqCst)
    }

    pub fn set_mode(&self, mode: Mode) {
        self.mode.store(mode as u8, Ordering::SeqCst);
    }

    pub fn client(&self) -> CatalogClientBuilder {
        builder_for(&self.base_url)
    }
}

async fn handle(mut stream: TcpStream, mode: u8) {
    if mode == Mode::Reset as u8 {
        drop(stream);
        return;
    }
    if mode == Mode::Hang as u8 {
        tokio::time::sleep(Duration::from_secs(30)).await;
        return;
    }

    let mut buf = vec![0u8; 8192];
    let mut read = 0;
    loop {
        let n = match stream.read(&mut buf[read..]).await {
            Ok(0) | Err(_) => return,
            Ok(n) => n,
        };
        read += n;
        if buf[..read].windows(4).any(|w| w == b"\r\n\r\n") {
            break;
        }
        if read == buf.len() {
            return;
        }
    }

    let head = String::from_utf8_lossy(&buf[..read]);
    let id: u64 = head
        .split_whitespace()
        .nth(1)
        .and_then(|path| path.rsplit('/').next())
        .and_then(|seg| seg.parse().ok())
        .unwrap_or(0);
    let body = product_body(id, "Recovered", "9.99");
    let resp = format!(
        "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
        body.len()
    );
    let _ = stream.write_all(resp.as_bytes()).await;
    let _ = stream.shutdown().await;
}
