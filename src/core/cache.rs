//! In-memory product cache with an enforced time-to-live.
//!
//! A single `RwLock` covers the whole map: lookups share the read side, writes take the
//! exclusive side. Stale entries are never returned; they are evicted lazily on read.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::core::models::Product;

#[derive(Debug, Clone)]
struct CacheEntry {
    product: Product,
    stored_at: Instant,
}

impl CacheEntry {
    fn is_fresh(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.stored_at) < ttl
    }
}

/// Process-local mapping from product id to the last successfully fetched product.
#[derive(Debug)]
pub struct ProductCache {
    map: RwLock<HashMap<u64, CacheEntry>>,
    ttl: Duration,
    capacity: usize,
}

impl ProductCache {
    /// Create an empty cache. `capacity` is clamped to at least one entry.
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            map: RwLock::new(HashMap::new()),
            ttl,
            capacity: capacity.max(1),
        }
    }

    /// The configured time-to-live.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Look up a fresh entry.
    ///
    /// An entry older than the TTL is treated as a miss and removed, unless a concurrent
    /// writer already replaced it.
    pub async fn get(&self, id: u64) -> Option<Product> {
        let now = Instant::now();
        let stale_since = {
            let guard = self.map.read().await;
            let entry = guard.get(&id)?;
            if entry.is_fresh(now, self.ttl) {
                return Some(entry.product.clone());
            }
            entry.stored_at
        };

        let mut guard = self.map.write().await;
        if guard
            .get(&id)
            .is_some_and(|entry| entry.stored_at == stale_since)
        {
            guard.remove(&id);
            #[cfg(feature = "tracing")]
            tracing::debug!(id, "evicted stale cache entry");
        }
        None
    }

    /// Store (overwrite) the entry for `id`.
    ///
    /// Inserting a new key into a full cache first drops expired entries, then the oldest one.
    pub async fn put(&self, id: u64, product: Product) {
        let now = Instant::now();
        let mut guard = self.map.write().await;

        if !guard.contains_key(&id) && guard.len() >= self.capacity {
            let ttl = self.ttl;
            guard.retain(|_, entry| entry.is_fresh(now, ttl));

            if guard.len() >= self.capacity
                && let Some(oldest) = guard
                    .iter()
                    .min_by_key(|(_, entry)| entry.stored_at)
                    .map(|(key, _)| *key)
            {
                guard.remove(&oldest);
                #[cfg(feature = "tracing")]
                tracing::debug!(evicted = oldest, "cache full; evicted oldest entry");
            }
        }

        guard.insert(
            id,
            CacheEntry {
                product,
                stored_at: now,
            },
        );
    }

    /// Drop every entry older than the TTL. Returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let ttl = self.ttl;
        let mut guard = self.map.write().await;
        let before = guard.len();
        guard.retain(|_, entry| entry.is_fresh(now, ttl));
        before - guard.len()
    }

    /// Entries currently stored, stale ones included until they are evicted.
    pub async fn len(&self) -> usize {
        self.map.read().await.len()
    }

    /// `true` when nothing is stored.
    pub async fn is_empty(&self) -> bool {
        self.map.read().await.is_empty()
    }

    /// Drop every entry.
    pub async fn clear(&self) {
        self.map.write().await.clear();
    }
}
