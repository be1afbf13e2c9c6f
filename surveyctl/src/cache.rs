//! Process-wide memoization of read-only lookups.
//!
//! A [`MemoCache`] stores `(value, stored_at)` entries keyed by whatever identifies the
//! lookup (a dataset path, a survey id). Entries are populated on miss and, when the
//! cache has a time-to-live, dropped on the first read after they expire. There is no
//! size bound and no background eviction: the key space is the fixed module catalog.
//!
//! Caches are cheap to clone (the entries live behind an [`Arc`]) and are owned by
//! application state rather than living in statics, so each test can build its own.
//!
//! Time is read from [`tokio::time::Instant`], which lets tests drive expiry with a
//! paused clock.

use dashmap::DashMap;
use std::{future::Future, hash::Hash, sync::Arc, time::Duration};
use tokio::time::Instant;
use tracing::trace;

/// A cached value together with the instant it was stored.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub value: V,
    pub stored_at: Instant,
}

impl<V> CacheEntry<V> {
    pub fn new(value: V) -> Self {
        Self {
            value,
            stored_at: Instant::now(),
        }
    }

    /// Whether the entry is still usable at `now`. Entries without a TTL never expire.
    pub fn is_fresh(&self, ttl: Option<Duration>, now: Instant) -> bool {
        match ttl {
            Some(ttl) => now.saturating_duration_since(self.stored_at) < ttl,
            None => true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MemoCache<K, V>
where
    K: Eq + Hash,
{
    name: &'static str,
    entries: Arc<DashMap<K, CacheEntry<V>>>,
    ttl: Option<Duration>,
}

impl<K, V> MemoCache<K, V>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
    V: Clone,
{
    /// Cache whose entries live for the lifetime of the process.
    pub fn unbounded(name: &'static str) -> Self {
        Self {
            name,
            entries: Arc::new(DashMap::new()),
            ttl: None,
        }
    }

    /// Cache whose entries are re-fetched once older than `ttl`.
    pub fn with_ttl(name: &'static str, ttl: Duration) -> Self {
        Self {
            name,
            entries: Arc::new(DashMap::new()),
            ttl: Some(ttl),
        }
    }

    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    /// Return the cached value if present and fresh. A stale entry is removed.
    pub fn get(&self, key: &K) -> Option<V> {
        let now = Instant::now();
        if let Some(entry) = self.entries.get(key)
            && entry.is_fresh(self.ttl, now)
        {
            return Some(entry.value.clone());
        }
        // The read guard must be released before taking the shard write lock.
        self.entries.remove_if(key, |_, entry| !entry.is_fresh(self.ttl, now));
        None
    }

    pub fn insert(&self, key: K, value: V) {
        self.entries.insert(key, CacheEntry::new(value));
    }

    /// Return the cached value, or run `init` and store its result on success.
    ///
    /// Errors are returned to the caller and nothing is cached, so the next call retries.
    /// Two concurrent misses for the same key both run `init`; the later insert wins.
    pub async fn get_or_try_insert_with<F, Fut, E>(&self, key: K, init: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(&key) {
            trace!(cache = self.name, ?key, "cache hit");
            return Ok(value);
        }

        trace!(cache = self.name, ?key, "cache miss");
        let value = init().await?;
        self.insert(key, value.clone());
        Ok(value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
