//! TTL response cache.
//!
//! Memoizes already-serialized responses keyed by logical resource id
//! (`"conversations"`, `"conversations/<id>"`). Entries are logically absent
//! once their age reaches the TTL, independent of when they are physically
//! removed. The cache does not coalesce concurrent misses: two requests
//! missing on the same key may both run the compute step, with the later
//! store winning.

use dashmap::DashMap;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default bound on the number of live entries.
const DEFAULT_MAX_ENTRIES: usize = 1024;

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache at capacity ({0} entries)")]
    Full(usize),
}

#[derive(Clone)]
struct CacheEntry {
    value: Value,
    stored_at: Instant,
    ttl: Duration,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now.duration_since(self.stored_at) >= self.ttl
    }
}

/// Shared in-memory cache with a fixed per-entry TTL.
#[derive(Clone)]
pub struct ResponseCache {
    entries: Arc<DashMap<String, CacheEntry>>,
    ttl: Duration,
    max_entries: usize,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self::with_capacity(ttl, DEFAULT_MAX_ENTRIES)
    }

    pub fn with_capacity(ttl: Duration, max_entries: usize) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            ttl,
            max_entries,
        }
    }

    /// Look up a live entry. Expired entries are treated as absent and
    /// removed on the way out.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.get_at(key, Instant::now())
    }

    fn get_at(&self, key: &str, now: Instant) -> Option<Value> {
        let expired = match self.entries.get(key) {
            Some(entry) if !entry.is_expired(now) => return Some(entry.value.clone()),
            Some(_) => true,
            None => false,
        };

        if expired {
            self.entries.remove(key);
        }
        None
    }

    /// Store a value under `key` with the configured TTL.
    ///
    /// Fails only when the cache is at capacity and the key is new; callers
    /// treat that as non-fatal and still return the computed value.
    pub fn store(&self, key: &str, value: Value) -> Result<(), CacheError> {
        if self.entries.len() >= self.max_entries && !self.entries.contains_key(key) {
            return Err(CacheError::Full(self.max_entries));
        }

        self.entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                stored_at: Instant::now(),
                ttl: self.ttl,
            },
        );
        Ok(())
    }

    /// Return the cached value for `key`, or run `compute` and cache its
    /// result.
    ///
    /// `compute` errors propagate uncached so a later call can retry. A store
    /// failure is logged and the freshly computed value is still returned.
    pub async fn get_or_compute<F, Fut, E>(&self, key: &str, compute: F) -> Result<Value, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value, E>>,
    {
        if let Some(hit) = self.get(key) {
            log::debug!("cache hit for {key}");
            return Ok(hit);
        }

        let value = compute().await?;
        if let Err(err) = self.store(key, value.clone()) {
            log::warn!("unable to cache entry for {key}: {err}");
        }
        Ok(value)
    }
}
