//! Memoized screening results.
//!
//! Results are keyed by snapshot id and config fingerprint. Nothing expires
//! on its own; callers drop entries with [`ResultCache::invalidate`] when a
//! snapshot is superseded, or [`ResultCache::clear`] to start over.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

/// Cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey {
    pub snapshot_id: String,
    pub config_fingerprint: String,
}

impl CacheKey {
    pub fn new(snapshot_id: impl Into<String>, config_fingerprint: impl Into<String>) -> Self {
        Self {
            snapshot_id: snapshot_id.into(),
            config_fingerprint: config_fingerprint.into(),
        }
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.snapshot_id, self.config_fingerprint)
    }
}

/// Thread-safe result cache.
pub struct ResultCache<T> {
    entries: RwLock<HashMap<CacheKey, Arc<T>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<T> ResultCache<T> {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Cached value for a key.
    pub fn get(&self, key: &CacheKey) -> Option<Arc<T>> {
        let cache = self.entries.read().ok()?;
        let found = cache.get(key).cloned();
        match found {
            Some(_) => self.hits.fetch_add(1, Ordering::Relaxed),
            None => self.misses.fetch_add(1, Ordering::Relaxed),
        };
        found
    }

    /// Store a value, replacing any previous one.
    pub fn insert(&self, key: CacheKey, value: T) -> Arc<T> {
        let value = Arc::new(value);
        if let Ok(mut cache) = self.entries.write() {
            cache.insert(key, Arc::clone(&value));
        }
        value
    }

    /// Return the cached value or compute and store it.
    ///
    /// Concurrent misses on the same key may both compute; the later insert
    /// wins and both callers get equal values.
    pub fn get_or_compute<F>(&self, key: CacheKey, compute: F) -> Arc<T>
    where
        F: FnOnce() -> T,
    {
        if let Some(hit) = self.get(&key) {
            tracing::debug!(key = %key, "Result cache hit");
            return hit;
        }
        tracing::debug!(key = %key, "Result cache miss");
        self.insert(key, compute())
    }

    /// Drop every entry for a snapshot. Returns how many were removed.
    pub fn invalidate(&self, snapshot_id: &str) -> usize {
        match self.entries.write() {
            Ok(mut cache) => {
                let before = cache.len();
                cache.retain(|k, _| k.snapshot_id != snapshot_id);
                let removed = before - cache.len();
                tracing::debug!(snapshot_id, removed, "Invalidated cached results");
                removed
            }
            Err(_) => 0,
        }
    }

    /// Drop everything and reset counters.
    pub fn clear(&self) {
        if let Ok(mut cache) = self.entries.write() {
            cache.clear();
        }
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        let entries = self.entries.read().map(|c| c.len()).unwrap_or(0);
        CacheStats {
            entries,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

impl<T> Default for ResultCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Cache statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

// ============================================================================
// Tests
// ============================================================================
