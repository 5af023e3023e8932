//! Decoded-image cache keyed by canonical image URL.
//!
//! Eviction under pressure is delegated to `lru::LruCache`; the pipeline
//! itself only clears the cache wholesale on refresh/reset. Distinct size
//! variants of one photo are distinct keys, and a hit returns the same shared
//! handle for the life of the entry.
//!
//! No request coalescing: two near-simultaneous misses for the same key both
//! fetch. Writes for a key are idempotent (equivalent decoded bytes for the
//! same URL), so the last writer wins.

use log::debug;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Decoded image handle shared between the cache and consumers.
pub type CachedImage = Arc<image::DynamicImage>;

/// Hit/miss counters for monitoring cache effectiveness.
#[derive(Debug, Default)]
pub struct CacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
}

impl CacheStats {
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn total(&self) -> u64 {
        self.hits() + self.misses()
    }

    pub fn hit_rate(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            self.hits() as f64 / total as f64
        }
    }

    pub fn reset(&self) {
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }
}

/// LRU-bounded store of decoded images.
pub struct ImageCache {
    entries: Mutex<LruCache<String, CachedImage>>,
    stats: Arc<CacheStats>,
}

impl ImageCache {
    /// Create a cache holding at most `capacity` decoded images.
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap();
        debug!("ImageCache created: capacity={}", capacity);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            stats: Arc::new(CacheStats::default()),
        }
    }

    /// Look up a decoded image. Updates recency and hit/miss stats.
    pub fn get(&self, key: &str) -> Option<CachedImage> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let result = entries.get(key).cloned();
        if result.is_some() {
            self.stats.record_hit();
        } else {
            self.stats.record_miss();
        }
        result
    }

    /// Check for a key without touching recency or stats.
    pub fn contains(&self, key: &str) -> bool {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .peek(key)
            .is_some()
    }

    /// Store a decoded image, evicting the least recently used entry when at
    /// capacity. Replacing an existing key is allowed (last writer wins).
    pub fn put(&self, key: &str, image: CachedImage) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.put(key.to_string(), image);
        debug!("Cached image: {} ({} entries)", key, entries.len());
    }

    /// Drop every entry. Called on refresh/reset.
    pub fn clear(&self) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let count = entries.len();
        entries.clear();
        debug!("Cleared image cache ({} entries dropped)", count);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> Arc<CacheStats> {
        Arc::clone(&self.stats)
    }
}

impl std::fmt::Debug for ImageCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageCache")
            .field("len", &self.len())
            .field("hits", &self.stats.hits())
            .field("misses", &self.stats.misses())
            .finish()
    }
}
