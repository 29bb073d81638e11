// src/utils/cache.rs
// TTL-bounded LRU cache for upstream lookup results. Capacity drives
// eviction; expiry is checked lazily on read rather than by scanning.

use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

use lru::LruCache;

struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

/// Key-value store with a fixed time-to-live and a maximum entry count.
/// Reads refresh recency; writes evict the least-recently-touched entries
/// once the capacity bound is exceeded. Not internally synchronized — wrap in
/// a mutex when shared across tasks.
pub struct TtlCache<V> {
    entries: LruCache<String, CacheEntry<V>>,
    ttl: Duration,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(ttl: Duration, max_size: usize) -> Self {
        let capacity = NonZeroUsize::new(max_size.max(1)).unwrap();
        Self {
            entries: LruCache::new(capacity),
            ttl,
        }
    }

    /// Look up a key. Expired entries are evicted and reported as misses;
    /// live entries are promoted to most-recently-used.
    pub fn get(&mut self, key: &str) -> Option<V> {
        let expired = match self.entries.peek(key) {
            None => return None,
            Some(entry) => Instant::now() > entry.expires_at,
        };
        if expired {
            self.entries.pop(key);
            return None;
        }
        self.entries.get(key).map(|entry| entry.value.clone())
    }

    /// Insert or replace a value with a fresh expiry. The capacity bound
    /// evicts the least-recently-used entry on overflow.
    pub fn set(&mut self, key: String, value: V) {
        self.entries.put(
            key,
            CacheEntry {
                value,
                expires_at: Instant::now() + self.ttl,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
