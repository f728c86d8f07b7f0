//! Kernel cache implementation
//!
//! LRU cache for kernel matrix values so the SMO solver does not recompute
//! K(i, j) on every error-cache update. Kernel matrices are symmetric, so
//! entries are stored with i <= j.

use lru::LruCache;
use std::num::NonZeroUsize;

/// LRU cache for kernel matrix values, keyed by symmetric sample index pairs
pub struct KernelCache {
    cache: LruCache<(usize, usize), f64>,
    hits: u64,
    misses: u64,
}

impl KernelCache {
    /// Create a new kernel cache with the given capacity in entries
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::new(1).unwrap());
        Self {
            cache: LruCache::new(capacity),
            hits: 0,
            misses: 0,
        }
    }

    /// Create a kernel cache sized from a memory budget in bytes
    ///
    /// Assumes roughly 32 bytes per entry (key, value, and map overhead).
    pub fn with_memory_limit(memory_bytes: usize) -> Self {
        Self::new((memory_bytes / 32).max(1))
    }

    /// Look up K(i, j), or compute and insert it via `f`.
    pub fn get_or_compute<F: FnOnce() -> f64>(&mut self, i: usize, j: usize, f: F) -> f64 {
        let key = if i <= j { (i, j) } else { (j, i) };
        if let Some(&value) = self.cache.get(&key) {
            self.hits += 1;
            value
        } else {
            self.misses += 1;
            let value = f();
            self.cache.put(key, value);
            value
        }
    }

    /// Fraction of lookups served from cache
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Drop all entries and reset statistics
    pub fn clear(&mut self) {
        self.cache.clear();
        self.hits = 0;
        self.misses = 0;
    }
}
