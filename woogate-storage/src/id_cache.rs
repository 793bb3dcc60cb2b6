//! In-memory identifier cache.
//!
//! The mapping lives behind an `Arc` so readers can take a snapshot without
//! holding the lock, and a refresh can swap in a freshly built mapping under
//! one write-lock acquisition. Readers see either the old complete mapping or
//! the new one, never a half-cleared state.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use woogate_core::{CatalogId, IdMap};

/// Statistics about cache usage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of lookups answered from the cache.
    pub hits: u64,
    /// Number of lookups that fell through to the upstream store.
    pub misses: u64,
    /// Number of keys currently cached.
    pub entry_count: u64,
}

impl CacheStats {
    /// Calculate the hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Process-wide key to ID mapping. Last write wins per key.
#[derive(Debug, Default)]
pub struct IdCache {
    map: RwLock<Arc<IdMap>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl IdCache {
    pub fn new(map: IdMap) -> Self {
        Self {
            map: RwLock::new(Arc::new(map)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Look up an exact key, counting the hit or miss.
    pub fn get(&self, key: &str) -> Option<CatalogId> {
        let found = self.read().get(key).copied();
        let counter = if found.is_some() { &self.hits } else { &self.misses };
        counter.fetch_add(1, Ordering::Relaxed);
        found
    }

    /// Insert several entries under one lock acquisition and return the
    /// resulting mapping.
    pub fn insert_all<I>(&self, entries: I) -> Arc<IdMap>
    where
        I: IntoIterator<Item = (String, CatalogId)>,
    {
        let mut guard = self.map.write().unwrap_or_else(PoisonError::into_inner);
        let map = Arc::make_mut(&mut *guard);
        for (key, id) in entries {
            map.insert(key, id);
        }
        Arc::clone(&*guard)
    }

    /// Replace the whole mapping and return it.
    pub fn replace(&self, map: IdMap) -> Arc<IdMap> {
        let fresh = Arc::new(map);
        let mut guard = self.map.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Arc::clone(&fresh);
        fresh
    }

    /// The current mapping.
    pub fn snapshot(&self) -> Arc<IdMap> {
        self.read()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entry_count: self.len() as u64,
        }
    }

    fn read(&self) -> Arc<IdMap> {
        let guard = self.map.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&*guard)
    }
}
