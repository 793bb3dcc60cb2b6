//! An [`IdCache`] backed by a [`MapStore`].

use std::sync::{Arc, Mutex, PoisonError};

use woogate_core::{CatalogId, IdMap};

use crate::id_cache::{CacheStats, IdCache};
use crate::map_store::MapStore;

/// Identifier cache that writes its full mapping to disk after every mutation.
///
/// Saves are best-effort: a failed save is logged by the store and the
/// in-memory mutation stands.
#[derive(Debug)]
pub struct PersistentIdCache {
    cache: IdCache,
    store: MapStore,
    // Serializes saves so an older snapshot never lands after a newer one.
    save_lock: Mutex<()>,
}

impl PersistentIdCache {
    /// Open a cache, loading whatever the store currently holds.
    pub fn open(store: MapStore) -> Self {
        let map = store.load();
        Self::with_map(store, map)
    }

    /// Create a cache with explicit contents. Nothing is read from or written
    /// to the store until the first mutation.
    pub fn with_map(store: MapStore, map: IdMap) -> Self {
        Self {
            cache: IdCache::new(map),
            store,
            save_lock: Mutex::new(()),
        }
    }

    /// Exact-key lookup.
    pub fn lookup(&self, key: &str) -> Option<CatalogId> {
        self.cache.get(key)
    }

    /// Add entries, then save the full mapping.
    pub fn record<I>(&self, entries: I)
    where
        I: IntoIterator<Item = (String, CatalogId)>,
    {
        self.cache.insert_all(entries);
        self.persist();
    }

    /// Swap in a complete new mapping, then save it. Returns the new size.
    pub fn replace_all(&self, map: IdMap) -> usize {
        let len = self.cache.replace(map).len();
        self.persist();
        len
    }

    pub fn snapshot(&self) -> Arc<IdMap> {
        self.cache.snapshot()
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn store(&self) -> &MapStore {
        &self.store
    }

    fn persist(&self) {
        let _guard = self.save_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let snapshot = self.cache.snapshot();
        self.store.save(&snapshot);
    }
}
