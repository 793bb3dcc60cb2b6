//! Service Layer
//!
//! Identifier resolution and cache refresh. Services operate on a
//! [`CatalogServices`] bundle: the upstream store plus the two persistent
//! identifier caches, one instance per running gateway.

mod cache_refresh;
mod category_resolver;
mod product_resolver;

pub use cache_refresh::*;
pub use category_resolver::*;
pub use product_resolver::*;

use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use woogate_core::{CatalogUpstream, EntityKind};
use woogate_storage::{MapStore, PersistentIdCache, CATEGORY_MAP_FILE, PRODUCT_MAP_FILE};

use crate::telemetry::metrics;

/// Default number of page fetches in flight during a refresh.
pub const DEFAULT_REFRESH_CONCURRENCY: usize = 4;

/// Upstream store and identifier caches shared by all requests.
pub struct CatalogServices {
    upstream: Arc<dyn CatalogUpstream>,
    categories: Arc<PersistentIdCache>,
    products: Arc<PersistentIdCache>,
    refresh_concurrency: usize,
    last_refresh: RwLock<RefreshTimes>,
}

/// When each cache was last fully refreshed by this process.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshTimes {
    pub categories: Option<DateTime<Utc>>,
    pub products: Option<DateTime<Utc>>,
}

impl CatalogServices {
    pub fn new(
        upstream: Arc<dyn CatalogUpstream>,
        categories: Arc<PersistentIdCache>,
        products: Arc<PersistentIdCache>,
    ) -> Self {
        let services = Self {
            upstream,
            categories,
            products,
            refresh_concurrency: DEFAULT_REFRESH_CONCURRENCY,
            last_refresh: RwLock::new(RefreshTimes::default()),
        };
        services.observe_cache_size(EntityKind::Category);
        services.observe_cache_size(EntityKind::Product);
        services
    }

    /// Open both caches from their map files. Missing files start empty.
    pub fn open(
        upstream: Arc<dyn CatalogUpstream>,
        category_map: impl Into<PathBuf>,
        product_map: impl Into<PathBuf>,
    ) -> Self {
        let categories = PersistentIdCache::open(MapStore::new(category_map));
        let products = PersistentIdCache::open(MapStore::new(product_map));
        Self::new(upstream, Arc::new(categories), Arc::new(products))
    }

    /// Open both caches from the standard file names in `data_dir`.
    pub fn open_dir(upstream: Arc<dyn CatalogUpstream>, data_dir: &Path) -> Self {
        Self::open(
            upstream,
            data_dir.join(CATEGORY_MAP_FILE),
            data_dir.join(PRODUCT_MAP_FILE),
        )
    }

    pub fn with_refresh_concurrency(mut self, concurrency: usize) -> Self {
        self.refresh_concurrency = concurrency.max(1);
        self
    }

    pub fn upstream(&self) -> &dyn CatalogUpstream {
        self.upstream.as_ref()
    }

    pub fn category_cache(&self) -> &PersistentIdCache {
        &self.categories
    }

    pub fn product_cache(&self) -> &PersistentIdCache {
        &self.products
    }

    pub fn refresh_concurrency(&self) -> usize {
        self.refresh_concurrency
    }

    pub fn last_refresh(&self) -> RefreshTimes {
        *self.last_refresh.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn cache(&self, kind: EntityKind) -> &PersistentIdCache {
        match kind {
            EntityKind::Category => &self.categories,
            EntityKind::Product => &self.products,
        }
    }

    fn mark_refreshed(&self, kind: EntityKind, at: DateTime<Utc>) {
        let mut times = self.last_refresh.write().unwrap_or_else(PoisonError::into_inner);
        match kind {
            EntityKind::Category => times.categories = Some(at),
            EntityKind::Product => times.products = Some(at),
        }
    }

    /// Publish the current size of one cache to the metrics gauge.
    fn observe_cache_size(&self, kind: EntityKind) {
        if let Some(metrics) = metrics() {
            metrics.set_cache_entries(cache_label(kind), self.cache(kind).len());
        }
    }
}

impl std::fmt::Debug for CatalogServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogServices")
            .field("categories", &self.categories.len())
            .field("products", &self.products.len())
            .field("refresh_concurrency", &self.refresh_concurrency)
            .finish()
    }
}

/// Metrics label of a cache.
pub fn cache_label(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Category => "categories",
        EntityKind::Product => "products",
    }
}

fn record_resolution(kind: EntityKind, outcome: &str) {
    if let Some(metrics) = metrics() {
        metrics.record_resolution(kind.as_str(), outcome);
    }
}
