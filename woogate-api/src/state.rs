//! Shared application state for Axum routers.

use std::sync::Arc;
use std::time::Instant;

use crate::services::CatalogServices;

/// Application-wide state shared across all routes.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Upstream store and identifier caches.
    pub services: Arc<CatalogServices>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(services: Arc<CatalogServices>) -> Self {
        Self {
            services,
            start_time: Instant::now(),
        }
    }
}

crate::impl_from_ref!(Arc<CatalogServices>, services);
crate::impl_from_ref!(Instant, start_time);
