//! Contract with the upstream store API.

use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::record::CatalogRecord;
use crate::{CatalogId, UpstreamResult};

/// Upstream collections the gateway talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Categories,
    Products,
}

impl Resource {
    /// Path of the collection relative to the REST base.
    pub fn path(&self) -> &'static str {
        match self {
            Resource::Categories => "products/categories",
            Resource::Products => "products",
        }
    }

    /// Short label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Resource::Categories => "categories",
            Resource::Products => "products",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Search filter. Absent fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    /// Free-text relevance search.
    pub search: Option<String>,
    /// Exact SKU filter (products only).
    pub sku: Option<String>,
    /// Maximum number of candidates.
    pub limit: Option<u32>,
}

impl SearchQuery {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            search: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn sku(sku: impl Into<String>) -> Self {
        Self {
            sku: Some(sku.into()),
            ..Self::default()
        }
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Extra query parameters for a listing (ordering, status, filters).
pub type ListParams = BTreeMap<String, String>;

/// One page of a listing.
#[derive(Debug, Clone, PartialEq)]
pub struct ListPage {
    pub records: Vec<CatalogRecord>,
    /// Total page count as signalled by the store; 1 when it did not say.
    pub total_pages: u32,
}

/// Operations the gateway needs from the upstream store.
///
/// Implementations own transport concerns (auth, timeouts, pagination
/// headers). Errors are reported as [`crate::UpstreamError`].
#[async_trait]
pub trait CatalogUpstream: Send + Sync {
    /// Search a collection.
    async fn search(
        &self,
        resource: Resource,
        query: &SearchQuery,
    ) -> UpstreamResult<Vec<CatalogRecord>>;

    /// Fetch one record by ID.
    async fn get(&self, resource: Resource, id: CatalogId) -> UpstreamResult<CatalogRecord>;

    /// Update one record by ID, returning the updated record.
    async fn put(
        &self,
        resource: Resource,
        id: CatalogId,
        body: &JsonValue,
    ) -> UpstreamResult<CatalogRecord>;

    /// Fetch one page of a listing. Pages are 1-based.
    async fn list(
        &self,
        resource: Resource,
        page: u32,
        per_page: u32,
        params: &ListParams,
    ) -> UpstreamResult<ListPage>;
}
