//! Cache Refresh
//!
//! Rebuilds a whole identifier cache from a full upstream listing. The new
//! mapping is assembled off to the side and swapped in only once every page
//! has been fetched; a failed refresh leaves the previous mapping in place.

use chrono::{DateTime, Utc};
use futures_util::stream::{self, StreamExt, TryStreamExt};
use serde::Serialize;
use woogate_core::{
    CatalogRecord, EntityKind, IdMap, ListPage, ListParams, Resource, UpstreamResult,
};

use super::CatalogServices;

/// Page size used when listing categories.
pub const CATEGORY_PAGE_SIZE: u32 = 100;

/// Page size used when listing products.
pub const PRODUCT_PAGE_SIZE: u32 = 50;

/// Outcome of [`refresh_category_cache`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryRefresh {
    /// Entries in the category cache after the swap.
    pub count: usize,
    pub refreshed_at: DateTime<Utc>,
}

/// Outcome of [`refresh_product_map`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductRefresh {
    /// Products returned by the listing.
    pub product_count: usize,
    /// Distinct name/SKU keys in the product cache after the swap.
    pub mapping_count: usize,
    pub refreshed_at: DateTime<Utc>,
}

/// Replace the category cache with `name -> id` for every category.
///
/// # Errors
/// Returns the upstream failure of any page; the cache is left untouched.
pub async fn refresh_category_cache(services: &CatalogServices) -> UpstreamResult<CategoryRefresh> {
    let mut params = ListParams::new();
    params.insert("orderby".to_string(), "name".to_string());
    params.insert("order".to_string(), "asc".to_string());

    let records = fetch_all(services, Resource::Categories, CATEGORY_PAGE_SIZE, &params).await?;
    let map = category_map(&records);

    let count = services.category_cache().replace_all(map);
    let refreshed_at = Utc::now();
    services.mark_refreshed(EntityKind::Category, refreshed_at);
    services.observe_cache_size(EntityKind::Category);

    tracing::info!(
        categories = records.len(),
        cache_entries = count,
        "Category cache refreshed"
    );

    Ok(CategoryRefresh {
        count,
        refreshed_at,
    })
}

/// Replace the product cache with `name -> id` and `sku -> id` for every
/// product, whatever its status.
///
/// # Errors
/// Returns the upstream failure of any page; the cache is left untouched.
pub async fn refresh_product_map(services: &CatalogServices) -> UpstreamResult<ProductRefresh> {
    let mut params = ListParams::new();
    params.insert("status".to_string(), "any".to_string());

    let records = fetch_all(services, Resource::Products, PRODUCT_PAGE_SIZE, &params).await?;
    let map = product_map(&records);

    let mapping_count = services.product_cache().replace_all(map);
    let refreshed_at = Utc::now();
    services.mark_refreshed(EntityKind::Product, refreshed_at);
    services.observe_cache_size(EntityKind::Product);

    tracing::info!(
        products = records.len(),
        mappings = mapping_count,
        "Product map refreshed"
    );

    Ok(ProductRefresh {
        product_count: records.len(),
        mapping_count,
        refreshed_at,
    })
}

/// Fetch every page of a listing. The first page reports the page count;
/// the rest are fetched with bounded concurrency and concatenated in page
/// order.
async fn fetch_all(
    services: &CatalogServices,
    resource: Resource,
    per_page: u32,
    params: &ListParams,
) -> UpstreamResult<Vec<CatalogRecord>> {
    let upstream = services.upstream();

    let first = upstream.list(resource, 1, per_page, params).await?;
    let total_pages = first.total_pages;
    tracing::debug!(resource = %resource, total_pages, "Fetched first listing page");

    let mut records = first.records;
    if total_pages > 1 {
        let rest: Vec<ListPage> = stream::iter(2..=total_pages)
            .map(|page| upstream.list(resource, page, per_page, params))
            .buffered(services.refresh_concurrency())
            .try_collect()
            .await?;

        for page in rest {
            records.extend(page.records);
        }
    }

    tracing::debug!(resource = %resource, records = records.len(), "Fetched full listing");
    Ok(records)
}

fn category_map(records: &[CatalogRecord]) -> IdMap {
    records
        .iter()
        .filter_map(|record| record.name().map(|name| (name.to_string(), record.id)))
        .collect()
}

fn product_map(records: &[CatalogRecord]) -> IdMap {
    let mut map = IdMap::new();
    for record in records {
        if let Some(name) = record.name() {
            map.insert(name.to_string(), record.id);
        }
        if let Some(sku) = record.sku() {
            map.insert(sku.to_string(), record.id);
        }
    }
    map
}
