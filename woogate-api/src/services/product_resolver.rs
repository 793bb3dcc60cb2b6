//! Product Resolver
//!
//! Maps a product name or SKU to its upstream ID in two phases: an exact
//! SKU filter first, then a relevance search on the name.

use woogate_core::{
    names_match, select_candidate, CatalogId, CatalogRecord, EntityKind, ResolveError,
    ResolveResult, Resource, SearchQuery, Selection,
};

use super::{record_resolution, CatalogServices};

/// Maximum candidates requested from the name search.
pub const PRODUCT_SEARCH_LIMIT: u32 = 5;

/// Resolve a product name or SKU to its ID.
///
/// Accepts `&str` or `Option<&str>`; a missing or empty identifier fails
/// before the cache or the store is consulted.
pub async fn resolve_product_id<'a>(
    services: &CatalogServices,
    identifier: impl Into<Option<&'a str>>,
) -> ResolveResult<CatalogId> {
    let kind = EntityKind::Product;

    let identifier = match identifier.into().filter(|s| !s.is_empty()) {
        Some(identifier) => identifier,
        None => {
            let err = ResolveError::invalid_input("Product identifier (name or SKU) is required");
            record_resolution(kind, err.outcome_label());
            return Err(err);
        }
    };

    if let Some(id) = services.product_cache().lookup(identifier) {
        tracing::debug!(identifier = %identifier, product_id = id, "Product cache hit");
        record_resolution(kind, "cache_hit");
        return Ok(id);
    }

    let result = search_product(services, identifier).await;
    match &result {
        Ok(id) => {
            tracing::info!(identifier = %identifier, product_id = *id, "Resolved product");
            record_resolution(kind, "resolved");
        }
        Err(err) => {
            tracing::warn!(identifier = %identifier, error = %err, "Product resolution failed");
            record_resolution(kind, err.outcome_label());
        }
    }
    result
}

async fn search_product(services: &CatalogServices, identifier: &str) -> ResolveResult<CatalogId> {
    let upstream_error = |source| ResolveError::upstream(EntityKind::Product, identifier, source);

    // Phase A: SKU filter.
    let by_sku = services
        .upstream()
        .search(Resource::Products, &SearchQuery::sku(identifier))
        .await
        .map_err(upstream_error)?;

    if let Some(first) = by_sku.first() {
        if by_sku.len() > 1 {
            tracing::warn!(
                sku = %identifier,
                matches = by_sku.len(),
                product_id = first.id,
                "SKU matched several products, using the first"
            );
        }
        remember(services, first, identifier);
        return Ok(first.id);
    }

    // Phase B: name search.
    tracing::debug!(identifier = %identifier, "No SKU match, searching by name");
    let query = SearchQuery::text(identifier).with_limit(PRODUCT_SEARCH_LIMIT);
    let candidates = services
        .upstream()
        .search(Resource::Products, &query)
        .await
        .map_err(upstream_error)?;

    let chosen = match select_candidate(&candidates, |c| names_match(&c.name, identifier)) {
        Selection::Empty => return Err(ResolveError::not_found(EntityKind::Product, identifier)),
        Selection::Exact(found) => found,
        Selection::SoleCandidate(found) => {
            tracing::warn!(
                identifier = %identifier,
                matched = %found.name,
                product_id = found.id,
                "No exact product name match, accepting the only candidate"
            );
            found
        }
        Selection::Ambiguous(all) => {
            return Err(ResolveError::ambiguous(
                EntityKind::Product,
                identifier,
                all.iter().map(CatalogRecord::candidate).collect(),
            ))
        }
    };

    remember(services, chosen, identifier);
    Ok(chosen.id)
}

/// Cache every key the product is reachable by: SKU, name and the
/// identifier that was asked for.
fn remember(services: &CatalogServices, product: &CatalogRecord, identifier: &str) {
    services
        .product_cache()
        .record(product_keys(product, identifier));
    services.observe_cache_size(EntityKind::Product);
}

fn product_keys(product: &CatalogRecord, identifier: &str) -> Vec<(String, CatalogId)> {
    let mut keys: Vec<(String, CatalogId)> = Vec::with_capacity(3);
    for key in [product.sku(), product.name(), Some(identifier)].into_iter().flatten() {
        if !keys.iter().any(|(k, _)| k == key) {
            keys.push((key.to_string(), product.id));
        }
    }
    keys
}
