//! Category Resolver
//!
//! Maps a category name to its upstream ID, consulting the category cache
//! first and the store's category search second.

use woogate_core::{
    names_match, select_candidate, CatalogId, CatalogRecord, EntityKind, ResolveError,
    ResolveResult, Resource, SearchQuery, Selection,
};

use super::{record_resolution, CatalogServices};

/// Maximum candidates requested from the category search.
pub const CATEGORY_SEARCH_LIMIT: u32 = 5;

/// Resolve a category name to its ID.
///
/// # Errors
/// - `InvalidInput` for an empty name
/// - `NotFound` when the search returns nothing
/// - `Ambiguous` when several candidates match and none exactly
/// - `Upstream` when the search itself fails
pub async fn resolve_category_id(services: &CatalogServices, name: &str) -> ResolveResult<CatalogId> {
    let kind = EntityKind::Category;

    if name.is_empty() {
        let err = ResolveError::invalid_input("Category name must not be empty");
        record_resolution(kind, err.outcome_label());
        return Err(err);
    }

    if let Some(id) = services.category_cache().lookup(name) {
        tracing::debug!(category = %name, category_id = id, "Category cache hit");
        record_resolution(kind, "cache_hit");
        return Ok(id);
    }

    let result = search_category(services, name).await;
    match &result {
        Ok(id) => {
            tracing::info!(category = %name, category_id = *id, "Resolved category");
            record_resolution(kind, "resolved");
        }
        Err(err) => {
            tracing::warn!(category = %name, error = %err, "Category resolution failed");
            record_resolution(kind, err.outcome_label());
        }
    }
    result
}

async fn search_category(services: &CatalogServices, name: &str) -> ResolveResult<CatalogId> {
    tracing::debug!(category = %name, "Category not cached, searching upstream");

    let query = SearchQuery::text(name).with_limit(CATEGORY_SEARCH_LIMIT);
    let candidates = services
        .upstream()
        .search(Resource::Categories, &query)
        .await
        .map_err(|source| ResolveError::upstream(EntityKind::Category, name, source))?;

    let chosen = match select_candidate(&candidates, |c| names_match(&c.name, name)) {
        Selection::Empty => return Err(ResolveError::not_found(EntityKind::Category, name)),
        Selection::Exact(found) => found,
        Selection::SoleCandidate(found) => {
            tracing::warn!(
                category = %name,
                matched = %found.name,
                category_id = found.id,
                "No exact category match, accepting the only candidate"
            );
            found
        }
        Selection::Ambiguous(all) => {
            return Err(ResolveError::ambiguous(
                EntityKind::Category,
                name,
                all.iter().map(CatalogRecord::candidate).collect(),
            ))
        }
    };

    let mut entries = vec![(name.to_string(), chosen.id)];
    if let Some(canonical) = chosen.name().filter(|n| *n != name) {
        entries.push((canonical.to_string(), chosen.id));
    }
    services.category_cache().record(entries);
    services.observe_cache_size(EntityKind::Category);

    Ok(chosen.id)
}
