//! woogate Test Utilities
//!
//! Shared test infrastructure for the woogate workspace:
//! - [`FakeCatalog`]: an in-memory upstream store with scripted searches,
//!   failure injection and per-operation call counters
//! - Proptest generators for identifier maps and catalog records
//! - Fixtures for common catalog scenarios
//! - Assertions for resolution outcomes

pub use woogate_core::{
    CatalogId, CatalogRecord, CatalogUpstream, EntityKind, IdMap, ListPage, ListParams, Resource,
    ResolveError, ResolveResult, SearchQuery, UpstreamError, UpstreamResult,
};

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde_json::Value as JsonValue;

// ============================================================================
// FAKE UPSTREAM
// ============================================================================

/// Upstream operations, used to count calls and target injected failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Search,
    Get,
    Put,
    List,
}

/// One recorded `list` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListCall {
    pub resource: Resource,
    pub page: u32,
    pub per_page: u32,
    pub params: ListParams,
}

type SearchKey = (Resource, Option<String>, Option<String>);

#[derive(Debug, Default)]
struct FakeState {
    categories: Vec<CatalogRecord>,
    products: Vec<CatalogRecord>,
    scripted: HashMap<SearchKey, Vec<CatalogRecord>>,
    failures: HashMap<(Resource, Op), UpstreamError>,
    page_failures: HashMap<(Resource, u32), UpstreamError>,
    calls: HashMap<(Resource, Op), usize>,
    list_calls: Vec<ListCall>,
}

/// In-memory stand-in for the upstream store.
///
/// Searches return scripted results when a script matches the exact query,
/// otherwise they are answered from the stored records: `sku` is an exact
/// filter, `search` a case-insensitive substring match on the name. Listings
/// page through the stored records in insertion order.
#[derive(Debug, Default)]
pub struct FakeCatalog {
    state: Mutex<FakeState>,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_categories(self, records: Vec<CatalogRecord>) -> Self {
        self.lock().categories = records;
        self
    }

    pub fn with_products(self, records: Vec<CatalogRecord>) -> Self {
        self.lock().products = records;
        self
    }

    /// Answer exactly this query with `results`, regardless of stored records.
    pub fn script_search(&self, resource: Resource, query: &SearchQuery, results: Vec<CatalogRecord>) {
        self.lock()
            .scripted
            .insert(search_key(resource, query), results);
    }

    /// Fail every call of `op` on `resource` with `error`.
    pub fn fail(&self, resource: Resource, op: Op, error: UpstreamError) {
        self.lock().failures.insert((resource, op), error);
    }

    /// Fail listing one specific page.
    pub fn fail_list_page(&self, resource: Resource, page: u32, error: UpstreamError) {
        self.lock().page_failures.insert((resource, page), error);
    }

    /// Remove all injected failures.
    pub fn heal(&self) {
        let mut state = self.lock();
        state.failures.clear();
        state.page_failures.clear();
    }

    /// Replace the stored records of a collection.
    pub fn set_records(&self, resource: Resource, records: Vec<CatalogRecord>) {
        *self.lock().records_mut(resource) = records;
    }

    /// Number of calls of `op` on `resource` so far.
    pub fn calls(&self, resource: Resource, op: Op) -> usize {
        self.lock().calls.get(&(resource, op)).copied().unwrap_or(0)
    }

    /// Number of calls of any kind so far.
    pub fn total_calls(&self) -> usize {
        self.lock().calls.values().sum()
    }

    /// Every `list` call so far, in call order.
    pub fn list_calls(&self) -> Vec<ListCall> {
        self.lock().list_calls.clone()
    }

    /// Current stored record, if any.
    pub fn record(&self, resource: Resource, id: CatalogId) -> Option<CatalogRecord> {
        self.lock()
            .records(resource)
            .iter()
            .find(|r| r.id == id)
            .cloned()
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn begin(&self, resource: Resource, op: Op) -> Result<MutexGuard<'_, FakeState>, UpstreamError> {
        let mut state = self.lock();
        *state.calls.entry((resource, op)).or_insert(0) += 1;
        if let Some(err) = state.failures.get(&(resource, op)).cloned() {
            return Err(err);
        }
        Ok(state)
    }
}

impl FakeState {
    fn records(&self, resource: Resource) -> &Vec<CatalogRecord> {
        match resource {
            Resource::Categories => &self.categories,
            Resource::Products => &self.products,
        }
    }

    fn records_mut(&mut self, resource: Resource) -> &mut Vec<CatalogRecord> {
        match resource {
            Resource::Categories => &mut self.categories,
            Resource::Products => &mut self.products,
        }
    }

    /// Apply the `category` listing filter the way the store does: unknown
    /// terms are rejected.
    fn filter_by_category<'a>(
        &'a self,
        records: &'a [CatalogRecord],
        params: &ListParams,
    ) -> UpstreamResult<Vec<&'a CatalogRecord>> {
        let Some(raw) = params.get("category") else {
            return Ok(records.iter().collect());
        };
        let known = raw
            .parse::<CatalogId>()
            .ok()
            .filter(|id| self.categories.iter().any(|c| c.id == *id));
        let Some(category_id) = known else {
            return Err(UpstreamError::status(
                400,
                Some("woocommerce_rest_invalid_term".to_string()),
                "Invalid term.",
            ));
        };
        Ok(records
            .iter()
            .filter(|r| in_category(r, category_id))
            .collect())
    }
}

fn search_key(resource: Resource, query: &SearchQuery) -> SearchKey {
    (resource, query.search.clone(), query.sku.clone())
}

fn in_category(record: &CatalogRecord, category_id: CatalogId) -> bool {
    record
        .extra
        .get("categories")
        .and_then(JsonValue::as_array)
        .map(|cats| {
            cats.iter()
                .any(|c| c.get("id").and_then(JsonValue::as_u64) == Some(category_id))
        })
        .unwrap_or(false)
}

#[async_trait]
impl CatalogUpstream for FakeCatalog {
    async fn search(
        &self,
        resource: Resource,
        query: &SearchQuery,
    ) -> UpstreamResult<Vec<CatalogRecord>> {
        let state = self.begin(resource, Op::Search)?;

        let mut results = match state.scripted.get(&search_key(resource, query)) {
            Some(scripted) => scripted.clone(),
            None => state
                .records(resource)
                .iter()
                .filter(|r| match &query.sku {
                    Some(sku) => r.sku() == Some(sku.as_str()),
                    None => true,
                })
                .filter(|r| match &query.search {
                    Some(text) => r.name.to_lowercase().contains(&text.to_lowercase()),
                    None => true,
                })
                .cloned()
                .collect(),
        };

        if let Some(limit) = query.limit {
            results.truncate(limit as usize);
        }
        Ok(results)
    }

    async fn get(&self, resource: Resource, id: CatalogId) -> UpstreamResult<CatalogRecord> {
        let state = self.begin(resource, Op::Get)?;
        state
            .records(resource)
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| invalid_id(resource))
    }

    async fn put(
        &self,
        resource: Resource,
        id: CatalogId,
        body: &JsonValue,
    ) -> UpstreamResult<CatalogRecord> {
        let mut state = self.begin(resource, Op::Put)?;
        let record = state
            .records_mut(resource)
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| invalid_id(resource))?;

        if let Some(fields) = body.as_object() {
            for (key, value) in fields {
                match (key.as_str(), value) {
                    ("id", _) => {}
                    ("name", JsonValue::String(name)) => record.name = name.clone(),
                    ("sku", JsonValue::String(sku)) => record.sku = Some(sku.clone()),
                    _ => {
                        record.extra.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        Ok(record.clone())
    }

    async fn list(
        &self,
        resource: Resource,
        page: u32,
        per_page: u32,
        params: &ListParams,
    ) -> UpstreamResult<ListPage> {
        let mut state = self.begin(resource, Op::List)?;
        state.list_calls.push(ListCall {
            resource,
            page,
            per_page,
            params: params.clone(),
        });
        if let Some(err) = state.page_failures.get(&(resource, page)) {
            return Err(err.clone());
        }

        let filtered = state.filter_by_category(state.records(resource), params)?;
        let per_page = per_page.max(1) as usize;
        let total_pages = filtered.len().div_ceil(per_page).max(1) as u32;
        let start = (page.max(1) as usize - 1) * per_page;
        let records = filtered
            .into_iter()
            .skip(start)
            .take(per_page)
            .cloned()
            .collect();

        Ok(ListPage {
            records,
            total_pages,
        })
    }
}

fn invalid_id(resource: Resource) -> UpstreamError {
    let code = match resource {
        Resource::Categories => "woocommerce_rest_term_invalid",
        Resource::Products => "woocommerce_rest_product_invalid_id",
    };
    UpstreamError::status(404, Some(code.to_string()), "Invalid ID.")
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for identifier maps and catalog records.

    use super::*;
    use proptest::prelude::*;

    /// A lookup key: category/product names and SKUs, including spaces,
    /// punctuation and non-ASCII text.
    pub fn arb_lookup_key() -> impl Strategy<Value = String> {
        prop_oneof![
            "[A-Za-z][A-Za-z0-9 &'-]{0,24}",
            "[A-Z]{2,4}-[0-9]{1,6}",
            "\\PC{1,16}",
        ]
    }

    pub fn arb_catalog_id() -> impl Strategy<Value = CatalogId> {
        1u64..1_000_000
    }

    /// Generate an identifier map, possibly empty.
    pub fn arb_id_map() -> impl Strategy<Value = IdMap> {
        prop::collection::btree_map(arb_lookup_key(), arb_catalog_id(), 0..32)
    }

    /// Generate a product record with an optional SKU.
    pub fn arb_product() -> impl Strategy<Value = CatalogRecord> {
        (
            arb_catalog_id(),
            "[A-Za-z][A-Za-z0-9 ]{0,20}",
            proptest::option::of("[A-Z]{2,4}-[0-9]{1,6}"),
        )
            .prop_map(|(id, name, sku)| {
                let record = CatalogRecord::new(id, name);
                match sku {
                    Some(sku) => record.with_sku(sku),
                    None => record,
                }
            })
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built records and catalogs for common scenarios.

    use super::*;
    use serde_json::json;

    pub fn category(id: CatalogId, name: &str) -> CatalogRecord {
        CatalogRecord::new(id, name)
    }

    pub fn product(id: CatalogId, name: &str, sku: &str) -> CatalogRecord {
        CatalogRecord::new(id, name).with_sku(sku)
    }

    /// A product assigned to one category, the way the store embeds it.
    pub fn product_in(id: CatalogId, name: &str, sku: &str, category_id: CatalogId) -> CatalogRecord {
        let mut record = product(id, name, sku);
        record
            .extra
            .insert("categories".to_string(), json!([{ "id": category_id }]));
        record
    }

    /// `count` categories named `Category 001`, `Category 002`, ...
    pub fn numbered_categories(count: u64) -> Vec<CatalogRecord> {
        (1..=count)
            .map(|i| category(i, &format!("Category {i:03}")))
            .collect()
    }

    /// `count` products named `Product 001` with SKUs `SKU-001`, ...
    pub fn numbered_products(count: u64) -> Vec<CatalogRecord> {
        (1..=count)
            .map(|i| product(1000 + i, &format!("Product {i:03}"), &format!("SKU-{i:03}")))
            .collect()
    }

    /// A small store: two tool categories, widgets, and a few products.
    pub fn sample_catalog() -> FakeCatalog {
        FakeCatalog::new()
            .with_categories(vec![
                category(1, "Hand Tools"),
                category(2, "Power Tools"),
                category(7, "Widgets"),
            ])
            .with_products(vec![
                product_in(42, "ABC Widget", "ABC-123", 7),
                product_in(43, "Blue Hammer", "HAM-1", 1),
                product_in(44, "Red Hammer", "HAM-2", 1),
                CatalogRecord::new(45, "Gift Card"),
            ])
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions for resolution outcomes.

    use super::*;
    use woogate_core::Candidate;

    #[track_caller]
    pub fn assert_invalid_input<T: std::fmt::Debug>(result: &ResolveResult<T>) {
        match result {
            Err(ResolveError::InvalidInput { .. }) => {}
            other => panic!("Expected InvalidInput, got: {:?}", other),
        }
    }

    #[track_caller]
    pub fn assert_not_found<T: std::fmt::Debug>(result: &ResolveResult<T>, expected: EntityKind) {
        match result {
            Err(ResolveError::NotFound { kind, .. }) => {
                assert_eq!(*kind, expected, "Wrong entity kind in NotFound error");
            }
            other => panic!("Expected NotFound for {:?}, got: {:?}", expected, other),
        }
    }

    /// Assert an Ambiguous error and return its candidates.
    #[track_caller]
    pub fn assert_ambiguous<T: std::fmt::Debug>(result: &ResolveResult<T>) -> Vec<Candidate> {
        match result {
            Err(ResolveError::Ambiguous { candidates, .. }) => candidates.clone(),
            other => panic!("Expected Ambiguous, got: {:?}", other),
        }
    }

    #[track_caller]
    pub fn assert_upstream_error<T: std::fmt::Debug>(result: &ResolveResult<T>) {
        match result {
            Err(ResolveError::Upstream { .. }) => {}
            other => panic!("Expected Upstream error, got: {:?}", other),
        }
    }
}
