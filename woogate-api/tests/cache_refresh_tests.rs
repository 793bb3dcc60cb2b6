//! Bulk cache refresh against a paginated fake store.


use serde_json::json;
use test_support::*;
use woogate_api::{
    refresh_category_cache, refresh_product_map, resolve_category_id, resolve_product_id,
    CATEGORY_PAGE_SIZE, PRODUCT_PAGE_SIZE,
};
use woogate_core::{CatalogRecord, Resource, UpstreamError};
use woogate_storage::{CATEGORY_MAP_FILE, PRODUCT_MAP_FILE};
use woogate_test_utils::fixtures::*;
use woogate_test_utils::{FakeCatalog, Op};

#[tokio::test]
async fn category_refresh_walks_every_page() -> Result<(), String> {
    let gateway = TestGateway::new(FakeCatalog::new().with_categories(numbered_categories(250)));

    let outcome = refresh_category_cache(&gateway.services)
        .await
        .map_err(|e| e.to_string())?;

    assert_eq!(outcome.count, 250);
    let cache = gateway.services.category_cache();
    assert_eq!(cache.lookup("Category 001"), Some(1));
    assert_eq!(cache.lookup("Category 250"), Some(250));

    let mut calls = gateway.catalog.list_calls();
    calls.sort_by_key(|c| c.page);
    let pages: Vec<u32> = calls.iter().map(|c| c.page).collect();
    assert_eq!(pages, vec![1, 2, 3]);
    for call in &calls {
        assert_eq!(call.resource, Resource::Categories);
        assert_eq!(call.per_page, CATEGORY_PAGE_SIZE);
        assert_eq!(call.params.get("orderby").map(String::as_str), Some("name"));
        assert_eq!(call.params.get("order").map(String::as_str), Some("asc"));
    }
    Ok(())
}

#[tokio::test]
async fn category_refresh_replaces_previous_entries() -> Result<(), String> {
    let gateway = TestGateway::new(sample_catalog());
    resolve_category_id(&gateway.services, "Widgets")
        .await
        .map_err(|e| e.to_string())?;

    gateway
        .catalog
        .set_records(Resource::Categories, vec![category(8, "Gadgets")]);
    refresh_category_cache(&gateway.services)
        .await
        .map_err(|e| e.to_string())?;

    assert_eq!(
        read_map(&gateway.dir.path().join(CATEGORY_MAP_FILE)),
        json!({"Gadgets": 8})
    );
    assert_eq!(gateway.services.category_cache().lookup("Widgets"), None);
    Ok(())
}

#[tokio::test]
async fn empty_store_refreshes_to_empty_map() -> Result<(), String> {
    let gateway = TestGateway::new(FakeCatalog::new());

    let outcome = refresh_category_cache(&gateway.services)
        .await
        .map_err(|e| e.to_string())?;

    assert_eq!(outcome.count, 0);
    assert_eq!(gateway.catalog.calls(Resource::Categories, Op::List), 1);
    assert_eq!(read_map(&gateway.dir.path().join(CATEGORY_MAP_FILE)), json!({}));
    Ok(())
}

#[tokio::test]
async fn product_refresh_maps_names_and_skus() -> Result<(), String> {
    let gateway = TestGateway::new(sample_catalog());

    let outcome = refresh_product_map(&gateway.services)
        .await
        .map_err(|e| e.to_string())?;

    // Four products, three of which carry a SKU.
    assert_eq!(outcome.product_count, 4);
    assert_eq!(outcome.mapping_count, 7);
    assert_eq!(
        read_map(&gateway.dir.path().join(PRODUCT_MAP_FILE)),
        json!({
            "ABC Widget": 42, "ABC-123": 42,
            "Blue Hammer": 43, "HAM-1": 43,
            "Red Hammer": 44, "HAM-2": 44,
            "Gift Card": 45
        })
    );

    let calls = gateway.catalog.list_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].per_page, PRODUCT_PAGE_SIZE);
    assert_eq!(calls[0].params.get("status").map(String::as_str), Some("any"));
    Ok(())
}

#[tokio::test]
async fn product_refresh_keeps_page_order() -> Result<(), String> {
    let mut products = numbered_products(120);
    // A later page reuses an earlier name; the later record wins.
    products.push(CatalogRecord::new(2000, "Product 001"));
    let gateway = TestGateway::new(FakeCatalog::new().with_products(products));

    let outcome = refresh_product_map(&gateway.services)
        .await
        .map_err(|e| e.to_string())?;

    assert_eq!(outcome.product_count, 121);
    assert_eq!(gateway.catalog.calls(Resource::Products, Op::List), 3);

    let cache = gateway.services.product_cache();
    assert_eq!(cache.lookup("Product 001"), Some(2000));
    assert_eq!(cache.lookup("SKU-001"), Some(1001));
    assert_eq!(cache.lookup("SKU-120"), Some(1120));
    Ok(())
}

#[tokio::test]
async fn refreshed_entries_resolve_without_searching() -> Result<(), String> {
    let gateway = TestGateway::new(sample_catalog());
    refresh_category_cache(&gateway.services)
        .await
        .map_err(|e| e.to_string())?;
    refresh_product_map(&gateway.services)
        .await
        .map_err(|e| e.to_string())?;

    let category = resolve_category_id(&gateway.services, "Power Tools")
        .await
        .map_err(|e| e.to_string())?;
    let product = resolve_product_id(&gateway.services, "HAM-1")
        .await
        .map_err(|e| e.to_string())?;

    assert_eq!((category, product), (2, 43));
    assert_eq!(gateway.catalog.calls(Resource::Categories, Op::Search), 0);
    assert_eq!(gateway.catalog.calls(Resource::Products, Op::Search), 0);
    Ok(())
}

#[tokio::test]
async fn failed_page_leaves_previous_map_in_place() -> Result<(), String> {
    let gateway = TestGateway::new(FakeCatalog::new().with_categories(numbered_categories(30)));
    refresh_category_cache(&gateway.services)
        .await
        .map_err(|e| e.to_string())?;
    let before = read_map(&gateway.dir.path().join(CATEGORY_MAP_FILE));

    gateway
        .catalog
        .set_records(Resource::Categories, numbered_categories(250));
    gateway.catalog.fail_list_page(
        Resource::Categories,
        3,
        UpstreamError::status(500, None, "Internal Server Error"),
    );

    let result = refresh_category_cache(&gateway.services).await;

    assert!(matches!(result, Err(UpstreamError::Status { status: 500, .. })));
    assert_eq!(gateway.services.category_cache().len(), 30);
    assert_eq!(gateway.services.category_cache().lookup("Category 200"), None);
    assert_eq!(read_map(&gateway.dir.path().join(CATEGORY_MAP_FILE)), before);
    Ok(())
}

#[tokio::test]
async fn failed_refresh_does_not_mark_refresh_time() {
    let gateway = TestGateway::new(sample_catalog());
    gateway
        .catalog
        .fail(Resource::Products, Op::List, UpstreamError::transport("connection reset"));

    assert!(refresh_product_map(&gateway.services).await.is_err());
    assert!(gateway.services.last_refresh().products.is_none());
    assert!(!gateway.dir.path().join(PRODUCT_MAP_FILE).exists());
}

#[tokio::test]
async fn successful_refresh_records_time() -> Result<(), String> {
    let gateway = TestGateway::new(sample_catalog());

    let outcome = refresh_category_cache(&gateway.services)
        .await
        .map_err(|e| e.to_string())?;

    let times = gateway.services.last_refresh();
    assert_eq!(times.categories, Some(outcome.refreshed_at));
    assert!(times.products.is_none());
    Ok(())
}

#[tokio::test]
async fn refreshed_map_survives_restart() -> Result<(), String> {
    let gateway = TestGateway::new(sample_catalog());
    refresh_product_map(&gateway.services)
        .await
        .map_err(|e| e.to_string())?;

    let restarted = gateway.restarted();
    assert_eq!(restarted.product_cache().len(), 7);
    assert_eq!(restarted.product_cache().lookup("ABC-123"), Some(42));
    Ok(())
}
