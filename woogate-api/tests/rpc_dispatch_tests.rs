//! End-to-end JSON-RPC tests through the full router.


use axum::http::StatusCode;
use secrecy::SecretString;
use serde_json::json;
use test_support::*;
use woogate_api::{create_api_router, ApiKeyState, AppState, ROOT_BANNER};
use woogate_core::{Resource, UpstreamError};
use woogate_test_utils::fixtures::*;
use woogate_test_utils::Op;

// ============================================================================
// ENVELOPE AND AUTHENTICATION
// ============================================================================

#[tokio::test]
async fn root_serves_banner() -> Result<(), String> {
    let gateway = TestGateway::new(sample_catalog());

    let (status, body) = send_text(gateway.router(), get_request("/")).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, ROOT_BANNER);
    Ok(())
}

#[tokio::test]
async fn missing_api_key_is_rejected_with_request_id() -> Result<(), String> {
    let gateway = TestGateway::new(sample_catalog());
    let body = json!({"jsonrpc": "2.0", "method": "get_product", "params": {"productId": 42}, "id": 7});

    let (status, response) =
        send_json(gateway.router(), raw_rpc_request(body.to_string(), None)).await?;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(response["error"]["code"], -32000);
    assert_eq!(
        response["error"]["message"],
        "Unauthorized: Invalid or missing API Key"
    );
    assert_eq!(response["id"], 7);
    assert_eq!(gateway.catalog.total_calls(), 0);
    Ok(())
}

#[tokio::test]
async fn wrong_api_key_is_rejected() -> Result<(), String> {
    let gateway = TestGateway::new(sample_catalog());
    let body = json!({"jsonrpc": "2.0", "method": "get_product", "id": "abc"});

    let (status, response) =
        send_json(gateway.router(), raw_rpc_request(body.to_string(), Some("nope"))).await?;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(response["id"], "abc");
    Ok(())
}

#[tokio::test]
async fn unconfigured_api_key_is_a_server_error() -> Result<(), String> {
    let gateway = TestGateway::new(sample_catalog());
    let router = create_api_router(
        AppState::new(gateway.services.clone()),
        ApiKeyState::new(SecretString::new("".into())),
    );

    let (status, response) = send_json(router, rpc_request("get_product", json!({}), json!(1))).await?;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response["error"]["code"], -32001);
    assert_eq!(
        response["error"]["message"],
        "Server configuration error: API Key not set"
    );
    Ok(())
}

#[tokio::test]
async fn malformed_body_is_a_parse_error() -> Result<(), String> {
    let gateway = TestGateway::new(sample_catalog());

    let (status, response) = send_json(
        gateway.router(),
        raw_rpc_request("{\"jsonrpc\": \"2.0\", ", Some(TEST_API_KEY)),
    )
    .await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"]["code"], -32700);
    assert_eq!(response["id"], json!(null));
    Ok(())
}

#[tokio::test]
async fn wrong_protocol_version_is_invalid_request() -> Result<(), String> {
    let gateway = TestGateway::new(sample_catalog());
    let body = json!({"jsonrpc": "1.0", "method": "get_product", "id": 3});

    let (status, response) = send_json(
        gateway.router(),
        raw_rpc_request(body.to_string(), Some(TEST_API_KEY)),
    )
    .await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"]["code"], -32600);
    assert_eq!(response["id"], 3);
    Ok(())
}

#[tokio::test]
async fn unsupported_method_is_method_not_found() -> Result<(), String> {
    let gateway = TestGateway::new(sample_catalog());

    let (status, response) = send_json(
        gateway.router(),
        rpc_request("delete_everything", json!({}), json!(9)),
    )
    .await?;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(response["jsonrpc"], "2.0");
    assert_eq!(response["error"]["code"], -32601);
    assert_eq!(response["error"]["message"], "Unsupported method: delete_everything");
    assert_eq!(response["id"], 9);
    assert!(response.get("result").is_none());
    Ok(())
}

#[tokio::test]
async fn non_object_params_are_invalid() -> Result<(), String> {
    let gateway = TestGateway::new(sample_catalog());

    let (status, response) =
        send_json(gateway.router(), rpc_request("get_products", json!([1, 2]), json!(1))).await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"]["code"], -32602);
    assert_eq!(response["error"]["message"], "params must be an object");
    Ok(())
}

// ============================================================================
// get_products
// ============================================================================

#[tokio::test]
async fn get_products_resolves_category_name() -> Result<(), String> {
    let gateway = TestGateway::new(sample_catalog());

    let (status, response) = send_json(
        gateway.router(),
        rpc_request("get_products", json!({"category_name": "Widgets"}), json!(1)),
    )
    .await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["result"][0]["id"], 42);
    assert_eq!(response["result"].as_array().map(Vec::len), Some(1));

    let calls = gateway.catalog.list_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].page, 1);
    assert_eq!(calls[0].per_page, 10);
    assert_eq!(calls[0].params.get("category").map(String::as_str), Some("7"));
    assert_eq!(gateway.services.category_cache().lookup("Widgets"), Some(7));
    Ok(())
}

#[tokio::test]
async fn get_products_category_id_wins_over_name() -> Result<(), String> {
    let gateway = TestGateway::new(sample_catalog());

    let (status, _) = send_json(
        gateway.router(),
        rpc_request(
            "get_products",
            json!({"category_id": "1", "category_name": "Widgets"}),
            json!(1),
        ),
    )
    .await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(gateway.catalog.calls(Resource::Categories, Op::Search), 0);
    let calls = gateway.catalog.list_calls();
    assert_eq!(calls[0].params.get("category").map(String::as_str), Some("1"));
    Ok(())
}

#[tokio::test]
async fn get_products_filters_override_paging() -> Result<(), String> {
    let gateway = TestGateway::new(sample_catalog());

    let (status, response) = send_json(
        gateway.router(),
        rpc_request(
            "get_products",
            json!({
                "page": 1,
                "perPage": 20,
                "filters": {"page": 2, "per_page": 1, "orderby": "title", "include": [43, 44]}
            }),
            json!(1),
        ),
    )
    .await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["result"][0]["id"], 43);

    let call = &gateway.catalog.list_calls()[0];
    assert_eq!((call.page, call.per_page), (2, 1));
    assert_eq!(call.params.get("orderby").map(String::as_str), Some("title"));
    assert_eq!(call.params.get("include").map(String::as_str), Some("43,44"));
    Ok(())
}

#[tokio::test]
async fn get_products_unknown_category_id_is_explained() -> Result<(), String> {
    let gateway = TestGateway::new(sample_catalog());

    let (status, response) = send_json(
        gateway.router(),
        rpc_request("get_products", json!({"category_id": 999}), json!(4)),
    )
    .await?;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(response["error"]["code"], -32004);
    assert_eq!(
        response["error"]["message"],
        "Upstream API error (400): Invalid category specified. It might not exist or the ID is incorrect."
    );
    assert_eq!(response["error"]["data"]["code"], "woocommerce_rest_invalid_term");
    Ok(())
}

#[tokio::test]
async fn get_products_unknown_category_name_is_not_found() -> Result<(), String> {
    let gateway = TestGateway::new(sample_catalog());

    let (status, response) = send_json(
        gateway.router(),
        rpc_request("get_products", json!({"category_name": "Garden"}), json!(5)),
    )
    .await?;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(response["error"]["code"], -32002);
    assert_eq!(response["error"]["message"], "Category not found: 'Garden'");
    assert_eq!(gateway.catalog.calls(Resource::Products, Op::List), 0);
    Ok(())
}

#[tokio::test]
async fn get_products_ambiguous_category_lists_candidates() -> Result<(), String> {
    let gateway = TestGateway::new(sample_catalog());

    let (status, response) = send_json(
        gateway.router(),
        rpc_request("get_products", json!({"category_name": "Tools"}), json!(6)),
    )
    .await?;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(response["error"]["code"], -32003);
    assert_eq!(response["error"]["data"]["candidates"][0]["name"], "Hand Tools");
    assert_eq!(response["error"]["data"]["candidates"][1]["id"], 2);
    Ok(())
}

// ============================================================================
// get_product / update_product
// ============================================================================

#[tokio::test]
async fn get_product_by_id_skips_resolution() -> Result<(), String> {
    let gateway = TestGateway::new(sample_catalog());

    let (status, response) =
        send_json(gateway.router(), rpc_request("get_product", json!({"productId": 42}), json!(1))).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["result"]["name"], "ABC Widget");
    assert_eq!(response["result"]["categories"][0]["id"], 7);
    assert_eq!(gateway.catalog.calls(Resource::Products, Op::Search), 0);
    Ok(())
}

#[tokio::test]
async fn get_product_by_sku_and_by_name() -> Result<(), String> {
    let gateway = TestGateway::new(sample_catalog());

    let (_, by_sku) = send_json(
        gateway.router(),
        rpc_request("get_product", json!({"product_sku": "HAM-1"}), json!(1)),
    )
    .await?;
    let (_, by_name) = send_json(
        gateway.router(),
        rpc_request("get_product", json!({"product_name": "Red Hammer"}), json!(2)),
    )
    .await?;

    assert_eq!(by_sku["result"]["id"], 43);
    assert_eq!(by_name["result"]["id"], 44);
    Ok(())
}

#[tokio::test]
async fn get_product_name_wins_over_sku() -> Result<(), String> {
    let gateway = TestGateway::new(sample_catalog());

    let (_, response) = send_json(
        gateway.router(),
        rpc_request(
            "get_product",
            json!({"product_name": "Blue Hammer", "product_sku": "HAM-2"}),
            json!(1),
        ),
    )
    .await?;

    assert_eq!(response["result"]["id"], 43);
    Ok(())
}

#[tokio::test]
async fn get_product_without_identifier_is_invalid_params() -> Result<(), String> {
    let gateway = TestGateway::new(sample_catalog());

    let (status, response) =
        send_json(gateway.router(), rpc_request("get_product", json!({}), json!(1))).await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"]["code"], -32602);
    assert_eq!(
        response["error"]["message"],
        "productId, product_name, or product_sku is required for get_product"
    );
    assert_eq!(gateway.catalog.total_calls(), 0);
    Ok(())
}

#[tokio::test]
async fn get_product_unknown_id_is_not_found() -> Result<(), String> {
    let gateway = TestGateway::new(sample_catalog());

    let (status, response) =
        send_json(gateway.router(), rpc_request("get_product", json!({"productId": 999}), json!(1))).await?;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(response["error"]["code"], -32002);
    Ok(())
}

#[tokio::test]
async fn get_product_ambiguous_name() -> Result<(), String> {
    let gateway = TestGateway::new(sample_catalog());

    let (status, response) = send_json(
        gateway.router(),
        rpc_request("get_product", json!({"product_name": "Hammer"}), json!(1)),
    )
    .await?;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        response["error"]["data"]["candidates"].as_array().map(Vec::len),
        Some(2)
    );
    Ok(())
}

#[tokio::test]
async fn update_product_requires_product_data_before_resolving() -> Result<(), String> {
    let gateway = TestGateway::new(sample_catalog());

    let (status, response) = send_json(
        gateway.router(),
        rpc_request("update_product", json!({"product_sku": "ABC-123"}), json!(1)),
    )
    .await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"]["code"], -32602);
    assert_eq!(
        response["error"]["message"],
        "productData object is required for update_product"
    );
    assert_eq!(gateway.catalog.total_calls(), 0);
    Ok(())
}

#[tokio::test]
async fn update_product_by_sku_sends_data() -> Result<(), String> {
    let gateway = TestGateway::new(sample_catalog());

    let (status, response) = send_json(
        gateway.router(),
        rpc_request(
            "update_product",
            json!({"product_sku": "ABC-123", "productData": {"regular_price": "9.99"}}),
            json!("u1"),
        ),
    )
    .await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["id"], "u1");
    assert_eq!(response["result"]["regular_price"], "9.99");
    let stored = gateway
        .catalog
        .record(Resource::Products, 42)
        .ok_or("product 42 missing")?;
    assert_eq!(stored.extra["regular_price"], "9.99");
    Ok(())
}

// ============================================================================
// REFRESH METHODS
// ============================================================================

#[tokio::test]
async fn refresh_category_cache_reports_count() -> Result<(), String> {
    let gateway = TestGateway::new(sample_catalog());

    let (status, response) = send_json(
        gateway.router(),
        rpc_request("refresh_category_cache", json!({}), json!(1)),
    )
    .await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["result"]["status"], "success");
    assert_eq!(
        response["result"]["message"],
        "Category cache refreshed successfully. In-memory cache has 3 categories."
    );
    assert_eq!(response["result"]["count"], 3);
    Ok(())
}

#[tokio::test]
async fn refresh_product_map_reports_counts() -> Result<(), String> {
    let gateway = TestGateway::new(sample_catalog());

    let (status, response) = send_json(
        gateway.router(),
        rpc_request("refresh_product_map", json!(null), json!(1)),
    )
    .await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["result"]["productCount"], 4);
    assert_eq!(response["result"]["mappingCount"], 7);
    Ok(())
}

#[tokio::test]
async fn refresh_failure_is_an_upstream_error() -> Result<(), String> {
    let gateway = TestGateway::new(sample_catalog());
    gateway.catalog.fail(
        Resource::Categories,
        Op::List,
        UpstreamError::status(503, None, "Service Unavailable"),
    );

    let (status, response) = send_json(
        gateway.router(),
        rpc_request("refresh_category_cache", json!({}), json!(1)),
    )
    .await?;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(response["error"]["code"], -32004);
    let message = response["error"]["message"].as_str().unwrap_or_default();
    assert!(message.starts_with("Failed to refresh category cache. Reason:"));
    Ok(())
}

// ============================================================================
// HEALTH AND METRICS
// ============================================================================

#[tokio::test]
async fn ping_needs_no_api_key() -> Result<(), String> {
    let gateway = TestGateway::new(sample_catalog());

    let (status, body) = send_text(gateway.router(), get_request("/health/ping")).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "pong");
    Ok(())
}

#[tokio::test]
async fn readiness_reports_cache_state() -> Result<(), String> {
    let gateway = TestGateway::new(sample_catalog());
    send_json(
        gateway.router(),
        rpc_request("refresh_category_cache", json!({}), json!(1)),
    )
    .await?;

    let (status, body) = send_json(gateway.router(), get_request("/health/ready")).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["details"]["upstream"]["status"], "healthy");
    assert_eq!(body["details"]["caches"]["categories"]["entries"], 3);
    assert!(body["details"]["caches"]["categories"]["last_refreshed"].is_string());
    assert!(body["details"]["caches"]["products"].get("last_refreshed").is_none());
    Ok(())
}

#[tokio::test]
async fn readiness_fails_when_upstream_is_down() -> Result<(), String> {
    let gateway = TestGateway::new(sample_catalog());
    gateway
        .catalog
        .fail(Resource::Categories, Op::List, UpstreamError::transport("connection refused"));

    let (status, body) = send_json(gateway.router(), get_request("/health/ready")).await?;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "unhealthy");
    let error = body["details"]["upstream"]["error"].as_str().unwrap_or_default();
    assert!(error.contains("connection refused"));
    Ok(())
}

#[tokio::test]
async fn metrics_expose_rpc_calls() -> Result<(), String> {
    let gateway = TestGateway::new(sample_catalog());
    send_json(
        gateway.router(),
        rpc_request("get_product", json!({"productId": 42}), json!(1)),
    )
    .await?;

    let (status, body) = send_text(gateway.router(), get_request("/metrics")).await?;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("woogate_rpc_calls_total"));
    assert!(body.contains("method=\"get_product\""));
    Ok(())
}
