//! woogate Server Entry Point
//!
//! Loads configuration from the environment, opens the identifier caches
//! and starts the Axum HTTP server.

use std::sync::Arc;

use axum::Router;
use woogate_api::telemetry::{init_tracing, TelemetryConfig};
use woogate_api::{
    create_api_router, ApiError, ApiKeyState, ApiResult, AppState, CatalogServices,
    GatewayConfig, WooCommerceClient,
};

#[tokio::main]
async fn main() -> ApiResult<()> {
    let config = GatewayConfig::from_env()?;
    init_tracing(&TelemetryConfig::from_gateway(&config))?;

    let client = WooCommerceClient::from_config(&config).map_err(|e| {
        ApiError::internal_error(format!("Failed to initialize WooCommerce client: {}", e))
    })?;
    tracing::info!(base_url = %client.base_url(), "WooCommerce client ready");

    let services = CatalogServices::open(
        Arc::new(client),
        config.category_map_path(),
        config.product_map_path(),
    )
    .with_refresh_concurrency(config.refresh_concurrency);
    tracing::info!(
        category_map = %services.category_cache().store().path().display(),
        product_map = %services.product_cache().store().path().display(),
        categories = services.category_cache().len(),
        products = services.product_cache().len(),
        "Identifier caches loaded"
    );

    let api_key = ApiKeyState::new(config.api_key.clone());
    if !api_key.is_configured() {
        tracing::warn!("MCP_API_KEY is not set; every RPC call will be rejected");
    }

    let state = AppState::new(Arc::new(services));
    let app: Router = create_api_router(state, api_key);

    let addr = config.bind_addr()?;
    tracing::info!(%addr, "Starting woogate server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to bind {}: {}", addr, e)))?;

    let server = axum::serve(listener, app);
    tokio::select! {
        result = server => {
            result.map_err(|e| ApiError::internal_error(format!("Server error: {}", e)))?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
