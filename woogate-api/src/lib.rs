//! woogate API - JSON-RPC gateway to a WooCommerce store
//!
//! Exposes a small set of catalog methods over JSON-RPC 2.0 on HTTP and
//! forwards them to the WooCommerce REST API. Callers may name categories
//! and products by name or SKU; the gateway resolves those to upstream IDs
//! through persistent identifier caches and refreshes the caches in bulk on
//! request.

pub mod config;
pub mod error;
pub mod macros;
pub mod middleware;
pub mod routes;
pub mod rpc;
pub mod services;
pub mod state;
pub mod telemetry;
pub mod upstream;

pub use config::{ConfigError, GatewayConfig, LogFormat};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use middleware::{api_key_middleware, ApiKeyState};
pub use routes::{create_api_router, ROOT_BANNER};
pub use rpc::{dispatch, RpcRequest, RpcResponse};
pub use services::{
    refresh_category_cache, refresh_product_map, resolve_category_id, resolve_product_id,
    CatalogServices, CategoryRefresh, ProductRefresh, CATEGORY_PAGE_SIZE, PRODUCT_PAGE_SIZE,
};
pub use state::AppState;
pub use upstream::WooCommerceClient;
