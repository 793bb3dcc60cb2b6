//! HTTP Routes
//!
//! - `POST /rpc` - JSON-RPC endpoint (API key required)
//! - `GET /` - banner
//! - `/health/*` - probes (no auth)
//! - `GET /metrics` - Prometheus text (no auth)

pub mod health;
pub mod rpc;

use std::time::Duration;

use axum::{
    http::{header, HeaderName, Method},
    middleware::{from_fn, from_fn_with_state},
    routing::get,
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::middleware::{api_key_middleware, ApiKeyState, API_KEY_HEADER};
use crate::state::AppState;
use crate::telemetry::{metrics_handler, observability_middleware};

/// Plain-text answer of `GET /`.
pub const ROOT_BANNER: &str =
    "MCP HTTP Server is running. Use the /rpc endpoint for JSON-RPC calls.";

/// Preflight cache lifetime.
const CORS_MAX_AGE: Duration = Duration::from_secs(3600);

async fn banner() -> &'static str {
    ROOT_BANNER
}

/// Build the complete gateway router.
///
/// Layer execution order: CORS -> Observability -> API key (RPC only) -> Handler
pub fn create_api_router(state: AppState, api_key: ApiKeyState) -> Router {
    let rpc_routes =
        rpc::create_router().route_layer(from_fn_with_state(api_key, api_key_middleware));

    Router::new()
        .route("/", get(banner))
        .merge(rpc_routes)
        .nest("/health", health::create_router())
        .route("/metrics", get(metrics_handler))
        .with_state(state)
        .layer(from_fn(observability_middleware))
        .layer(build_cors_layer())
}

// ============================================================================
// CORS LAYER
// ============================================================================

/// Any origin may call the gateway; the API key is the access control.
fn build_cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::ACCEPT,
            HeaderName::from_static(API_KEY_HEADER),
        ])
        .max_age(CORS_MAX_AGE)
}
