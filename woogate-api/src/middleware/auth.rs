//! Axum Middleware for API Key Authentication
//!
//! Every RPC call must carry the shared gateway key in `X-API-Key`.
//! Rejections are JSON-RPC error envelopes (HTTP 401, code -32000) that echo
//! the `id` of the rejected call when its body is parseable.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value as JsonValue;

use crate::error::ApiError;
use crate::rpc::{error_response, request_id};

/// Header carrying the gateway key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Largest body buffered to recover the `id` of a rejected call.
pub const MAX_REJECTED_BODY_SIZE: usize = 64 * 1024;

// ============================================================================
// MIDDLEWARE STATE
// ============================================================================

/// Shared state for the API key middleware.
#[derive(Clone)]
pub struct ApiKeyState {
    api_key: Arc<SecretString>,
}

impl ApiKeyState {
    pub fn new(api_key: SecretString) -> Self {
        Self {
            api_key: Arc::new(api_key),
        }
    }

    /// Whether a gateway key is configured at all.
    pub fn is_configured(&self) -> bool {
        !self.api_key.expose_secret().is_empty()
    }

    pub fn is_valid(&self, presented: &str) -> bool {
        self.is_configured() && presented == self.api_key.expose_secret()
    }
}

impl std::fmt::Debug for ApiKeyState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeyState")
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

// ============================================================================
// MIDDLEWARE FUNCTION
// ============================================================================

/// Reject requests without the gateway key.
///
/// ```ignore
/// let app = Router::new()
///     .route("/rpc", post(handle_rpc))
///     .route_layer(from_fn_with_state(ApiKeyState::new(key), api_key_middleware));
/// ```
pub async fn api_key_middleware(
    State(state): State<ApiKeyState>,
    request: Request,
    next: Next,
) -> Response {
    if !state.is_configured() {
        tracing::error!("Gateway API key is not configured; rejecting request");
        return error_response(
            ApiError::server_misconfigured("Server configuration error: API Key not set"),
            JsonValue::Null,
        );
    }

    let authorized = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|h| h.to_str().ok())
        .is_some_and(|key| state.is_valid(key));

    if authorized {
        return next.run(request).await;
    }

    tracing::warn!(path = %request.uri().path(), "Rejected request with invalid or missing API key");

    let (_, body) = request.into_parts();
    let id = match axum::body::to_bytes(body, MAX_REJECTED_BODY_SIZE).await {
        Ok(bytes) => serde_json::from_slice::<JsonValue>(&bytes)
            .map(|value| request_id(&value))
            .unwrap_or(JsonValue::Null),
        Err(_) => JsonValue::Null,
    };

    error_response(ApiError::unauthorized(), id)
}
