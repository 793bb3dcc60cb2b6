//! JSON-RPC Endpoint
//!
//! `POST /rpc` accepts one JSON-RPC 2.0 call per request.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};

use crate::rpc::{dispatch, error_response, success_response, RpcRequest};
use crate::services::CatalogServices;
use crate::state::AppState;

/// POST /rpc - Execute one JSON-RPC call
pub async fn handle_rpc(State(services): State<Arc<CatalogServices>>, body: Bytes) -> Response {
    let request = match RpcRequest::from_slice(&body) {
        Ok(request) => request,
        Err(failure) => {
            tracing::warn!(code = %failure.error.code, id = %failure.id, "Rejected malformed RPC request");
            return failure.into_response();
        }
    };

    tracing::info!(method = %request.method, id = %request.id, "RPC request");

    match dispatch(&services, &request.method, &request.params).await {
        Ok(result) => success_response(result, request.id),
        Err(err) => error_response(err, request.id),
    }
}

/// Create the RPC router. Authentication is layered on by the caller.
pub fn create_router() -> Router<AppState> {
    Router::new().route("/rpc", post(handle_rpc))
}
