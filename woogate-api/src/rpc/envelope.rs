//! JSON-RPC 2.0 envelopes

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::ApiError;

/// Protocol version accepted and emitted.
pub const JSONRPC_VERSION: &str = "2.0";

// ============================================================================
// REQUEST
// ============================================================================

/// A validated request envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct RpcRequest {
    pub method: String,
    /// `null` when the caller sent no params.
    pub params: JsonValue,
    /// Echoed back verbatim; `null` when absent.
    pub id: JsonValue,
}

impl RpcRequest {
    /// Parse and validate a raw request body.
    ///
    /// # Errors
    /// `ParseError` for a body that is not JSON, `InvalidRequest` for one
    /// that is not a JSON-RPC 2.0 call. The `id` is recovered whenever the
    /// body was parseable.
    pub fn from_slice(body: &[u8]) -> Result<Self, RpcFailure> {
        let value: JsonValue = serde_json::from_slice(body).map_err(|e| RpcFailure {
            error: ApiError::parse_error(format!("Parse error: {}", e)),
            id: JsonValue::Null,
        })?;
        Self::from_value(value)
    }

    pub fn from_value(value: JsonValue) -> Result<Self, RpcFailure> {
        let id = request_id(&value);
        let invalid = || RpcFailure {
            error: ApiError::invalid_request(),
            id: id.clone(),
        };

        if value.get("jsonrpc").and_then(JsonValue::as_str) != Some(JSONRPC_VERSION) {
            return Err(invalid());
        }
        let method = match value.get("method").and_then(JsonValue::as_str) {
            Some(method) if !method.is_empty() => method.to_string(),
            _ => return Err(invalid()),
        };

        Ok(Self {
            method,
            params: value.get("params").cloned().unwrap_or(JsonValue::Null),
            id,
        })
    }
}

/// The `id` member of a request body, `null` when missing or when the body
/// is not an object.
pub fn request_id(body: &JsonValue) -> JsonValue {
    body.get("id").cloned().unwrap_or(JsonValue::Null)
}

// ============================================================================
// RESPONSE
// ============================================================================

/// Response envelope. Exactly one of `result` and `error` is present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcResponse {
    pub jsonrpc: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<JsonValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcErrorObject>,

    pub id: JsonValue,
}

/// The `error` member of a response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcErrorObject {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<JsonValue>,
}

impl From<ApiError> for RpcErrorObject {
    fn from(err: ApiError) -> Self {
        Self {
            code: err.code.rpc_code(),
            message: err.message,
            data: err.details,
        }
    }
}

impl RpcResponse {
    pub fn success(result: JsonValue, id: JsonValue) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            result: Some(result),
            error: None,
            id,
        }
    }

    pub fn failure(err: ApiError, id: JsonValue) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            result: None,
            error: Some(err.into()),
            id,
        }
    }
}

/// HTTP 200 carrying a result envelope.
pub fn success_response(result: JsonValue, id: JsonValue) -> Response {
    (StatusCode::OK, Json(RpcResponse::success(result, id))).into_response()
}

/// Error envelope with the HTTP status of the error code.
pub fn error_response(err: ApiError, id: JsonValue) -> Response {
    let status = err.status_code();
    (status, Json(RpcResponse::failure(err, id))).into_response()
}

/// An error paired with the request `id` it answers.
#[derive(Debug, Clone, PartialEq)]
pub struct RpcFailure {
    pub error: ApiError,
    pub id: JsonValue,
}

impl IntoResponse for RpcFailure {
    fn into_response(self) -> Response {
        error_response(self.error, self.id)
    }
}
