//! Error Types for the woogate API
//!
//! This module defines error handling for the gateway, including:
//! - ApiError struct for structured error responses
//! - ErrorCode enum mapping each failure to a JSON-RPC code and HTTP status
//! - Conversions from resolution, upstream and configuration failures
//!
//! Errors leave the service as JSON-RPC error objects.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use std::fmt;
use woogate_core::{ResolveError, UpstreamError};

use crate::config::ConfigError;
use crate::rpc::envelope::error_response;

// ============================================================================
// ERROR CODE ENUM
// ============================================================================

/// Error codes for gateway responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // ========================================================================
    // Protocol Errors
    // ========================================================================
    /// Body is not valid JSON
    ParseError,

    /// Envelope is not a valid JSON-RPC 2.0 request
    InvalidRequest,

    /// Method is not supported
    MethodNotFound,

    /// Parameters are missing or malformed
    InvalidParams,

    /// Unexpected failure inside the gateway
    InternalError,

    // ========================================================================
    // Gateway Errors
    // ========================================================================
    /// Missing or wrong API key
    Unauthorized,

    /// Gateway is not configured correctly
    ServerMisconfigured,

    /// No category or product matches the identifier
    ResourceNotFound,

    /// Several upstream records match the identifier equally well
    AmbiguousIdentifier,

    /// The upstream store failed or rejected the request
    UpstreamError,
}

impl ErrorCode {
    /// Get the HTTP status code for this error code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::ParseError | ErrorCode::InvalidRequest | ErrorCode::InvalidParams => {
                StatusCode::BAD_REQUEST
            }

            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,

            ErrorCode::MethodNotFound | ErrorCode::ResourceNotFound => StatusCode::NOT_FOUND,

            ErrorCode::AmbiguousIdentifier => StatusCode::CONFLICT,

            ErrorCode::UpstreamError => StatusCode::BAD_GATEWAY,

            ErrorCode::InternalError | ErrorCode::ServerMisconfigured => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// JSON-RPC error code carried in the response envelope.
    pub fn rpc_code(&self) -> i64 {
        match self {
            ErrorCode::ParseError => -32700,
            ErrorCode::InvalidRequest => -32600,
            ErrorCode::MethodNotFound => -32601,
            ErrorCode::InvalidParams => -32602,
            ErrorCode::InternalError => -32603,
            ErrorCode::Unauthorized => -32000,
            ErrorCode::ServerMisconfigured => -32001,
            ErrorCode::ResourceNotFound => -32002,
            ErrorCode::AmbiguousIdentifier => -32003,
            ErrorCode::UpstreamError => -32004,
        }
    }

    /// Get a default message for this error code.
    pub fn default_message(&self) -> &'static str {
        match self {
            ErrorCode::ParseError => "Parse error",
            ErrorCode::InvalidRequest => "Invalid Request",
            ErrorCode::MethodNotFound => "Method not found",
            ErrorCode::InvalidParams => "Invalid params",
            ErrorCode::InternalError => "Internal error",
            ErrorCode::Unauthorized => "Unauthorized: Invalid or missing API Key",
            ErrorCode::ServerMisconfigured => "Server configuration error",
            ErrorCode::ResourceNotFound => "Resource not found",
            ErrorCode::AmbiguousIdentifier => "Ambiguous identifier",
            ErrorCode::UpstreamError => "Upstream API error",
        }
    }

    /// Short label for metrics.
    pub fn label(&self) -> &'static str {
        match self {
            ErrorCode::ParseError => "parse_error",
            ErrorCode::InvalidRequest => "invalid_request",
            ErrorCode::MethodNotFound => "method_not_found",
            ErrorCode::InvalidParams => "invalid_params",
            ErrorCode::InternalError => "internal_error",
            ErrorCode::Unauthorized => "unauthorized",
            ErrorCode::ServerMisconfigured => "server_misconfigured",
            ErrorCode::ResourceNotFound => "not_found",
            ErrorCode::AmbiguousIdentifier => "ambiguous",
            ErrorCode::UpstreamError => "upstream_error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

// ============================================================================
// API ERROR STRUCT
// ============================================================================

/// Structured error returned by every gateway operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code categorizing the error
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,

    /// Optional diagnostic payload (candidates, upstream status)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<JsonValue>,
}

impl ApiError {
    /// Create a new API error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Create a new API error with the given code, using the default message.
    pub fn from_code(code: ErrorCode) -> Self {
        Self::new(code, code.default_message())
    }

    /// Add additional details to the error.
    pub fn with_details(mut self, details: JsonValue) -> Self {
        self.details = Some(details);
        self
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        self.code.status_code()
    }

    // ========================================================================
    // Convenience constructors for common errors
    // ========================================================================

    pub fn parse_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ParseError, message)
    }

    pub fn invalid_request() -> Self {
        Self::from_code(ErrorCode::InvalidRequest)
    }

    /// Create a MethodNotFound error for an unsupported method.
    pub fn unsupported_method(method: &str) -> Self {
        Self::new(
            ErrorCode::MethodNotFound,
            format!("Unsupported method: {}", method),
        )
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidParams, message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    pub fn unauthorized() -> Self {
        Self::from_code(ErrorCode::Unauthorized)
    }

    pub fn server_misconfigured(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServerMisconfigured, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ResourceNotFound, message)
    }

    /// Create an UpstreamError carrying the store's status and code.
    pub fn upstream(message: impl Into<String>, source: &UpstreamError) -> Self {
        let err = Self::new(ErrorCode::UpstreamError, message);
        match source {
            UpstreamError::Status { status, code, .. } => {
                err.with_details(json!({ "status": status, "code": code }))
            }
            _ => err,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

// ============================================================================
// AXUM INTEGRATION
// ============================================================================

/// Errors raised outside a request context (no `id` known) are rendered as a
/// JSON-RPC error envelope with a null `id`.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error_response(self, JsonValue::Null)
    }
}

// ============================================================================
// CONVERSIONS
// ============================================================================

impl From<ResolveError> for ApiError {
    fn from(err: ResolveError) -> Self {
        let message = err.to_string();
        match err {
            ResolveError::InvalidInput { .. } => ApiError::invalid_params(message),
            ResolveError::NotFound { .. } => ApiError::not_found(message),
            ResolveError::Ambiguous { candidates, .. } => {
                ApiError::new(ErrorCode::AmbiguousIdentifier, message)
                    .with_details(json!({ "candidates": candidates }))
            }
            ResolveError::Upstream { source, .. } => ApiError::upstream(message, &source),
        }
    }
}

/// Direct upstream calls (get/put/list). A 404 from the store means the
/// requested record does not exist.
impl From<UpstreamError> for ApiError {
    fn from(err: UpstreamError) -> Self {
        match err.http_status() {
            Some(404) => ApiError::not_found(err.to_string()).with_details(json!({
                "status": 404,
                "code": err.upstream_code(),
            })),
            _ => {
                tracing::error!(error = %err, "Upstream request failed");
                ApiError::upstream(err.to_string(), &err)
            }
        }
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        tracing::error!(error = %err, "Configuration error");
        ApiError::server_misconfigured(err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!("JSON serialization error: {:?}", err);
        ApiError::internal_error(format!("JSON serialization failed: {}", err))
    }
}

// ============================================================================
// RESULT TYPE ALIAS
// ============================================================================

/// Result type alias for gateway operations.
pub type ApiResult<T> = Result<T, ApiError>;
