//! Middleware modules for the woogate API
//!
//! - `auth`: shared API key check in front of the RPC endpoint
//!
//! Request tracing and metrics live in [`crate::telemetry::middleware`].

mod auth;

pub use auth::{api_key_middleware, ApiKeyState, API_KEY_HEADER, MAX_REJECTED_BODY_SIZE};
