//! JSON-RPC 2.0 layer
//!
//! Envelope parsing and rendering, typed params and method dispatch.

pub mod dispatcher;
pub mod envelope;
pub mod params;

pub use dispatcher::{dispatch, DEFAULT_PER_PAGE, SUPPORTED_METHODS};
pub use envelope::{
    error_response, request_id, success_response, RpcErrorObject, RpcFailure, RpcRequest,
    RpcResponse, JSONRPC_VERSION,
};
pub use params::{Params, ProductTarget};
