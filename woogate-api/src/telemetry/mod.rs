//! woogate Telemetry - Observability Infrastructure
//!
//! Provides structured logging and Prometheus metrics for the gateway.

pub mod metrics;
pub mod middleware;
pub mod tracer;

pub use metrics::{metrics, metrics_handler, GatewayMetrics, METRICS};
pub use middleware::observability_middleware;
pub use tracer::{init_tracing, TelemetryConfig};
