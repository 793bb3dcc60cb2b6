//! Prometheus Metrics Definitions
//!
//! Defines the gateway metrics with their labels and exposes a /metrics
//! endpoint for Prometheus scraping.

use axum::{http::StatusCode, response::IntoResponse};
use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_histogram_vec, register_int_gauge_vec, CounterVec, Encoder,
    HistogramVec, IntGaugeVec, TextEncoder,
};

use crate::error::{ApiError, ApiResult};

/// HTTP request latency buckets (seconds)
const HTTP_LATENCY_BUCKETS: &[f64] = &[
    0.001, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.0, 2.5, 5.0, 10.0,
];

/// Upstream call latency buckets (seconds); the store is remote and slow.
const UPSTREAM_LATENCY_BUCKETS: &[f64] =
    &[0.025, 0.050, 0.100, 0.250, 0.500, 1.0, 2.5, 5.0, 10.0, 30.0];

/// Global metrics instance - initialized once at startup
pub static METRICS: Lazy<ApiResult<GatewayMetrics>> = Lazy::new(GatewayMetrics::new);

/// The global metrics, if registration succeeded.
pub fn metrics() -> Option<&'static GatewayMetrics> {
    METRICS.as_ref().ok()
}

/// Container for all gateway metrics.
#[derive(Clone)]
pub struct GatewayMetrics {
    /// HTTP request counter - labels: method, path, status
    pub http_requests_total: CounterVec,

    /// HTTP request duration histogram - labels: method, path
    pub http_request_duration_seconds: HistogramVec,

    /// JSON-RPC call counter - labels: method, outcome
    pub rpc_calls_total: CounterVec,

    /// Identifier resolutions - labels: kind, outcome
    pub resolutions_total: CounterVec,

    /// Upstream requests - labels: resource, operation, outcome
    pub upstream_requests_total: CounterVec,

    /// Upstream request duration - labels: resource, operation
    pub upstream_request_duration_seconds: HistogramVec,

    /// Entries per identifier cache - labels: cache
    pub id_cache_entries: IntGaugeVec,
}

fn registration_error(name: &str, e: prometheus::Error) -> ApiError {
    ApiError::internal_error(format!("Failed to register {}: {}", name, e))
}

impl GatewayMetrics {
    /// Create and register all metrics with Prometheus.
    pub fn new() -> ApiResult<Self> {
        Ok(Self {
            http_requests_total: register_counter_vec!(
                "woogate_http_requests_total",
                "Total number of HTTP requests",
                &["method", "path", "status"]
            )
            .map_err(|e| registration_error("http_requests_total", e))?,

            http_request_duration_seconds: register_histogram_vec!(
                "woogate_http_request_duration_seconds",
                "HTTP request duration in seconds",
                &["method", "path"],
                HTTP_LATENCY_BUCKETS.to_vec()
            )
            .map_err(|e| registration_error("http_request_duration_seconds", e))?,

            rpc_calls_total: register_counter_vec!(
                "woogate_rpc_calls_total",
                "Total JSON-RPC method invocations",
                &["method", "outcome"]
            )
            .map_err(|e| registration_error("rpc_calls_total", e))?,

            resolutions_total: register_counter_vec!(
                "woogate_resolutions_total",
                "Identifier resolutions by entity kind and outcome",
                &["kind", "outcome"]
            )
            .map_err(|e| registration_error("resolutions_total", e))?,

            upstream_requests_total: register_counter_vec!(
                "woogate_upstream_requests_total",
                "Requests sent to the upstream store",
                &["resource", "operation", "outcome"]
            )
            .map_err(|e| registration_error("upstream_requests_total", e))?,

            upstream_request_duration_seconds: register_histogram_vec!(
                "woogate_upstream_request_duration_seconds",
                "Upstream request duration in seconds",
                &["resource", "operation"],
                UPSTREAM_LATENCY_BUCKETS.to_vec()
            )
            .map_err(|e| registration_error("upstream_request_duration_seconds", e))?,

            id_cache_entries: register_int_gauge_vec!(
                "woogate_id_cache_entries",
                "Number of keys in each identifier cache",
                &["cache"]
            )
            .map_err(|e| registration_error("id_cache_entries", e))?,
        })
    }

    /// Record an HTTP request.
    pub fn record_http_request(&self, method: &str, path: &str, status: u16, duration_secs: f64) {
        let status_str = status.to_string();
        self.http_requests_total
            .with_label_values(&[method, path, &status_str])
            .inc();
        self.http_request_duration_seconds
            .with_label_values(&[method, path])
            .observe(duration_secs);
    }

    /// Record a JSON-RPC call. `outcome` is "success" or an error label.
    pub fn record_rpc_call(&self, method: &str, outcome: &str) {
        self.rpc_calls_total
            .with_label_values(&[method, outcome])
            .inc();
    }

    /// Record an identifier resolution.
    pub fn record_resolution(&self, kind: &str, outcome: &str) {
        self.resolutions_total
            .with_label_values(&[kind, outcome])
            .inc();
    }

    /// Record an upstream request.
    pub fn record_upstream_request(
        &self,
        resource: &str,
        operation: &str,
        success: bool,
        duration_secs: f64,
    ) {
        let outcome = if success { "success" } else { "error" };
        self.upstream_requests_total
            .with_label_values(&[resource, operation, outcome])
            .inc();
        self.upstream_request_duration_seconds
            .with_label_values(&[resource, operation])
            .observe(duration_secs);
    }

    /// Set the entry count of one identifier cache.
    pub fn set_cache_entries(&self, cache: &str, entries: usize) {
        self.id_cache_entries
            .with_label_values(&[cache])
            .set(entries as i64);
    }
}

/// Handler for GET /metrics endpoint.
///
/// Returns Prometheus text format metrics.
pub async fn metrics_handler() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    match encoder.encode(&metric_families, &mut buffer) {
        Ok(_) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            buffer,
        ),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode metrics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [("content-type", "text/plain")],
                format!("Failed to encode metrics: {}", e).into_bytes(),
            )
        }
    }
}
