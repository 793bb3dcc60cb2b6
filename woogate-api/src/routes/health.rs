//! Health Check Endpoints
//!
//! - /health/ping - Simple liveness check
//! - /health/live - Process alive check
//! - /health/ready - Upstream reachability plus identifier cache state
//!
//! No authentication required for health endpoints.

use std::sync::Arc;
use std::time::Instant;

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use woogate_core::{ListParams, Resource};
use woogate_storage::CacheStats;

use crate::services::CatalogServices;
use crate::state::AppState;

// ============================================================================
// TYPES
// ============================================================================

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HealthDetails>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthDetails {
    pub upstream: ComponentHealth,
    pub caches: CachesHealth,
    pub version: String,
    pub uptime_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachesHealth {
    pub categories: CacheHealth,
    pub products: CacheHealth,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheHealth {
    pub entries: u64,
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_refreshed: Option<DateTime<Utc>>,
}

impl CacheHealth {
    fn new(stats: CacheStats, last_refreshed: Option<DateTime<Utc>>) -> Self {
        Self {
            entries: stats.entry_count,
            hits: stats.hits,
            misses: stats.misses,
            hit_rate: stats.hit_rate(),
            last_refreshed,
        }
    }
}

// ============================================================================
// HANDLERS
// ============================================================================

/// GET /health/ping - Simple pong response
pub async fn ping() -> impl IntoResponse {
    (StatusCode::OK, "pong")
}

/// GET /health/live - Process liveness check
pub async fn liveness() -> impl IntoResponse {
    let response = HealthResponse {
        status: HealthStatus::Healthy,
        message: Some("Process is alive".to_string()),
        details: None,
    };
    (StatusCode::OK, Json(response))
}

/// GET /health/ready - Readiness check (upstream reachability)
pub async fn readiness(
    State(services): State<Arc<CatalogServices>>,
    State(start_time): State<Instant>,
) -> impl IntoResponse {
    let upstream = match check_upstream(&services).await {
        Ok(latency) => ComponentHealth {
            status: HealthStatus::Healthy,
            latency_ms: Some(latency),
            error: None,
        },
        Err(e) => ComponentHealth {
            status: HealthStatus::Unhealthy,
            latency_ms: None,
            error: Some(e),
        },
    };

    let refreshed = services.last_refresh();
    let caches = CachesHealth {
        categories: CacheHealth::new(services.category_cache().stats(), refreshed.categories),
        products: CacheHealth::new(services.product_cache().stats(), refreshed.products),
    };

    let overall_status = upstream.status;
    let response = HealthResponse {
        status: overall_status,
        message: None,
        details: Some(HealthDetails {
            upstream,
            caches,
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: start_time.elapsed().as_secs(),
        }),
    };

    let status_code = if overall_status == HealthStatus::Healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(response))
}

/// Probe the store with a one-record category listing.
async fn check_upstream(services: &CatalogServices) -> Result<u64, String> {
    let start = Instant::now();

    match services
        .upstream()
        .list(Resource::Categories, 1, 1, &ListParams::new())
        .await
    {
        Ok(_) => Ok(start.elapsed().as_millis() as u64),
        Err(e) => Err(format!("Upstream check failed: {}", e)),
    }
}

// ============================================================================
// ROUTER
// ============================================================================

/// Create health check router (no auth required)
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/ping", get(ping))
        .route("/live", get(liveness))
        .route("/ready", get(readiness))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_response_serialization() -> Result<(), serde_json::Error> {
        let response = HealthResponse {
            status: HealthStatus::Healthy,
            message: Some("All systems operational".to_string()),
            details: None,
        };

        let json = serde_json::to_string(&response)?;
        assert!(json.contains("\"status\":\"healthy\""));
        assert!(!json.contains("details"));
        Ok(())
    }

    #[test]
    fn test_cache_health_from_stats() -> Result<(), serde_json::Error> {
        let stats = CacheStats {
            hits: 3,
            misses: 1,
            entry_count: 12,
        };
        let health = CacheHealth::new(stats, None);
        assert_eq!(health.entries, 12);
        assert!((health.hit_rate - 0.75).abs() < f64::EPSILON);

        let json = serde_json::to_string(&health)?;
        assert!(!json.contains("last_refreshed"));
        Ok(())
    }

    #[test]
    fn test_component_health_with_error() -> Result<(), serde_json::Error> {
        let component = ComponentHealth {
            status: HealthStatus::Unhealthy,
            latency_ms: None,
            error: Some("Upstream check failed: connection refused".to_string()),
        };

        let json = serde_json::to_string(&component)?;
        assert!(json.contains("\"status\":\"unhealthy\""));
        assert!(json.contains("connection refused"));
        Ok(())
    }
}
