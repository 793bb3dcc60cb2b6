//! Tracing Subscriber Initialization
//!
//! Installs a global `tracing` subscriber with an `EnvFilter` and either JSON
//! or human-readable output.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{GatewayConfig, LogFormat};
use crate::error::{ApiError, ApiResult};

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Filter used when `RUST_LOG` is not set (e.g. "info", "woogate_api=debug").
    pub log_level: String,
    pub log_format: LogFormat,
    /// Service name attached to the startup event
    pub service_name: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Json,
            service_name: "woogate-api".to_string(),
        }
    }
}

impl TelemetryConfig {
    pub fn from_gateway(config: &GatewayConfig) -> Self {
        Self {
            log_level: config.log_level.clone(),
            log_format: config.log_format,
            ..Self::default()
        }
    }

    /// `RUST_LOG` wins over the configured level.
    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.log_level))
    }
}

/// Initialize the global tracing subscriber.
///
/// Call once at startup, before any request is served.
pub fn init_tracing(config: &TelemetryConfig) -> ApiResult<()> {
    let registry = tracing_subscriber::registry().with(config.env_filter());

    let result = match config.log_format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).try_init(),
    };
    result.map_err(|e| ApiError::internal_error(format!("Failed to init subscriber: {}", e)))?;

    tracing::info!(
        service_name = %config.service_name,
        log_level = %config.log_level,
        log_format = ?config.log_format,
        "Telemetry initialized"
    );
    Ok(())
}
