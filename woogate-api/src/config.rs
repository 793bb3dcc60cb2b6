//! Gateway Configuration Module
//!
//! Configuration is loaded from environment variables. The upstream store
//! credentials and the shared API key are required; everything else has a
//! default suitable for a single-instance deployment.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use woogate_storage::{CATEGORY_MAP_FILE, PRODUCT_MAP_FILE};

/// Path of the WooCommerce REST v3 API below the store URL.
pub const REST_API_PATH: &str = "wp-json/wc/v3";

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variable {name}")]
    MissingRequired { name: &'static str },

    #[error("Invalid value '{value}' for {name}: {reason}")]
    InvalidValue {
        name: &'static str,
        value: String,
        reason: String,
    },
}

// ============================================================================
// LOG FORMAT
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

impl LogFormat {
    fn parse(name: &'static str, value: &str) -> Result<Self, ConfigError> {
        match value.to_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" | "text" => Ok(LogFormat::Pretty),
            _ => Err(ConfigError::InvalidValue {
                name,
                value: value.to_string(),
                reason: "expected 'json' or 'pretty'".to_string(),
            }),
        }
    }
}

// ============================================================================
// GATEWAY CONFIGURATION
// ============================================================================

/// Everything the gateway needs to start.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Listen host.
    pub bind_host: String,
    /// Listen port.
    pub port: u16,
    /// Shared secret expected in the `X-API-Key` header.
    pub api_key: SecretString,
    /// Store base URL, e.g. `https://shop.example.com`.
    pub store_url: String,
    /// REST consumer key (basic auth user).
    pub consumer_key: SecretString,
    /// REST consumer secret (basic auth password).
    pub consumer_secret: SecretString,
    /// Per-request upstream timeout.
    pub upstream_timeout: Duration,
    /// Directory holding the persisted identifier maps.
    pub data_dir: PathBuf,
    /// Maximum in-flight page fetches during a cache refresh.
    pub refresh_concurrency: usize,
    /// Default log filter when `RUST_LOG` is unset.
    pub log_level: String,
    pub log_format: LogFormat,
}

impl GatewayConfig {
    /// Load configuration from the process environment.
    ///
    /// Environment variables:
    /// - `PORT`: listen port (default: 3000)
    /// - `WOOGATE_BIND`: listen host (default: 0.0.0.0)
    /// - `MCP_API_KEY`: shared API key (unset rejects every RPC call)
    /// - `WOOCOMMERCE_URL`, `WOOCOMMERCE_KEY`, `WOOCOMMERCE_SECRET`: store access (required)
    /// - `WOOGATE_UPSTREAM_TIMEOUT_SECS`: upstream timeout (default: 30)
    /// - `WOOGATE_DATA_DIR`: map directory (default: data)
    /// - `WOOGATE_REFRESH_CONCURRENCY`: parallel page fetches (default: 4)
    /// - `LOG_LEVEL`: default log filter (default: info)
    /// - `WOOGATE_LOG_FORMAT`: json or pretty (default: json)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Blank values count as unset.
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let required = |name: &'static str| get(name).ok_or(ConfigError::MissingRequired { name });

        let api_key = SecretString::new(get("MCP_API_KEY").unwrap_or_default().into());
        let store_url = required("WOOCOMMERCE_URL")?;
        let consumer_key = SecretString::new(required("WOOCOMMERCE_KEY")?.into());
        let consumer_secret = SecretString::new(required("WOOCOMMERCE_SECRET")?.into());

        if !store_url.starts_with("http://") && !store_url.starts_with("https://") {
            return Err(ConfigError::InvalidValue {
                name: "WOOCOMMERCE_URL",
                value: store_url,
                reason: "expected an http(s) URL".to_string(),
            });
        }

        let port = parse_or("PORT", get("PORT"), 3000u16)?;
        let timeout_secs = parse_or(
            "WOOGATE_UPSTREAM_TIMEOUT_SECS",
            get("WOOGATE_UPSTREAM_TIMEOUT_SECS"),
            30u64,
        )?;
        let refresh_concurrency =
            parse_or("WOOGATE_REFRESH_CONCURRENCY", get("WOOGATE_REFRESH_CONCURRENCY"), 4usize)?;

        let log_format = match get("WOOGATE_LOG_FORMAT") {
            Some(value) => LogFormat::parse("WOOGATE_LOG_FORMAT", &value)?,
            None => LogFormat::default(),
        };

        Ok(Self {
            bind_host: get("WOOGATE_BIND").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            api_key,
            store_url,
            consumer_key,
            consumer_secret,
            upstream_timeout: Duration::from_secs(timeout_secs.max(1)),
            data_dir: get("WOOGATE_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("data")),
            refresh_concurrency: refresh_concurrency.max(1),
            log_level: get("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            log_format,
        })
    }

    /// Base URL of the REST API, without a trailing slash.
    pub fn rest_base_url(&self) -> String {
        format!("{}/{}", self.store_url.trim_end_matches('/'), REST_API_PATH)
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = format!("{}:{}", self.bind_host, self.port);
        addr.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue {
                name: "WOOGATE_BIND",
                value: addr.clone(),
                reason: e.to_string(),
            })
    }

    pub fn category_map_path(&self) -> PathBuf {
        self.data_dir.join(CATEGORY_MAP_FILE)
    }

    pub fn product_map_path(&self) -> PathBuf {
        self.data_dir.join(PRODUCT_MAP_FILE)
    }
}

fn parse_or<T>(name: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => match value.trim().parse::<T>() {
            Ok(parsed) => Ok(parsed),
            Err(e) => Err(ConfigError::InvalidValue {
                name,
                reason: e.to_string(),
                value,
            }),
        },
    }
}
