//! WooCommerce REST v3 client

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use woogate_core::{
    CatalogId, CatalogRecord, CatalogUpstream, ListPage, ListParams, Resource, SearchQuery,
    UpstreamError, UpstreamResult,
};

use crate::config::GatewayConfig;
use crate::telemetry::metrics;

/// Response header carrying the total page count of a listing.
pub const TOTAL_PAGES_HEADER: &str = "x-wp-totalpages";

/// HTTP client for the store's REST API, authenticated with a consumer
/// key/secret pair over basic auth.
pub struct WooCommerceClient {
    client: Client,
    base_url: String,
    consumer_key: SecretString,
    consumer_secret: SecretString,
}

impl WooCommerceClient {
    /// Create a client for the REST API rooted at `base_url`
    /// (e.g. `https://shop.example.com/wp-json/wc/v3`).
    pub fn new(
        base_url: impl Into<String>,
        consumer_key: SecretString,
        consumer_secret: SecretString,
        timeout: Duration,
    ) -> UpstreamResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| UpstreamError::transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            consumer_key,
            consumer_secret,
        })
    }

    pub fn from_config(config: &GatewayConfig) -> UpstreamResult<Self> {
        Self::new(
            config.rest_base_url(),
            config.consumer_key.clone(),
            config.consumer_secret.clone(),
            config.upstream_timeout,
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}/{}", self.base_url, path))
            .basic_auth(
                self.consumer_key.expose_secret(),
                Some(self.consumer_secret.expose_secret()),
            )
            .header("Accept", "application/json")
    }

    /// Send a request, timing it and turning non-2xx answers into
    /// [`UpstreamError::Status`].
    async fn send(
        &self,
        resource: Resource,
        operation: &'static str,
        builder: RequestBuilder,
    ) -> UpstreamResult<Response> {
        let start = Instant::now();
        let result = execute(builder).await;
        let elapsed = start.elapsed();

        if let Some(metrics) = metrics() {
            metrics.record_upstream_request(
                resource.label(),
                operation,
                result.is_ok(),
                elapsed.as_secs_f64(),
            );
        }

        match &result {
            Ok(_) => tracing::debug!(
                resource = %resource,
                operation,
                duration_ms = elapsed.as_millis() as u64,
                "Upstream request succeeded"
            ),
            Err(err) => tracing::warn!(
                resource = %resource,
                operation,
                duration_ms = elapsed.as_millis() as u64,
                error = %err,
                "Upstream request failed"
            ),
        }
        result
    }
}

async fn execute(builder: RequestBuilder) -> UpstreamResult<Response> {
    let response = builder
        .send()
        .await
        .map_err(|e| UpstreamError::transport(format!("HTTP request failed: {}", e)))?;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let (code, message) = parse_error_body(&body);
    Err(UpstreamError::status(status.as_u16(), code, message))
}

/// Pull `code` and `message` from a store error body. Bodies that are not
/// the usual `{code, message, data}` object are reported verbatim.
fn parse_error_body(body: &str) -> (Option<String>, String) {
    let parsed: Option<JsonValue> = serde_json::from_str(body).ok();
    let field = |name: &str| {
        parsed
            .as_ref()
            .and_then(|v| v.get(name))
            .and_then(JsonValue::as_str)
            .map(str::to_string)
    };

    let message = field("message").unwrap_or_else(|| {
        if body.is_empty() {
            "Empty response body".to_string()
        } else {
            body.to_string()
        }
    });
    (field("code"), message)
}

async fn decode<T: DeserializeOwned>(response: Response) -> UpstreamResult<T> {
    let bytes = response
        .bytes()
        .await
        .map_err(|e| UpstreamError::transport(format!("Failed to read response: {}", e)))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| UpstreamError::invalid_response(format!("Failed to parse response: {}", e)))
}

/// Total page count from the listing headers; missing or unparsable means one.
fn total_pages(response: &Response) -> u32 {
    response
        .headers()
        .get(TOTAL_PAGES_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u32>().ok())
        .filter(|pages| *pages > 0)
        .unwrap_or(1)
}

fn search_params(query: &SearchQuery) -> Vec<(&'static str, String)> {
    let mut params = Vec::new();
    if let Some(search) = &query.search {
        params.push(("search", search.clone()));
    }
    if let Some(sku) = &query.sku {
        params.push(("sku", sku.clone()));
    }
    if let Some(limit) = query.limit {
        params.push(("per_page", limit.to_string()));
    }
    params
}

#[async_trait]
impl CatalogUpstream for WooCommerceClient {
    async fn search(
        &self,
        resource: Resource,
        query: &SearchQuery,
    ) -> UpstreamResult<Vec<CatalogRecord>> {
        let builder = self
            .request(Method::GET, resource.path())
            .query(&search_params(query));
        let response = self.send(resource, "search", builder).await?;
        decode(response).await
    }

    async fn get(&self, resource: Resource, id: CatalogId) -> UpstreamResult<CatalogRecord> {
        let builder = self.request(Method::GET, &format!("{}/{}", resource.path(), id));
        let response = self.send(resource, "get", builder).await?;
        decode(response).await
    }

    async fn put(
        &self,
        resource: Resource,
        id: CatalogId,
        body: &JsonValue,
    ) -> UpstreamResult<CatalogRecord> {
        let builder = self
            .request(Method::PUT, &format!("{}/{}", resource.path(), id))
            .json(body);
        let response = self.send(resource, "put", builder).await?;
        decode(response).await
    }

    async fn list(
        &self,
        resource: Resource,
        page: u32,
        per_page: u32,
        params: &ListParams,
    ) -> UpstreamResult<ListPage> {
        let mut query: Vec<(&str, String)> = vec![
            ("page", page.to_string()),
            ("per_page", per_page.to_string()),
        ];
        query.extend(params.iter().map(|(k, v)| (k.as_str(), v.clone())));

        let builder = self.request(Method::GET, resource.path()).query(&query);
        let response = self.send(resource, "list", builder).await?;
        let total_pages = total_pages(&response);
        let records = decode(response).await?;

        Ok(ListPage {
            records,
            total_pages,
        })
    }
}

impl std::fmt::Debug for WooCommerceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WooCommerceClient")
            .field("base_url", &self.base_url)
            .field("consumer_key", &"[REDACTED]")
            .field("consumer_secret", &"[REDACTED]")
            .finish()
    }
}
