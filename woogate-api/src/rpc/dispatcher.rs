//! Method dispatch
//!
//! Routes a validated call to the resolver, refresh procedure or upstream
//! operation it names.

use serde_json::{json, Value as JsonValue};
use woogate_core::{CatalogId, ListParams, Resource, UpstreamError};

use super::params::{product_target, query_value, Params, ProductTarget};
use crate::error::{ApiError, ApiResult};
use crate::services::{
    refresh_category_cache, refresh_product_map, resolve_category_id, resolve_product_id,
    CatalogServices,
};
use crate::telemetry::metrics;

/// Default page size for `get_products`.
pub const DEFAULT_PER_PAGE: u32 = 10;

/// Methods this gateway answers.
pub const SUPPORTED_METHODS: &[&str] = &[
    "get_products",
    "get_product",
    "update_product",
    "refresh_category_cache",
    "refresh_product_map",
];

const INVALID_TERM_CODE: &str = "woocommerce_rest_invalid_term";

/// Execute one RPC method.
///
/// # Errors
/// Any resolution, validation or upstream failure, already mapped to an
/// [`ApiError`] with its JSON-RPC code.
pub async fn dispatch(
    services: &CatalogServices,
    method: &str,
    params: &JsonValue,
) -> ApiResult<JsonValue> {
    tracing::debug!(method = %method, "Dispatching RPC call");

    let result = execute(services, method, params).await;

    let label = if SUPPORTED_METHODS.contains(&method) {
        method
    } else {
        "unsupported"
    };
    let outcome = match &result {
        Ok(_) => "success",
        Err(err) => err.code.label(),
    };
    if let Some(metrics) = metrics() {
        metrics.record_rpc_call(label, outcome);
    }

    if let Err(err) = &result {
        tracing::warn!(method = %method, code = %err.code, error = %err.message, "RPC call failed");
    }
    result
}

async fn execute(
    services: &CatalogServices,
    method: &str,
    params: &JsonValue,
) -> ApiResult<JsonValue> {
    match method {
        "get_products" => get_products(services, Params::new(params)?).await,
        "get_product" => {
            let params = Params::new(params)?;
            let id = product_id(services, &params, method).await?;
            let product = services.upstream().get(Resource::Products, id).await?;
            Ok(serde_json::to_value(product)?)
        }
        "update_product" => {
            let params = Params::new(params)?;
            let data = params.object("productData")?.ok_or_else(|| {
                ApiError::invalid_params("productData object is required for update_product")
            })?;
            let id = product_id(services, &params, method).await?;
            let body = JsonValue::Object(data.clone());
            let product = services.upstream().put(Resource::Products, id, &body).await?;
            tracing::info!(product_id = id, "Product updated");
            Ok(serde_json::to_value(product)?)
        }
        "refresh_category_cache" => {
            let refresh = refresh_category_cache(services).await.map_err(|err| {
                ApiError::upstream(
                    format!("Failed to refresh category cache. Reason: {}", err),
                    &err,
                )
            })?;
            Ok(json!({
                "status": "success",
                "message": format!(
                    "Category cache refreshed successfully. In-memory cache has {} categories.",
                    refresh.count
                ),
                "count": refresh.count,
            }))
        }
        "refresh_product_map" => {
            let refresh = refresh_product_map(services).await.map_err(|err| {
                ApiError::upstream(format!("Failed to refresh product map. Reason: {}", err), &err)
            })?;
            Ok(json!({
                "status": "success",
                "message": format!(
                    "Product map refreshed successfully. Stored {} mappings for {} products.",
                    refresh.mapping_count, refresh.product_count
                ),
                "productCount": refresh.product_count,
                "mappingCount": refresh.mapping_count,
            }))
        }
        _ => Err(ApiError::unsupported_method(method)),
    }
}

async fn product_id(
    services: &CatalogServices,
    params: &Params<'_>,
    method: &str,
) -> ApiResult<CatalogId> {
    match product_target(params, method)? {
        ProductTarget::Id(id) => Ok(id),
        ProductTarget::Identifier(identifier) => {
            Ok(resolve_product_id(services, identifier.as_str()).await?)
        }
    }
}

async fn get_products(services: &CatalogServices, params: Params<'_>) -> ApiResult<JsonValue> {
    let category = match params.id("category_id")? {
        Some(id) => Some(id),
        None => match params.text("category_name")? {
            Some(name) => Some(resolve_category_id(services, &name).await?),
            None => None,
        },
    };

    let mut page = params.page_number("page")?.unwrap_or(1);
    let mut per_page = params.page_number("perPage")?.unwrap_or(DEFAULT_PER_PAGE);

    let mut query = ListParams::new();
    if let Some(category) = category {
        query.insert("category".to_string(), category.to_string());
    }

    // Filters are applied last and override the defaults above.
    if let Some(filters) = params.object("filters")? {
        let filter_params = Params::from_map(filters);
        for (key, value) in filters {
            match key.as_str() {
                "page" => page = filter_params.page_number(key)?.unwrap_or(page),
                "per_page" => per_page = filter_params.page_number(key)?.unwrap_or(per_page),
                _ => {
                    if let Some(value) = query_value(key, value)? {
                        query.insert(key.clone(), value);
                    }
                }
            }
        }
    }

    let listing = services
        .upstream()
        .list(Resource::Products, page, per_page, &query)
        .await
        .map_err(products_error)?;

    tracing::debug!(
        category = ?category,
        page,
        per_page,
        returned = listing.records.len(),
        "Listed products"
    );
    Ok(serde_json::to_value(listing.records)?)
}

fn products_error(err: UpstreamError) -> ApiError {
    if err.upstream_code() == Some(INVALID_TERM_CODE) {
        if let Some(status) = err.http_status() {
            return ApiError::upstream(
                format!(
                    "Upstream API error ({}): Invalid category specified. It might not exist or the ID is incorrect.",
                    status
                ),
                &err,
            );
        }
    }
    err.into()
}
