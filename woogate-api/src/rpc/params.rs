//! Typed access to JSON-RPC `params`.

use serde_json::{Map, Value as JsonValue};
use woogate_core::CatalogId;

use crate::error::{ApiError, ApiResult};

/// Borrowed view over a params object. Absent params behave like `{}`.
#[derive(Debug, Clone, Copy)]
pub struct Params<'a> {
    inner: Option<&'a Map<String, JsonValue>>,
}

impl<'a> Params<'a> {
    /// # Errors
    /// `InvalidParams` when `params` is present but not an object.
    pub fn new(params: &'a JsonValue) -> ApiResult<Self> {
        match params {
            JsonValue::Null => Ok(Self { inner: None }),
            JsonValue::Object(map) => Ok(Self { inner: Some(map) }),
            _ => Err(ApiError::invalid_params("params must be an object")),
        }
    }

    pub fn from_map(map: &'a Map<String, JsonValue>) -> Self {
        Self { inner: Some(map) }
    }

    pub fn get(&self, name: &str) -> Option<&'a JsonValue> {
        self.inner.and_then(|map| map.get(name))
    }

    /// A positive integer given as a number or a numeric string. `0`, `""`
    /// and `null` count as absent.
    pub fn positive_int(&self, name: &str) -> ApiResult<Option<u64>> {
        let invalid = || ApiError::invalid_params(format!("{} must be a positive integer", name));
        match self.get(name) {
            None | Some(JsonValue::Null) => Ok(None),
            Some(JsonValue::Number(n)) => match n.as_u64() {
                Some(0) => Ok(None),
                Some(v) => Ok(Some(v)),
                None => Err(invalid()),
            },
            Some(JsonValue::String(s)) => {
                let s = s.trim();
                if s.is_empty() {
                    return Ok(None);
                }
                match s.parse::<u64>() {
                    Ok(0) => Ok(None),
                    Ok(v) => Ok(Some(v)),
                    Err(_) => Err(invalid()),
                }
            }
            Some(_) => Err(invalid()),
        }
    }

    pub fn id(&self, name: &str) -> ApiResult<Option<CatalogId>> {
        self.positive_int(name)
    }

    /// A page number or size, bounded to `u32`.
    pub fn page_number(&self, name: &str) -> ApiResult<Option<u32>> {
        match self.positive_int(name)? {
            None => Ok(None),
            Some(v) => u32::try_from(v)
                .map(Some)
                .map_err(|_| ApiError::invalid_params(format!("{} is too large", name))),
        }
    }

    /// A non-empty string. Numbers are accepted and rendered as text.
    pub fn text(&self, name: &str) -> ApiResult<Option<String>> {
        match self.get(name) {
            None | Some(JsonValue::Null) => Ok(None),
            Some(JsonValue::String(s)) if s.is_empty() => Ok(None),
            Some(JsonValue::String(s)) => Ok(Some(s.clone())),
            Some(JsonValue::Number(n)) => Ok(Some(n.to_string())),
            Some(_) => Err(ApiError::invalid_params(format!("{} must be a string", name))),
        }
    }

    /// A nested object, absent when missing or `null`.
    pub fn object(&self, name: &str) -> ApiResult<Option<&'a Map<String, JsonValue>>> {
        match self.get(name) {
            None | Some(JsonValue::Null) => Ok(None),
            Some(JsonValue::Object(map)) => Ok(Some(map)),
            Some(_) => Err(ApiError::invalid_params(format!("{} must be an object", name))),
        }
    }
}

/// How a product call names its target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductTarget {
    Id(CatalogId),
    /// Name or SKU, resolved through the product resolver.
    Identifier(String),
}

/// `productId` wins, then `product_name`, then `product_sku`.
///
/// # Errors
/// `InvalidParams` naming `method` when none is given.
pub fn product_target(params: &Params<'_>, method: &str) -> ApiResult<ProductTarget> {
    if let Some(id) = params.id("productId")? {
        return Ok(ProductTarget::Id(id));
    }
    let identifier = match params.text("product_name")? {
        Some(name) => Some(name),
        None => params.text("product_sku")?,
    };
    identifier.map(ProductTarget::Identifier).ok_or_else(|| {
        ApiError::invalid_params(format!(
            "productId, product_name, or product_sku is required for {}",
            method
        ))
    })
}

/// Render a filter value as a query parameter. Arrays become
/// comma-separated lists.
pub fn query_value(name: &str, value: &JsonValue) -> ApiResult<Option<String>> {
    match value {
        JsonValue::Null => Ok(None),
        JsonValue::String(s) => Ok(Some(s.clone())),
        JsonValue::Number(n) => Ok(Some(n.to_string())),
        JsonValue::Bool(b) => Ok(Some(b.to_string())),
        JsonValue::Array(items) => {
            let mut parts = Vec::with_capacity(items.len());
            for item in items {
                match query_value(name, item)? {
                    Some(part) if !matches!(item, JsonValue::Array(_)) => parts.push(part),
                    Some(_) | None => {
                        return Err(ApiError::invalid_params(format!(
                            "filter {} must hold scalar values",
                            name
                        )))
                    }
                }
            }
            Ok(Some(parts.join(",")))
        }
        JsonValue::Object(_) => Err(ApiError::invalid_params(format!(
            "filter {} must not be an object",
            name
        ))),
    }
}
