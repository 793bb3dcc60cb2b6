//! Catalog records as returned by the upstream store

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::error::Candidate;
use crate::CatalogId;

/// A category or product record.
///
/// Only the fields the resolvers need are typed; everything else the store
/// sends is kept in `extra` so pass-through calls return the record intact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogRecord {
    pub id: CatalogId,

    #[serde(default)]
    pub name: String,

    /// Products only. The store sends `""` for products without a SKU.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl CatalogRecord {
    pub fn new(id: CatalogId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            sku: None,
            extra: Map::new(),
        }
    }

    pub fn with_sku(mut self, sku: impl Into<String>) -> Self {
        self.sku = Some(sku.into());
        self
    }

    /// The SKU, treating an empty string as absent.
    pub fn sku(&self) -> Option<&str> {
        self.sku.as_deref().filter(|s| !s.is_empty())
    }

    /// The name, treating an empty string as absent.
    pub fn name(&self) -> Option<&str> {
        Some(self.name.as_str()).filter(|s| !s.is_empty())
    }

    pub fn candidate(&self) -> Candidate {
        Candidate {
            id: self.id,
            name: self.name.clone(),
        }
    }

    /// Decode a raw upstream JSON value.
    pub fn from_value(value: JsonValue) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }
}
