//! Error types for identifier resolution and upstream calls

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::CatalogId;

/// Which kind of catalog entity a resolution was for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Category,
    Product,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Category => "category",
            EntityKind::Product => "product",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A candidate returned by an upstream search that could not be told apart
/// from its siblings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: CatalogId,
    pub name: String,
}

/// Render candidates as `'Name' (ID: 1), 'Other' (ID: 2)`.
pub fn format_candidates(candidates: &[Candidate]) -> String {
    candidates
        .iter()
        .map(|c| format!("'{}' (ID: {})", c.name, c.id))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Upstream store errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UpstreamError {
    /// The store answered with a non-success status.
    #[error("Upstream API error ({status}): {message}")]
    Status {
        status: u16,
        /// Machine-readable error code from the store, when it sent one.
        code: Option<String>,
        message: String,
    },

    /// Connection, TLS or timeout failure before a response arrived.
    #[error("Upstream request failed: {reason}")]
    Transport { reason: String },

    /// The store answered but the body could not be decoded.
    #[error("Invalid upstream response: {reason}")]
    InvalidResponse { reason: String },
}

impl UpstreamError {
    pub fn status(status: u16, code: Option<String>, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn transport(reason: impl Into<String>) -> Self {
        Self::Transport {
            reason: reason.into(),
        }
    }

    pub fn invalid_response(reason: impl Into<String>) -> Self {
        Self::InvalidResponse {
            reason: reason.into(),
        }
    }

    /// HTTP status reported by the store, if any.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            UpstreamError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Store-specific error code, if any.
    pub fn upstream_code(&self) -> Option<&str> {
        match self {
            UpstreamError::Status { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}

/// Failures of category/product identifier resolution.
///
/// Every variant reaches the caller; none are swallowed by the resolvers.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("{} not found: '{identifier}'", capitalize(.kind.as_str()))]
    NotFound { kind: EntityKind, identifier: String },

    #[error(
        "Ambiguous {kind} identifier: '{identifier}'. Found multiple possible matches: {}",
        format_candidates(.candidates)
    )]
    Ambiguous {
        kind: EntityKind,
        identifier: String,
        candidates: Vec<Candidate>,
    },

    #[error("Failed to retrieve {kind} ID for '{identifier}'. Reason: {source}")]
    Upstream {
        kind: EntityKind,
        identifier: String,
        #[source]
        source: UpstreamError,
    },
}

impl ResolveError {
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    pub fn not_found(kind: EntityKind, identifier: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            identifier: identifier.into(),
        }
    }

    pub fn ambiguous(
        kind: EntityKind,
        identifier: impl Into<String>,
        candidates: Vec<Candidate>,
    ) -> Self {
        Self::Ambiguous {
            kind,
            identifier: identifier.into(),
            candidates,
        }
    }

    pub fn upstream(kind: EntityKind, identifier: impl Into<String>, source: UpstreamError) -> Self {
        Self::Upstream {
            kind,
            identifier: identifier.into(),
            source,
        }
    }

    /// Short label used for metrics and logs.
    pub fn outcome_label(&self) -> &'static str {
        match self {
            ResolveError::InvalidInput { .. } => "invalid_input",
            ResolveError::NotFound { .. } => "not_found",
            ResolveError::Ambiguous { .. } => "ambiguous",
            ResolveError::Upstream { .. } => "upstream_error",
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
