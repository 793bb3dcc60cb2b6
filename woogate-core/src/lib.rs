//! woogate core - catalog types and resolution policy
//!
//! Shared vocabulary for the gateway:
//! - [`CatalogRecord`]: a category or product as the upstream store returns it
//! - [`CatalogUpstream`]: the contract the resolvers need from the store API
//! - [`select_candidate`]: the exact-match / sole-candidate / ambiguous policy
//! - [`ResolveError`] and [`UpstreamError`]: the failure taxonomy
//!
//! Nothing in this crate performs IO.

pub mod error;
pub mod record;
pub mod select;
pub mod upstream;

use std::collections::BTreeMap;

pub use error::{format_candidates, Candidate, EntityKind, ResolveError, UpstreamError};
pub use record::CatalogRecord;
pub use select::{names_match, select_candidate, Selection};
pub use upstream::{CatalogUpstream, ListPage, ListParams, Resource, SearchQuery};

/// Numeric identifier assigned by the upstream store.
pub type CatalogId = u64;

/// Lookup key to upstream ID. Keys are exact, case-sensitive strings.
///
/// Ordered so that persisted maps are stable on disk.
pub type IdMap = BTreeMap<String, CatalogId>;

/// Result of a resolution.
pub type ResolveResult<T> = Result<T, ResolveError>;

/// Result of a call to the upstream store.
pub type UpstreamResult<T> = Result<T, UpstreamError>;
