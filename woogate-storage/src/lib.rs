//! woogate storage - identifier maps on disk and in memory
//!
//! - [`MapStore`]: best-effort load/save of a name-to-ID map as a JSON file.
//!   Load and save never fail from the caller's point of view.
//! - [`IdCache`]: process-wide mapping with atomic multi-key inserts and
//!   whole-map swaps, plus hit/miss counters.
//! - [`PersistentIdCache`]: an `IdCache` whose every mutation is followed by a
//!   save of the full mapping.

pub mod id_cache;
pub mod map_store;
pub mod persistent;

pub use id_cache::{CacheStats, IdCache};
pub use map_store::{MapStore, StoreError};
pub use persistent::PersistentIdCache;

/// File name of the persisted category map inside the data directory.
pub const CATEGORY_MAP_FILE: &str = "category_map.json";

/// File name of the persisted product map inside the data directory.
pub const PRODUCT_MAP_FILE: &str = "product_map.json";
