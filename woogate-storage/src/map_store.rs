//! JSON file persistence for identifier maps.
//!
//! The file is a flat object of key to integer ID. A missing file is an empty
//! map. Any other read or parse failure is logged and also yields an empty
//! map; the resolvers repopulate it lazily.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use woogate_core::IdMap;

/// Internal persistence failures. Never returned from [`MapStore::load`] or
/// [`MapStore::save`].
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Malformed map in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// A durable record holding one identifier map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapStore {
    path: PathBuf,
}

impl MapStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the map, falling back to an empty map on any failure.
    pub fn load(&self) -> IdMap {
        match self.try_load() {
            Ok(Some(map)) => {
                tracing::info!(path = %self.path.display(), entries = map.len(), "Loaded identifier map");
                map
            }
            Ok(None) => {
                tracing::info!(path = %self.path.display(), "Identifier map not found, starting empty");
                IdMap::new()
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to load identifier map, starting empty");
                IdMap::new()
            }
        }
    }

    /// Save the map. Failures are logged and swallowed.
    pub fn save(&self, map: &IdMap) {
        match self.try_save(map) {
            Ok(()) => {
                tracing::debug!(path = %self.path.display(), entries = map.len(), "Saved identifier map");
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to save identifier map");
            }
        }
    }

    /// Load the map, reporting failures. `Ok(None)` means the file does not exist.
    pub fn try_load(&self) -> Result<Option<IdMap>, StoreError> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        // A file holding `null` is treated like an empty object.
        let map: Option<IdMap> = serde_json::from_str(&data).map_err(|source| StoreError::Parse {
            path: self.path.clone(),
            source,
        })?;
        Ok(Some(map.unwrap_or_default()))
    }

    /// Save the map atomically: write a sibling temp file, then rename it over
    /// the target. Missing parent directories are created.
    pub fn try_save(&self, map: &IdMap) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| self.io_error(source))?;
        }

        let data = serde_json::to_string_pretty(map).map_err(|source| StoreError::Parse {
            path: self.path.clone(),
            source,
        })?;

        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, data).map_err(|source| StoreError::Io {
            path: tmp_path.clone(),
            source,
        })?;

        if let Err(source) = fs::rename(&tmp_path, &self.path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(self.io_error(source));
        }
        Ok(())
    }

    fn io_error(&self, source: io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}
