use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::util::atomic::atomic_write;

/// Dedup key to the id of the Todoist task created for it.
pub type ItemTaskMapping = BTreeMap<String, u64>;

#[derive(Debug, Error)]
pub enum MappingError {
    #[error("failed to read mapping {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid JSON for mapping {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write mapping {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Persists which GitHub items already have a Todoist task.
pub struct MappingStore {
    path: PathBuf,
}

impl MappingStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing file reads as empty. Unreadable or malformed content is an error,
    /// so a damaged file never gets silently replaced by an empty mapping.
    pub fn load(&self) -> Result<ItemTaskMapping, MappingError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(ItemTaskMapping::new()),
            Err(source) => {
                return Err(MappingError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        serde_json::from_str(&contents).map_err(|source| MappingError::Json {
            path: self.path.clone(),
            source,
        })
    }

    /// Rewrites the whole file atomically.
    pub fn save(&self, mapping: &ItemTaskMapping) -> Result<(), MappingError> {
        let json = serde_json::to_string_pretty(mapping).map_err(|source| MappingError::Json {
            path: self.path.clone(),
            source,
        })?;
        atomic_write(&self.path, &json).map_err(|source| MappingError::Write {
            path: self.path.clone(),
            source,
        })
    }
}
