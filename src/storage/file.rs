//! File-based history storage.
//!
//! The list is stored as a JSON array in `<dir>/<key>.json`, the on-disk
//! counterpart of a browser local-storage key. Writes go through a temp file
//! and rename.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::storage_dir;
use crate::error::{Result, VitrinaError};
use crate::storage::HistoryStore;
use crate::util::{read_to_string_limited, write_atomic};

/// File-based history store.
#[derive(Debug, Clone)]
pub struct FileHistoryStore {
    path: PathBuf,
}

impl FileHistoryStore {
    /// Create a store for `key` in the default storage directory.
    ///
    /// Uses `~/.vitrina/storage/` or `$VITRINA_HOME/storage/`.
    pub fn new(key: &str) -> Result<Self> {
        let dir = storage_dir().ok_or_else(|| {
            VitrinaError::config("could not determine storage directory (no home directory)")
        })?;
        Self::with_dir(dir, key)
    }

    /// Create a store for `key` in a custom directory.
    pub fn with_dir(dir: impl Into<PathBuf>, key: &str) -> Result<Self> {
        let dir = dir.into();
        if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
            return Err(VitrinaError::config(format!(
                "invalid storage key '{}'",
                key
            )));
        }

        if !dir.exists() {
            fs::create_dir_all(&dir).map_err(|e| VitrinaError::storage(&dir, e))?;
        }

        Ok(Self {
            path: dir.join(format!("{}.json", key)),
        })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HistoryStore for FileHistoryStore {
    fn load(&self) -> Result<Vec<String>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let content = read_to_string_limited(&self.path)?;
        let entries: Vec<String> = serde_json::from_str(&content)?;
        Ok(entries)
    }

    fn save(&self, entries: &[String]) -> Result<()> {
        let json = serde_json::to_string(entries)?;
        write_atomic(&self.path, &json)
    }

    fn remove(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path).map_err(|e| VitrinaError::storage(&self.path, e))?;
        }
        Ok(())
    }
}
