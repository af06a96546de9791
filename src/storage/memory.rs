//! In-memory history storage for testing.

use std::sync::RwLock;

use crate::error::Result;
use crate::storage::HistoryStore;

/// In-memory history store.
///
/// Keeps the difference between a removed key (`None`) and a saved empty
/// list, which is what the file store does on disk.
#[derive(Debug, Default)]
pub struct MemoryHistoryStore {
    entries: RwLock<Option<Vec<String>>>,
}

impl MemoryHistoryStore {
    /// Create a store with nothing saved.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(None),
        }
    }

    /// Create a store that already holds `entries`.
    pub fn with_entries(entries: Vec<String>) -> Self {
        Self {
            entries: RwLock::new(Some(entries)),
        }
    }

    /// Whether a list is currently saved under the key.
    pub fn is_present(&self) -> bool {
        self.entries.read().unwrap().is_some()
    }
}

impl HistoryStore for MemoryHistoryStore {
    fn load(&self) -> Result<Vec<String>> {
        Ok(self.entries.read().unwrap().clone().unwrap_or_default())
    }

    fn save(&self, entries: &[String]) -> Result<()> {
        *self.entries.write().unwrap() = Some(entries.to_vec());
        Ok(())
    }

    fn remove(&self) -> Result<()> {
        *self.entries.write().unwrap() = None;
        Ok(())
    }
}
