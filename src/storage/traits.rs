//! History storage trait.

use std::sync::Arc;

use crate::error::Result;

/// Persistence for the ordered search history list.
///
/// A store holds one list under one key. `remove` deletes the key entirely,
/// which is distinct from saving an empty list.
pub trait HistoryStore: Send + Sync {
    /// Load the persisted list.
    ///
    /// Returns an empty list when nothing has been saved.
    fn load(&self) -> Result<Vec<String>>;

    /// Replace the persisted list.
    fn save(&self, entries: &[String]) -> Result<()>;

    /// Delete the persisted key.
    ///
    /// Returns `Ok(())` even if nothing was saved.
    fn remove(&self) -> Result<()>;
}

/// Blanket implementation of HistoryStore for Arc-wrapped stores.
///
/// Lets tests keep a handle on the store they hand to the engine.
impl<T: HistoryStore + ?Sized> HistoryStore for Arc<T> {
    fn load(&self) -> Result<Vec<String>> {
        (**self).load()
    }

    fn save(&self, entries: &[String]) -> Result<()> {
        (**self).save(entries)
    }

    fn remove(&self) -> Result<()> {
        (**self).remove()
    }
}

impl<T: HistoryStore + ?Sized> HistoryStore for Box<T> {
    fn load(&self) -> Result<Vec<String>> {
        (**self).load()
    }

    fn save(&self, entries: &[String]) -> Result<()> {
        (**self).save(entries)
    }

    fn remove(&self) -> Result<()> {
        (**self).remove()
    }
}

/// Test utilities for HistoryStore implementations.
#[cfg(test)]
pub mod tests {
    use super::*;

    /// Exercise save, load, overwrite and remove on any store.
    pub fn test_history_store_round_trip<S: HistoryStore>(store: &S) {
        // Nothing saved yet
        assert!(store.load().unwrap().is_empty());

        let entries = vec!["nevera".to_string(), "celular".to_string()];
        store.save(&entries).unwrap();
        assert_eq!(store.load().unwrap(), entries);

        // Save replaces, never appends
        store.save(&["hotel".to_string()]).unwrap();
        assert_eq!(store.load().unwrap(), vec!["hotel".to_string()]);

        store.remove().unwrap();
        assert!(store.load().unwrap().is_empty());

        // Removing twice succeeds
        store.remove().unwrap();
    }
}
