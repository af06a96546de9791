//! Persisted, most-recent-first search history.

use crate::error::FailOpen;
use crate::search::text::{char_len, normalize_query};
use crate::storage::HistoryStore;

/// Queries shorter than this (in chars, after trimming) are not recorded.
pub const MIN_HISTORY_QUERY_CHARS: usize = 2;

/// Search history owned by one engine and mirrored to a [`HistoryStore`].
///
/// Entries are normalized, unique, most recent first, and capped at
/// `max_entries`. Storage failures never reach the caller: a failed load
/// starts empty and a failed write leaves the history session-only.
#[derive(Debug)]
pub struct SearchHistory<S: HistoryStore> {
    store: S,
    entries: Vec<String>,
    max_entries: usize,
}

impl<S: HistoryStore> SearchHistory<S> {
    /// Load history from `store`.
    ///
    /// Loaded entries are re-normalized, deduplicated and capped, so a
    /// hand-edited or older file cannot break the invariants.
    pub fn load(store: S, max_entries: usize) -> Self {
        let max_entries = max_entries.max(1);
        let raw = store.load().fail_open_default("loading search history");

        let mut entries: Vec<String> = Vec::with_capacity(max_entries);
        for entry in raw {
            let entry = normalize_query(&entry);
            if char_len(&entry) >= MIN_HISTORY_QUERY_CHARS && !entries.contains(&entry) {
                entries.push(entry);
            }
        }
        entries.truncate(max_entries);

        Self {
            store,
            entries,
            max_entries,
        }
    }

    /// Entries, most recent first.
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Record a submitted query.
    ///
    /// Returns false when the query is too short to record.
    pub fn add(&mut self, query: &str) -> bool {
        let entry = normalize_query(query);
        if char_len(&entry) < MIN_HISTORY_QUERY_CHARS {
            return false;
        }

        self.entries.retain(|e| *e != entry);
        self.entries.insert(0, entry);
        self.entries.truncate(self.max_entries);

        self.store
            .save(&self.entries)
            .fail_open_default("saving search history");
        true
    }

    /// Forget every entry and delete the persisted key.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.store
            .remove()
            .fail_open_default("removing search history");
    }
}
