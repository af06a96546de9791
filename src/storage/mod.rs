//! Durable storage for the search history list.
//!
//! The search engine only sees the [`HistoryStore`] trait, so it can be
//! driven by a file on disk in the CLI and by memory in tests.

pub mod file;
pub mod memory;
pub mod traits;

pub use file::FileHistoryStore;
pub use memory::MemoryHistoryStore;
pub use traits::HistoryStore;
