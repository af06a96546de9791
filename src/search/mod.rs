//! Fuzzy product search.
//!
//! A query flows through three stages:
//!
//! 1. [`TermExpander`] turns the raw query into an ordered set of terms
//!    (the query itself, typo corrections and synonym groups).
//! 2. [`FuzzyMatcher`] scores each term against a [`SearchIndex`] built
//!    from the catalog snapshot.
//! 3. [`SearchEngine`] merges per-term hits, falls back to plain substring
//!    search when nothing matched, and ranks the result.
//!
//! The engine also owns search history and produces autocomplete
//! suggestions. [`Debouncer`] paces suggestion requests for interactive
//! front ends.

pub mod debounce;
pub mod dictionary;
pub mod engine;
pub mod expander;
pub mod history;
pub mod matcher;
pub mod text;

pub use debounce::{Debouncer, Ticket};
pub use dictionary::{Dictionary, SynonymGroup};
pub use engine::{MatchSource, RankedProduct, SearchEngine, SearchResults, SearchState};
pub use expander::{ExpandedTerms, TermExpander};
pub use history::SearchHistory;
pub use matcher::{FuzzyMatcher, Hit, MatchOptions, SearchIndex};
