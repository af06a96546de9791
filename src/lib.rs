//! Vitrina - fuzzy product search for a bilingual storefront
//!
//! Vitrina expands a query through synonym and typo-correction tables,
//! matches every expanded term approximately against the product catalog,
//! and ranks the merged hits. It also keeps a bounded search history and
//! produces autocomplete suggestions.

pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod search;
pub mod storage;
pub mod util;
pub mod verification;

pub use catalog::{Catalog, Product, ProductId};
pub use config::Config;
pub use error::{FailOpen, Result, VitrinaError};
pub use search::{
    Debouncer, Dictionary, ExpandedTerms, FuzzyMatcher, MatchSource, RankedProduct,
    SearchEngine, SearchHistory, SearchIndex, SearchResults, SearchState, SynonymGroup,
    TermExpander,
};
pub use storage::{FileHistoryStore, HistoryStore, MemoryHistoryStore};
pub use verification::{CodeStore, MessageSender, RegistrationVerifier, VerifyOutcome};

// CLI commands
pub use cli::{ExpandCommand, HistoryCommand, SearchCommand, SuggestCommand};
