//! CLI commands for Vitrina.
//!
//! - **Search commands**: search, suggest, expand
//! - **History command**: history list / clear

pub mod expand;
pub mod history;
pub mod search;
pub mod suggest;

pub use expand::ExpandCommand;
pub use history::HistoryCommand;
pub use search::SearchCommand;
pub use suggest::SuggestCommand;
