//! Suggest command for Vitrina.
//!
//! Prints autocomplete candidates for a partial query.

use serde::{Deserialize, Serialize};

use crate::search::SearchEngine;
use crate::storage::HistoryStore;

/// Options for the suggest command.
#[derive(Debug, Clone, Default)]
pub struct SuggestOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
}

/// Output format for the suggest command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestOutput {
    pub partial: String,
    pub count: usize,
    pub suggestions: Vec<String>,
}

/// The suggest command implementation.
pub struct SuggestCommand<S: HistoryStore> {
    engine: SearchEngine<S>,
}

impl<S: HistoryStore> SuggestCommand<S> {
    pub fn new(engine: SearchEngine<S>) -> Self {
        Self { engine }
    }

    pub fn run(&self, partial: &str) -> SuggestOutput {
        let suggestions = self.engine.suggestions(partial);
        SuggestOutput {
            partial: partial.trim().to_string(),
            count: suggestions.len(),
            suggestions,
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &SuggestOutput, options: &SuggestOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string())
        } else if output.suggestions.is_empty() {
            format!("No suggestions for \"{}\"\n", output.partial)
        } else {
            let mut text = output.suggestions.join("\n");
            text.push('\n');
            text
        }
    }
}
