//! Expand command for Vitrina.
//!
//! Shows the terms a query expands to, in match order.

use serde::{Deserialize, Serialize};

use crate::search::text::normalize_query;
use crate::search::TermExpander;

/// Options for the expand command.
#[derive(Debug, Clone, Default)]
pub struct ExpandOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
}

/// Output format for the expand command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpandOutput {
    pub query: String,
    pub terms: Vec<String>,
    /// Typo corrections applied to query tokens, as (typo, fix).
    pub corrections: Vec<(String, String)>,
}

/// The expand command implementation.
pub struct ExpandCommand {
    expander: TermExpander,
}

impl ExpandCommand {
    pub fn new(expander: TermExpander) -> Self {
        Self { expander }
    }

    pub fn run(&self, query: &str) -> ExpandOutput {
        let query = normalize_query(query);
        let terms = self.expander.expand(&query);

        let dictionary = self.expander.dictionary();
        let corrections = query
            .split_whitespace()
            .filter_map(|token| {
                dictionary
                    .correction(token)
                    .map(|fix| (token.to_string(), fix.to_string()))
            })
            .collect();

        ExpandOutput {
            query,
            terms: terms.into_iter().filter(|t| !t.is_empty()).collect(),
            corrections,
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &ExpandOutput, options: &ExpandOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            return serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string());
        }

        if output.terms.is_empty() {
            return "Nothing to expand.\n".to_string();
        }

        let mut lines = vec![format!(
            "\"{}\" expands to {} term(s):",
            output.query,
            output.terms.len()
        )];
        for (i, term) in output.terms.iter().enumerate() {
            lines.push(format!("  {}. {}", i + 1, term));
        }
        for (typo, fix) in &output.corrections {
            lines.push(format!("Corrected: {} -> {}", typo, fix));
        }
        lines.push(String::new());
        lines.join("\n")
    }
}
