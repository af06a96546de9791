//! History command for Vitrina.
//!
//! Lists or clears the persisted search history.

use serde::{Deserialize, Serialize};

use crate::search::SearchHistory;
use crate::storage::HistoryStore;

/// What to do with the history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoryAction {
    #[default]
    List,
    Clear,
}

/// Options for the history command.
#[derive(Debug, Clone, Default)]
pub struct HistoryOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
}

/// Output format for the history command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryOutput {
    /// "list" or "clear".
    pub action: String,
    /// Entries, most recent first. Empty after a clear.
    pub entries: Vec<String>,
    /// Entries removed by a clear.
    pub cleared: usize,
}

/// The history command implementation.
pub struct HistoryCommand<S: HistoryStore> {
    history: SearchHistory<S>,
}

impl<S: HistoryStore> HistoryCommand<S> {
    pub fn new(history: SearchHistory<S>) -> Self {
        Self { history }
    }

    pub fn run(&mut self, action: HistoryAction) -> HistoryOutput {
        match action {
            HistoryAction::List => HistoryOutput {
                action: "list".to_string(),
                entries: self.history.entries().to_vec(),
                cleared: 0,
            },
            HistoryAction::Clear => {
                let cleared = self.history.entries().len();
                self.history.clear();
                HistoryOutput {
                    action: "clear".to_string(),
                    entries: Vec::new(),
                    cleared,
                }
            }
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &HistoryOutput, options: &HistoryOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            return serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string());
        }

        if output.action == "clear" {
            return format!("Cleared {} history entr{}\n", output.cleared, plural(output.cleared));
        }

        if output.entries.is_empty() {
            return "No search history.\n".to_string();
        }

        let mut lines: Vec<String> = output
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| format!("{:>2}. {}", i + 1, entry))
            .collect();
        lines.push(String::new());
        lines.join("\n")
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        "y"
    } else {
        "ies"
    }
}
