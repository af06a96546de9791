//! Search command for Vitrina.
//!
//! Runs a query through the search engine and prints the ranked products.

use serde::{Deserialize, Serialize};

use crate::search::{MatchSource, RankedProduct, SearchEngine, SearchState};
use crate::storage::HistoryStore;

/// Options for the search command.
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
    /// Maximum number of results.
    pub limit: Option<usize>,
    /// Do not record the query in history.
    pub no_history: bool,
}

/// Output format for the search command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchOutput {
    pub success: bool,
    /// The normalized query.
    pub query: String,
    /// "idle" for an empty query, "searching" otherwise.
    pub state: String,
    /// Number of results shown.
    pub count: usize,
    /// Number of results before the limit was applied.
    pub total: usize,
    pub results: Vec<ProductInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// One ranked product for output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    /// Lower is better.
    pub score: f64,
    /// "unfiltered", "fuzzy" or "fallback".
    pub matched_by: String,
    /// Expanded term that matched, for fuzzy hits.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub term: Option<String>,
}

impl From<&RankedProduct<'_>> for ProductInfo {
    fn from(hit: &RankedProduct<'_>) -> Self {
        let (matched_by, term) = match &hit.source {
            MatchSource::Unfiltered => ("unfiltered", None),
            MatchSource::Fuzzy { term } => ("fuzzy", Some(term.clone())),
            MatchSource::Fallback => ("fallback", None),
        };
        Self {
            id: hit.product.id.to_string(),
            name: hit.product.name.clone(),
            description: hit.product.description.clone(),
            category: hit.product.category.clone(),
            score: hit.score,
            matched_by: matched_by.to_string(),
            term,
        }
    }
}

impl SearchOutput {
    pub fn success(
        query: impl Into<String>,
        state: SearchState,
        total: usize,
        results: Vec<ProductInfo>,
    ) -> Self {
        let state = match state {
            SearchState::Idle => "idle",
            SearchState::Searching => "searching",
        };
        Self {
            success: true,
            query: query.into(),
            state: state.to_string(),
            count: results.len(),
            total,
            results,
            error: None,
        }
    }

    pub fn failure(query: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            query: query.into(),
            state: "idle".to_string(),
            count: 0,
            total: 0,
            results: Vec::new(),
            error: Some(error.into()),
        }
    }
}

/// The search command implementation.
pub struct SearchCommand<S: HistoryStore> {
    engine: SearchEngine<S>,
}

impl<S: HistoryStore> SearchCommand<S> {
    pub fn new(engine: SearchEngine<S>) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &SearchEngine<S> {
        &self.engine
    }

    /// Run the search command with the given query.
    pub fn run(&mut self, query: &str, options: &SearchOptions) -> SearchOutput {
        if !options.no_history {
            self.engine.add_to_history(query);
        }

        let results = self.engine.search_ranked(query);
        let total = results.len();
        let limit = options.limit.unwrap_or(usize::MAX);
        let infos: Vec<ProductInfo> = results.hits.iter().take(limit).map(ProductInfo::from).collect();

        SearchOutput::success(results.query, results.state, total, infos)
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &SearchOutput, options: &SearchOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string())
        } else {
            self.format_human_readable(output)
        }
    }

    fn format_human_readable(&self, output: &SearchOutput) -> String {
        if !output.success {
            return format!(
                "Search failed: {}\n",
                output.error.as_deref().unwrap_or("unknown error")
            );
        }

        if output.results.is_empty() {
            if output.state == "idle" {
                return "The catalog is empty.\n".to_string();
            }
            return format!("No products found for \"{}\"\n", output.query);
        }

        let mut lines = Vec::new();
        if output.state == "idle" {
            lines.push(format!("{} product(s) in catalog\n", output.total));
        } else {
            lines.push(format!(
                "Found {} product(s) for \"{}\"\n",
                output.total, output.query
            ));
        }

        for (i, result) in output.results.iter().enumerate() {
            let mut headline = format!("{}. {}", i + 1, result.name);
            if !result.category.is_empty() {
                headline.push_str(&format!(" [{}]", result.category));
            }
            if output.state != "idle" {
                headline.push_str(&format!(" (score: {:.3})", result.score));
            }
            lines.push(headline);

            if !result.description.is_empty() {
                lines.push(format!("   {}", result.description));
            }
            match &result.term {
                Some(term) => lines.push(format!("   ID: {} | matched \"{}\"", result.id, term)),
                None if result.matched_by == "fallback" => {
                    lines.push(format!("   ID: {} | text match", result.id))
                }
                None => lines.push(format!("   ID: {}", result.id)),
            }
            lines.push(String::new());
        }

        if output.count < output.total {
            lines.push(format!("... {} more", output.total - output.count));
        }

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Product;
    use crate::config::Config;
    use crate::search::Dictionary;
    use crate::storage::MemoryHistoryStore;

    fn command() -> SearchCommand<MemoryHistoryStore> {
        let products = vec![
            Product::new(1, "Refrigerador LG", "Dos puertas", "Electrodomésticos"),
            Product::new(2, "Celular Samsung", "Pantalla AMOLED", "Telefonía"),
            Product::new(3, "Hotel Antigua", "Desayuno incluido", "Hoteles"),
        ];
        SearchCommand::new(SearchEngine::new(
            products,
            Dictionary::builtin(),
            &Config::default(),
            MemoryHistoryStore::new(),
        ))
    }

    #[test]
    fn test_search_finds_synonym() {
        let mut cmd = command();
        let output = cmd.run("nevera", &SearchOptions::default());

        assert!(output.success);
        assert_eq!(output.state, "searching");
        assert_eq!(output.results[0].id, "1");
        assert_eq!(output.results[0].matched_by, "fuzzy");
    }

    #[test]
    fn test_search_records_history() {
        let mut cmd = command();
        cmd.run("Nevera", &SearchOptions::default());
        assert_eq!(cmd.engine().history(), &["nevera".to_string()]);
    }

    #[test]
    fn test_search_no_history() {
        let mut cmd = command();
        let options = SearchOptions {
            no_history: true,
            ..Default::default()
        };
        cmd.run("nevera", &options);
        assert!(cmd.engine().history().is_empty());
    }

    #[test]
    fn test_empty_query_lists_catalog() {
        let mut cmd = command();
        let output = cmd.run("  ", &SearchOptions::default());

        assert_eq!(output.state, "idle");
        assert_eq!(output.count, 3);
        assert!(output.results.iter().all(|r| r.matched_by == "unfiltered"));
        assert!(cmd.engine().history().is_empty());
    }

    #[test]
    fn test_search_with_limit() {
        let mut cmd = command();
        let options = SearchOptions {
            limit: Some(1),
            ..Default::default()
        };
        let output = cmd.run("", &options);

        assert_eq!(output.count, 1);
        assert_eq!(output.total, 3);
    }

    #[test]
    fn test_search_no_results() {
        let mut cmd = command();
        let output = cmd.run("xyzzynomatch", &SearchOptions::default());
        assert!(output.success);
        assert_eq!(output.count, 0);
    }

    #[test]
    fn test_format_output_json() {
        let mut cmd = command();
        let output = cmd.run("hotel", &SearchOptions::default());
        let options = SearchOptions {
            json: true,
            ..Default::default()
        };

        let formatted = cmd.format_output(&output, &options);
        assert!(formatted.contains("\"success\": true"));
        assert!(formatted.contains("\"query\": \"hotel\""));
        assert!(formatted.contains("\"matched_by\": \"fuzzy\""));
    }

    #[test]
    fn test_format_output_quiet() {
        let cmd = command();
        let output = SearchOutput::success("hotel", SearchState::Searching, 0, vec![]);
        let options = SearchOptions {
            quiet: true,
            ..Default::default()
        };
        assert!(cmd.format_output(&output, &options).is_empty());
    }

    #[test]
    fn test_format_output_human_readable() {
        let mut cmd = command();
        let output = cmd.run("hotel", &SearchOptions::default());
        let formatted = cmd.format_output(&output, &SearchOptions::default());

        assert!(formatted.contains("product(s) for \"hotel\""));
        assert!(formatted.contains("1. Hotel Antigua [Hoteles]"));
        assert!(formatted.contains("matched \"hotel\""));
    }

    #[test]
    fn test_format_output_no_results() {
        let cmd = command();
        let output = SearchOutput::success("tikal", SearchState::Searching, 0, vec![]);
        let formatted = cmd.format_output(&output, &SearchOptions::default());
        assert!(formatted.contains("No products found"));
    }

    #[test]
    fn test_format_output_failure() {
        let cmd = command();
        let output = SearchOutput::failure("hotel", "catalog not found");
        let formatted = cmd.format_output(&output, &SearchOptions::default());
        assert!(formatted.contains("Search failed: catalog not found"));
    }
}
