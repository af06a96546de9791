//! Search orchestration: expansion, fuzzy matching, fallback and ranking.

use std::collections::HashSet;

use indexmap::IndexMap;
use serde::Serialize;

use crate::catalog::{Catalog, Product, ProductId};
use crate::config::{Config, SearchConfig, SuggestionConfig};
use crate::search::dictionary::Dictionary;
use crate::search::expander::{ExpandedTerms, TermExpander};
use crate::search::history::SearchHistory;
use crate::search::matcher::{FuzzyMatcher, MatchOptions, SearchIndex};
use crate::search::text::{char_len, contains_either_way, normalize_query};
use crate::storage::HistoryStore;

/// Whether the last query filtered the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchState {
    /// Empty query: the unfiltered catalog.
    Idle,
    /// Non-empty query: ranked matches.
    Searching,
}

/// How a product got into the result list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum MatchSource {
    Unfiltered,
    /// First expanded term that matched the product.
    Fuzzy { term: String },
    /// Plain substring match after fuzzy matching found nothing.
    Fallback,
}

/// One ranked result.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedProduct<'a> {
    pub product: &'a Product,
    /// Lower is better.
    pub score: f64,
    pub source: MatchSource,
}

/// Ranked results for one query.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResults<'a> {
    pub state: SearchState,
    pub query: String,
    pub hits: Vec<RankedProduct<'a>>,
}

impl<'a> SearchResults<'a> {
    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// The products in rank order.
    pub fn into_products(self) -> Vec<&'a Product> {
        self.hits.into_iter().map(|hit| hit.product).collect()
    }
}

/// The search orchestrator.
///
/// Owns a catalog snapshot with its index, the expansion tables and the
/// search history. `search` and `suggestions` never fail: matcher and
/// storage errors are logged and recovered.
#[derive(Debug)]
pub struct SearchEngine<S: HistoryStore> {
    products: Vec<Product>,
    index: SearchIndex,
    expander: TermExpander,
    matcher: FuzzyMatcher,
    history: SearchHistory<S>,
    search_config: SearchConfig,
    suggestion_config: SuggestionConfig,
}

impl<S: HistoryStore> SearchEngine<S> {
    /// Build an engine and load history from `store`.
    pub fn new(
        catalog: impl Into<Catalog>,
        dictionary: Dictionary,
        config: &Config,
        store: S,
    ) -> Self {
        let products = catalog.into().into_products();
        let index = SearchIndex::build(&products);
        Self {
            products,
            index,
            expander: TermExpander::new(dictionary),
            matcher: FuzzyMatcher::new(MatchOptions::from(&config.search)),
            history: SearchHistory::load(store, config.history.max_entries),
            search_config: config.search.clone(),
            suggestion_config: config.suggestions.clone(),
        }
    }

    /// The current catalog snapshot, in catalog order.
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Swap in a new catalog snapshot and rebuild the index.
    pub fn replace_catalog(&mut self, catalog: impl Into<Catalog>) {
        self.products = catalog.into().into_products();
        self.index = SearchIndex::build(&self.products);
        tracing::debug!(products = self.products.len(), "rebuilt search index");
    }

    pub fn dictionary(&self) -> &Dictionary {
        self.expander.dictionary()
    }

    /// Expanded terms for `query`.
    pub fn expand(&self, query: &str) -> ExpandedTerms {
        self.expander.expand(query)
    }

    /// Products matching `query`, best first.
    ///
    /// An empty or whitespace-only query returns the whole catalog in
    /// catalog order.
    pub fn search(&self, query: &str) -> Vec<&Product> {
        self.search_ranked(query).into_products()
    }

    /// Like [`search`](Self::search), with state, scores and match sources.
    pub fn search_ranked(&self, query: &str) -> SearchResults<'_> {
        let normalized = normalize_query(query);
        if normalized.is_empty() {
            return SearchResults {
                state: SearchState::Idle,
                query: normalized,
                hits: self
                    .products
                    .iter()
                    .map(|product| RankedProduct {
                        product,
                        score: 0.0,
                        source: MatchSource::Unfiltered,
                    })
                    .collect(),
            };
        }

        let terms = self.expander.expand(&normalized);
        let mut seen: HashSet<&ProductId> = HashSet::new();
        let mut hits: Vec<RankedProduct<'_>> = Vec::new();

        for term in &terms {
            if char_len(term) < self.search_config.min_match_chars {
                continue;
            }

            let term_hits: Vec<(usize, f64, MatchSource)> =
                match self.matcher.query(&self.index, term) {
                    Ok(term_hits) => term_hits
                        .into_iter()
                        .map(|hit| {
                            (hit.position, hit.score, MatchSource::Fuzzy { term: term.clone() })
                        })
                        .collect(),
                    Err(err) => {
                        // Unmatchable terms still count when the text contains them verbatim
                        tracing::warn!(term = %term, error = %err, "fuzzy match failed, using substring match");
                        self.index
                            .substring_positions(term)
                            .into_iter()
                            .map(|position| {
                                (position, self.search_config.fallback_score, MatchSource::Fallback)
                            })
                            .collect()
                    }
                };

            for (position, score, source) in term_hits {
                let product = &self.products[position];
                // First term to reach a product records its score
                if seen.insert(&product.id) {
                    hits.push(RankedProduct {
                        product,
                        score,
                        source,
                    });
                }
            }
        }

        if hits.is_empty() && char_len(&normalized) >= self.search_config.min_match_chars {
            hits = self
                .index
                .substring_positions(&normalized)
                .into_iter()
                .map(|position| RankedProduct {
                    product: &self.products[position],
                    score: self.search_config.fallback_score,
                    source: MatchSource::Fallback,
                })
                .collect();
            if !hits.is_empty() {
                tracing::debug!(query = %normalized, hits = hits.len(), "substring fallback matched");
            }
        }

        // Stable: equal scores keep the order hits were recorded
        hits.sort_by(|a, b| a.score.total_cmp(&b.score));

        tracing::debug!(
            query = %normalized,
            terms = terms.len(),
            hits = hits.len(),
            "search finished"
        );

        SearchResults {
            state: SearchState::Searching,
            query: normalized,
            hits,
        }
    }

    /// Record `query` in history, then search for it.
    pub fn submit(&mut self, query: &str) -> Vec<&Product> {
        self.history.add(query);
        self.search(query)
    }

    /// Autocomplete candidates for a partial query.
    ///
    /// Candidates come from product names and categories, synonym groups,
    /// popular searches, history, and the typo correction, in that order,
    /// and are deduplicated ignoring case.
    /// The first `max_suggestions` are kept and then ordered with prefix
    /// matches first and shorter candidates before longer ones.
    pub fn suggestions(&self, partial: &str) -> Vec<String> {
        let partial = normalize_query(partial);
        if char_len(&partial) < self.suggestion_config.min_query_chars.max(1) {
            return Vec::new();
        }

        // Keyed by lower-cased text; the first surface form wins
        let mut candidates: IndexMap<String, String> = IndexMap::new();
        let mut offer = |candidate: &str| {
            candidates
                .entry(candidate.to_lowercase())
                .or_insert_with(|| candidate.to_string());
        };

        for product in &self.products {
            if product.name.to_lowercase().contains(&partial) {
                offer(product.name.as_str());
            }
            if product.category.to_lowercase().contains(&partial) {
                offer(product.category.as_str());
            }
        }

        let dictionary = self.expander.dictionary();
        for group in dictionary.groups() {
            for term in group.terms() {
                if contains_either_way(term, &partial) {
                    offer(term);
                }
            }
        }

        for term in dictionary.popular() {
            if contains_either_way(term, &partial) {
                offer(term.as_str());
            }
        }

        for entry in self.history.entries() {
            if contains_either_way(entry, &partial) {
                offer(entry.as_str());
            }
        }

        if let Some(fix) = dictionary.correction(&partial) {
            offer(fix);
        }

        let mut suggestions: Vec<String> = candidates
            .into_iter()
            .filter(|(key, _)| *key != partial)
            .map(|(_, surface)| surface)
            .take(self.suggestion_config.max_suggestions)
            .collect();

        suggestions.sort_by_cached_key(|c| (!c.to_lowercase().starts_with(&partial), char_len(c)));
        suggestions
    }

    /// Search history, most recent first.
    pub fn history(&self) -> &[String] {
        self.history.entries()
    }

    /// Record an explicitly submitted query.
    pub fn add_to_history(&mut self, query: &str) {
        self.history.add(query);
    }

    /// Forget all history and delete the persisted key.
    pub fn clear_history(&mut self) {
        self.history.clear();
    }
}
