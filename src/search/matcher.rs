//! Approximate, location-independent product matching.
//!
//! Each indexed field is compared against a term with an approximate
//! substring edit distance: the term may match anywhere in the field, and
//! the score is the number of edits divided by the term length. A field
//! matches when its score is within the configured threshold.
//!
//! Field scores combine multiplicatively, each raised to its field weight,
//! so an exact name hit ranks above an exact category hit and a product
//! matching in several fields ranks above one matching in a single field.
//! Lower is better.

use crate::catalog::Product;
use crate::config::{FieldWeights, SearchConfig};
use crate::error::{Result, VitrinaError};
use crate::search::text::fold;

/// Longest term the matcher accepts, in chars.
pub const MAX_PATTERN_CHARS: usize = 64;

/// Tunables for [`FuzzyMatcher`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchOptions {
    /// Maximum edits per term char for a field to match.
    pub threshold: f64,
    /// Shorter terms never match.
    pub min_match_chars: usize,
    pub weights: FieldWeights,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self::from(&SearchConfig::default())
    }
}

impl From<&SearchConfig> for MatchOptions {
    fn from(config: &SearchConfig) -> Self {
        Self {
            threshold: config.threshold,
            min_match_chars: config.min_match_chars,
            weights: config.weights,
        }
    }
}

#[derive(Debug, Clone)]
struct IndexedProduct {
    name: Vec<char>,
    description: Vec<char>,
    category: Vec<char>,
    /// Lower-cased "name description category" for plain substring search.
    haystack: String,
}

/// Weighted text index over a product snapshot.
///
/// Positions in the index are positions in the slice it was built from.
/// The index is rebuilt, never patched, when the snapshot changes.
#[derive(Debug, Clone, Default)]
pub struct SearchIndex {
    entries: Vec<IndexedProduct>,
}

impl SearchIndex {
    pub fn build(products: &[Product]) -> Self {
        let entries = products
            .iter()
            .map(|p| IndexedProduct {
                name: fold(&p.name).chars().collect(),
                description: fold(&p.description).chars().collect(),
                category: fold(&p.category).chars().collect(),
                haystack: format!("{} {} {}", p.name, p.description, p.category).to_lowercase(),
            })
            .collect();
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Positions whose combined text contains `needle` (case-insensitive).
    pub fn substring_positions(&self, needle: &str) -> Vec<usize> {
        let needle = needle.to_lowercase();
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.haystack.contains(&needle))
            .map(|(position, _)| position)
            .collect()
    }
}

/// A scored match of one term against one indexed product.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub position: usize,
    pub score: f64,
}

/// Scores terms against a [`SearchIndex`].
#[derive(Debug, Clone, Default)]
pub struct FuzzyMatcher {
    options: MatchOptions,
}

impl FuzzyMatcher {
    pub fn new(options: MatchOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &MatchOptions {
        &self.options
    }

    /// Match `term` against every product in `index`.
    ///
    /// Hits are sorted by ascending score; equal scores keep index order.
    /// Terms below `min_match_chars` return no hits.
    ///
    /// # Errors
    ///
    /// Returns a matcher error for terms longer than [`MAX_PATTERN_CHARS`].
    pub fn query(&self, index: &SearchIndex, term: &str) -> Result<Vec<Hit>> {
        let pattern: Vec<char> = fold(term).chars().collect();
        if pattern.len() < self.options.min_match_chars.max(1) {
            return Ok(Vec::new());
        }
        if pattern.len() > MAX_PATTERN_CHARS {
            return Err(VitrinaError::matcher(format!(
                "term of {} chars exceeds the {} char limit",
                pattern.len(),
                MAX_PATTERN_CHARS
            )));
        }

        let mut hits: Vec<Hit> = index
            .entries
            .iter()
            .enumerate()
            .filter_map(|(position, entry)| {
                self.score_entry(&pattern, entry)
                    .map(|score| Hit { position, score })
            })
            .collect();

        // Stable: ties keep catalog order
        hits.sort_by(|a, b| a.score.total_cmp(&b.score));
        Ok(hits)
    }

    fn score_entry(&self, pattern: &[char], entry: &IndexedProduct) -> Option<f64> {
        let weights = &self.options.weights;
        let fields = [
            (&entry.name, weights.name),
            (&entry.description, weights.description),
            (&entry.category, weights.category),
        ];

        let mut combined: Option<f64> = None;
        for (text, weight) in fields {
            if weight <= 0.0 || text.is_empty() {
                continue;
            }
            let score = approximate_distance(pattern, text) as f64 / pattern.len() as f64;
            if score <= self.options.threshold {
                let factor = score.max(f64::EPSILON).powf(weight);
                combined = Some(combined.unwrap_or(1.0) * factor);
            }
        }
        combined
    }
}

/// Fewest edits turning `pattern` into some substring of `text`.
///
/// Leading and trailing text is free, so the match is location-independent.
/// An empty text costs the full pattern length.
pub fn approximate_distance(pattern: &[char], text: &[char]) -> usize {
    let m = pattern.len();
    // column[i]: cost of matching pattern[..i] ending at the current text char
    let mut column: Vec<usize> = (0..=m).collect();
    let mut best = m;

    for &tc in text {
        let mut diagonal = column[0];
        column[0] = 0;
        for i in 1..=m {
            let left = column[i];
            let cost = usize::from(pattern[i - 1] != tc);
            column[i] = (diagonal + cost).min(left + 1).min(column[i - 1] + 1);
            diagonal = left;
        }
        best = best.min(column[m]);
        if best == 0 {
            break;
        }
    }

    best
}
