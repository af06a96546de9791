//! Query term expansion through synonym and typo-correction tables.

use indexmap::IndexSet;

use crate::search::dictionary::Dictionary;
use crate::search::text::normalize_query;

/// Insertion-ordered set of expanded search terms.
///
/// Order is part of the contract: the orchestrator records the score of the
/// first term that hits a product, so earlier terms win ties.
pub type ExpandedTerms = IndexSet<String>;

/// Expands a raw query into the set of terms to match.
#[derive(Debug, Clone)]
pub struct TermExpander {
    dictionary: Dictionary,
}

impl TermExpander {
    pub fn new(dictionary: Dictionary) -> Self {
        Self { dictionary }
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    /// Expand `raw_query`.
    ///
    /// The normalized query always comes first. Each whitespace token then
    /// contributes its correction, if any, followed by the key and synonyms
    /// of every group it hits, in dictionary order. An empty query yields a
    /// single empty term.
    pub fn expand(&self, raw_query: &str) -> ExpandedTerms {
        let normalized = normalize_query(raw_query);
        let mut terms = ExpandedTerms::new();
        terms.insert(normalized.clone());

        for token in normalized.split_whitespace() {
            if let Some(fix) = self.dictionary.correction(token) {
                terms.insert(fix.to_string());
            }

            for group in self.dictionary.groups() {
                if group.is_hit_by(token) {
                    terms.extend(group.terms().map(str::to_string));
                }
            }
        }

        tracing::debug!(query = %normalized, expanded = terms.len(), "expanded query");
        terms
    }
}

impl Default for TermExpander {
    fn default() -> Self {
        Self::new(Dictionary::builtin())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::dictionary::SynonymGroup;
    use proptest::prelude::*;

    fn expander() -> TermExpander {
        TermExpander::new(Dictionary::new(
            vec![
                SynonymGroup::new("refrigerador", ["nevera", "fridge"]),
                SynonymGroup::new("hotel", ["hostal"]),
            ],
            vec![("refrijerador".to_string(), "refrigerador".to_string())],
            Vec::new(),
        ))
    }

    #[test]
    fn test_expand_synonym_to_key_and_group() {
        let terms = expander().expand("Nevera");
        assert_eq!(
            terms.iter().collect::<Vec<_>>(),
            vec!["nevera", "refrigerador", "fridge"]
        );
    }

    #[test]
    fn test_expand_correction() {
        let terms = expander().expand("refrijerador");
        assert!(terms.contains("refrijerador"));
        assert!(terms.contains("refrigerador"));
        assert!(!terms.contains("nevera"));
    }

    #[test]
    fn test_expand_substring_of_key() {
        let terms = expander().expand("refri");
        assert!(terms.contains("refrigerador"));
        assert!(terms.contains("nevera"));
    }

    #[test]
    fn test_expand_multiple_tokens_keeps_order() {
        let terms = expander().expand("  hostal nevera ");
        assert_eq!(
            terms.iter().collect::<Vec<_>>(),
            vec!["hostal nevera", "hotel", "hostal", "refrigerador", "nevera", "fridge"]
        );
    }

    #[test]
    fn test_expand_unknown_term_is_identity() {
        let terms = expander().expand("bicicleta");
        assert_eq!(terms.len(), 1);
        assert!(terms.contains("bicicleta"));
    }

    #[test]
    fn test_expand_empty_query() {
        let terms = expander().expand("   ");
        assert_eq!(terms.len(), 1);
        assert!(terms.contains(""));
    }

    #[test]
    fn test_builtin_scenario_nevera() {
        let terms = TermExpander::default().expand("nevera");
        assert!(terms.contains("refrigerador"));
    }

    proptest! {
        #[test]
        fn prop_expansion_contains_normalized_query(query in "\\PC{1,30}") {
            let terms = TermExpander::default().expand(&query);
            let normalized = normalize_query(&query);
            prop_assert!(terms.contains(&normalized));
            prop_assert_eq!(terms.get_index(0), Some(&normalized));
        }
    }
}
