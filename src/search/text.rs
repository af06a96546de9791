//! Text normalization for queries and indexed fields.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Normalize a user query: trim and lower-case.
///
/// This is the form stored in history and used as the first expanded term.
pub fn normalize_query(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Fold text for matching: strip diacritics, lower-case, collapse whitespace.
///
/// - "Categoría" → "categoria"
/// - "  Refrigerador   LG " → "refrigerador lg"
pub fn fold(value: &str) -> String {
    value
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Number of chars in `value`.
pub fn char_len(value: &str) -> usize {
    value.chars().count()
}

/// True when either string contains the other.
pub fn contains_either_way(a: &str, b: &str) -> bool {
    a.contains(b) || b.contains(a)
}
