//! Search-term extraction from an identified item name.

use snapcart_core::NOT_FOUND;

/// Words too common (or too unit-like) to discriminate between products.
const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
    "ml", "fl", "oz",
];

/// Extract ordered search terms from an item name.
///
/// Pure and deterministic: lowercases, splits on whitespace, trims
/// punctuation from token edges, and keeps tokens that are longer than
/// two characters, contain at least one letter, and are not stop words.
/// Order follows the original name, so the most discriminating terms
/// (brand, product type) come first.
///
/// The [`NOT_FOUND`] sentinel and empty input yield an empty list; the
/// orchestrator must then short-circuit without querying the catalog.
pub fn extract_terms(name: &str) -> Vec<String> {
    if name.trim().is_empty() || name == NOT_FOUND {
        return Vec::new();
    }

    name.to_lowercase()
        .split_whitespace()
        .map(|token| token.trim_matches(|c: char| !c.is_ascii_alphanumeric()))
        .filter(|token| {
            token.len() > 2
                && token.chars().any(|c| c.is_ascii_alphabetic())
                && !STOP_WORDS.contains(token)
        })
        .map(str::to_string)
        .collect()
}
