//! Wire-level data model shared by the pipeline and the HTTP server.

use serde::{Deserialize, Serialize};

/// Sentinel item name meaning the vision step could not identify anything.
pub const NOT_FOUND: &str = "Not Found";

/// How sure a model call was about its answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Confidence {
    #[serde(alias = "high", alias = "HIGH")]
    High,
    #[serde(alias = "medium", alias = "MEDIUM")]
    Medium,
    #[default]
    #[serde(alias = "low", alias = "LOW")]
    Low,
}

/// A structured item description produced by the vision step.
///
/// Serialized with the upload API's historical field names
/// (`identified_item`, `item_type`, `key_features`), which the web
/// frontend depends on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDescription {
    /// Specific product name, or [`NOT_FOUND`] when unidentifiable.
    #[serde(rename = "identified_item")]
    pub name: String,
    #[serde(default)]
    pub confidence: Confidence,
    /// General category such as "Beverage" or "Flask".
    #[serde(rename = "item_type", default)]
    pub category: String,
    /// Visually distinguishing features, most salient first.
    #[serde(rename = "key_features", default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub notes: String,
}

impl ItemDescription {
    /// The low-confidence "nothing identified" description, with an
    /// explanation of why identification did not happen.
    pub fn not_found(notes: impl Into<String>) -> Self {
        Self {
            name: NOT_FOUND.to_string(),
            confidence: Confidence::Low,
            category: "Unknown".to_string(),
            features: Vec::new(),
            notes: notes.into(),
        }
    }

    /// Whether the vision step actually identified something.
    pub fn is_identified(&self) -> bool {
        !self.name.trim().is_empty() && self.name != NOT_FOUND
    }
}

/// A normalized storefront catalog entry.
///
/// Produced by the catalog query client from heterogeneous upstream
/// shapes. `url` is always absolute by the time a record leaves that
/// client; no record with a relative or missing URL may reach the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub name: String,
    pub id: String,
    /// Currency-prefixed display price, e.g. `"$10"`.
    pub price: String,
    #[serde(default)]
    pub description: String,
    /// Absolute product page URL.
    pub url: String,
}

/// The outcome of one candidate-matching attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub found: bool,
    pub product: Option<ProductRecord>,
    pub confidence: Confidence,
    /// The ranking model's explanation of why this is or isn't a match.
    pub reasoning: String,
}

impl MatchResult {
    /// The "no match" outcome. Not an error: it is the normal result of
    /// an exhausted search.
    pub fn none() -> Self {
        Self {
            found: false,
            product: None,
            confidence: Confidence::Low,
            reasoning: String::new(),
        }
    }

    /// A successful match for `product`.
    pub fn matched(product: ProductRecord, confidence: Confidence, reasoning: String) -> Self {
        Self { found: true, product: Some(product), confidence, reasoning }
    }
}
