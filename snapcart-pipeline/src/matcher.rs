//! AI-assisted selection of the best catalog candidate.

use std::fmt::Write as _;
use std::sync::Arc;

use serde::Deserialize;
use snapcart_core::{Confidence, MatchResult, ProductRecord};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::json::extract_json_object;
use crate::ranking::RankingModel;

/// Picks the single best match (or none) from a candidate list by
/// delegating ranking to an external model.
///
/// The matcher itself is deterministic given a fixed model reply: it
/// builds the prompt, extracts the first balanced JSON object from the
/// reply, and validates the declared index. Unparseable replies and
/// out-of-range indices are "no match", never errors; only transport
/// failures surface as errors, and the orchestrator absorbs those.
pub struct CandidateMatcher {
    model: Arc<dyn RankingModel>,
}

impl CandidateMatcher {
    pub fn new(model: Arc<dyn RankingModel>) -> Self {
        Self { model }
    }

    /// Select the best match for `target` among `candidates`.
    ///
    /// `allow_fallback` additionally accepts the model's "closest, not
    /// exact" pick when no exact match was declared; the exact pick is
    /// always preferred when both are present.
    pub async fn pick(
        &self,
        target: &str,
        candidates: &[ProductRecord],
        allow_fallback: bool,
    ) -> Result<MatchResult> {
        if candidates.is_empty() {
            return Ok(MatchResult::none());
        }

        debug!(target = %target, candidates = candidates.len(), "ranking candidates");

        let prompt = build_prompt(target, candidates);
        let reply = self.model.rank(&prompt).await?;

        Ok(interpret_reply(&reply, candidates, allow_fallback))
    }
}

/// The structured verdict requested from the ranking model.
#[derive(Debug, Deserialize)]
struct RankingVerdict {
    #[serde(default)]
    match_found: bool,
    best_match_number: Option<i64>,
    fallback_match_number: Option<i64>,
    #[serde(default)]
    confidence: Confidence,
    #[serde(default)]
    reasoning: String,
}

/// Assemble the numbered-candidate ranking prompt.
fn build_prompt(target: &str, candidates: &[ProductRecord]) -> String {
    let mut listing = String::new();
    for (index, candidate) in candidates.iter().enumerate() {
        let _ = writeln!(listing, "{}. {}", index + 1, candidate.name);
    }

    format!(
        r#"I'm looking for this product: "{target}"

Here are the products I found in the store:
{listing}
Please analyze these products and tell me which one (if any) matches the product I'm looking for.

Return your response in this exact JSON format:
{{
    "match_found": true/false,
    "best_match_number": 1-{count} (the number from the list above, or null),
    "fallback_match_number": 1-{count} (the closest candidate when no exact match exists, or null),
    "confidence": "High/Medium/Low",
    "reasoning": "Why this is or isn't a match"
}}

Consider:
- Brand names (Red Bull, Coca-Cola, etc.)
- Product types (Energy Drink, Flask, Beaker, etc.)
- Variations (Sugarfree, Sugar-Free, etc.)
- Similar products if exact match not found"#,
        count = candidates.len(),
    )
}

/// Turn the model's free-form reply into a [`MatchResult`].
fn interpret_reply(reply: &str, candidates: &[ProductRecord], allow_fallback: bool) -> MatchResult {
    let Some(object) = extract_json_object(reply) else {
        warn!("no JSON object found in ranking reply");
        return MatchResult::none();
    };

    let verdict: RankingVerdict = match serde_json::from_str(object) {
        Ok(verdict) => verdict,
        Err(e) => {
            warn!(error = %e, "ranking reply JSON did not match the expected shape");
            return MatchResult::none();
        }
    };

    // Exact pick first; the fallback pick only when permitted.
    let selected = match checked_index(verdict.best_match_number, candidates.len()) {
        Some(index) if verdict.match_found => Some(index),
        _ if allow_fallback => checked_index(verdict.fallback_match_number, candidates.len()),
        _ => None,
    };

    match selected {
        Some(index) => {
            let product = candidates[index].clone();
            info!(product = %product.name, confidence = ?verdict.confidence, "ranking selected a match");
            MatchResult::matched(product, verdict.confidence, verdict.reasoning)
        }
        None => {
            info!("ranking found no suitable match");
            MatchResult { reasoning: verdict.reasoning, ..MatchResult::none() }
        }
    }
}

/// Validate a declared 1-based index against the candidate count.
/// Anything outside `1..=count` is ignored rather than guessed at.
fn checked_index(declared: Option<i64>, count: usize) -> Option<usize> {
    let declared = declared?;
    if declared >= 1 && (declared as usize) <= count {
        Some(declared as usize - 1)
    } else {
        None
    }
}
