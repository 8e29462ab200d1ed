//! Pipeline orchestrator.
//!
//! The [`MatchPipeline`] sequences term extraction, catalog queries,
//! and candidate matching across the fallback ladder, terminating on
//! the first success. Construct one via [`MatchPipeline::builder()`].
//!
//! # Example
//!
//! ```rust,ignore
//! use snapcart_pipeline::{MatchPipeline, CatalogClient, CandidateMatcher};
//!
//! let pipeline = MatchPipeline::builder()
//!     .catalog(CatalogClient::from_config(&config))
//!     .matcher(CandidateMatcher::new(Arc::new(ranker)))
//!     .allow_fallback_match(config.allow_fallback_match)
//!     .build()?;
//!
//! let result = pipeline.find_match("Erlenmeyer Flask 250ml").await;
//! ```

use snapcart_core::{MatchResult, ProductRecord, NOT_FOUND};
use tracing::{info, warn};

use crate::catalog::{normalize, CatalogClient};
use crate::error::{PipelineError, Result};
use crate::matcher::CandidateMatcher;
use crate::terms::extract_terms;

/// The product-matching orchestrator.
///
/// A run never fails: model and catalog errors are logged and absorbed,
/// and an exhausted search returns the normal "no match" outcome. Runs
/// are deterministic given fixed upstream responses.
pub struct MatchPipeline {
    catalog: CatalogClient,
    matcher: CandidateMatcher,
    allow_fallback_match: bool,
    max_candidates: usize,
}

impl MatchPipeline {
    /// Create a new [`MatchPipelineBuilder`].
    pub fn builder() -> MatchPipelineBuilder {
        MatchPipelineBuilder::default()
    }

    /// Find the best purchasable match for an identified item name.
    ///
    /// The fallback ladder, terminal on first success:
    ///
    /// 1. the sentinel or an empty name short-circuits to no-match
    ///    without touching the catalog;
    /// 2. per extracted term, in priority order: query the catalog for
    ///    that term alone and rank any results;
    /// 3. one retry with the full un-split name as the query;
    /// 4. a final aggregate pass over everything seen so far unioned
    ///    with every strategy's results, accepting a non-exact fallback
    ///    pick iff configured to.
    pub async fn find_match(&self, target: &str) -> MatchResult {
        if target.trim().is_empty() || target == NOT_FOUND {
            return MatchResult::none();
        }

        let terms = extract_terms(target);
        if terms.is_empty() {
            info!(target = %target, "no usable search terms; skipping catalog");
            return MatchResult::none();
        }
        info!(target = %target, ?terms, "starting product search");

        // Every record seen along the way feeds the aggregate pass.
        let mut seen: Vec<ProductRecord> = Vec::new();

        for term in &terms {
            let records = self.catalog.search(std::slice::from_ref(term)).await;
            if records.is_empty() {
                continue;
            }
            if let Some(result) = self.try_match(target, &records, false).await {
                return result;
            }
            seen.extend(records);
        }

        // Step 3: the un-split name sometimes hits where single terms miss.
        let records = self.catalog.search(std::slice::from_ref(&target.to_string())).await;
        if !records.is_empty() {
            if let Some(result) = self.try_match(target, &records, false).await {
                return result;
            }
            seen.extend(records);
        }

        // Step 4: aggregate pass over everything seen plus a
        // completeness-first sweep across every strategy, so a record a
        // later strategy holds still gets ranked even when an earlier
        // strategy answered first.
        let mut union = seen;
        union.extend(self.catalog.search_all(&terms).await);
        let union = normalize::dedupe_by_name(union);
        if !union.is_empty() {
            if let Some(result) = self.try_match(target, &union, self.allow_fallback_match).await {
                return result;
            }
        }

        info!(target = %target, "product search exhausted without a match");
        MatchResult::none()
    }

    /// Return up to `max_candidates` records for user selection instead
    /// of auto-picking.
    pub async fn find_candidates(&self, target: &str) -> Vec<ProductRecord> {
        if target.trim().is_empty() || target == NOT_FOUND {
            return Vec::new();
        }

        let terms = extract_terms(target);
        if terms.is_empty() {
            return Vec::new();
        }

        let mut records = self.catalog.search(&terms).await;
        records.truncate(self.max_candidates);
        info!(target = %target, count = records.len(), "collected candidate products");
        records
    }

    /// Run the matcher over `records`, absorbing ranking failures.
    /// `Some` means "terminate with this result"; `None` means keep going.
    async fn try_match(
        &self,
        target: &str,
        records: &[ProductRecord],
        allow_fallback: bool,
    ) -> Option<MatchResult> {
        match self.matcher.pick(target, records, allow_fallback).await {
            Ok(result) if result.found => Some(result),
            Ok(_) => None,
            Err(e) => {
                warn!(error = %e, "ranking call failed; treating as no match");
                None
            }
        }
    }
}

/// Builder for constructing a [`MatchPipeline`].
#[derive(Default)]
pub struct MatchPipelineBuilder {
    catalog: Option<CatalogClient>,
    matcher: Option<CandidateMatcher>,
    allow_fallback_match: bool,
    max_candidates: Option<usize>,
}

impl MatchPipelineBuilder {
    /// Set the catalog query client.
    pub fn catalog(mut self, catalog: CatalogClient) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Set the candidate matcher.
    pub fn matcher(mut self, matcher: CandidateMatcher) -> Self {
        self.matcher = Some(matcher);
        self
    }

    /// Accept a non-exact fallback pick in the aggregate pass.
    pub fn allow_fallback_match(mut self, allow: bool) -> Self {
        self.allow_fallback_match = allow;
        self
    }

    /// Cap the candidate list returned by `find_candidates`.
    pub fn max_candidates(mut self, max: usize) -> Self {
        self.max_candidates = Some(max);
        self
    }

    /// Build the [`MatchPipeline`], validating that all required parts
    /// are present.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Config`] if the catalog or matcher is
    /// missing, or `max_candidates` is zero.
    pub fn build(self) -> Result<MatchPipeline> {
        let catalog =
            self.catalog.ok_or_else(|| PipelineError::Config("catalog is required".to_string()))?;
        let matcher =
            self.matcher.ok_or_else(|| PipelineError::Config("matcher is required".to_string()))?;
        let max_candidates = self.max_candidates.unwrap_or(10);
        if max_candidates == 0 {
            return Err(PipelineError::Config("max_candidates must be greater than zero".to_string()));
        }

        Ok(MatchPipeline {
            catalog,
            matcher,
            allow_fallback_match: self.allow_fallback_match,
            max_candidates,
        })
    }
}
