//! End-to-end pipeline flows over stubbed catalog and ranking backends.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use snapcart_core::{ProductRecord, NOT_FOUND};
use snapcart_pipeline::catalog::CatalogClient;
use snapcart_pipeline::error::Result;
use snapcart_pipeline::matcher::CandidateMatcher;
use snapcart_pipeline::pipeline::MatchPipeline;
use snapcart_pipeline::ranking::RankingModel;
use snapcart_pipeline::CatalogSource;

const ORIGIN: &str = "https://shop.example.org";

/// Catalog source returning a fixed record set and counting fetches.
struct StubCatalog {
    records: Vec<ProductRecord>,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl CatalogSource for StubCatalog {
    fn strategy(&self) -> &'static str {
        "stub"
    }

    async fn fetch(&self, _terms: &[String]) -> Result<Vec<ProductRecord>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.records.clone())
    }
}

/// Ranking model returning a canned reply and counting calls.
struct StubRanker {
    reply: String,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl RankingModel for StubRanker {
    async fn rank(&self, _prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.reply.clone())
    }
}

struct Counters {
    catalog: Arc<AtomicUsize>,
    ranker: Arc<AtomicUsize>,
}

fn pipeline_with(records: Vec<ProductRecord>, reply: &str, allow_fallback: bool) -> (MatchPipeline, Counters) {
    let catalog_calls = Arc::new(AtomicUsize::new(0));
    let ranker_calls = Arc::new(AtomicUsize::new(0));

    let catalog = CatalogClient::new(
        vec![Arc::new(StubCatalog { records, calls: catalog_calls.clone() }) as Arc<dyn CatalogSource>],
        ORIGIN,
    );
    let matcher = CandidateMatcher::new(Arc::new(StubRanker {
        reply: reply.to_string(),
        calls: ranker_calls.clone(),
    }));

    let pipeline = MatchPipeline::builder()
        .catalog(catalog)
        .matcher(matcher)
        .allow_fallback_match(allow_fallback)
        .build()
        .unwrap();

    (pipeline, Counters { catalog: catalog_calls, ranker: ranker_calls })
}

fn flask_record() -> ProductRecord {
    ProductRecord {
        name: "Erlenmeyer Flask 250ml".to_string(),
        id: "x".to_string(),
        price: "$10".to_string(),
        description: String::new(),
        url: "/products/x".to_string(),
    }
}

const EXACT_MATCH_REPLY: &str =
    r#"{"match_found": true, "best_match_number": 1, "confidence": "High", "reasoning": "exact name match"}"#;

const NO_MATCH_REPLY: &str =
    r#"{"match_found": false, "best_match_number": null, "confidence": "Low", "reasoning": "nothing similar"}"#;

#[tokio::test]
async fn not_found_sentinel_issues_no_catalog_queries() {
    let (pipeline, counters) = pipeline_with(vec![flask_record()], EXACT_MATCH_REPLY, false);

    let result = pipeline.find_match(NOT_FOUND).await;

    assert!(!result.found);
    assert!(result.product.is_none());
    assert_eq!(counters.catalog.load(Ordering::SeqCst), 0);
    assert_eq!(counters.ranker.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn stop_word_only_name_issues_no_catalog_queries() {
    let (pipeline, counters) = pipeline_with(vec![flask_record()], EXACT_MATCH_REPLY, false);

    let result = pipeline.find_match("the and of").await;

    assert!(!result.found);
    assert_eq!(counters.catalog.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn exact_match_resolves_with_absolute_url() {
    let (pipeline, _) = pipeline_with(vec![flask_record()], EXACT_MATCH_REPLY, false);

    let result = pipeline.find_match("Erlenmeyer Flask 250ml").await;

    assert!(result.found);
    let product = result.product.unwrap();
    assert_eq!(product.name, "Erlenmeyer Flask 250ml");
    assert_eq!(product.url, "https://shop.example.org/products/x");
}

#[tokio::test]
async fn no_match_outcome_is_normal_not_an_error() {
    let (pipeline, counters) = pipeline_with(vec![flask_record()], NO_MATCH_REPLY, false);

    let result = pipeline.find_match("Volumetric Pipette 10ml").await;

    assert!(!result.found);
    assert!(result.product.is_none());
    // Catalog and ranking were both consulted; the outcome is still no-match.
    assert!(counters.catalog.load(Ordering::SeqCst) > 0);
    assert!(counters.ranker.load(Ordering::SeqCst) > 0);
}

#[tokio::test]
async fn empty_catalog_skips_ranking_entirely() {
    let (pipeline, counters) = pipeline_with(Vec::new(), EXACT_MATCH_REPLY, false);

    let result = pipeline.find_match("Erlenmeyer Flask 250ml").await;

    assert!(!result.found);
    assert!(counters.catalog.load(Ordering::SeqCst) > 0);
    assert_eq!(counters.ranker.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn fallback_pick_honored_only_in_aggregate_pass_when_configured() {
    let fallback_reply = r#"{"match_found": false, "best_match_number": null, "fallback_match_number": 1, "confidence": "Low", "reasoning": "closest size"}"#;

    // Not configured: the fallback pick is never accepted.
    let (pipeline, _) = pipeline_with(vec![flask_record()], fallback_reply, false);
    let result = pipeline.find_match("Erlenmeyer Flask 500ml").await;
    assert!(!result.found);

    // Configured: the aggregate pass accepts it.
    let (pipeline, _) = pipeline_with(vec![flask_record()], fallback_reply, true);
    let result = pipeline.find_match("Erlenmeyer Flask 500ml").await;
    assert!(result.found);
    assert_eq!(result.product.unwrap().url, "https://shop.example.org/products/x");
}

#[tokio::test]
async fn aggregate_pass_ranks_the_union_across_strategies() {
    // The first strategy answers every query, so per-term searches only
    // ever see its single record; index 2 exists solely in the
    // cross-strategy union built for the final pass.
    let small = ProductRecord {
        name: "Beaker 250ml".to_string(),
        id: "a".to_string(),
        price: "$5".to_string(),
        description: String::new(),
        url: "/products/a".to_string(),
    };
    let large = ProductRecord {
        name: "Beaker 500ml".to_string(),
        id: "b".to_string(),
        price: "$7".to_string(),
        description: String::new(),
        url: "/products/b".to_string(),
    };

    let catalog = CatalogClient::new(
        vec![
            Arc::new(StubCatalog { records: vec![small], calls: Arc::new(AtomicUsize::new(0)) })
                as Arc<dyn CatalogSource>,
            Arc::new(StubCatalog { records: vec![large], calls: Arc::new(AtomicUsize::new(0)) }),
        ],
        ORIGIN,
    );
    let matcher = CandidateMatcher::new(Arc::new(StubRanker {
        reply: r#"{"match_found": true, "best_match_number": 2, "confidence": "Medium", "reasoning": "matching size"}"#.to_string(),
        calls: Arc::new(AtomicUsize::new(0)),
    }));
    let pipeline = MatchPipeline::builder().catalog(catalog).matcher(matcher).build().unwrap();

    let result = pipeline.find_match("Beaker 500ml").await;

    assert!(result.found);
    let product = result.product.unwrap();
    assert_eq!(product.name, "Beaker 500ml");
    assert_eq!(product.url, "https://shop.example.org/products/b");
}

#[tokio::test]
async fn identical_inputs_yield_identical_results() {
    let (pipeline, _) = pipeline_with(vec![flask_record()], EXACT_MATCH_REPLY, false);

    let first = pipeline.find_match("Erlenmeyer Flask 250ml").await;
    let second = pipeline.find_match("Erlenmeyer Flask 250ml").await;

    assert_eq!(first, second);
}

#[tokio::test]
async fn find_candidates_returns_capped_normalized_records() {
    let records: Vec<ProductRecord> = (0..15)
        .map(|i| ProductRecord {
            name: format!("Beaker {i}"),
            id: format!("b{i}"),
            price: "$5".to_string(),
            description: String::new(),
            url: format!("/products/b{i}"),
        })
        .collect();

    let (pipeline, counters) = pipeline_with(records, NO_MATCH_REPLY, false);
    let candidates = pipeline.find_candidates("Beaker 500ml glass").await;

    assert_eq!(candidates.len(), 10);
    assert!(candidates.iter().all(|c| c.url.starts_with("http")));
    // Candidate mode never consults the ranking model.
    assert_eq!(counters.ranker.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn find_candidates_short_circuits_on_sentinel() {
    let (pipeline, counters) = pipeline_with(vec![flask_record()], NO_MATCH_REPLY, false);

    assert!(pipeline.find_candidates(NOT_FOUND).await.is_empty());
    assert_eq!(counters.catalog.load(Ordering::SeqCst), 0);
}
