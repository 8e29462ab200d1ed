//! Catalog query client and its strategies.
//!
//! Strategy selection is data: the client holds an ordered list of
//! [`CatalogSource`]s built from the configured [`Strategy`] list, and
//! tries them in order until one produces records. Every record leaving
//! the client has an absolute URL, a currency-prefixed price, and a
//! unique (case-insensitive) name.

pub mod commerce;
pub mod normalize;
pub mod scrape;
pub mod source;
pub mod static_list;
pub mod storefront;

use std::sync::Arc;
use std::time::Duration;

use snapcart_core::{AppConfig, ProductRecord, Strategy};
use tracing::{info, warn};

pub use commerce::CommerceApi;
pub use scrape::SiteScrape;
pub use source::CatalogSource;
pub use static_list::StaticCatalog;
pub use storefront::StorefrontSearch;

/// Timeout for catalog HTTP requests.
const CATALOG_TIMEOUT: Duration = Duration::from_secs(30);

/// Front door to every configured catalog strategy.
pub struct CatalogClient {
    sources: Vec<Arc<dyn CatalogSource>>,
    origin: String,
}

impl CatalogClient {
    /// Build a client over explicit sources. `origin` is the store
    /// origin used to enforce the absolute-URL invariant on whatever
    /// the sources return.
    pub fn new(sources: Vec<Arc<dyn CatalogSource>>, origin: impl Into<String>) -> Self {
        Self { sources, origin: origin.into() }
    }

    /// Build the production client from configuration.
    ///
    /// Sources appear in the configured strategy order. The
    /// authenticated commerce API is constructed only when credentials
    /// are fully present; otherwise that strategy is skipped entirely.
    pub fn from_config(config: &AppConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(CATALOG_TIMEOUT)
            .build()
            .unwrap_or_default();
        let origin = config.store_origin();

        let mut sources: Vec<Arc<dyn CatalogSource>> = Vec::new();
        for strategy in &config.strategies {
            match strategy {
                Strategy::CommerceApi => match &config.commerce {
                    Some(credentials) => sources.push(Arc::new(CommerceApi::new(
                        client.clone(),
                        config.api_base.clone(),
                        origin.clone(),
                        credentials.clone(),
                    ))),
                    None => {
                        info!("commerce credentials not configured; skipping authenticated API")
                    }
                },
                Strategy::StorefrontSearch => sources.push(Arc::new(StorefrontSearch::new(
                    client.clone(),
                    config.api_base.clone(),
                    config.store_domain.clone(),
                    origin.clone(),
                ))),
                Strategy::SiteScrape => {
                    sources.push(Arc::new(SiteScrape::new(client.clone(), origin.clone())))
                }
                Strategy::StaticList => sources.push(Arc::new(StaticCatalog::new(&origin))),
            }
        }

        Self::new(sources, origin)
    }

    /// Return the first strategy's non-empty result set for `terms`.
    ///
    /// Source errors are logged and treated as zero results; an empty
    /// vec means every configured strategy came up dry.
    pub async fn search(&self, terms: &[String]) -> Vec<ProductRecord> {
        for source in &self.sources {
            match source.fetch(terms).await {
                Ok(records) if !records.is_empty() => {
                    return self.finalize(records);
                }
                Ok(_) => {}
                Err(e) => {
                    warn!(strategy = source.strategy(), error = %e, "catalog strategy failed");
                }
            }
        }
        Vec::new()
    }

    /// Aggregate the de-duplicated union of every strategy's results,
    /// for the completeness-first passes.
    pub async fn search_all(&self, terms: &[String]) -> Vec<ProductRecord> {
        let mut union = Vec::new();
        for source in &self.sources {
            match source.fetch(terms).await {
                Ok(records) => union.extend(records),
                Err(e) => {
                    warn!(strategy = source.strategy(), error = %e, "catalog strategy failed");
                }
            }
        }
        self.finalize(union)
    }

    /// Enforce the client's outgoing invariants regardless of which
    /// source produced the records: absolute URLs, no unnamed records,
    /// a currency-prefixed price, first occurrence per name.
    fn finalize(&self, records: Vec<ProductRecord>) -> Vec<ProductRecord> {
        let resolved = records
            .into_iter()
            .filter(|record| !record.name.trim().is_empty())
            .filter_map(|mut record| {
                record.url = normalize::absolute_url(&record.url, &self.origin)?;
                if record.price.trim().is_empty() {
                    record.price = "$0".to_string();
                }
                Some(record)
            })
            .collect();
        normalize::dedupe_by_name(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedSource {
        records: Vec<ProductRecord>,
        calls: AtomicUsize,
        fail: bool,
    }

    impl FixedSource {
        fn new(records: Vec<ProductRecord>) -> Self {
            Self { records, calls: AtomicUsize::new(0), fail: false }
        }

        fn failing() -> Self {
            Self { records: Vec::new(), calls: AtomicUsize::new(0), fail: true }
        }
    }

    #[async_trait]
    impl CatalogSource for FixedSource {
        fn strategy(&self) -> &'static str {
            "fixed"
        }

        async fn fetch(&self, _terms: &[String]) -> crate::error::Result<Vec<ProductRecord>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(crate::error::PipelineError::Catalog {
                    strategy: "fixed",
                    message: "down".into(),
                });
            }
            Ok(self.records.clone())
        }
    }

    fn record(name: &str, url: &str) -> ProductRecord {
        ProductRecord {
            name: name.to_string(),
            id: "x".to_string(),
            price: "$10".to_string(),
            description: String::new(),
            url: url.to_string(),
        }
    }

    #[tokio::test]
    async fn search_uses_first_non_empty_source() {
        let empty = Arc::new(FixedSource::new(Vec::new()));
        let full = Arc::new(FixedSource::new(vec![record("Flask", "/products/x")]));
        let unreached = Arc::new(FixedSource::new(vec![record("Decoy", "/products/y")]));

        let client = CatalogClient::new(
            vec![
                empty.clone() as Arc<dyn CatalogSource>,
                full.clone(),
                unreached.clone(),
            ],
            "https://shop.example.org",
        );
        let records = client.search(&["flask".to_string()]).await;

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Flask");
        assert_eq!(unreached.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn failing_source_falls_through_to_next() {
        let down = Arc::new(FixedSource::failing());
        let full = Arc::new(FixedSource::new(vec![record("Flask", "/products/x")]));

        let client =
            CatalogClient::new(vec![down as Arc<dyn CatalogSource>, full], "https://shop.example.org");
        let records = client.search(&[]).await;
        assert_eq!(records.len(), 1);
    }

    #[tokio::test]
    async fn outgoing_urls_are_always_absolute() {
        let source = Arc::new(FixedSource::new(vec![
            record("Flask", "/products/x"),
            record("Beaker", "https://elsewhere.org/p/2"),
            record("Cylinder", "bare-handle"),
        ]));
        let client =
            CatalogClient::new(vec![source as Arc<dyn CatalogSource>], "https://shop.example.org");

        for rec in client.search(&[]).await {
            assert!(rec.url.starts_with("http"), "{} is not absolute", rec.url);
        }
    }

    #[tokio::test]
    async fn records_without_a_price_leave_with_a_placeholder() {
        let mut priceless = record("Flask", "/products/x");
        priceless.price = String::new();
        let source = Arc::new(FixedSource::new(vec![priceless]));

        let client =
            CatalogClient::new(vec![source as Arc<dyn CatalogSource>], "https://shop.example.org");
        let records = client.search(&[]).await;

        assert_eq!(records[0].price, "$0");
    }

    #[tokio::test]
    async fn search_all_unions_and_dedupes() {
        let a = Arc::new(FixedSource::new(vec![
            record("Flask", "/products/x"),
            record("Beaker", "/products/y"),
        ]));
        let b = Arc::new(FixedSource::new(vec![
            record("FLASK", "/products/x2"),
            record("Cylinder", "/products/z"),
        ]));

        let client =
            CatalogClient::new(vec![a as Arc<dyn CatalogSource>, b], "https://shop.example.org");
        let records = client.search_all(&[]).await;

        let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Flask", "Beaker", "Cylinder"]);
    }

    #[tokio::test]
    async fn all_sources_empty_yields_empty() {
        let client = CatalogClient::new(
            vec![Arc::new(FixedSource::new(Vec::new())) as Arc<dyn CatalogSource>],
            "https://shop.example.org",
        );
        assert!(client.search(&["flask".to_string()]).await.is_empty());
    }
}
