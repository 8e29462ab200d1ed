//! Best-effort HTML scrape of the storefront search page.
//!
//! Used when both APIs come up empty. No markup format is guaranteed:
//! anything unexpected yields an empty list, never a pipeline failure.

use async_trait::async_trait;
use scraper::{Html, Selector};
use snapcart_core::ProductRecord;
use tracing::{debug, info, warn};

use super::normalize;
use super::source::CatalogSource;
use crate::error::{PipelineError, Result};

/// Anchor text that marks a navigation link, not a product.
const NAV_PHRASES: &[&str] = &[
    "sign in", "log in", "login", "sign up", "contact us", "about us", "cart", "checkout",
    "home", "search", "my account",
];

/// Catalog source that scrapes the storefront's HTML search results.
pub struct SiteScrape {
    client: reqwest::Client,
    origin: String,
}

impl SiteScrape {
    pub fn new(client: reqwest::Client, origin: impl Into<String>) -> Self {
        Self { client, origin: origin.into() }
    }

    /// Pull product links out of a search results page.
    ///
    /// Keeps anchors whose href points under `/products/`, using the
    /// anchor text as the product name and the trailing path segment as
    /// the id. Navigation links are rejected by text heuristics.
    fn extract_products(&self, html: &str) -> Vec<ProductRecord> {
        let document = Html::parse_document(html);
        let anchors = Selector::parse("a[href]").unwrap();

        let mut records = Vec::new();
        for anchor in document.select(&anchors) {
            let Some(href) = anchor.value().attr("href") else { continue };
            if !href.contains("/products/") {
                continue;
            }

            let name = anchor.text().collect::<String>().trim().to_string();
            if name.is_empty() || is_navigation(&name) {
                continue;
            }

            let Some(url) = normalize::absolute_url(href, &self.origin) else { continue };
            let id = href.rsplit('/').find(|segment| !segment.is_empty()).unwrap_or_default();

            records.push(ProductRecord {
                name,
                id: id.to_string(),
                // The search page does not expose prices.
                price: String::new(),
                description: String::new(),
                url,
            });
        }

        normalize::dedupe_by_name(records)
    }
}

#[async_trait]
impl CatalogSource for SiteScrape {
    fn strategy(&self) -> &'static str {
        "site_scrape"
    }

    async fn fetch(&self, terms: &[String]) -> Result<Vec<ProductRecord>> {
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        let endpoint = format!("{}/search", self.origin);
        let mut failures = 0;

        for term in terms {
            debug!(%endpoint, term = %term, "scraping storefront search page");

            let response = match self.client.get(&endpoint).query(&[("q", term)]).send().await {
                Ok(response) => response,
                Err(e) => {
                    warn!(term = %term, error = %e, "scrape request failed");
                    failures += 1;
                    continue;
                }
            };

            if !response.status().is_success() {
                warn!(term = %term, status = %response.status(), "scrape request rejected");
                failures += 1;
                continue;
            }

            let html = match response.text().await {
                Ok(html) => html,
                Err(e) => {
                    warn!(term = %term, error = %e, "failed to read scrape response body");
                    failures += 1;
                    continue;
                }
            };

            let records = self.extract_products(&html);
            if !records.is_empty() {
                info!(count = records.len(), term = %term, "scraped products from search page");
                return Ok(records);
            }
        }

        if failures == terms.len() {
            return Err(PipelineError::Catalog {
                strategy: self.strategy(),
                message: "every scrape attempt failed".into(),
            });
        }
        Ok(Vec::new())
    }
}

/// Whether anchor text looks like site navigation rather than a product.
fn is_navigation(text: &str) -> bool {
    let lowered = text.to_lowercase();
    NAV_PHRASES.iter().any(|phrase| lowered == *phrase || lowered.starts_with(phrase))
}
