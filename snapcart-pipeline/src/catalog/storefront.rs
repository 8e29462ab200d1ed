//! Unauthenticated storefront search API strategy.

use async_trait::async_trait;
use serde_json::Value;
use snapcart_core::ProductRecord;
use tracing::{debug, info, warn};

use super::normalize;
use super::source::CatalogSource;
use crate::error::{PipelineError, Result};

/// The catch-all query the storefront accepts as "everything".
const ALL_PRODUCTS_QUERY: &str = "all";

/// Catalog source backed by the storefront's public search API.
///
/// Needs no credentials, only the `domain-name` header identifying the
/// store. The query plan per fetch: the plain product listing first,
/// then one search per term, then the `q=all` catch-all. The first
/// request whose normalized product list is non-empty wins.
pub struct StorefrontSearch {
    client: reqwest::Client,
    api_base: String,
    domain: String,
    origin: String,
}

impl StorefrontSearch {
    pub fn new(
        client: reqwest::Client,
        api_base: impl Into<String>,
        domain: impl Into<String>,
        origin: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_base: api_base.into(),
            domain: domain.into(),
            origin: origin.into(),
        }
    }

    /// The ordered (url, query) plan for one fetch.
    fn query_plan(&self, terms: &[String]) -> Vec<(String, Option<String>)> {
        let listing = format!("{}/storefront/api/v1/products", self.api_base);
        let search = format!("{}/storefront/api/v1/search-products", self.api_base);

        let mut plan = vec![(listing, None)];
        for term in terms {
            // Guard against degenerate terms even though the extractor
            // already filters them.
            if term.len() > 2 {
                plan.push((search.clone(), Some(term.clone())));
            }
        }
        plan.push((search, Some(ALL_PRODUCTS_QUERY.to_string())));
        plan
    }
}

#[async_trait]
impl CatalogSource for StorefrontSearch {
    fn strategy(&self) -> &'static str {
        "storefront_search"
    }

    async fn fetch(&self, terms: &[String]) -> Result<Vec<ProductRecord>> {
        let plan = self.query_plan(terms);
        let attempts = plan.len();
        let mut failures = 0;

        for (endpoint, query) in plan {
            debug!(%endpoint, query = query.as_deref().unwrap_or(""), "querying storefront API");

            let mut request = self.client.get(&endpoint).header("domain-name", &self.domain);
            if let Some(q) = &query {
                request = request.query(&[("q", q)]);
            }

            let response = match request.send().await {
                Ok(response) => response,
                Err(e) => {
                    warn!(%endpoint, error = %e, "storefront API request failed");
                    failures += 1;
                    continue;
                }
            };

            if !response.status().is_success() {
                warn!(%endpoint, status = %response.status(), "storefront API rejected request");
                failures += 1;
                continue;
            }

            let body: Value = match response.json().await {
                Ok(body) => body,
                Err(e) => {
                    warn!(%endpoint, error = %e, "storefront API returned malformed JSON");
                    failures += 1;
                    continue;
                }
            };

            if let Some(items) = normalize::product_list(&body) {
                let records: Vec<ProductRecord> = items
                    .iter()
                    .filter_map(|item| normalize::record_from_value(item, &self.origin))
                    .collect();
                if !records.is_empty() {
                    info!(
                        count = records.len(),
                        query = query.as_deref().unwrap_or(""),
                        "retrieved products from storefront API"
                    );
                    return Ok(records);
                }
            }
        }

        if failures == attempts {
            return Err(PipelineError::Catalog {
                strategy: self.strategy(),
                message: "every storefront API request failed".into(),
            });
        }
        Ok(Vec::new())
    }
}
