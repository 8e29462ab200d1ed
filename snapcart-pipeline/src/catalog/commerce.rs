//! Authenticated commerce platform API strategy.

use async_trait::async_trait;
use serde_json::Value;
use snapcart_core::{CommerceCredentials, ProductRecord};
use tracing::{debug, info, warn};

use super::normalize;
use super::source::CatalogSource;
use crate::error::{PipelineError, Result};

/// Catalog source backed by the credentialed commerce API.
///
/// Constructed only when all three credentials are present; a partial
/// credential set means the strategy is skipped entirely, not attempted.
/// The API has moved between endpoint paths over time, so a small
/// ordered list is tried until one answers with products.
pub struct CommerceApi {
    client: reqwest::Client,
    api_base: String,
    origin: String,
    credentials: CommerceCredentials,
}

impl CommerceApi {
    pub fn new(
        client: reqwest::Client,
        api_base: impl Into<String>,
        origin: impl Into<String>,
        credentials: CommerceCredentials,
    ) -> Self {
        Self { client, api_base: api_base.into(), origin: origin.into(), credentials }
    }

    fn endpoints(&self) -> Vec<String> {
        vec![
            format!("{}/api/v1/products", self.api_base),
            format!("{}/api/v1/store/products", self.api_base),
            format!("{}/api/v1/store/{}/products", self.api_base, self.credentials.client_id),
        ]
    }
}

#[async_trait]
impl CatalogSource for CommerceApi {
    fn strategy(&self) -> &'static str {
        "commerce_api"
    }

    async fn fetch(&self, _terms: &[String]) -> Result<Vec<ProductRecord>> {
        // The authenticated API has no search parameter; it returns the
        // whole catalog and the matcher narrows it down.
        let endpoints = self.endpoints();
        let mut failures = 0;

        for endpoint in &endpoints {
            debug!(%endpoint, "querying commerce API");

            let response = match self
                .client
                .get(endpoint)
                .bearer_auth(&self.credentials.access_token)
                .header("X-COMMERCE-CLIENT-ID", &self.credentials.client_id)
                .header("X-COMMERCE-CLIENT-SECRET", &self.credentials.client_secret)
                .send()
                .await
            {
                Ok(response) => response,
                Err(e) => {
                    warn!(%endpoint, error = %e, "commerce API request failed");
                    failures += 1;
                    continue;
                }
            };

            if !response.status().is_success() {
                warn!(%endpoint, status = %response.status(), "commerce API rejected request");
                failures += 1;
                continue;
            }

            let body: Value = match response.json().await {
                Ok(body) => body,
                Err(e) => {
                    warn!(%endpoint, error = %e, "commerce API returned malformed JSON");
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
                    info!(count = records.len(), "retrieved products from commerce API");
                    return Ok(records);
                }
            }
        }

        if failures == endpoints.len() {
            return Err(PipelineError::Catalog {
                strategy: self.strategy(),
                message: "every commerce API endpoint failed".into(),
            });
        }
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_ladder_ends_with_the_per_client_path() {
        let api = CommerceApi::new(
            reqwest::Client::new(),
            "https://commerce.example.com",
            "https://shop.example.org",
            CommerceCredentials {
                client_id: "cid-1".to_string(),
                client_secret: "secret".to_string(),
                access_token: "token".to_string(),
            },
        );

        let endpoints = api.endpoints();
        assert_eq!(
            endpoints,
            vec![
                "https://commerce.example.com/api/v1/products",
                "https://commerce.example.com/api/v1/store/products",
                "https://commerce.example.com/api/v1/store/cid-1/products",
            ]
        );
    }
}
