//! The strategy seam every catalog backend implements.

use async_trait::async_trait;
use snapcart_core::ProductRecord;

use crate::error::Result;

/// One method of obtaining catalog data.
///
/// A source answers a fetch for zero or more search terms with its best
/// set of records. `Ok(vec![])` means "I responded but found nothing";
/// `Err` means the whole strategy was unusable (every endpoint it tried
/// failed). The [`CatalogClient`](super::CatalogClient) absorbs errors
/// into zero results and moves to the next configured source, so a dead
/// upstream can never fail the pipeline.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Stable strategy name for logging.
    fn strategy(&self) -> &'static str;

    /// Fetch records for the given terms.
    async fn fetch(&self, terms: &[String]) -> Result<Vec<ProductRecord>>;
}
