//! Hardcoded last-resort catalog entries.

use async_trait::async_trait;
use snapcart_core::ProductRecord;
use tracing::info;

use super::source::CatalogSource;
use crate::error::Result;

/// Known catalog entries (name, handle, price) used only when every
/// dynamic strategy yields nothing.
const KNOWN_PRODUCTS: &[(&str, &str, &str)] = &[
    ("Erlenmeyer Flask 250ml", "erlenmeyer-flask-250ml", "$8.50"),
    ("Beaker 500ml", "beaker-500ml", "$6.00"),
    ("Graduated Cylinder 100ml", "graduated-cylinder-100ml", "$9.25"),
    ("Petri Dishes (Pack of 20)", "petri-dishes-pack-of-20", "$12.00"),
    ("Pipette Tips 200ul (Box)", "pipette-tips-200ul-box", "$15.75"),
    ("Safety Goggles", "safety-goggles", "$4.99"),
    ("Nitrile Gloves (Box of 100)", "nitrile-gloves-box-of-100", "$11.50"),
    ("Test Tube Rack", "test-tube-rack", "$7.25"),
];

/// Catalog source serving a fixed product list.
pub struct StaticCatalog {
    records: Vec<ProductRecord>,
}

impl StaticCatalog {
    /// Build the static records with URLs under the given store origin.
    pub fn new(origin: &str) -> Self {
        let records = KNOWN_PRODUCTS
            .iter()
            .map(|(name, handle, price)| ProductRecord {
                name: (*name).to_string(),
                id: (*handle).to_string(),
                price: (*price).to_string(),
                description: String::new(),
                url: format!("{origin}/products/{handle}"),
            })
            .collect();
        Self { records }
    }
}

#[async_trait]
impl CatalogSource for StaticCatalog {
    fn strategy(&self) -> &'static str {
        "static_list"
    }

    async fn fetch(&self, _terms: &[String]) -> Result<Vec<ProductRecord>> {
        info!(count = self.records.len(), "serving static fallback catalog");
        Ok(self.records.clone())
    }
}
