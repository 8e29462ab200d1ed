//! Wire shapes of the HTTP API.
//!
//! Field names here are load-bearing: the web frontend predates this
//! implementation and expects them exactly as they are.

use serde::{Deserialize, Serialize};
use snapcart_core::{ItemDescription, ProductRecord};

/// `/upload` response in auto-select mode.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub identification: ItemDescription,
    /// Absolute product page URL, or `null` when nothing matched.
    /// A `null` here is a normal outcome, not an error.
    pub product_url: Option<String>,
    /// Base64 data-URI echo of the uploaded image.
    pub image_data: String,
}

/// `/upload` response in candidate-selection mode.
#[derive(Debug, Serialize)]
pub struct CandidateUploadResponse {
    pub identification: ItemDescription,
    pub candidate_products: Vec<ProductRecord>,
    pub image_data: String,
}

/// `/select_product` request body.
#[derive(Debug, Deserialize)]
pub struct SelectProductRequest {
    pub product_url: Option<String>,
}

/// `/select_product` response.
#[derive(Debug, Serialize)]
pub struct SelectProductResponse {
    pub success: bool,
    pub product_url: String,
    pub message: String,
}

/// `/check-login` response.
#[derive(Debug, Serialize)]
pub struct CheckLoginResponse {
    pub logged_in: bool,
}
