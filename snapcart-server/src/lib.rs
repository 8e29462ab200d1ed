//! HTTP server for the snapcart photo-to-product service.
//!
//! Exposes the upload flow over the pipeline crate: `POST /upload`
//! takes a photo, runs vision identification and the product-matching
//! pipeline, and answers with either an auto-selected product link or
//! a candidate list, depending on the configured match mode.

pub mod error;
pub mod protocol;
pub mod server;

pub use error::AppError;
pub use server::{app_router, run_server, AppState};
