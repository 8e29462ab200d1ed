//! Product-matching pipeline for the snapcart service.
//!
//! Turns an AI-identified item description into a purchasable product
//! link from a single storefront:
//!
//! - [`terms`] extracts ordered search keywords from the item name;
//! - [`catalog`] queries the configured storefront strategies and
//!   normalizes their heterogeneous responses into [`ProductRecord`]s
//!   with absolute URLs;
//! - [`matcher`] delegates best-candidate selection to an external
//!   ranking model and validates its structured verdict;
//! - [`pipeline`] sequences the above across the fallback ladder.
//!
//! The vision and ranking models sit behind the [`VisionModel`] and
//! [`RankingModel`] traits so everything downstream of them stays
//! deterministic and testable.
//!
//! [`ProductRecord`]: snapcart_core::ProductRecord

pub mod catalog;
pub mod error;
pub mod json;
pub mod matcher;
pub mod openai;
pub mod pipeline;
pub mod ranking;
pub mod terms;
pub mod vision;

pub use catalog::{CatalogClient, CatalogSource};
pub use error::{PipelineError, Result};
pub use matcher::CandidateMatcher;
pub use openai::OpenAiChat;
pub use pipeline::{MatchPipeline, MatchPipelineBuilder};
pub use ranking::{OpenAiRanker, RankingModel};
pub use terms::extract_terms;
pub use vision::{OpenAiVision, VisionModel};
