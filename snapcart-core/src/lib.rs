//! Shared types, configuration, and errors for the snapcart service.
//!
//! Everything that crosses a crate boundary lives here: the wire-level
//! data model (item descriptions, product records, match results), the
//! process-wide [`AppConfig`] built once at startup, and the core error
//! type.

pub mod config;
pub mod error;
pub mod types;

pub use config::{AppConfig, CommerceCredentials, MatchMode, Strategy};
pub use error::{ConfigError, Result};
pub use types::{Confidence, ItemDescription, MatchResult, ProductRecord, NOT_FOUND};
