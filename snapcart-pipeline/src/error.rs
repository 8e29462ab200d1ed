//! Error types for the `snapcart-pipeline` crate.

use thiserror::Error;

/// Errors that can occur in the matching pipeline.
///
/// Catalog and model failures are never fatal to a pipeline run: the
/// orchestrator checks for them explicitly and falls through to the next
/// strategy, so they carry enough context to log and nothing more.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A model call (vision or ranking) failed at the transport layer or
    /// returned an unusable response envelope.
    #[error("model error ({provider}): {message}")]
    Model {
        /// The model provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// A catalog strategy failed outright (every endpoint it tried was
    /// unreachable or rejected the request).
    #[error("catalog error ({strategy}): {message}")]
    Catalog {
        /// The strategy that produced the error.
        strategy: &'static str,
        /// A description of the failure.
        message: String,
    },

    /// A pipeline construction / validation error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// A convenience result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;
