//! Error types for the `snapcart-core` crate.

use thiserror::Error;

/// Errors raised while building process configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable held a value the config cannot interpret.
    #[error("invalid value for {variable}: {message}")]
    InvalidValue {
        /// The environment variable at fault.
        variable: String,
        /// A description of what was wrong with it.
        message: String,
    },
}

/// A convenience result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
