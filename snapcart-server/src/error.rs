//! Handler error type and its HTTP mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Errors a request handler can surface to the client.
///
/// Only input and configuration problems become user-visible failures;
/// catalog and matching trouble degrades to a "not found" result long
/// before reaching this type.
#[derive(Debug, Error)]
pub enum AppError {
    /// The request itself was unusable (missing file, missing field).
    #[error("{0}")]
    BadRequest(String),

    /// The deployment gates uploads on a storefront login and the
    /// session cookie was absent.
    #[error("storefront login required")]
    Unauthorized,

    /// A required service (the vision model) is not configured.
    #[error("{0}")]
    NotConfigured(String),

    /// Anything unexpected. Logged in full, reported generically.
    #[error("failed to process image")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::BadRequest(message) => (StatusCode::BAD_REQUEST, message.clone()),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
            AppError::NotConfigured(message) => (StatusCode::INTERNAL_SERVER_ERROR, message.clone()),
            AppError::Internal(source) => {
                error!(error = %source, "request handler failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Failed to process image".to_string())
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_the_error_taxonomy() {
        let cases = [
            (AppError::BadRequest("no file".into()), StatusCode::BAD_REQUEST),
            (AppError::Unauthorized, StatusCode::UNAUTHORIZED),
            (AppError::NotConfigured("AI service not configured".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (AppError::Internal(anyhow::anyhow!("boom")), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }
}
