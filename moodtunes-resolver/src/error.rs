//! Error types for moodtunes-resolver's HTTP surface
//!
//! Messages returned to clients are fixed strings per failure class; upstream
//! details stay in the logs.

use crate::catalog::CatalogError;
use crate::pipeline::PipelineError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::warn;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Pipeline(PipelineError::Catalog(err)) => {
                warn!(error = %err, "Resolution failed");
                catalog_failure(&err)
            }
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

fn catalog_failure(err: &CatalogError) -> (StatusCode, &'static str, String) {
    let (status, code, message) = match err {
        CatalogError::Configuration => (
            StatusCode::SERVICE_UNAVAILABLE,
            "SERVICE_UNAVAILABLE",
            "Service unavailable",
        ),
        CatalogError::Authentication => (
            StatusCode::BAD_GATEWAY,
            "CATALOG_AUTH_FAILED",
            "Music catalog authentication failed",
        ),
        CatalogError::UpstreamUnavailable(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            "CATALOG_UNAVAILABLE",
            "Music catalog temporarily unavailable",
        ),
        _ => (
            StatusCode::BAD_GATEWAY,
            "CATALOG_ERROR",
            "Music catalog request failed",
        ),
    };
    (status, code, message.to_string())
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
