//! API Error Types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Errors from service start-up and administrative endpoints
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Logging setup failed: {0}")]
    Logging(String),

    #[error("Invalid rate limit: per_second={per_second}, burst_size={burst_size}")]
    RateLimit { per_second: u64, burst_size: u32 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The new bundle could not be loaded; the previous pipeline stays live
    #[error("Reload failed: {0}")]
    Reload(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::Reload(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "status": "error",
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}
