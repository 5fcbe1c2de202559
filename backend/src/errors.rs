// backend/src/errors.rs
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug, Clone)]
pub enum AppError {
    // --- Request/Input Errors ---
    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Invalid Input: {0}")]
    InvalidInput(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("API Rate Limit Exceeded")]
    RateLimited,

    // --- Inference Errors ---
    // Transport-level failure talking to the model provider. Retryable.
    #[error("AI service error: {0}")]
    InferenceFailed(String),

    // The model answered, but the payload failed schema/domain validation.
    // Never retried automatically.
    #[error("AI output failed validation: {0}")]
    AgentOutputInvalid(String),

    // A retried task ran out of attempts. Wraps only the last error.
    #[error("task '{task}' failed after {attempts} attempts: {last_error}")]
    AgentRetriesExhausted {
        task: String,
        attempts: u32,
        last_error: String,
    },

    // --- General/Internal Errors ---
    #[error("Configuration Error: {0}")]
    ConfigError(String),

    #[error("IO Error: {0}")]
    IoError(String),

    #[error("Serialization Error: {0}")]
    SerializationError(String),

    #[error("Internal Server Error: {0}")]
    InternalServerError(String),
}

impl AppError {
    /// Whether the retry layer may re-issue the failed operation.
    /// Only transport-level inference failures qualify; validation and
    /// schema problems are deterministic and must surface unchanged.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::InferenceFailed(_))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // 4xx Client Errors
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::InvalidInput(msg) => {
                (StatusCode::BAD_REQUEST, format!("Invalid input: {msg}"))
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "API rate limit exceeded. Please try again later.".to_string(),
            ),

            // 5xx Upstream Errors
            AppError::InferenceFailed(e) => {
                error!("AI service error: {}", e);
                (StatusCode::BAD_GATEWAY, "AI service error".to_string())
            }
            AppError::AgentOutputInvalid(e) => {
                error!("AI output failed validation: {}", e);
                (
                    StatusCode::BAD_GATEWAY,
                    "AI service returned an unusable result".to_string(),
                )
            }
            AppError::AgentRetriesExhausted {
                ref task,
                attempts,
                ref last_error,
            } => {
                error!(
                    "task '{}' exhausted {} attempts: {}",
                    task, attempts, last_error
                );
                (
                    StatusCode::BAD_GATEWAY,
                    "AI service is currently unavailable".to_string(),
                )
            }

            // 5xx Server Errors
            AppError::ConfigError(msg) => {
                error!("Configuration error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Server configuration error".to_string(),
                )
            }
            AppError::IoError(e) => {
                error!("IO error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "File system or network error".to_string(),
                )
            }
            AppError::SerializationError(e) => {
                error!("Serialization error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Data formatting error".to_string(),
                )
            }
            AppError::InternalServerError(e) => {
                error!("Internal Server Error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An unexpected error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

// --- Convenience Result Type ---
pub type Result<T, E = AppError> = std::result::Result<T, E>;

// --- From implementations ---

impl From<genai::Error> for AppError {
    fn from(err: genai::Error) -> Self {
        AppError::InferenceFailed(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::SerializationError(err.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalServerError(err.to_string())
    }
}
