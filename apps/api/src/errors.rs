use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::config::ConfigError;
use crate::generation::{GenerationError, TopicError};
use crate::history::{StoreError, HISTORY_UNAVAILABLE_MESSAGE};
use crate::identity::IdentityError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Feature unavailable: {0}")]
    Config(#[from] ConfigError),

    #[error("Generation failed: {0}")]
    Generation(#[from] GenerationError),

    #[error("Identity error: {0}")]
    Identity(#[from] IdentityError),

    #[error("History unavailable: {0}")]
    HistoryUnavailable(#[from] StoreError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<TopicError> for AppError {
    fn from(e: TopicError) -> Self {
        AppError::Validation(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
            AppError::Config(e) => {
                tracing::warn!("Request hit unconfigured feature: {e}");
                (StatusCode::SERVICE_UNAVAILABLE, "CONFIG_ERROR", e.to_string())
            }
            AppError::Generation(e) => {
                tracing::error!("Generation error: {e}");
                (StatusCode::BAD_GATEWAY, "GENERATION_ERROR", e.to_string())
            }
            AppError::Identity(e) => match e {
                IdentityError::Provider { status, message } => {
                    let status = match *status {
                        401 | 403 => StatusCode::UNAUTHORIZED,
                        429 => StatusCode::TOO_MANY_REQUESTS,
                        s if (400..500).contains(&s) => StatusCode::BAD_REQUEST,
                        _ => StatusCode::BAD_GATEWAY,
                    };
                    (status, "AUTH_ERROR", message.clone())
                }
                IdentityError::Unauthenticated => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", e.to_string())
                }
                IdentityError::Http(_)
                | IdentityError::InvalidResponse(_)
                | IdentityError::InvalidExpiry(_) => {
                    tracing::error!("Identity provider error: {e}");
                    (
                        StatusCode::BAD_GATEWAY,
                        "AUTH_UNAVAILABLE",
                        "The authentication service is unavailable. Please try again later."
                            .to_string(),
                    )
                }
            },
            AppError::HistoryUnavailable(e) => {
                tracing::error!("Error fetching generations: {e}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "HISTORY_UNAVAILABLE",
                    HISTORY_UNAVAILABLE_MESSAGE.to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
