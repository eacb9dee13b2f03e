//! API error types for grievance endpoints.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use grievance_core::GrievanceError;

/// API error response body.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    /// Error code for client handling.
    pub error: String,
    /// Human-readable error message.
    pub message: String,
}

/// Grievance API error type.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Domain error from the lifecycle core.
    #[error(transparent)]
    Domain(#[from] GrievanceError),

    /// Validation error.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Actor identity missing or malformed.
    #[error("Authentication required")]
    Unauthorized,

    /// Resource not found.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Database error.
    #[error("Database error")]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match &self {
            Self::Domain(e) => {
                if e.is_not_found() {
                    (StatusCode::NOT_FOUND, "not_found", e.to_string())
                } else if e.is_conflict() {
                    (
                        StatusCode::CONFLICT,
                        "invalid_status_transition",
                        e.to_string(),
                    )
                } else {
                    match e {
                        GrievanceError::Validation(msg) => {
                            (StatusCode::BAD_REQUEST, "validation_error", msg.clone())
                        }
                        GrievanceError::RuleNotTriggerable(_)
                        | GrievanceError::NoCoordinatorAvailable(_) => {
                            (StatusCode::BAD_REQUEST, "validation_error", e.to_string())
                        }
                        GrievanceError::Database(ref db_err) => {
                            tracing::error!("Domain database error: {:?}", db_err);
                            (
                                StatusCode::INTERNAL_SERVER_ERROR,
                                "database_error",
                                "Database error".to_string(),
                            )
                        }
                        _ => {
                            tracing::error!("Unhandled domain error: {:?}", e);
                            (
                                StatusCode::INTERNAL_SERVER_ERROR,
                                "internal_error",
                                "An internal error occurred".to_string(),
                            )
                        }
                    }
                }
            }
            Self::Validation(msg) => (StatusCode::BAD_REQUEST, "validation_error", msg.clone()),
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "Authentication required".to_string(),
            ),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            Self::Database(ref e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "database_error",
                    "Database error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
        });

        (status, body).into_response()
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::Validation(err.to_string())
    }
}

/// Result type alias for API operations.
pub type ApiResult<T> = std::result::Result<T, ApiError>;
