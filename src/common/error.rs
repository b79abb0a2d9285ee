// Error handling types for the API

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::fmt;
use tracing::error;

use super::validation::{ValidationError, ValidationResult};

/// API error types
#[derive(Debug)]
pub enum ApiError {
    /// Request shape / required-field errors, with per-field messages (400)
    Validation(Vec<ValidationError>),
    /// Duplicate resource, e.g. an already-registered email (400)
    Conflict(String),
    /// Bad login. Carries no detail so that unknown-email and wrong-password
    /// are indistinguishable to the caller (400)
    InvalidCredentials,
    /// Missing, expired, or malformed token (401)
    Unauthorized(String),
    /// Role or ownership violation (403)
    Forbidden(String),
    /// No such resource (404)
    NotFound(String),
    /// Unexpected failure (500)
    Internal(String),
    DatabaseError(sqlx::Error),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Validation(errors) => {
                write!(f, "Validation Failed: {} field(s)", errors.len())
            }
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::InvalidCredentials => write!(f, "Invalid email or password"),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            ApiError::Internal(msg) => write!(f, "Internal Server Error: {}", msg),
            ApiError::DatabaseError(e) => write!(f, "Database Error: {}", e),
        }
    }
}

/// JSON error response structure
///
/// Every failure body carries `success: false` and a human-readable message;
/// validation failures additionally enumerate per-field errors.
#[derive(Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<ValidationError>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message, code, errors) = match self {
            ApiError::Validation(field_errors) => (
                StatusCode::BAD_REQUEST,
                "Validation failed".to_string(),
                "VALIDATION_FAILED",
                Some(field_errors),
            ),
            ApiError::Conflict(msg) => (StatusCode::BAD_REQUEST, msg, "CONFLICT", None),
            ApiError::InvalidCredentials => (
                StatusCode::BAD_REQUEST,
                "Invalid email or password".to_string(),
                "INVALID_CREDENTIALS",
                None,
            ),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg, "UNAUTHORIZED", None),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg, "FORBIDDEN", None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, "NOT_FOUND", None),
            ApiError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                msg,
                "INTERNAL_SERVER_ERROR",
                None,
            ),
            ApiError::DatabaseError(e) => {
                error!(error = %e, "Database error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database operation failed".to_string(),
                    "DATABASE_ERROR",
                    None,
                )
            }
        };

        let error_response = ErrorResponse {
            success: false,
            message,
            code: code.to_string(),
            errors,
        };

        (status, Json(error_response)).into_response()
    }
}

impl From<ValidationResult> for ApiError {
    fn from(result: ValidationResult) -> Self {
        if result.is_valid {
            ApiError::Internal("Validation result was valid but converted to error".to_string())
        } else {
            ApiError::Validation(result.errors)
        }
    }
}
