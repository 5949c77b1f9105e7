// src/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

use crate::{auth::AuthError, models::quiz::SchemaIssue, storage::StorageError};

/// Global Application Error Enum.
/// Centralizes error handling and mapping to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    // 500 Internal Server Error
    InternalServerError(String),

    // 400 Bad Request
    BadRequest(String),

    // 400 Bad Request, with field-level detail
    ValidationError {
        message: String,
        errors: serde_json::Value,
    },

    // 401 Unauthorized
    AuthError(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict (e.g., duplicate username)
    Conflict(String),
}

impl AppError {
    /// Rejects malformed quiz content, listing every offending path.
    pub fn invalid_quiz_data(issues: Vec<SchemaIssue>) -> Self {
        AppError::ValidationError {
            message: "Invalid quiz data format".to_string(),
            errors: json!(issues),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for AppError {}

/// Implements `IntoResponse` for `AppError`.
/// Converts the error into a JSON response with appropriate HTTP status code.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message, errors) = match self {
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                    None,
                )
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, None),
            AppError::ValidationError { message, errors } => {
                (StatusCode::BAD_REQUEST, message, Some(errors))
            }
            AppError::AuthError(msg) => (StatusCode::UNAUTHORIZED, msg, None),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg, None),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, None),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg, None),
        };

        let body = match errors {
            Some(errors) => json!({ "error": error_message, "errors": errors }),
            None => json!({ "error": error_message }),
        };

        (status, Json(body)).into_response()
    }
}

/// Converts storage failures. Unique violations become 409, everything else 500.
impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Conflict(what) => AppError::Conflict(format!("{} already exists", what)),
            StorageError::Database(e) => AppError::InternalServerError(e.to_string()),
        }
    }
}

/// Token problems of any kind collapse into one indistinguishable 401.
/// A failed user sync is a server fault, not an auth failure.
impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Storage(e) => AppError::from(e),
            _ => AppError::AuthError("Unauthorized".to_string()),
        }
    }
}

/// Allows `payload.validate()?` in handlers.
impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::ValidationError {
            message: "Validation failed".to_string(),
            errors: serde_json::to_value(&err).unwrap_or_else(|_| json!(err.to_string())),
        }
    }
}
