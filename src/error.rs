//! Store errors and their HTTP representation.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

use crate::types::TaskId;

/// Message returned when a task is created without a usable title.
pub const TITLE_REQUIRED: &str = "Title is required";

/// Errors raised by the task store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Title is required")]
    EmptyTitle,

    #[error("Task {0} not found")]
    NotFound(TaskId),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("migration failed: {0}")]
    Migration(#[from] refinery::Error),

    #[error("database connection is unavailable")]
    Unavailable,

    #[error("database {} is not initialized; run `todo-server init-db` first", .0.display())]
    NotInitialized(PathBuf),
}

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation errors
    MissingRequiredField,
    MalformedRequest,

    // Not found errors
    TaskNotFound,
    RouteNotFound,

    // Internal errors
    DatabaseError,
}

impl ErrorCode {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorCode::MissingRequiredField | ErrorCode::MalformedRequest => {
                StatusCode::BAD_REQUEST
            }
            ErrorCode::TaskNotFound | ErrorCode::RouteNotFound => StatusCode::NOT_FOUND,
            ErrorCode::DatabaseError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error returned from an HTTP handler.
#[derive(Debug)]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

/// JSON body of every error response.
#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn title_required() -> Self {
        Self::new(ErrorCode::MissingRequiredField, TITLE_REQUIRED)
    }

    pub fn malformed(reason: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::MalformedRequest,
            format!("Malformed JSON body: {}", reason),
        )
    }

    pub fn task_not_found(id: impl fmt::Display) -> Self {
        Self::new(ErrorCode::TaskNotFound, format!("Task {} not found", id))
    }

    pub fn database(err: impl fmt::Display) -> Self {
        Self::new(ErrorCode::DatabaseError, err.to_string())
    }

    pub fn status(&self) -> StatusCode {
        self.code.status()
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::EmptyTitle => ApiError::title_required(),
            StoreError::NotFound(id) => ApiError::task_not_found(id),
            other => ApiError::database(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(code = ?self.code, "{}", self.message);
        } else {
            tracing::debug!(code = ?self.code, status = status.as_u16(), "{}", self.message);
        }
        (
            status,
            Json(ErrorBody {
                error: &self.message,
            }),
        )
            .into_response()
    }
}

/// Result type for HTTP handlers.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_title_maps_to_bad_request_with_exact_message() {
        let err: ApiError = StoreError::EmptyTitle.into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Title is required");
    }

    #[test]
    fn not_found_maps_to_404() {
        let err: ApiError = StoreError::NotFound(999).into();
        assert_eq!(err.code, ErrorCode::TaskNotFound);
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.message, "Task 999 not found");
    }

    #[test]
    fn unavailable_store_is_internal_error() {
        let err: ApiError = StoreError::Unavailable.into();
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn malformed_is_bad_request() {
        let err = ApiError::malformed("expected value at line 1 column 1");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(err.message.starts_with("Malformed JSON body"));
    }
}
