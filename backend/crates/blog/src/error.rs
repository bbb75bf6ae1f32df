//! Blog Error Types
//!
//! Blog-specific error variants that render through the unified
//! `kernel::error::AppError` problem body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use platform::cache::CacheError;
use thiserror::Error;

/// Blog-specific result type alias
pub type BlogResult<T> = Result<T, BlogError>;

#[derive(Debug, Error)]
pub enum BlogError {
    /// Unknown slug or id, or a post that is not public
    #[error("Not found.")]
    NotFound,

    /// Page number past the last page
    #[error("Invalid page.")]
    InvalidPage,

    #[error("Comments are disabled.")]
    CommentsDisabled,

    /// Fixed-window throttle exhausted
    #[error("Request was throttled.")]
    Throttled,

    /// Field-level validation failure
    #[error("{message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl BlogError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        BlogError::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            BlogError::NotFound | BlogError::InvalidPage => StatusCode::NOT_FOUND,
            BlogError::CommentsDisabled | BlogError::Validation { .. } => StatusCode::BAD_REQUEST,
            BlogError::Throttled => StatusCode::TOO_MANY_REQUESTS,
            BlogError::Database(e) if is_unique_violation(e) => StatusCode::CONFLICT,
            BlogError::Cache(_) | BlogError::Database(_) | BlogError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            BlogError::NotFound | BlogError::InvalidPage => ErrorKind::NotFound,
            BlogError::CommentsDisabled | BlogError::Validation { .. } => ErrorKind::BadRequest,
            BlogError::Throttled => ErrorKind::TooManyRequests,
            BlogError::Database(e) if is_unique_violation(e) => ErrorKind::Conflict,
            BlogError::Cache(_) | BlogError::Database(_) | BlogError::Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    pub fn to_app_error(&self) -> AppError {
        match self {
            BlogError::Validation { field, message } => {
                AppError::validation(*field, message.clone())
            }
            BlogError::Database(e) if is_unique_violation(e) => {
                AppError::conflict("A record with these values already exists.")
            }
            BlogError::Cache(_) | BlogError::Database(_) | BlogError::Internal(_) => {
                AppError::internal("A server error occurred.")
            }
            _ => AppError::new(self.kind(), self.to_string()),
        }
    }

    fn log(&self) {
        match self {
            BlogError::Database(e) => tracing::error!(error = %e, "Blog database error"),
            BlogError::Cache(e) => tracing::error!(error = %e, "Blog cache error"),
            BlogError::Internal(msg) => tracing::error!(message = %msg, "Blog internal error"),
            BlogError::Throttled => tracing::warn!("Blog request throttled"),
            _ => tracing::debug!(error = %self, "Blog error"),
        }
    }
}

impl IntoResponse for BlogError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(BlogError::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(BlogError::InvalidPage.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(BlogError::CommentsDisabled.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(BlogError::Throttled.status_code(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn test_messages_match_public_contract() {
        assert_eq!(BlogError::InvalidPage.to_app_error().message(), "Invalid page.");
        assert_eq!(
            BlogError::CommentsDisabled.to_app_error().message(),
            "Comments are disabled."
        );
    }

    #[test]
    fn test_cache_errors_are_masked() {
        let err = BlogError::from(CacheError::Backend("redis down at 10.0.0.7".to_string()));
        let app = err.to_app_error();
        assert_eq!(app.status_code(), 500);
        assert!(!app.message().contains("10.0.0.7"));
    }
}
