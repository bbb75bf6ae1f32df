//! Auth Error Types
//!
//! This module provides auth-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use platform::password::{PasswordHashError, PasswordPolicyError};
use thiserror::Error;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown identifier, wrong password or inactive account.
    /// All three answer identically.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Second factor missing or wrong
    #[error("2FA code required or invalid")]
    TwoFactorRequired,

    /// Missing, expired or revoked bearer/refresh token
    #[error("Given token not valid for any token type")]
    InvalidSession,

    /// Verification or reset token unknown, consumed or forged
    #[error("Invalid token")]
    InvalidToken,

    /// Verification token exists but is past its expiry
    #[error("Token expired")]
    TokenExpired,

    /// Device unknown, foreign or already confirmed
    #[error("Device not found")]
    DeviceNotFound,

    /// TOTP code rejected during enrollment
    #[error("Invalid code")]
    InvalidCode,

    #[error("Not found.")]
    UserNotFound,

    /// Page number past the last page
    #[error("Invalid page.")]
    InvalidPage,

    /// Field-level validation failure
    #[error("{message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        AuthError::Validation {
            field,
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::InvalidCredentials
            | AuthError::InvalidToken
            | AuthError::TokenExpired
            | AuthError::InvalidCode
            | AuthError::Validation { .. } => StatusCode::BAD_REQUEST,
            AuthError::TwoFactorRequired | AuthError::InvalidSession => StatusCode::UNAUTHORIZED,
            AuthError::DeviceNotFound | AuthError::UserNotFound | AuthError::InvalidPage => {
                StatusCode::NOT_FOUND
            }
            AuthError::Database(e) if is_unique_violation(e) => StatusCode::CONFLICT,
            AuthError::Database(_) | AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::InvalidCredentials
            | AuthError::InvalidToken
            | AuthError::TokenExpired
            | AuthError::InvalidCode
            | AuthError::Validation { .. } => ErrorKind::BadRequest,
            AuthError::TwoFactorRequired | AuthError::InvalidSession => ErrorKind::Unauthorized,
            AuthError::DeviceNotFound | AuthError::UserNotFound | AuthError::InvalidPage => {
                ErrorKind::NotFound
            }
            AuthError::Database(e) if is_unique_violation(e) => ErrorKind::Conflict,
            AuthError::Database(_) | AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        match self {
            AuthError::Validation { field, message } => {
                AppError::validation(*field, message.clone())
            }
            // Unique violation that slipped past the pre-checks (concurrent insert)
            AuthError::Database(e) if is_unique_violation(e) => {
                AppError::conflict("A record with these values already exists.")
            }
            // Never leak database or internal details to the client
            AuthError::Database(_) | AuthError::Internal(_) => {
                AppError::internal("A server error occurred.")
            }
            _ => AppError::new(self.kind(), self.to_string()),
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            AuthError::TwoFactorRequired => {
                tracing::warn!("Login rejected at second factor");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        if err.is_client_error() {
            let field = err
                .field_errors()
                .first()
                .map(|f| f.field.to_string())
                .unwrap_or_default();
            return AuthError::Validation {
                field: known_field(&field),
                message: err.message().to_string(),
            };
        }
        AuthError::Internal(err.to_string())
    }
}

impl From<PasswordPolicyError> for AuthError {
    fn from(err: PasswordPolicyError) -> Self {
        AuthError::validation("password", err.to_string())
    }
}

impl From<PasswordHashError> for AuthError {
    fn from(err: PasswordHashError) -> Self {
        AuthError::Internal(err.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        tracing::debug!(error = %err, "Rejected access token");
        AuthError::InvalidSession
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}

/// Field names are `'static` in [`AuthError::Validation`]; anything unknown
/// is reported under `non_field_errors`.
fn known_field(field: &str) -> &'static str {
    match field {
        "email" => "email",
        "username" => "username",
        "password" => "password",
        "new_password" => "new_password",
        "code" => "code",
        "count" => "count",
        _ => "non_field_errors",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_failures_have_distinct_statuses() {
        assert_eq!(AuthError::InvalidCredentials.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AuthError::TwoFactorRequired.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AuthError::TwoFactorRequired.to_app_error().message(),
            "2FA code required or invalid"
        );
    }

    #[test]
    fn test_internal_errors_are_masked() {
        let app = AuthError::Internal("pool exhausted".to_string()).to_app_error();
        assert_eq!(app.status_code(), 500);
        assert!(!app.message().contains("pool"));
    }

    #[test]
    fn test_validation_carries_field() {
        let app = AuthError::validation("email", "A user with this email already exists.")
            .to_app_error();
        let json = app.field_errors_json().unwrap();
        assert_eq!(json["email"][0], "A user with this email already exists.");
    }

    #[test]
    fn test_from_app_error_keeps_client_errors() {
        let err = AuthError::from(AppError::validation("email", "Enter a valid email address."));
        assert!(matches!(err, AuthError::Validation { field: "email", .. }));

        let err = AuthError::from(AppError::internal("boom"));
        assert!(matches!(err, AuthError::Internal(_)));
    }
}
