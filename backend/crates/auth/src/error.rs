//! Auth Error Types
//!
//! This module provides auth-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

use crate::domain::value_object::{scope::Scope, user_name::UserNameError};

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// Caller is not logged in, or acts on something that isn't theirs
    #[error("{0}")]
    Unauthorized(String),

    /// Caller is known to lack the right; anonymous token management lands here
    #[error("{0}")]
    Forbidden(String),

    /// Token lacks the scope required for the operation
    #[error("Missing required scope {0}.")]
    MissingScope(Scope),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    InvalidUserName(#[from] UserNameError),

    /// Unknown OAuth provider name in the path
    #[error("OAuth provider {0} not found.")]
    UnknownProvider(String),

    /// Callback arrived without the state cookie set by the login redirect
    #[error("Missing state session.")]
    MissingOAuthState,

    #[error("The OAuth states don't match.")]
    OAuthStateMismatch,

    /// OAuth provider request failed
    #[error("OAuth provider error: {0}")]
    Provider(String),

    /// Error raised by a shared kernel component
    #[error(transparent)]
    App(#[from] AppError),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        AuthError::Unauthorized(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        AuthError::Forbidden(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        AuthError::NotFound(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        AuthError::BadRequest(msg.into())
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::Unauthorized(_) => ErrorKind::Unauthorized,
            AuthError::Forbidden(_) | AuthError::MissingScope(_) => ErrorKind::Forbidden,
            AuthError::NotFound(_) | AuthError::UnknownProvider(_) => ErrorKind::NotFound,
            AuthError::BadRequest(_)
            | AuthError::InvalidUserName(_)
            | AuthError::OAuthStateMismatch => ErrorKind::BadRequest,
            AuthError::App(e) => e.kind(),
            AuthError::MissingOAuthState
            | AuthError::Provider(_)
            | AuthError::Database(_)
            | AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        AppError::new(self.kind(), self.to_string())
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
            AuthError::Provider(msg) => {
                tracing::error!(message = %msg, "OAuth provider request failed");
            }
            AuthError::OAuthStateMismatch | AuthError::MissingOAuthState => {
                tracing::warn!(error = %self, "OAuth state check failed");
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
        // Keep the user-facing message for the state check
        if let AuthError::MissingOAuthState = self {
            return (
                self.status_code(),
                axum::Json(serde_json::json!({
                    "statusCode": self.status_code().as_u16(),
                    "message": self.to_string(),
                })),
            )
                .into_response();
        }
        self.to_app_error().into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(AuthError::unauthorized("x").status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AuthError::MissingScope(Scope::Paste).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(AuthError::not_found("x").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            AuthError::OAuthStateMismatch.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AuthError::MissingOAuthState.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AuthError::App(AppError::not_found("gone")).status_code(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_scope_message() {
        assert_eq!(
            AuthError::MissingScope(Scope::UserAccessTokens).to_string(),
            "Missing required scope user:access_tokens."
        );
    }
}
