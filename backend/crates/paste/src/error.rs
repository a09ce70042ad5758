//! Paste Error Types
//!
//! Paste-specific error variants that integrate with the unified
//! `kernel::error::AppError` system.

use auth::AuthError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Paste-specific result type alias
pub type PasteResult<T> = Result<T, PasteError>;

#[derive(Debug, Error)]
pub enum PasteError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    /// Caller resolution or scope checks
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Language not found.")]
    LanguageNotFound,

    #[error("Missing encryption key")]
    MissingEncryptionKey,

    #[error("Invalid encryption key")]
    InvalidEncryptionKey,

    /// Building a zip archive failed
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Loading the language catalogue failed
    #[error("Language catalogue error: {0}")]
    Catalogue(String),

    #[error(transparent)]
    App(#[from] AppError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl PasteError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        PasteError::NotFound(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        PasteError::BadRequest(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        PasteError::Unauthorized(msg.into())
    }

    /// The 404 used whenever a paste must look absent
    pub fn paste_not_found() -> Self {
        PasteError::NotFound("Paste not found".to_string())
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            PasteError::NotFound(_) => ErrorKind::NotFound,
            PasteError::BadRequest(_)
            | PasteError::LanguageNotFound
            | PasteError::MissingEncryptionKey
            | PasteError::InvalidEncryptionKey => ErrorKind::BadRequest,
            PasteError::Unauthorized(_) => ErrorKind::Unauthorized,
            PasteError::Auth(e) => e.kind(),
            PasteError::App(e) => e.kind(),
            PasteError::Archive(_)
            | PasteError::Catalogue(_)
            | PasteError::Database(_)
            | PasteError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        AppError::new(self.kind(), self.to_string())
    }

    fn log(&self) {
        match self {
            PasteError::Database(e) => {
                tracing::error!(error = %e, "Paste database error");
            }
            PasteError::Archive(e) => {
                tracing::error!(error = %e, "Failed to build zip archive");
            }
            PasteError::Catalogue(msg) | PasteError::Internal(msg) => {
                tracing::error!(message = %msg, "Paste internal error");
            }
            PasteError::InvalidEncryptionKey => {
                tracing::debug!("Paste decryption failed");
            }
            _ => {
                tracing::debug!(error = %self, "Paste error");
            }
        }
    }
}

impl From<PasteError> for AppError {
    fn from(err: PasteError) -> Self {
        err.to_app_error()
    }
}

impl IntoResponse for PasteError {
    fn into_response(self) -> Response {
        match self {
            // Auth errors carry their own logging
            PasteError::Auth(e) => e.into_response(),
            other => {
                other.log();
                other.to_app_error().into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use auth::domain::Scope;

    #[test]
    fn test_status_mapping() {
        assert_eq!(PasteError::paste_not_found().status_code(), StatusCode::NOT_FOUND);
        assert_eq!(PasteError::LanguageNotFound.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            PasteError::MissingEncryptionKey.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            PasteError::Auth(AuthError::MissingScope(Scope::Paste)).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            PasteError::Internal("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_messages() {
        assert_eq!(PasteError::paste_not_found().to_string(), "Paste not found");
        assert_eq!(PasteError::LanguageNotFound.to_string(), "Language not found.");
        assert_eq!(
            PasteError::Auth(AuthError::MissingScope(Scope::Paste)).to_string(),
            "Missing required scope paste."
        );
    }
}
