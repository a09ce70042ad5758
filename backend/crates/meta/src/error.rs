//! Meta Error Types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Meta-specific result type alias
pub type MetaResult<T> = Result<T, MetaError>;

#[derive(Debug, Error)]
pub enum MetaError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    /// GitHub could not be reached or answered garbage
    #[error("Failed to fetch releases: {0}")]
    Releases(String),

    #[error(transparent)]
    App(#[from] AppError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl MetaError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        MetaError::NotFound(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        MetaError::BadRequest(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        MetaError::Unauthorized(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            MetaError::NotFound(_) => ErrorKind::NotFound,
            MetaError::BadRequest(_) => ErrorKind::BadRequest,
            MetaError::Unauthorized(_) => ErrorKind::Unauthorized,
            MetaError::Releases(_) => ErrorKind::ServiceUnavailable,
            MetaError::App(e) => e.kind(),
            MetaError::Database(_) => ErrorKind::InternalServerError,
        }
    }

    pub fn to_app_error(&self) -> AppError {
        AppError::new(self.kind(), self.to_string())
    }

    fn log(&self) {
        match self {
            MetaError::Database(e) => {
                tracing::error!(error = %e, "Meta database error");
            }
            MetaError::Releases(msg) => {
                tracing::warn!(message = %msg, "GitHub releases unavailable");
            }
            MetaError::Unauthorized(msg) => {
                tracing::warn!(message = %msg, "Rejected announcement change");
            }
            _ => {
                tracing::debug!(error = %self, "Meta error");
            }
        }
    }
}

impl From<MetaError> for AppError {
    fn from(err: MetaError) -> Self {
        err.to_app_error()
    }
}

impl IntoResponse for MetaError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            MetaError::unauthorized("no").status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            MetaError::Releases("timeout".into()).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            MetaError::not_found("Announcement not found.").to_string(),
            "Announcement not found."
        );
    }
}
