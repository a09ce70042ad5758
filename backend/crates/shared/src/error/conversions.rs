//! Error Conversions
//!
//! `From` impls for the foreign errors that cross crate boundaries, and the
//! HTTP rendering of [`AppError`].

use super::app_error::AppError;
use super::kind::ErrorKind;

/// Message returned for every 5xx response
pub const INTERNAL_SERVER_ERROR_MESSAGE: &str = "Internal server error.";

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        let kind = match err.kind() {
            std::io::ErrorKind::NotFound => ErrorKind::NotFound,
            std::io::ErrorKind::TimedOut => ErrorKind::ServiceUnavailable,
            _ => ErrorKind::InternalServerError,
        };
        AppError::new(kind, "I/O failure").with_source(err)
    }
}

/// Bad JSON from the client is its fault; failing to serialize is ours
impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_syntax() || err.is_data() || err.is_eof() {
            AppError::bad_request(format!("Invalid JSON: {err}")).with_source(err)
        } else {
            AppError::internal("JSON serialization failed").with_source(err)
        }
    }
}

/// SQLSTATE classes mapped to client-facing kinds
///
/// See <https://www.postgresql.org/docs/current/errcodes-appendix.html>
#[cfg(feature = "sqlx")]
fn from_sqlstate(code: &str) -> AppError {
    match code {
        "23505" => AppError::conflict("Already exists."),
        "23503" => AppError::conflict("Referenced record does not exist."),
        "23502" | "23514" => AppError::bad_request("Invalid value."),
        c if c.starts_with("23") => AppError::conflict("Constraint violation."),
        c if c.starts_with("53") || c.starts_with("57") => {
            AppError::service_unavailable("Database unavailable")
        }
        _ => AppError::internal("Database error"),
    }
}

#[cfg(feature = "sqlx")]
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        let mapped = match &err {
            sqlx::Error::RowNotFound => AppError::not_found("Record not found."),
            sqlx::Error::PoolTimedOut | sqlx::Error::Io(_) => {
                AppError::service_unavailable("Database unavailable")
            }
            sqlx::Error::Database(db) => match db.code() {
                Some(code) => from_sqlstate(&code),
                None => AppError::internal("Database error"),
            },
            _ => AppError::internal("Database error"),
        };
        mapped.with_source(err)
    }
}

/// Renders `{"statusCode": u16, "message": string}`
#[cfg(feature = "axum")]
impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;
        use axum::http::StatusCode;

        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        // Server-side details stay in the log
        let message = if self.is_server_error() {
            tracing::error!(error = ?self, "Request failed");
            INTERNAL_SERVER_ERROR_MESSAGE
        } else {
            self.message()
        };

        let body = serde_json::json!({
            "statusCode": self.status_code(),
            "message": message,
        });

        (status, Json(body)).into_response()
    }
}
