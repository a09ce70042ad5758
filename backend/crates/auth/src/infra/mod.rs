//! Infrastructure Layer
//!
//! Database implementations and external service integrations.

#[cfg(any(test, feature = "test-util"))]
pub mod memory;
pub mod oauth_http;
pub mod postgres;

pub use oauth_http::ReqwestOAuthClient;
pub use postgres::PgAuthRepository;
