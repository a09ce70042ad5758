//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, repository traits, OAuth provider port
//! - `application/` - Use cases and application services
//! - `infra/` - Database implementations and the OAuth HTTP client
//! - `presentation/` - HTTP handlers, DTOs, router, middleware
//!
//! ## Features
//! - OAuth login (GitHub, GitLab) with username registration for new identities
//! - `{id}-{secret}` access tokens with scopes; browser logins use a hidden one in a cookie
//! - Per-request [`UserContext`] resolved from the cookie or `Authorization: Bearer`
//! - Editor settings for users and anonymous sessions, avatars
//!
//! ## Security Model
//! - Only the SHA-512 hash of a token secret is stored
//! - OAuth state and pending registrations live in HMAC-signed cookies
//! - Login cookies are HttpOnly and SameSite=Strict

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::AuthConfig;
pub use application::user_context::UserContext;
pub use error::{AuthError, AuthResult};
pub use infra::{PgAuthRepository, ReqwestOAuthClient};
pub use presentation::router::auth_router;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

// Convenience re-exports
pub mod config {
    pub use crate::application::config::*;
}

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}

pub mod handlers {
    pub use crate::presentation::handlers::*;
}

pub mod store {
    pub use crate::domain::repository::AuthStore;
    pub use crate::infra::postgres::PgAuthRepository;
}

pub mod router {
    pub use crate::presentation::router::*;
}

pub mod middleware {
    pub use crate::presentation::middleware::*;
}

#[cfg(test)]
mod tests;
