//! Meta Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Announcements, releases, statistics, repository traits
//! - `application/` - Use cases: announcements, release changelog, statistics
//! - `infra/` - PostgreSQL repository, GitHub releases client
//! - `presentation/` - HTTP handlers, DTOs, router
//!
//! ## Features
//! - Server version and live paste count
//! - Changelog built from GitHub releases, cached for the process lifetime
//! - Site statistics with weekly paste activity, derived from the action log
//! - Admin-managed announcements

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::{MetaConfig, ReleaseRepo};
pub use error::{MetaError, MetaResult};
pub use infra::{GithubReleaseClient, PgMetaRepository};
pub use presentation::router::meta_router;

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
    pub use crate::domain::entities::*;
    pub use crate::presentation::dto::*;
}

pub mod handlers {
    pub use crate::presentation::handlers::*;
}

pub mod store {
    pub use crate::domain::repository::MetaStore;
    pub use crate::infra::postgres::PgMetaRepository;
}

pub mod router {
    pub use crate::presentation::router::*;
}

#[cfg(test)]
mod tests;
