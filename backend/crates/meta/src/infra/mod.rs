//! Infrastructure Layer
//!
//! PostgreSQL storage and the GitHub releases client.

pub mod github;
#[cfg(any(test, feature = "test-util"))]
pub mod memory;
pub mod postgres;

pub use github::GithubReleaseClient;
pub use postgres::PgMetaRepository;
