//! Paste Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Pastes, pasties, history, language catalogue, repository traits
//! - `application/` - Use cases: create, read, edit, owner actions, listings, expiry
//! - `infra/` - PostgreSQL repository, linguist loader, external language detector
//! - `presentation/` - HTTP handlers, DTOs, router
//!
//! ## Features
//! - Multi-file pastes with expiry, tags, stars, pinning and private visibility
//! - Edit history with per-edit views and diffs
//! - Optional AES-256 encryption of pasties and history with a caller key
//! - Zip downloads of single pastes and of a user's whole data
//!
//! ## Visibility
//! - Private pastes are only visible to their owner with a paste scope
//! - Missing, expired and hidden pastes all answer 404

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::{LanguageSource, PasteConfig};
pub use domain::languages::LanguageCatalogue;
pub use error::{PasteError, PasteResult};
pub use infra::{CommandDetector, PgPasteRepository, load_catalogue_or_minimal};
pub use presentation::router::paste_router;

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
    pub use crate::domain::languages::*;
    pub use crate::presentation::dto::*;
}

pub mod handlers {
    pub use crate::presentation::handlers::*;
}

pub mod store {
    pub use crate::domain::repository::PasteStore;
    pub use crate::infra::postgres::PgPasteRepository;
}

pub mod router {
    pub use crate::presentation::router::*;
}
