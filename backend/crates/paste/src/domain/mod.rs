//! Domain Layer - Business logic and entities
//!
//! This layer contains:
//! - Domain entities (Paste, Pasty, PasteHistory)
//! - The language catalogue
//! - Domain services (tags, text and language statistics)
//! - Repository and detector traits (interfaces)

pub mod entities;
pub mod languages;
pub mod repository;
pub mod services;

pub use entities::{EncryptedContent, Paste, PasteContent, PasteHistory, Pasty};
pub use languages::{Language, LanguageCatalogue};
pub use repository::{LanguageDetector, OwnerQuery, PasteRepository, PasteStore};
