//! Application Layer - Use Cases
//!
//! This layer orchestrates domain logic and infrastructure.
//! Contains use case implementations.

pub mod archive;
pub mod config;
pub mod create_paste;
pub mod edit_paste;
pub mod encryption;
pub mod expire_pastes;
pub mod get_paste;
pub mod languages;
pub mod paste_actions;
pub mod user_pastes;

pub use config::{LanguageSource, PasteConfig};
pub use create_paste::{CreatePasteInput, CreatePasteUseCase, PastyInput};
pub use edit_paste::{EditPasteInput, EditPasteUseCase};
pub use encryption::EncryptionKeys;
pub use expire_pastes::ExpirePastesUseCase;
pub use get_paste::{GetPasteUseCase, HistoryEntry, PasteArchive, PasteDiff, PasteRevision};
pub use languages::LanguageUseCase;
pub use paste_actions::PasteActionsUseCase;
pub use user_pastes::{Page, PageRequest, PasteWithLangStats, UserExport, UserPastesUseCase};
