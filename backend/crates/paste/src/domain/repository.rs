//! Repository Traits
//!
//! Interfaces for data persistence and language detection. Implementations
//! live in the infrastructure layer.

use chrono::{DateTime, Utc};
use kernel::action_log::ActionLogRepository;
use kernel::id::{PasteId, UserId};

use crate::domain::entities::Paste;
use crate::error::PasteResult;

/// Filter for a user's pastes, newest first
#[derive(Debug, Clone)]
pub struct OwnerQuery {
    pub owner_id: UserId,
    pub pinned_only: bool,
    pub include_private: bool,
    pub tag: Option<String>,
    pub page: u32,
    pub page_size: u32,
}

/// Paste repository trait
#[trait_variant::make(PasteRepository: Send)]
pub trait LocalPasteRepository {
    /// Insert a paste with its pasties and history (or its ciphertext)
    async fn create(&self, paste: &Paste) -> PasteResult<()>;

    /// Find a paste by ID, with the star count filled in
    async fn find_by_id(&self, id: &PasteId) -> PasteResult<Option<Paste>>;

    async fn exists_by_id(&self, id: &PasteId) -> PasteResult<bool>;

    /// Replace title, pasties and history (or the ciphertext)
    async fn update_content(&self, paste: &Paste) -> PasteResult<()>;

    async fn set_pinned(&self, id: &PasteId, pinned: bool) -> PasteResult<()>;

    async fn set_private(&self, id: &PasteId, private: bool) -> PasteResult<()>;

    async fn set_tags(&self, id: &PasteId, tags: &[String]) -> PasteResult<()>;

    async fn delete(&self, id: &PasteId) -> PasteResult<()>;

    async fn is_starred(&self, id: &PasteId, user_id: &UserId) -> PasteResult<bool>;

    async fn star(&self, id: &PasteId, user_id: &UserId) -> PasteResult<()>;

    async fn unstar(&self, id: &PasteId, user_id: &UserId) -> PasteResult<()>;

    /// One page of a user's pastes and the total number of matches
    async fn find_by_owner(&self, query: &OwnerQuery) -> PasteResult<(Vec<Paste>, u64)>;

    /// Every paste of a user, newest first
    async fn find_all_by_owner(&self, owner_id: &UserId) -> PasteResult<Vec<Paste>>;

    /// Distinct tags over a user's pastes
    async fn tags_by_owner(&self, owner_id: &UserId) -> PasteResult<Vec<String>>;

    /// Number of stored pastes
    async fn count(&self) -> PasteResult<u64>;

    /// Delete pastes whose `deletes_at` is before `now`, returning their ids
    async fn delete_expired(&self, now: DateTime<Utc>) -> PasteResult<Vec<PasteId>>;
}

/// Everything a paste handler needs from storage
pub trait PasteStore: PasteRepository + ActionLogRepository + Clone + Send + Sync + 'static {}

impl<T> PasteStore for T where
    T: PasteRepository + ActionLogRepository + Clone + Send + Sync + 'static
{
}

/// Guesses the language of a piece of content
#[trait_variant::make(LanguageDetector: Send)]
pub trait LocalLanguageDetector {
    /// Raw language name as reported by the detector, `None` on failure
    async fn detect(&self, content: &str) -> Option<String>;
}
