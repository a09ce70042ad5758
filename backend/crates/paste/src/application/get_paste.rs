//! Get Paste Use Case
//!
//! Every read goes through the same checks: the paste exists, has not
//! expired, and is visible to the caller. Encrypted pastes are decrypted with
//! the key supplied by the request.

use std::sync::Arc;

use auth::UserContext;
use auth::domain::Scope;
use chrono::{DateTime, Utc};
use kernel::action_log::{ActionLogType, log_action};
use kernel::id::{PasteHistoryId, PasteId};
use serde::Serialize;

use crate::application::archive::{ZipBuilder, pasty_file_names};
use crate::application::encryption::{self, EncryptionKeys};
use crate::domain::entities::{Paste, PasteHistory, Pasty};
use crate::domain::languages::LanguageCatalogue;
use crate::domain::repository::PasteStore;
use crate::domain::services::{LanguageStat, PasteStats, language_stats, paste_stats};
use crate::error::{PasteError, PasteResult};

/// Entry of the compact history list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: PasteHistoryId,
    pub edited_at: DateTime<Utc>,
}

/// One side of a diff; the current state has no id or edit time
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasteRevision {
    pub id: Option<PasteHistoryId>,
    pub edited_at: Option<DateTime<Utc>>,
    pub title: String,
    pub pasties: Vec<Pasty>,
}

impl From<&PasteHistory> for PasteRevision {
    fn from(h: &PasteHistory) -> Self {
        Self {
            id: Some(h.id.clone()),
            edited_at: Some(h.edited_at),
            title: h.title.clone(),
            pasties: h.pasties.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasteDiff {
    pub current_paste: Paste,
    pub old_paste: PasteRevision,
    pub new_paste: PasteRevision,
}

/// Zip download of a paste
pub struct PasteArchive {
    pub file_name: String,
    pub data: Vec<u8>,
}

/// True when the caller may see a private paste
pub(crate) fn can_read_private(ctx: &UserContext, paste: &Paste) -> bool {
    ctx.user().is_some_and(|u| paste.is_owned_by(&u.id))
        && ctx.has_scope(&[Scope::Paste, Scope::PasteRead])
}

pub(crate) fn is_owner(ctx: &UserContext, paste: &Paste) -> bool {
    ctx.user().is_some_and(|u| paste.is_owned_by(&u.id))
}

pub struct GetPasteUseCase<R>
where
    R: PasteStore,
{
    repo: Arc<R>,
    catalogue: Arc<LanguageCatalogue>,
}

impl<R> GetPasteUseCase<R>
where
    R: PasteStore,
{
    pub fn new(repo: Arc<R>, catalogue: Arc<LanguageCatalogue>) -> Self {
        Self { repo, catalogue }
    }

    /// Existing, unexpired paste without any visibility check
    pub async fn find_live(&self, id: &PasteId) -> PasteResult<Paste> {
        let paste = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(PasteError::paste_not_found)?;

        if paste.is_expired(Utc::now()) {
            self.repo.delete(&paste.id).await?;
            log_action(self.repo.as_ref(), ActionLogType::PasteExpired, paste.id.as_str()).await;
            tracing::info!(paste_id = %paste.id, "Deleted expired paste on access");
            return Err(PasteError::paste_not_found());
        }

        Ok(paste)
    }

    /// Paste as the caller may see it, still encrypted.
    ///
    /// Private pastes of others look absent and tags are only shown to the owner.
    pub async fn find_visible(&self, ctx: &UserContext, id: &PasteId) -> PasteResult<Paste> {
        let mut paste = self.find_live(id).await?;

        if paste.private && !can_read_private(ctx, &paste) {
            return Err(PasteError::paste_not_found());
        }

        if !is_owner(ctx, &paste) {
            paste.tags.clear();
        }

        Ok(paste)
    }

    /// Decrypt in place using the request's key
    pub async fn decrypt(&self, paste: &mut Paste, keys: &EncryptionKeys) -> PasteResult<()> {
        let Some(encrypted) = &paste.encrypted else {
            return Ok(());
        };
        let key = keys
            .key_for(&paste.id)
            .ok_or(PasteError::MissingEncryptionKey)?;

        let content = encryption::open(encrypted, key).await?;
        paste.pasties = content.pasties;
        paste.history = content.history;
        Ok(())
    }

    pub async fn get(
        &self,
        ctx: &UserContext,
        id: &PasteId,
        keys: &EncryptionKeys,
    ) -> PasteResult<Paste> {
        let mut paste = self.find_visible(ctx, id).await?;
        self.decrypt(&mut paste, keys).await?;
        Ok(paste)
    }

    pub async fn is_encrypted(&self, ctx: &UserContext, id: &PasteId) -> PasteResult<bool> {
        Ok(self.find_visible(ctx, id).await?.is_encrypted())
    }

    pub async fn stats(
        &self,
        ctx: &UserContext,
        id: &PasteId,
        keys: &EncryptionKeys,
    ) -> PasteResult<PasteStats> {
        let paste = self.get(ctx, id, keys).await?;
        Ok(paste_stats(&paste.pasties))
    }

    pub async fn language_stats(
        &self,
        ctx: &UserContext,
        id: &PasteId,
        keys: &EncryptionKeys,
    ) -> PasteResult<Vec<LanguageStat>> {
        let paste = self.get(ctx, id, keys).await?;
        Ok(language_stats(&paste, &self.catalogue))
    }

    /// Content of one pasty, optionally as it was at a history entry
    pub async fn raw(
        &self,
        ctx: &UserContext,
        id: &PasteId,
        pasty_id: &str,
        history_id: Option<&str>,
        keys: &EncryptionKeys,
    ) -> PasteResult<String> {
        let paste = self.get(ctx, id, keys).await?;

        let pasties = match history_id {
            Some(history_id) => {
                &paste
                    .find_history(history_id)
                    .ok_or_else(|| PasteError::not_found("Edit not found."))?
                    .pasties
            }
            None => &paste.pasties,
        };

        pasties
            .iter()
            .find(|p| p.id.as_str() == pasty_id)
            .map(|p| p.content.clone())
            .ok_or_else(|| PasteError::not_found("Pasty not found."))
    }

    /// One file per pasty, named after its title and language
    pub async fn zip(
        &self,
        ctx: &UserContext,
        id: &PasteId,
        keys: &EncryptionKeys,
    ) -> PasteResult<PasteArchive> {
        let paste = self.get(ctx, id, keys).await?;

        let mut zip = ZipBuilder::new();
        let names = pasty_file_names(&paste.pasties, &self.catalogue);
        for (pasty, name) in paste.pasties.iter().zip(&names) {
            zip.add(name, pasty.content.as_bytes())?;
        }

        let stem = if paste.title.trim().is_empty() {
            paste.id.to_string()
        } else {
            paste.title.clone()
        };

        Ok(PasteArchive {
            file_name: format!("{stem}.zip"),
            data: zip.finish()?,
        })
    }

    /// Edits, newest first
    pub async fn history_compact(
        &self,
        ctx: &UserContext,
        id: &PasteId,
        keys: &EncryptionKeys,
    ) -> PasteResult<Vec<HistoryEntry>> {
        let paste = self.get(ctx, id, keys).await?;
        let mut entries: Vec<HistoryEntry> = paste
            .history
            .iter()
            .map(|h| HistoryEntry {
                id: h.id.clone(),
                edited_at: h.edited_at,
            })
            .collect();
        entries.sort_by(|a, b| b.edited_at.cmp(&a.edited_at));
        Ok(entries)
    }

    /// The paste with title and pasties from a history entry
    pub async fn at_edit(
        &self,
        ctx: &UserContext,
        id: &PasteId,
        history_id: &str,
        keys: &EncryptionKeys,
    ) -> PasteResult<Paste> {
        let mut paste = self.get(ctx, id, keys).await?;
        let edit = paste
            .find_history(history_id)
            .cloned()
            .ok_or_else(|| PasteError::not_found("Edit not found."))?;

        paste.title = edit.title;
        paste.pasties = edit.pasties;
        Ok(paste)
    }

    /// A history entry next to the state that replaced it
    pub async fn diff(
        &self,
        ctx: &UserContext,
        id: &PasteId,
        history_id: &str,
        keys: &EncryptionKeys,
    ) -> PasteResult<PasteDiff> {
        let paste = self.get(ctx, id, keys).await?;
        let index = paste
            .history
            .iter()
            .position(|h| h.id.as_str() == history_id)
            .ok_or_else(|| PasteError::not_found("Edit not found."))?;

        let old_paste = PasteRevision::from(&paste.history[index]);
        let new_paste = match paste.history.get(index + 1) {
            Some(next) => PasteRevision::from(next),
            None => PasteRevision {
                id: None,
                edited_at: None,
                title: paste.title.clone(),
                pasties: paste.pasties.clone(),
            },
        };

        Ok(PasteDiff {
            current_paste: paste,
            old_paste,
            new_paste,
        })
    }
}
