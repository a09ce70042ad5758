//! Edit Paste Use Case
//!
//! Content edits snapshot the previous state into the paste's history.

use std::sync::Arc;

use auth::UserContext;
use auth::domain::Scope;
use chrono::Utc;
use kernel::id::{PasteHistoryId, PasteId, generate_while};

use crate::application::create_paste::{PastyInput, build_pasties, validate_content};
use crate::application::encryption::{self, EncryptionKeys};
use crate::application::get_paste::GetPasteUseCase;
use crate::application::languages::LanguageUseCase;
use crate::domain::entities::{Paste, PasteHistory};
use crate::domain::repository::{LanguageDetector, PasteStore};
use crate::domain::services::normalize_tags;
use crate::error::{PasteError, PasteResult};

#[derive(Debug, Clone, Default)]
pub struct EditPasteInput {
    pub title: String,
    pub pasties: Vec<PastyInput>,
}

pub struct EditPasteUseCase<R, D>
where
    R: PasteStore,
    D: LanguageDetector + Send + Sync + 'static,
{
    repo: Arc<R>,
    reader: GetPasteUseCase<R>,
    languages: LanguageUseCase<D>,
}

impl<R, D> EditPasteUseCase<R, D>
where
    R: PasteStore,
    D: LanguageDetector + Send + Sync + 'static,
{
    pub fn new(repo: Arc<R>, reader: GetPasteUseCase<R>, languages: LanguageUseCase<D>) -> Self {
        Self {
            repo,
            reader,
            languages,
        }
    }

    /// Replace title and pasties
    pub async fn edit(
        &self,
        ctx: &UserContext,
        id: &PasteId,
        input: EditPasteInput,
        keys: &EncryptionKeys,
    ) -> PasteResult<Paste> {
        ctx.require_user("You must be authorized to edit pastes.")?;
        ctx.require_scope(&[Scope::Paste])?;

        let mut paste = self.reader.get(ctx, id, keys).await?;
        require_owner(
            ctx,
            &paste,
            "Only owned pastes can be edited.",
            "You can only edit your own pastes.",
        )?;
        validate_content(&input.title, &input.pasties)?;

        let snapshot = PasteHistory {
            id: generate_while(|id: &PasteHistoryId| paste.history.iter().any(|h| &h.id == id)),
            edited_at: Utc::now(),
            title: paste.title.clone(),
            pasties: paste.pasties.clone(),
        };

        paste.pasties = build_pasties(&self.languages, input.pasties, true).await?;
        paste.title = input.title;
        paste.history.push(snapshot);

        if paste.is_encrypted() {
            let key = keys
                .key_for(&paste.id)
                .ok_or(PasteError::MissingEncryptionKey)?;
            paste.encrypted = Some(encryption::seal(&paste.content(), key).await?);
        }

        self.repo.update_content(&paste).await?;
        tracing::info!(paste_id = %paste.id, edits = paste.history.len(), "Paste edited");

        Ok(paste)
    }

    /// Replace the tags; returns the updated paste
    pub async fn edit_tags(
        &self,
        ctx: &UserContext,
        id: &PasteId,
        tags: Vec<String>,
        keys: &EncryptionKeys,
    ) -> PasteResult<Paste> {
        ctx.require_user("You must be authorized to edit tags.")?;
        ctx.require_scope(&[Scope::Paste])?;

        let mut paste = self.reader.get(ctx, id, keys).await?;
        require_owner(
            ctx,
            &paste,
            "Only owned pastes can have their tags edited.",
            "You can only edit tags of your own pastes.",
        )?;

        paste.tags = normalize_tags(tags);
        self.repo.set_tags(&paste.id, &paste.tags).await?;

        Ok(paste)
    }
}

/// 400 for anonymous pastes, 401 for pastes of someone else
pub(crate) fn require_owner(
    ctx: &UserContext,
    paste: &Paste,
    unowned_message: &str,
    foreign_message: &str,
) -> PasteResult<()> {
    let Some(owner_id) = &paste.owner_id else {
        return Err(PasteError::bad_request(unowned_message));
    };
    if !ctx.is_self_id(owner_id.as_str()) {
        return Err(PasteError::unauthorized(foreign_message));
    }
    Ok(())
}
