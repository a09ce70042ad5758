//! Paste Actions Use Case
//!
//! Delete, star, pin and private toggles.

use std::sync::Arc;

use auth::UserContext;
use auth::domain::Scope;
use kernel::action_log::{ActionLogType, log_action};
use kernel::id::PasteId;

use crate::application::edit_paste::require_owner;
use crate::application::get_paste::{GetPasteUseCase, is_owner};
use crate::domain::repository::PasteStore;
use crate::error::{PasteError, PasteResult};

pub struct PasteActionsUseCase<R>
where
    R: PasteStore,
{
    repo: Arc<R>,
    reader: GetPasteUseCase<R>,
}

impl<R> PasteActionsUseCase<R>
where
    R: PasteStore,
{
    pub fn new(repo: Arc<R>, reader: GetPasteUseCase<R>) -> Self {
        Self { repo, reader }
    }

    pub async fn delete(&self, ctx: &UserContext, id: &PasteId) -> PasteResult<()> {
        let user = ctx.require_user("You must be authorized to delete pastes.")?;
        ctx.require_scope(&[Scope::Paste])?;

        let paste = self.reader.find_live(id).await?;

        if !paste.is_owned_by(&user.id) {
            // Someone else's private paste must look absent
            if paste.private {
                return Err(PasteError::paste_not_found());
            }
            return Err(PasteError::unauthorized(
                "You can only delete your own pastes.",
            ));
        }

        self.repo.delete(&paste.id).await?;
        log_action(self.repo.as_ref(), ActionLogType::PasteDeleted, paste.id.as_str()).await;
        tracing::info!(paste_id = %paste.id, "Paste deleted");

        Ok(())
    }

    pub async fn is_starred(&self, ctx: &UserContext, id: &PasteId) -> PasteResult<bool> {
        let user = ctx.require_user("You must be authorized to star pastes.")?;
        let paste = self.reader.find_live(id).await?;

        if paste.private && !is_owner(ctx, &paste) {
            return Err(PasteError::paste_not_found());
        }

        self.repo.is_starred(&paste.id, &user.id).await
    }

    /// Star or unstar; returns whether the paste is now starred
    pub async fn toggle_star(&self, ctx: &UserContext, id: &PasteId) -> PasteResult<bool> {
        let user = ctx.require_user("You must be authorized to star pastes.")?;
        let paste = self.reader.find_live(id).await?;

        if paste.private && !is_owner(ctx, &paste) {
            return Err(PasteError::paste_not_found());
        }

        if self.repo.is_starred(&paste.id, &user.id).await? {
            self.repo.unstar(&paste.id, &user.id).await?;
            Ok(false)
        } else {
            self.repo.star(&paste.id, &user.id).await?;
            Ok(true)
        }
    }

    /// Returns the new pinned state
    pub async fn toggle_pin(&self, ctx: &UserContext, id: &PasteId) -> PasteResult<bool> {
        ctx.require_user("You must be authorized to pin/unpin pastes.")?;
        ctx.require_scope(&[Scope::User])?;

        let paste = self.reader.find_visible(ctx, id).await?;
        require_owner(
            ctx,
            &paste,
            "Only owned pastes can be pinned.",
            "You can only pin/unpin your own pastes.",
        )?;
        if paste.private {
            return Err(PasteError::bad_request("You can't pin private pastes."));
        }

        self.repo.set_pinned(&paste.id, !paste.pinned).await?;
        Ok(!paste.pinned)
    }

    /// Returns the new private state
    pub async fn toggle_private(&self, ctx: &UserContext, id: &PasteId) -> PasteResult<bool> {
        ctx.require_user("You must be authorized to change the private status of pastes.")?;
        ctx.require_scope(&[Scope::Paste])?;

        let paste = self.reader.find_visible(ctx, id).await?;
        require_owner(
            ctx,
            &paste,
            "Only owned pastes can be set/unset to private.",
            "You can only change the private status of your own pastes.",
        )?;
        if paste.pinned {
            return Err(PasteError::bad_request("You can't private pinned pastes."));
        }

        self.repo.set_private(&paste.id, !paste.private).await?;
        Ok(!paste.private)
    }
}
