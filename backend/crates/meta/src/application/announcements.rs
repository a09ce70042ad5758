//! Announcements Use Case

use std::sync::Arc;

use auth::UserContext;
use chrono::Utc;
use kernel::id::AnnouncementId;

use crate::domain::entities::Announcement;
use crate::domain::repository::MetaStore;
use crate::error::{MetaError, MetaResult};

const NOT_FOUND: &str = "Announcement not found.";

#[derive(Debug, Clone, Default)]
pub struct AnnouncementInput {
    pub title: String,
    pub content: String,
}

impl AnnouncementInput {
    fn validate(&self) -> MetaResult<()> {
        if self.title.trim().is_empty() {
            return Err(MetaError::bad_request("Title is required."));
        }
        if self.content.trim().is_empty() {
            return Err(MetaError::bad_request("Content is required."));
        }
        Ok(())
    }
}

pub struct AnnouncementUseCase<R>
where
    R: MetaStore,
{
    repo: Arc<R>,
}

impl<R> AnnouncementUseCase<R>
where
    R: MetaStore,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn latest(&self) -> MetaResult<Option<Announcement>> {
        Ok(self.repo.list_announcements().await?.into_iter().next())
    }

    pub async fn list(&self) -> MetaResult<Vec<Announcement>> {
        self.repo.list_announcements().await
    }

    pub async fn create(
        &self,
        ctx: &UserContext,
        input: AnnouncementInput,
    ) -> MetaResult<Announcement> {
        require_admin(ctx, "Only admins can create new announcements.")?;
        input.validate()?;

        let announcement = Announcement {
            id: AnnouncementId::new(),
            created_at: Utc::now(),
            title: input.title,
            content: input.content,
        };
        self.repo.create_announcement(&announcement).await?;

        tracing::info!(announcement_id = %announcement.id, "Announcement created");
        Ok(announcement)
    }

    pub async fn update(
        &self,
        ctx: &UserContext,
        id: &AnnouncementId,
        input: AnnouncementInput,
    ) -> MetaResult<Announcement> {
        require_admin(ctx, "Only admins can edit announcements.")?;
        input.validate()?;

        let mut announcement = self
            .repo
            .find_announcement(id)
            .await?
            .ok_or_else(|| MetaError::not_found(NOT_FOUND))?;

        announcement.title = input.title;
        announcement.content = input.content;
        self.repo.update_announcement(&announcement).await?;

        tracing::info!(announcement_id = %id, "Announcement edited");
        Ok(announcement)
    }

    pub async fn delete(&self, ctx: &UserContext, id: &AnnouncementId) -> MetaResult<()> {
        require_admin(ctx, "Only admins can delete announcements.")?;

        if self.repo.find_announcement(id).await?.is_none() {
            return Err(MetaError::not_found(NOT_FOUND));
        }
        self.repo.delete_announcement(id).await?;

        tracing::info!(announcement_id = %id, "Announcement deleted");
        Ok(())
    }
}

fn require_admin(ctx: &UserContext, message: &str) -> MetaResult<()> {
    if ctx.is_admin() {
        Ok(())
    } else {
        Err(MetaError::unauthorized(message))
    }
}
