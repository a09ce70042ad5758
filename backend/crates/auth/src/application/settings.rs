//! Settings Use Case
//!
//! Editor preferences for logged-in users and anonymous sessions,
//! plus account settings (user name, avatar).

use std::sync::Arc;

use chrono::{DateTime, Utc};
use kernel::id::{ImageId, SessionSettingsId, generate_while_async};

use crate::application::user_context::UserContext;
use crate::domain::entity::{
    image::Image,
    settings::{SessionSettings, Settings, UserSettings},
};
use crate::domain::repository::{ImageRepository, SessionSettingsRepository, UserRepository};
use crate::domain::value_object::user_name::UserName;
use crate::error::{AuthError, AuthResult};

/// Settings returned to the client, with a session to remember when one was created
#[derive(Debug)]
pub struct ResolvedSettings {
    pub settings: Settings,
    pub new_session: Option<SessionSettingsId>,
}

pub struct SettingsUseCase<R>
where
    R: UserRepository
        + SessionSettingsRepository
        + ImageRepository
        + Send
        + Sync
        + 'static,
{
    repo: Arc<R>,
}

impl<R> SettingsUseCase<R>
where
    R: UserRepository
        + SessionSettingsRepository
        + ImageRepository
        + Send
        + Sync
        + 'static,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// User settings, else the cookie session, else a fresh session
    pub async fn get_settings(
        &self,
        ctx: &UserContext,
        session_cookie: Option<&str>,
    ) -> AuthResult<ResolvedSettings> {
        if let Some(user) = ctx.user() {
            return Ok(ResolvedSettings {
                settings: user.settings.clone(),
                new_session: None,
            });
        }

        if let Some(raw) = session_cookie {
            let id = SessionSettingsId::from_string(raw);
            let found = SessionSettingsRepository::find_by_id(self.repo.as_ref(), &id).await?;
            if let Some(session) = found {
                self.repo.touch(&id, Utc::now()).await?;
                return Ok(ResolvedSettings {
                    settings: session.settings,
                    new_session: None,
                });
            }
        }

        let repo = self.repo.clone();
        let id: SessionSettingsId = generate_while_async(|id| {
            let repo = repo.clone();
            async move { SessionSettingsRepository::exists_by_id(repo.as_ref(), &id).await }
        })
        .await?;

        let session = SessionSettings::new(id.clone());
        SessionSettingsRepository::create(self.repo.as_ref(), &session).await?;
        tracing::debug!(session_id = %id, "Created session settings");

        Ok(ResolvedSettings {
            settings: session.settings,
            new_session: Some(id),
        })
    }

    pub async fn update_settings(
        &self,
        ctx: &UserContext,
        session_cookie: Option<&str>,
        settings: Settings,
    ) -> AuthResult<()> {
        if let Some(user) = ctx.user() {
            return self.repo.update_settings(&user.id, &settings).await;
        }

        let raw = session_cookie.ok_or_else(|| {
            AuthError::bad_request(
                "Can't update the settings since the user is not logged in and the session settings cookie is missing.",
            )
        })?;

        let id = SessionSettingsId::from_string(raw);
        if !SessionSettingsRepository::exists_by_id(self.repo.as_ref(), &id).await? {
            return Err(AuthError::bad_request(
                "The session settings cookie has probably expired.",
            ));
        }

        self.repo.update(&id, &settings, Utc::now()).await
    }

    pub fn get_user_settings(&self, ctx: &UserContext) -> AuthResult<UserSettings> {
        let user = ctx.require_user("You must be logged in to view user settings.")?;
        Ok(user.user_settings.clone())
    }

    pub async fn update_user_settings(
        &self,
        ctx: &UserContext,
        user_settings: UserSettings,
    ) -> AuthResult<()> {
        let user = ctx.require_user("You must be logged in to update user settings.")?;
        self.repo
            .update_user_settings(&user.id, &user_settings)
            .await
    }

    pub async fn set_username(&self, ctx: &UserContext, username: &str) -> AuthResult<()> {
        let user = ctx.require_user("You must be logged in to change your username.")?;
        let username = UserName::new(username)?;

        if user.username.eq_ignore_case(username.original()) {
            return Err(AuthError::bad_request("Same username."));
        }

        if self.repo.exists_by_username(username.canonical()).await? {
            return Err(AuthError::bad_request("Username already taken."));
        }

        self.repo.update_username(&user.id, &username).await?;
        tracing::info!(user_id = %user.id, username = %username, "Username changed");

        Ok(())
    }

    /// Replace the avatar, dropping the previous image
    pub async fn set_avatar(
        &self,
        ctx: &UserContext,
        content_type: &str,
        data: Vec<u8>,
    ) -> AuthResult<ImageId> {
        let user = ctx.require_user("You must be logged in to change your avatar.")?;

        if !content_type.starts_with("image/") {
            return Err(AuthError::bad_request("The avatar must be an image."));
        }

        let repo = self.repo.clone();
        let id: ImageId = generate_while_async(|id| {
            let repo = repo.clone();
            async move { ImageRepository::exists_by_id(repo.as_ref(), &id).await }
        })
        .await?;

        ImageRepository::create(
            self.repo.as_ref(),
            &Image {
                id: id.clone(),
                content_type: content_type.to_string(),
                data,
                created_at: Utc::now(),
            },
        )
        .await?;

        self.repo.update_avatar(&user.id, Some(&id)).await?;

        if let Some(old) = &user.avatar_id {
            ImageRepository::delete(self.repo.as_ref(), old).await?;
        }

        Ok(id)
    }

    /// Drop anonymous sessions idle since `before`
    pub async fn expire_sessions(&self, before: DateTime<Utc>) -> AuthResult<u64> {
        self.repo.delete_idle(before).await
    }
}
