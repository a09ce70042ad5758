//! User Use Case
//!
//! Public profile lookup and account deletion.

use std::sync::Arc;

use kernel::action_log::{ActionLogRepository, ActionLogType, log_action};
use kernel::id::UserId;

use crate::application::user_context::UserContext;
use crate::domain::entity::user::User;
use crate::domain::repository::{ImageRepository, UserRepository};
use crate::domain::value_object::scope::Scope;
use crate::error::{AuthError, AuthResult};

const USER_NOT_FOUND: &str = "User not found.";

pub struct UserUseCase<R>
where
    R: UserRepository + ImageRepository + ActionLogRepository + Send + Sync + 'static,
{
    repo: Arc<R>,
}

impl<R> UserUseCase<R>
where
    R: UserRepository + ImageRepository + ActionLogRepository + Send + Sync + 'static,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Case-insensitive lookup by user name
    pub async fn get_by_username(&self, username: &str) -> AuthResult<User> {
        self.repo
            .find_by_username(username)
            .await?
            .ok_or_else(|| AuthError::not_found(USER_NOT_FOUND))
    }

    pub async fn get_by_id(&self, id: &UserId) -> AuthResult<User> {
        UserRepository::find_by_id(self.repo.as_ref(), id)
            .await?
            .ok_or_else(|| AuthError::not_found(USER_NOT_FOUND))
    }

    /// Delete the caller's own account together with its avatar
    pub async fn delete(&self, ctx: &UserContext, username: &str) -> AuthResult<()> {
        let caller = ctx.require_user("You must be authorized to delete your account.")?;
        ctx.require_scope(&[Scope::User])?;

        let user = self.get_by_username(username).await?;
        if !ctx.user_is_self(&user) {
            return Err(AuthError::unauthorized("You can delete only your account."));
        }

        if let Some(avatar_id) = &user.avatar_id {
            ImageRepository::delete(self.repo.as_ref(), avatar_id).await?;
        }
        UserRepository::delete(self.repo.as_ref(), &user.id).await?;

        log_action(
            self.repo.as_ref(),
            ActionLogType::UserDeleted,
            caller.id.as_str(),
        )
        .await;

        tracing::info!(user_id = %user.id, "User deleted");

        Ok(())
    }
}
