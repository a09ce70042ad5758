//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.

use chrono::{DateTime, Utc};
use kernel::action_log::ActionLogRepository;
use kernel::id::{AccessTokenId, ImageId, SessionSettingsId, UserId};

use crate::domain::entity::{
    access_token::AccessToken,
    image::Image,
    settings::{SessionSettings, Settings, UserSettings},
    user::User,
};
use crate::domain::value_object::user_name::UserName;
use crate::error::AuthResult;

/// User repository trait
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    /// Create a new user
    async fn create(&self, user: &User) -> AuthResult<()>;

    /// Find user by ID
    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>>;

    /// Find user by user name (case-insensitive)
    async fn find_by_username(&self, username: &str) -> AuthResult<Option<User>>;

    /// Find user by OAuth identity (provider name compared case-insensitively)
    async fn find_by_provider(
        &self,
        provider_name: &str,
        provider_id: &str,
    ) -> AuthResult<Option<User>>;

    /// Check if a user ID exists
    async fn exists_by_id(&self, user_id: &UserId) -> AuthResult<bool>;

    /// Check if user name exists (case-insensitive)
    async fn exists_by_username(&self, username: &str) -> AuthResult<bool>;

    async fn update_username(&self, user_id: &UserId, username: &UserName) -> AuthResult<()>;

    async fn update_avatar(&self, user_id: &UserId, avatar_id: Option<&ImageId>) -> AuthResult<()>;

    async fn update_settings(&self, user_id: &UserId, settings: &Settings) -> AuthResult<()>;

    async fn update_user_settings(
        &self,
        user_id: &UserId,
        user_settings: &UserSettings,
    ) -> AuthResult<()>;

    /// Delete user; owned pastes, stars and tokens go with it
    async fn delete(&self, user_id: &UserId) -> AuthResult<()>;
}

/// Access token repository trait
#[trait_variant::make(AccessTokenRepository: Send)]
pub trait LocalAccessTokenRepository {
    async fn create(&self, token: &AccessToken) -> AuthResult<()>;

    async fn find_by_id(&self, id: &AccessTokenId) -> AuthResult<Option<AccessToken>>;

    async fn exists_by_id(&self, id: &AccessTokenId) -> AuthResult<bool>;

    /// Non-hidden tokens of a user, newest first
    async fn find_visible_by_owner(&self, owner_id: &UserId) -> AuthResult<Vec<AccessToken>>;

    async fn delete(&self, id: &AccessTokenId) -> AuthResult<()>;

    /// Delete every token expired at `now`, returning their owners
    async fn delete_expired(&self, now: DateTime<Utc>) -> AuthResult<Vec<UserId>>;
}

/// Anonymous session settings repository trait
#[trait_variant::make(SessionSettingsRepository: Send)]
pub trait LocalSessionSettingsRepository {
    async fn create(&self, session: &SessionSettings) -> AuthResult<()>;

    async fn find_by_id(&self, id: &SessionSettingsId) -> AuthResult<Option<SessionSettings>>;

    async fn exists_by_id(&self, id: &SessionSettingsId) -> AuthResult<bool>;

    async fn touch(&self, id: &SessionSettingsId, at: DateTime<Utc>) -> AuthResult<()>;

    async fn update(
        &self,
        id: &SessionSettingsId,
        settings: &Settings,
        at: DateTime<Utc>,
    ) -> AuthResult<()>;

    /// Delete sessions not accessed since `before`
    async fn delete_idle(&self, before: DateTime<Utc>) -> AuthResult<u64>;
}

/// Image repository trait
#[trait_variant::make(ImageRepository: Send)]
pub trait LocalImageRepository {
    async fn create(&self, image: &Image) -> AuthResult<()>;

    async fn find_by_id(&self, id: &ImageId) -> AuthResult<Option<Image>>;

    async fn exists_by_id(&self, id: &ImageId) -> AuthResult<bool>;

    async fn delete(&self, id: &ImageId) -> AuthResult<()>;
}

/// Every store the auth handlers need, implemented by a single backend
pub trait AuthStore:
    UserRepository
    + AccessTokenRepository
    + SessionSettingsRepository
    + ImageRepository
    + ActionLogRepository
    + Clone
    + Send
    + Sync
    + 'static
{
}

impl<T> AuthStore for T where
    T: UserRepository
        + AccessTokenRepository
        + SessionSettingsRepository
        + ImageRepository
        + ActionLogRepository
        + Clone
        + Send
        + Sync
        + 'static
{
}
