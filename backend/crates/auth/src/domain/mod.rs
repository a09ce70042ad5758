//! Domain Layer
//!
//! Contains entities, value objects, and repository traits.

pub mod entity;
pub mod provider;
pub mod repository;
pub mod value_object;

// Re-exports
pub use entity::{
    access_token::AccessToken,
    image::Image,
    settings::{SessionSettings, Settings, UserSettings},
    user::User,
};
pub use provider::{DownloadedImage, OAuthClient, ProviderUser};
pub use repository::{
    AccessTokenRepository, AuthStore, ImageRepository, SessionSettingsRepository, UserRepository,
};
pub use value_object::{access_token_value::AccessTokenValue, scope::Scope, user_name::UserName};
