//! Application Layer
//!
//! Use cases and application services.

pub mod access_tokens;
pub mod config;
pub mod images;
pub mod oauth;
pub mod settings;
pub mod user_context;
pub mod users;

// Re-exports
pub use access_tokens::{AccessTokenUseCase, GenerateTokenInput, IssuedToken};
pub use config::{AuthConfig, OAuthProviderConfig, TokenHeaderStyle};
pub use images::ImageUseCase;
pub use oauth::{CallbackOutcome, LoginRedirect, OAuthUseCase};
pub use settings::{ResolvedSettings, SettingsUseCase};
pub use user_context::UserContext;
pub use users::UserUseCase;
