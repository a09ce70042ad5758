//! OAuth provider port.

use crate::application::config::OAuthProviderConfig;
use crate::error::AuthResult;

/// Identity returned by the provider's user endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderUser {
    pub id: String,
    pub username: String,
    pub avatar_url: String,
}

/// Downloaded image bytes with their media type
#[derive(Debug, Clone)]
pub struct DownloadedImage {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Outbound calls to an OAuth provider
#[trait_variant::make(OAuthClient: Send)]
pub trait LocalOAuthClient {
    /// Exchange an authorization code for a provider access token
    async fn exchange_code(&self, provider: &OAuthProviderConfig, code: &str) -> AuthResult<String>;

    /// Fetch the identity behind a provider access token
    async fn fetch_user(
        &self,
        provider: &OAuthProviderConfig,
        token: &str,
    ) -> AuthResult<ProviderUser>;

    /// Download an avatar image
    async fn download_image(&self, url: &str) -> AuthResult<DownloadedImage>;
}
