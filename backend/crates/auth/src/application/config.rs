//! Application Configuration
//!
//! Configuration for the auth application layer.

use std::time::Duration;

/// Re-export SameSite from platform
pub use platform::cookie::SameSite;
use platform::cookie::CookieConfig;

/// How the provider expects the OAuth access token on the user endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenHeaderStyle {
    /// `Authorization: token <t>` (GitHub)
    Token,
    /// `Authorization: Bearer <t>`
    Bearer,
}

/// OAuth provider settings
#[derive(Debug, Clone)]
pub struct OAuthProviderConfig {
    /// Path segment used in `/login/{key}`
    pub key: String,
    /// Name stored on the user (`GitHub`, `GitLab`)
    pub name: String,
    pub client_id: String,
    pub client_secret: String,
    pub auth_url: String,
    pub token_url: String,
    pub user_url: String,
    pub redirect_url: String,
    pub scopes: Vec<String>,
    pub id_field: String,
    pub username_field: String,
    pub avatar_url_field: String,
    pub token_header: TokenHeaderStyle,
    pub user_accept: String,
}

impl OAuthProviderConfig {
    pub fn github(client_id: &str, client_secret: &str, api_url: &str) -> Self {
        Self {
            key: "github".to_string(),
            name: "GitHub".to_string(),
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            auth_url: "https://github.com/login/oauth/authorize".to_string(),
            token_url: "https://github.com/login/oauth/access_token".to_string(),
            user_url: "https://api.github.com/user".to_string(),
            redirect_url: format!("{api_url}/api/v3/login/github/callback"),
            scopes: vec!["read:user".to_string()],
            id_field: "id".to_string(),
            username_field: "login".to_string(),
            avatar_url_field: "avatar_url".to_string(),
            token_header: TokenHeaderStyle::Token,
            user_accept: "application/vnd.github.v3+json".to_string(),
        }
    }

    pub fn gitlab(client_id: &str, client_secret: &str, api_url: &str) -> Self {
        Self {
            key: "gitlab".to_string(),
            name: "GitLab".to_string(),
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            auth_url: "https://gitlab.com/oauth/authorize".to_string(),
            token_url: "https://gitlab.com/oauth/token".to_string(),
            user_url: "https://gitlab.com/api/v4/user".to_string(),
            redirect_url: format!("{api_url}/api/v3/login/gitlab/callback"),
            scopes: vec!["read_user".to_string()],
            id_field: "id".to_string(),
            username_field: "username".to_string(),
            avatar_url_field: "avatar_url".to_string(),
            token_header: TokenHeaderStyle::Bearer,
            user_accept: "application/json".to_string(),
        }
    }

    /// Authorization redirect for the given state
    pub fn authorize_url(&self, state: &str) -> String {
        format!(
            "{}?client_id={}&redirect_uri={}&scope={}&response_type=code&state={}",
            self.auth_url,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&self.redirect_url),
            urlencoding::encode(&self.scopes.join(",")),
            urlencoding::encode(state),
        )
    }
}

/// Auth application configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Front end base URL, target of post-login redirects
    pub client_url: String,
    /// Key for signing the OAuth state and registration cookies
    pub secret: [u8; 32],
    /// Whether to require Secure cookie
    pub cookie_secure: bool,
    /// Cookie holding the login access token
    pub access_token_cookie_name: String,
    pub registration_cookie_name: String,
    pub oauth_state_cookie_name: String,
    pub session_settings_cookie_name: String,
    /// Lifetime of the login cookie
    pub login_cookie_ttl: Duration,
    /// Lifetime of a pending registration
    pub registration_ttl: Duration,
    /// Lifetime of the OAuth state cookie
    pub oauth_state_ttl: Duration,
    /// Anonymous settings are dropped after this much inactivity
    pub session_settings_idle_ttl: Duration,
    pub providers: Vec<OAuthProviderConfig>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            client_url: "http://localhost:5173".to_string(),
            secret: [0u8; 32],
            cookie_secure: true,
            access_token_cookie_name: "pastemyst".to_string(),
            registration_cookie_name: "pastemyst-registration".to_string(),
            oauth_state_cookie_name: "pastemyst-oauth-state".to_string(),
            session_settings_cookie_name: "pastemyst_session_settings".to_string(),
            login_cookie_ttl: Duration::from_secs(30 * 24 * 3600),
            registration_ttl: Duration::from_secs(3600),
            oauth_state_ttl: Duration::from_secs(600),
            session_settings_idle_ttl: Duration::from_secs(30 * 24 * 3600),
            providers: Vec::new(),
        }
    }
}

impl AuthConfig {
    /// Create config with a random signing secret (for development)
    pub fn with_random_secret() -> Self {
        let mut secret = [0u8; 32];
        secret.copy_from_slice(&platform::crypto::random_bytes(32));
        Self {
            secret,
            ..Default::default()
        }
    }

    /// Create config for development (insecure cookie)
    pub fn development() -> Self {
        Self {
            cookie_secure: false,
            ..Self::with_random_secret()
        }
    }

    pub fn provider(&self, key: &str) -> Option<&OAuthProviderConfig> {
        self.providers.iter().find(|p| p.key == key)
    }

    fn strict_cookie(&self, name: &str, ttl: Duration) -> CookieConfig {
        CookieConfig::new(name)
            .secure(self.cookie_secure)
            .same_site(SameSite::Strict)
            .max_age_secs(ttl.as_secs() as i64)
    }

    pub fn access_token_cookie(&self) -> CookieConfig {
        self.strict_cookie(&self.access_token_cookie_name, self.login_cookie_ttl)
    }

    pub fn registration_cookie(&self) -> CookieConfig {
        self.strict_cookie(&self.registration_cookie_name, self.registration_ttl)
    }

    /// The provider redirects back cross-site, so the state cookie must be Lax
    pub fn oauth_state_cookie(&self) -> CookieConfig {
        CookieConfig::new(&self.oauth_state_cookie_name)
            .secure(self.cookie_secure)
            .same_site(SameSite::Lax)
            .max_age_secs(self.oauth_state_ttl.as_secs() as i64)
    }

    /// Long-lived; the server side expires idle sessions
    pub fn session_settings_cookie(&self) -> CookieConfig {
        self.strict_cookie(
            &self.session_settings_cookie_name,
            Duration::from_secs(10 * 365 * 24 * 3600),
        )
    }
}
