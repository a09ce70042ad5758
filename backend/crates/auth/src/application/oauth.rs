//! OAuth Login Use Case
//!
//! Login redirect, provider callback and registration of new accounts.
//! Short-lived state lives in HMAC-signed cookies instead of a server session.

use std::sync::Arc;

use chrono::Utc;
use kernel::action_log::{ActionLogRepository, ActionLogType, log_action};
use kernel::id::{ImageId, UserId, generate_while_async};
use platform::crypto::{random_hex, sign_token, verify_token};
use serde::{Deserialize, Serialize};

use crate::application::access_tokens::{AccessTokenUseCase, IssuedToken};
use crate::application::config::{AuthConfig, OAuthProviderConfig};
use crate::domain::entity::{image::Image, user::User};
use crate::domain::provider::OAuthClient;
use crate::domain::repository::{AccessTokenRepository, ImageRepository, UserRepository};
use crate::domain::value_object::user_name::UserName;
use crate::error::{AuthError, AuthResult};

/// Payload of the OAuth state cookie
#[derive(Debug, Serialize, Deserialize)]
struct OAuthState {
    state: String,
    provider: String,
    exp: i64,
}

/// Payload of the pending registration cookie
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegistrationClaims {
    provider_name: String,
    provider_id: String,
    avatar_url: String,
    exp: i64,
}

/// Where to send the browser and the state cookie to set
pub struct LoginRedirect {
    pub url: String,
    pub state_cookie: String,
}

pub enum CallbackOutcome {
    /// Known identity: log straight in
    LoggedIn(IssuedToken),
    /// Unknown identity: the front end asks for a username
    NeedsRegistration {
        registration_cookie: String,
        suggested_username: String,
    },
}

pub struct OAuthUseCase<R, C>
where
    R: UserRepository
        + AccessTokenRepository
        + ImageRepository
        + ActionLogRepository
        + Send
        + Sync
        + 'static,
    C: OAuthClient + Send + Sync + 'static,
{
    repo: Arc<R>,
    client: Arc<C>,
    config: Arc<AuthConfig>,
}

impl<R, C> OAuthUseCase<R, C>
where
    R: UserRepository
        + AccessTokenRepository
        + ImageRepository
        + ActionLogRepository
        + Send
        + Sync
        + 'static,
    C: OAuthClient + Send + Sync + 'static,
{
    pub fn new(repo: Arc<R>, client: Arc<C>, config: Arc<AuthConfig>) -> Self {
        Self {
            repo,
            client,
            config,
        }
    }

    fn tokens(&self) -> AccessTokenUseCase<R, R, R> {
        AccessTokenUseCase::new(self.repo.clone(), self.repo.clone(), self.repo.clone())
    }

    fn provider(&self, key: &str) -> AuthResult<&OAuthProviderConfig> {
        self.config
            .provider(key)
            .ok_or_else(|| AuthError::UnknownProvider(key.to_string()))
    }

    /// Start the authorization code flow
    pub fn begin_login(&self, provider_key: &str) -> AuthResult<LoginRedirect> {
        let provider = self.provider(provider_key)?;
        let state = random_hex(32);

        let payload = OAuthState {
            state: state.clone(),
            provider: provider.key.clone(),
            exp: Utc::now().timestamp() + self.config.oauth_state_ttl.as_secs() as i64,
        };
        let state_cookie = sign_token(&self.config.secret, &payload)
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        Ok(LoginRedirect {
            url: provider.authorize_url(&state),
            state_cookie,
        })
    }

    /// Handle the provider redirect back to us
    pub async fn callback(
        &self,
        provider_key: &str,
        state: &str,
        code: &str,
        state_cookie: Option<&str>,
    ) -> AuthResult<CallbackOutcome> {
        let provider = self.provider(provider_key)?;
        let cookie = state_cookie.ok_or(AuthError::MissingOAuthState)?;

        let expected: OAuthState = verify_token(&self.config.secret, cookie)
            .map_err(|_| AuthError::OAuthStateMismatch)?;

        if expected.exp < Utc::now().timestamp()
            || expected.provider != provider.key
            || expected.state != state
        {
            return Err(AuthError::OAuthStateMismatch);
        }

        let provider_token = self.client.exchange_code(provider, code).await?;
        let provider_user = self.client.fetch_user(provider, &provider_token).await?;

        if let Some(user) = self
            .repo
            .find_by_provider(&provider.name, &provider_user.id)
            .await?
        {
            tracing::info!(user_id = %user.id, provider = %provider.name, "User logged in");
            let token = self.tokens().issue_login(&user.id).await?;
            return Ok(CallbackOutcome::LoggedIn(token));
        }

        let claims = RegistrationClaims {
            provider_name: provider.name.clone(),
            provider_id: provider_user.id,
            avatar_url: provider_user.avatar_url,
            exp: Utc::now().timestamp() + self.config.registration_ttl.as_secs() as i64,
        };
        let registration_cookie = sign_token(&self.config.secret, &claims)
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        Ok(CallbackOutcome::NeedsRegistration {
            registration_cookie,
            suggested_username: provider_user.username,
        })
    }

    /// Finish registration with the chosen username
    pub async fn register(
        &self,
        username: &str,
        registration_cookie: Option<&str>,
    ) -> AuthResult<(User, IssuedToken)> {
        let cookie = registration_cookie
            .ok_or_else(|| AuthError::bad_request("Missing the registration cookie."))?;

        let username = UserName::new(username)?;

        let claims: RegistrationClaims = verify_token(&self.config.secret, cookie)
            .ok()
            .filter(|c: &RegistrationClaims| c.exp >= Utc::now().timestamp())
            .ok_or_else(|| {
                AuthError::bad_request("The registration cookie is invalid or has expired.")
            })?;

        if self.repo.exists_by_username(username.canonical()).await? {
            return Err(AuthError::bad_request("Username is already taken."));
        }

        if self
            .repo
            .find_by_provider(&claims.provider_name, &claims.provider_id)
            .await?
            .is_some()
        {
            return Err(AuthError::bad_request("This account is already registered."));
        }

        let repo = self.repo.clone();
        let id: UserId = generate_while_async(|id| {
            let repo = repo.clone();
            async move { UserRepository::exists_by_id(repo.as_ref(), &id).await }
        })
        .await?;

        let avatar_id = self.store_avatar(&claims.avatar_url).await?;

        let user = User::new(
            id,
            username,
            avatar_id,
            claims.provider_name,
            claims.provider_id,
        );
        UserRepository::create(self.repo.as_ref(), &user).await?;

        let token = self.tokens().issue_login(&user.id).await?;
        log_action(
            self.repo.as_ref(),
            ActionLogType::UserCreated,
            user.id.as_str(),
        )
        .await;

        tracing::info!(user_id = %user.id, username = %user.username, "User registered");

        Ok((user, token))
    }

    /// Copy the provider avatar; registration proceeds without one on failure
    async fn store_avatar(&self, url: &str) -> AuthResult<Option<ImageId>> {
        let downloaded = match self.client.download_image(url).await {
            Ok(d) => d,
            Err(e) => {
                tracing::warn!(error = %e, url = %url, "Failed to download avatar");
                return Ok(None);
            }
        };

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
                content_type: downloaded.content_type,
                data: downloaded.bytes,
                created_at: Utc::now(),
            },
        )
        .await?;

        Ok(Some(id))
    }
}
