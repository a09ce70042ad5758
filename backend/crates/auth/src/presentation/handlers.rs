//! HTTP Handlers

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{AppendHeaders, IntoResponse, Redirect, Response};
use std::sync::Arc;

use kernel::id::{AccessTokenId, ImageId, UserId};
use platform::cookie::{delete_cookie_header, extract_cookie, set_cookie_header};

use crate::application::config::AuthConfig;
use crate::application::{
    AccessTokenUseCase, CallbackOutcome, GenerateTokenInput, ImageUseCase, OAuthUseCase,
    SettingsUseCase, UserContext, UserUseCase,
};
use crate::domain::entity::{
    settings::{Settings, UserSettings},
    user::User,
};
use crate::domain::provider::OAuthClient;
use crate::domain::repository::AuthStore;
use crate::domain::value_object::scope::Scope;
use crate::error::{AuthError, AuthResult};
use crate::presentation::dto::{
    AccessTokenResponse, CallbackQuery, GenerateAccessTokenRequest, GenerateAccessTokenResponse,
    RegisterRequest, SetUsernameRequest, UserQuery,
};

/// Shared state for auth handlers
#[derive(Clone)]
pub struct AuthAppState<R, C>
where
    R: AuthStore,
    C: OAuthClient + Clone + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub client: Arc<C>,
    pub config: Arc<AuthConfig>,
}

impl<R, C> AuthAppState<R, C>
where
    R: AuthStore,
    C: OAuthClient + Clone + Send + Sync + 'static,
{
    fn tokens(&self) -> AccessTokenUseCase<R, R, R> {
        AccessTokenUseCase::new(self.repo.clone(), self.repo.clone(), self.repo.clone())
    }

    fn oauth(&self) -> OAuthUseCase<R, C> {
        OAuthUseCase::new(self.repo.clone(), self.client.clone(), self.config.clone())
    }
}

// ============================================================================
// OAuth login
// ============================================================================

/// GET /login/{provider}
pub async fn login<R, C>(
    State(state): State<AuthAppState<R, C>>,
    Path(provider): Path<String>,
) -> AuthResult<Response>
where
    R: AuthStore,
    C: OAuthClient + Clone + Send + Sync + 'static,
{
    let redirect = state.oauth().begin_login(&provider)?;
    let cookie = set_cookie_header(&state.config.oauth_state_cookie(), &redirect.state_cookie);

    Ok((
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        Redirect::to(&redirect.url),
    )
        .into_response())
}

/// GET /login/{provider}/callback
pub async fn login_callback<R, C>(
    State(state): State<AuthAppState<R, C>>,
    Path(provider): Path<String>,
    Query(query): Query<CallbackQuery>,
    headers: HeaderMap,
) -> AuthResult<Response>
where
    R: AuthStore,
    C: OAuthClient + Clone + Send + Sync + 'static,
{
    let config = &state.config;
    let state_cookie = extract_cookie(&headers, &config.oauth_state_cookie_name);
    // The state is single use whatever the outcome
    let clear_state = delete_cookie_header(&config.oauth_state_cookie());

    let outcome = match state
        .oauth()
        .callback(&provider, &query.state, &query.code, state_cookie.as_deref())
        .await
    {
        Ok(outcome) => outcome,
        Err(e) => {
            return Ok((AppendHeaders([(header::SET_COOKIE, clear_state)]), e).into_response());
        }
    };

    let response = match outcome {
        CallbackOutcome::LoggedIn(token) => (
            AppendHeaders([
                (header::SET_COOKIE, clear_state),
                (
                    header::SET_COOKIE,
                    set_cookie_header(&config.access_token_cookie(), &token.value.to_string()),
                ),
            ]),
            Redirect::to(&config.client_url),
        )
            .into_response(),
        CallbackOutcome::NeedsRegistration {
            registration_cookie,
            suggested_username,
        } => {
            let target = format!(
                "{}/create-account?username={}",
                config.client_url,
                urlencoding::encode(&suggested_username)
            );
            (
                AppendHeaders([
                    (header::SET_COOKIE, clear_state),
                    (
                        header::SET_COOKIE,
                        set_cookie_header(&config.registration_cookie(), &registration_cookie),
                    ),
                ]),
                Redirect::to(&target),
            )
                .into_response()
        }
    };

    Ok(response)
}

/// POST /auth/register
pub async fn register<R, C>(
    State(state): State<AuthAppState<R, C>>,
    headers: HeaderMap,
    Json(req): Json<RegisterRequest>,
) -> AuthResult<Response>
where
    R: AuthStore,
    C: OAuthClient + Clone + Send + Sync + 'static,
{
    let config = &state.config;
    let registration = extract_cookie(&headers, &config.registration_cookie_name);

    let (user, token) = state
        .oauth()
        .register(&req.username, registration.as_deref())
        .await?;

    Ok((
        AppendHeaders([
            (
                header::SET_COOKIE,
                delete_cookie_header(&config.registration_cookie()),
            ),
            (
                header::SET_COOKIE,
                set_cookie_header(&config.access_token_cookie(), &token.value.to_string()),
            ),
        ]),
        Json(user),
    )
        .into_response())
}

/// GET /auth/self
pub async fn get_self(ctx: UserContext) -> AuthResult<Json<User>> {
    let user = ctx.require_user("You must be logged in.")?;
    ctx.require_scope(&[Scope::User, Scope::UserRead])?;
    Ok(Json(user.clone()))
}

/// GET /auth/logout
pub async fn logout<R, C>(
    State(state): State<AuthAppState<R, C>>,
    headers: HeaderMap,
) -> AuthResult<Response>
where
    R: AuthStore,
    C: OAuthClient + Clone + Send + Sync + 'static,
{
    let config = &state.config;
    let token = extract_cookie(&headers, &config.access_token_cookie_name);

    state.tokens().logout(token.as_deref()).await?;

    Ok((
        AppendHeaders([(
            header::SET_COOKIE,
            delete_cookie_header(&config.access_token_cookie()),
        )]),
        Redirect::to(&config.client_url),
    )
        .into_response())
}

// ============================================================================
// Access tokens
// ============================================================================

/// POST /auth/self/access_tokens
pub async fn generate_access_token<R, C>(
    State(state): State<AuthAppState<R, C>>,
    ctx: UserContext,
    Json(req): Json<GenerateAccessTokenRequest>,
) -> AuthResult<Json<GenerateAccessTokenResponse>>
where
    R: AuthStore,
    C: OAuthClient + Clone + Send + Sync + 'static,
{
    let input = GenerateTokenInput {
        scopes: req.scopes,
        expires_in: req.expires_in,
        description: req.description,
    };

    let issued = state.tokens().generate_for_self(&ctx, input).await?;
    Ok(Json(issued.into()))
}

/// GET /auth/self/access_tokens
pub async fn list_access_tokens<R, C>(
    State(state): State<AuthAppState<R, C>>,
    ctx: UserContext,
) -> AuthResult<Json<Vec<AccessTokenResponse>>>
where
    R: AuthStore,
    C: OAuthClient + Clone + Send + Sync + 'static,
{
    let tokens = state.tokens().list_for_self(&ctx).await?;
    Ok(Json(tokens.into_iter().map(Into::into).collect()))
}

/// DELETE /auth/self/access_tokens/{id}
pub async fn delete_access_token<R, C>(
    State(state): State<AuthAppState<R, C>>,
    ctx: UserContext,
    Path(id): Path<String>,
) -> AuthResult<StatusCode>
where
    R: AuthStore,
    C: OAuthClient + Clone + Send + Sync + 'static,
{
    state
        .tokens()
        .delete_for_self(&ctx, &AccessTokenId::from_string(id))
        .await?;
    Ok(StatusCode::OK)
}

// ============================================================================
// Users
// ============================================================================

/// GET /users/{username}
pub async fn get_user<R, C>(
    State(state): State<AuthAppState<R, C>>,
    Path(username): Path<String>,
) -> AuthResult<Json<User>>
where
    R: AuthStore,
    C: OAuthClient + Clone + Send + Sync + 'static,
{
    let user = UserUseCase::new(state.repo.clone())
        .get_by_username(&username)
        .await?;
    Ok(Json(user))
}

/// GET /users?id=
pub async fn get_user_by_id<R, C>(
    State(state): State<AuthAppState<R, C>>,
    Query(query): Query<UserQuery>,
) -> AuthResult<Json<User>>
where
    R: AuthStore,
    C: OAuthClient + Clone + Send + Sync + 'static,
{
    let user = UserUseCase::new(state.repo.clone())
        .get_by_id(&UserId::from_string(query.id))
        .await?;
    Ok(Json(user))
}

/// DELETE /users/{username}
pub async fn delete_user<R, C>(
    State(state): State<AuthAppState<R, C>>,
    ctx: UserContext,
    Path(username): Path<String>,
) -> AuthResult<StatusCode>
where
    R: AuthStore,
    C: OAuthClient + Clone + Send + Sync + 'static,
{
    UserUseCase::new(state.repo.clone())
        .delete(&ctx, &username)
        .await?;
    Ok(StatusCode::OK)
}

// ============================================================================
// Settings
// ============================================================================

/// GET /settings
pub async fn get_settings<R, C>(
    State(state): State<AuthAppState<R, C>>,
    ctx: UserContext,
    headers: HeaderMap,
) -> AuthResult<Response>
where
    R: AuthStore,
    C: OAuthClient + Clone + Send + Sync + 'static,
{
    let cookie_config = state.config.session_settings_cookie();
    let session = extract_cookie(&headers, &cookie_config.name);

    let resolved = SettingsUseCase::new(state.repo.clone())
        .get_settings(&ctx, session.as_deref())
        .await?;

    Ok(match resolved.new_session {
        Some(id) => (
            AppendHeaders([(
                header::SET_COOKIE,
                set_cookie_header(&cookie_config, id.as_str()),
            )]),
            Json(resolved.settings),
        )
            .into_response(),
        None => Json(resolved.settings).into_response(),
    })
}

/// PATCH /settings
pub async fn update_settings<R, C>(
    State(state): State<AuthAppState<R, C>>,
    ctx: UserContext,
    headers: HeaderMap,
    Json(settings): Json<Settings>,
) -> AuthResult<StatusCode>
where
    R: AuthStore,
    C: OAuthClient + Clone + Send + Sync + 'static,
{
    let session = extract_cookie(&headers, &state.config.session_settings_cookie_name);

    SettingsUseCase::new(state.repo.clone())
        .update_settings(&ctx, session.as_deref(), settings)
        .await?;
    Ok(StatusCode::OK)
}

/// GET /settings/user
pub async fn get_user_settings<R, C>(
    State(state): State<AuthAppState<R, C>>,
    ctx: UserContext,
) -> AuthResult<Json<UserSettings>>
where
    R: AuthStore,
    C: OAuthClient + Clone + Send + Sync + 'static,
{
    let settings = SettingsUseCase::new(state.repo.clone()).get_user_settings(&ctx)?;
    Ok(Json(settings))
}

/// PATCH /settings/user
pub async fn update_user_settings<R, C>(
    State(state): State<AuthAppState<R, C>>,
    ctx: UserContext,
    Json(settings): Json<UserSettings>,
) -> AuthResult<StatusCode>
where
    R: AuthStore,
    C: OAuthClient + Clone + Send + Sync + 'static,
{
    SettingsUseCase::new(state.repo.clone())
        .update_user_settings(&ctx, settings)
        .await?;
    Ok(StatusCode::OK)
}

/// PATCH /settings/username
pub async fn set_username<R, C>(
    State(state): State<AuthAppState<R, C>>,
    ctx: UserContext,
    Json(req): Json<SetUsernameRequest>,
) -> AuthResult<StatusCode>
where
    R: AuthStore,
    C: OAuthClient + Clone + Send + Sync + 'static,
{
    SettingsUseCase::new(state.repo.clone())
        .set_username(&ctx, &req.username)
        .await?;
    Ok(StatusCode::OK)
}

/// PATCH /settings/avatar (multipart field `file`)
pub async fn set_avatar<R, C>(
    State(state): State<AuthAppState<R, C>>,
    ctx: UserContext,
    mut multipart: Multipart,
) -> AuthResult<Json<ImageId>>
where
    R: AuthStore,
    C: OAuthClient + Clone + Send + Sync + 'static,
{
    let mut upload: Option<(String, Bytes)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AuthError::bad_request(e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let content_type = field.content_type().unwrap_or_default().to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AuthError::bad_request(e.body_text()))?;
        upload = Some((content_type, data));
        break;
    }

    let (content_type, data) =
        upload.ok_or_else(|| AuthError::bad_request("Missing the avatar file."))?;

    let id = SettingsUseCase::new(state.repo.clone())
        .set_avatar(&ctx, &content_type, data.to_vec())
        .await?;
    Ok(Json(id))
}

// ============================================================================
// Images
// ============================================================================

/// GET /images/{id}
pub async fn get_image<R, C>(
    State(state): State<AuthAppState<R, C>>,
    Path(id): Path<String>,
) -> AuthResult<Response>
where
    R: AuthStore,
    C: OAuthClient + Clone + Send + Sync + 'static,
{
    let image = ImageUseCase::new(state.repo.clone())
        .get(&ImageId::from_string(id))
        .await?;

    Ok(([(header::CONTENT_TYPE, image.content_type)], image.data).into_response())
}
