//! Auth Middleware
//!
//! Resolves the caller on every request and exposes it as [`UserContext`].

use std::convert::Infallible;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{FromRequestParts, State};
use axum::http::{HeaderMap, Request, header, request::Parts};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::application::access_tokens::AccessTokenUseCase;
use crate::application::config::AuthConfig;
use crate::application::user_context::UserContext;
use crate::domain::repository::AuthStore;

const BEARER_PREFIX: &str = "Bearer ";

/// Middleware state
#[derive(Clone)]
pub struct AuthMiddlewareState<R>
where
    R: AuthStore,
{
    pub repo: Arc<R>,
    pub config: Arc<AuthConfig>,
}

/// Raw access token of the request: login cookie first, then `Authorization: Bearer`
pub fn extract_access_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    if let Some(token) = platform::cookie::extract_cookie(headers, cookie_name) {
        return Some(token);
    }

    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    if value.len() < BEARER_PREFIX.len() {
        return None;
    }
    value.get(BEARER_PREFIX.len()..).map(|t| t.trim().to_string())
}

/// Insert the caller's [`UserContext`] into request extensions.
///
/// Invalid or expired tokens leave the request anonymous.
pub async fn resolve_user_context<R>(
    State(state): State<AuthMiddlewareState<R>>,
    mut req: Request<Body>,
    next: Next,
) -> Response
where
    R: AuthStore,
{
    let token = extract_access_token(req.headers(), &state.config.access_token_cookie_name);

    let use_case = AccessTokenUseCase::new(state.repo.clone(), state.repo.clone(), state.repo.clone());
    let ctx = match use_case.resolve(token.as_deref()).await {
        Ok(ctx) => ctx,
        Err(e) => return e.into_response(),
    };

    if let Some(user) = ctx.user() {
        tracing::debug!(user_id = %user.id, "Resolved caller");
    }

    req.extensions_mut().insert(ctx);

    next.run(req).await
}

impl<S> FromRequestParts<S> for UserContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<UserContext>()
            .cloned()
            .unwrap_or_default())
    }
}
