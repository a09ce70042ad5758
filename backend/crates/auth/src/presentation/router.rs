//! Auth Router

use axum::{
    Router,
    routing::{delete, get, patch, post},
};
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::domain::provider::OAuthClient;
use crate::domain::repository::AuthStore;
use crate::infra::{PgAuthRepository, ReqwestOAuthClient};
use crate::presentation::handlers::{self, AuthAppState};

/// Create the Auth router with PostgreSQL repository and the reqwest OAuth client
pub fn auth_router(
    repo: PgAuthRepository,
    client: ReqwestOAuthClient,
    config: AuthConfig,
) -> Router {
    auth_router_generic(repo, client, config)
}

/// Create a generic Auth router for any repository and provider client
pub fn auth_router_generic<R, C>(repo: R, client: C, config: AuthConfig) -> Router
where
    R: AuthStore,
    C: OAuthClient + Clone + Send + Sync + 'static,
{
    let state = AuthAppState {
        repo: Arc::new(repo),
        client: Arc::new(client),
        config: Arc::new(config),
    };

    Router::new()
        .route("/login/{provider}", get(handlers::login::<R, C>))
        .route(
            "/login/{provider}/callback",
            get(handlers::login_callback::<R, C>),
        )
        .route("/auth/register", post(handlers::register::<R, C>))
        .route("/auth/self", get(handlers::get_self))
        .route("/auth/logout", get(handlers::logout::<R, C>))
        .route(
            "/auth/self/access_tokens",
            post(handlers::generate_access_token::<R, C>)
                .get(handlers::list_access_tokens::<R, C>),
        )
        .route(
            "/auth/self/access_tokens/{id}",
            delete(handlers::delete_access_token::<R, C>),
        )
        .route("/users", get(handlers::get_user_by_id::<R, C>))
        .route(
            "/users/{username}",
            get(handlers::get_user::<R, C>).delete(handlers::delete_user::<R, C>),
        )
        .route(
            "/settings",
            get(handlers::get_settings::<R, C>).patch(handlers::update_settings::<R, C>),
        )
        .route(
            "/settings/user",
            get(handlers::get_user_settings::<R, C>)
                .patch(handlers::update_user_settings::<R, C>),
        )
        .route("/settings/username", patch(handlers::set_username::<R, C>))
        .route("/settings/avatar", patch(handlers::set_avatar::<R, C>))
        .route("/images/{id}", get(handlers::get_image::<R, C>))
        .with_state(state)
}
