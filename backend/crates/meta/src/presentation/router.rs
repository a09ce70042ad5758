//! Meta Router

use axum::{
    Router,
    routing::{get, patch},
};
use std::sync::Arc;

use crate::application::ReleasesUseCase;
use crate::application::config::MetaConfig;
use crate::domain::repository::{MetaStore, ReleaseSource};
use crate::infra::{GithubReleaseClient, PgMetaRepository};
use crate::presentation::handlers::{self, MetaAppState};

/// Create the Meta router with the PostgreSQL repository and GitHub client
pub fn meta_router(
    repo: PgMetaRepository,
    releases: GithubReleaseClient,
    config: MetaConfig,
) -> Router {
    meta_router_generic(repo, releases, config)
}

/// Create a generic Meta router for any repository and release source
pub fn meta_router_generic<R, S>(repo: R, releases: S, config: MetaConfig) -> Router
where
    R: MetaStore,
    S: ReleaseSource + Clone + Send + Sync + 'static,
{
    let state = MetaAppState {
        repo: Arc::new(repo),
        releases: Arc::new(ReleasesUseCase::new(
            Arc::new(releases),
            config.release_repos.clone(),
        )),
        config: Arc::new(config),
    };

    Router::new()
        .route("/meta/version", get(handlers::version::<R, S>))
        .route("/meta/releases", get(handlers::releases::<R, S>))
        .route("/meta/active_pastes", get(handlers::active_pastes::<R, S>))
        .route("/meta/stats", get(handlers::stats::<R, S>))
        .route(
            "/announcements",
            get(handlers::list_announcements::<R, S>).post(handlers::create_announcement::<R, S>),
        )
        .route(
            "/announcements/latest",
            get(handlers::latest_announcement::<R, S>),
        )
        .route(
            "/announcements/{id}",
            patch(handlers::edit_announcement::<R, S>)
                .delete(handlers::delete_announcement::<R, S>),
        )
        .with_state(state)
}
