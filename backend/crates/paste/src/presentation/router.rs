//! Paste Router

use axum::{
    Router,
    routing::{get, patch, post},
};
use std::sync::Arc;

use auth::PgAuthRepository;
use auth::domain::UserRepository;

use crate::application::config::PasteConfig;
use crate::domain::languages::LanguageCatalogue;
use crate::domain::repository::{LanguageDetector, PasteStore};
use crate::infra::{CommandDetector, PgPasteRepository};
use crate::presentation::handlers::{self, PasteAppState};

/// Create the Paste router with PostgreSQL repositories and the command detector
pub fn paste_router(
    repo: PgPasteRepository,
    users: PgAuthRepository,
    detector: CommandDetector,
    catalogue: LanguageCatalogue,
    config: PasteConfig,
) -> Router {
    paste_router_generic(repo, users, detector, catalogue, config)
}

/// Create a generic Paste router for any repository and detector
pub fn paste_router_generic<R, U, D>(
    repo: R,
    users: U,
    detector: D,
    catalogue: LanguageCatalogue,
    config: PasteConfig,
) -> Router
where
    R: PasteStore,
    U: UserRepository + Clone + Send + Sync + 'static,
    D: LanguageDetector + Clone + Send + Sync + 'static,
{
    let state = PasteAppState {
        repo: Arc::new(repo),
        users: Arc::new(users),
        detector: Arc::new(detector),
        catalogue: Arc::new(catalogue),
        config: Arc::new(config),
    };

    Router::new()
        .route("/pastes", post(handlers::create_paste::<R, U, D>))
        .route(
            "/pastes/{id}",
            get(handlers::get_paste::<R, U, D>)
                .patch(handlers::edit_paste::<R, U, D>)
                .delete(handlers::delete_paste::<R, U, D>),
        )
        .route("/pastes/{id}/stats", get(handlers::get_stats::<R, U, D>))
        .route(
            "/pastes/{id}/langs",
            get(handlers::get_language_stats::<R, U, D>),
        )
        .route(
            "/pastes/{id}/encrypted",
            get(handlers::is_encrypted::<R, U, D>),
        )
        .route(
            "/pastes/{id}/raw/{pasty_id}",
            get(handlers::get_raw::<R, U, D>),
        )
        .route(
            "/pastes/{id}/star",
            get(handlers::is_starred::<R, U, D>).post(handlers::toggle_star::<R, U, D>),
        )
        .route("/pastes/{id}/pin", post(handlers::toggle_pin::<R, U, D>))
        .route(
            "/pastes/{id}/private",
            post(handlers::toggle_private::<R, U, D>),
        )
        .route("/pastes/{id}/tags", patch(handlers::edit_tags::<R, U, D>))
        .route(
            "/pastes/{id}/history_compact",
            get(handlers::history_compact::<R, U, D>),
        )
        .route(
            "/pastes/{id}/history/{history_id}",
            get(handlers::get_at_edit::<R, U, D>),
        )
        .route(
            "/pastes/{id}/history/{history_id}/diff",
            get(handlers::get_diff::<R, U, D>),
        )
        .route(
            "/users/{username}/pastes",
            get(handlers::user_pastes::<R, U, D>),
        )
        .route(
            "/users/{username}/pastes/pinned",
            get(handlers::user_pinned_pastes::<R, U, D>),
        )
        .route("/users/{username}/tags", get(handlers::user_tags::<R, U, D>))
        .route(
            "/users/{username}/data.zip",
            get(handlers::export_user_data::<R, U, D>),
        )
        .route("/langs", get(handlers::list_languages::<R, U, D>))
        .route("/langs/popular", get(handlers::popular_languages::<R, U, D>))
        .route(
            "/langs/autodetect",
            post(handlers::autodetect_language::<R, U, D>),
        )
        .route("/langs/{name}", get(handlers::get_language::<R, U, D>))
        .with_state(state)
}
