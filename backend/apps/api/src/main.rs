//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

mod config;
mod jobs;

use std::net::SocketAddr;
use std::sync::Arc;

use auth::middleware::{AuthMiddlewareState, resolve_user_context};
use auth::{PgAuthRepository, ReqwestOAuthClient, auth_router};
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderName, HeaderValue, Method, header};
use axum::{Router, middleware};
use meta::{GithubReleaseClient, PgMetaRepository, meta_router};
use paste::{CommandDetector, PgPasteRepository, load_catalogue_or_minimal, paste_router};
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::AppConfig;

// Re-export unified error types for use in handlers
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "api=info,auth=info,paste=info,meta=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    if config.secret_key.is_none() {
        tracing::warn!("SECRET_KEY not set, using a random one; logins will not survive restarts");
    }

    // Database connection
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Migrations completed");

    let auth_config = config.auth_config();
    let paste_config = config.paste_config();
    let meta_config = config.meta_config();

    let auth_repo = PgAuthRepository::new(pool.clone());
    let paste_repo = PgPasteRepository::new(pool.clone());

    let catalogue = load_catalogue_or_minimal(&paste_config.languages).await;
    let detector = CommandDetector::new(paste_config.autodetect_command.clone());

    jobs::spawn_cleanup(
        paste_repo.clone(),
        auth_repo.clone(),
        auth_config.session_settings_idle_ttl,
    );

    let oauth = ReqwestOAuthClient::new()?;
    let releases = GithubReleaseClient::new()?;

    let auth_state = AuthMiddlewareState {
        repo: Arc::new(auth_repo.clone()),
        config: Arc::new(auth_config.clone()),
    };

    let encryption_header = HeaderName::try_from(paste_config.encryption_header.as_str())?;

    // CORS configuration: the web client sends cookies
    let cors = CorsLayer::new()
        .allow_origin(HeaderValue::from_str(&config.client_url)?)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
            encryption_header,
        ]))
        .allow_credentials(true);

    let api = Router::new()
        .merge(auth_router(auth_repo.clone(), oauth, auth_config))
        .merge(paste_router(
            paste_repo,
            auth_repo,
            detector,
            catalogue,
            paste_config,
        ))
        .merge(meta_router(
            PgMetaRepository::new(pool.clone()),
            releases,
            meta_config,
        ))
        .layer(middleware::from_fn_with_state(
            auth_state,
            resolve_user_context::<PgAuthRepository>,
        ));

    // Build router
    let app = Router::new()
        .nest(paste::handlers::API_PREFIX, api)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(DefaultBodyLimit::max(config.max_body_bytes)),
        );

    // Start server
    let addr = config.addr()?;
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
