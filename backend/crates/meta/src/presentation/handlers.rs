//! HTTP Handlers

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use std::sync::Arc;

use auth::UserContext;
use kernel::id::AnnouncementId;

use crate::application::config::MetaConfig;
use crate::application::{AnnouncementUseCase, ReleasesUseCase, StatsUseCase};
use crate::domain::entities::{Announcement, AppStats, Release};
use crate::domain::repository::{MetaStore, ReleaseSource};
use crate::error::MetaResult;
use crate::presentation::dto::{AnnouncementRequest, CountResponse, VersionResponse};

/// Shared state for meta handlers
#[derive(Clone)]
pub struct MetaAppState<R, S>
where
    R: MetaStore,
    S: ReleaseSource + Clone + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    /// Shared so the release cache outlives a single request
    pub releases: Arc<ReleasesUseCase<S>>,
    pub config: Arc<MetaConfig>,
}

impl<R, S> MetaAppState<R, S>
where
    R: MetaStore,
    S: ReleaseSource + Clone + Send + Sync + 'static,
{
    fn announcements(&self) -> AnnouncementUseCase<R> {
        AnnouncementUseCase::new(self.repo.clone())
    }

    fn stats(&self) -> StatsUseCase<R> {
        StatsUseCase::new(self.repo.clone())
    }
}

// ============================================================================
// Meta
// ============================================================================

/// GET /meta/version
pub async fn version<R, S>(State(state): State<MetaAppState<R, S>>) -> Json<VersionResponse>
where
    R: MetaStore,
    S: ReleaseSource + Clone + Send + Sync + 'static,
{
    Json(VersionResponse {
        version: state.config.version.clone(),
    })
}

/// GET /meta/releases
pub async fn releases<R, S>(
    State(state): State<MetaAppState<R, S>>,
) -> MetaResult<Json<Vec<Release>>>
where
    R: MetaStore,
    S: ReleaseSource + Clone + Send + Sync + 'static,
{
    let releases = state.releases.releases().await?;
    Ok(Json(releases.to_vec()))
}

/// GET /meta/active_pastes
pub async fn active_pastes<R, S>(
    State(state): State<MetaAppState<R, S>>,
) -> MetaResult<Json<CountResponse>>
where
    R: MetaStore,
    S: ReleaseSource + Clone + Send + Sync + 'static,
{
    let count = state.stats().active_pastes().await?;
    Ok(Json(CountResponse { count }))
}

/// GET /meta/stats
pub async fn stats<R, S>(State(state): State<MetaAppState<R, S>>) -> MetaResult<Json<AppStats>>
where
    R: MetaStore,
    S: ReleaseSource + Clone + Send + Sync + 'static,
{
    Ok(Json(state.stats().stats().await?))
}

// ============================================================================
// Announcements
// ============================================================================

/// GET /announcements
pub async fn list_announcements<R, S>(
    State(state): State<MetaAppState<R, S>>,
) -> MetaResult<Json<Vec<Announcement>>>
where
    R: MetaStore,
    S: ReleaseSource + Clone + Send + Sync + 'static,
{
    Ok(Json(state.announcements().list().await?))
}

/// GET /announcements/latest
pub async fn latest_announcement<R, S>(
    State(state): State<MetaAppState<R, S>>,
) -> MetaResult<Json<Option<Announcement>>>
where
    R: MetaStore,
    S: ReleaseSource + Clone + Send + Sync + 'static,
{
    Ok(Json(state.announcements().latest().await?))
}

/// POST /announcements
pub async fn create_announcement<R, S>(
    State(state): State<MetaAppState<R, S>>,
    ctx: UserContext,
    Json(req): Json<AnnouncementRequest>,
) -> MetaResult<Json<Announcement>>
where
    R: MetaStore,
    S: ReleaseSource + Clone + Send + Sync + 'static,
{
    let announcement = state.announcements().create(&ctx, req.into()).await?;
    Ok(Json(announcement))
}

/// PATCH /announcements/{id}
pub async fn edit_announcement<R, S>(
    State(state): State<MetaAppState<R, S>>,
    ctx: UserContext,
    Path(id): Path<String>,
    Json(req): Json<AnnouncementRequest>,
) -> MetaResult<Json<Announcement>>
where
    R: MetaStore,
    S: ReleaseSource + Clone + Send + Sync + 'static,
{
    let announcement = state
        .announcements()
        .update(&ctx, &AnnouncementId::from_string(id), req.into())
        .await?;
    Ok(Json(announcement))
}

/// DELETE /announcements/{id}
pub async fn delete_announcement<R, S>(
    State(state): State<MetaAppState<R, S>>,
    ctx: UserContext,
    Path(id): Path<String>,
) -> MetaResult<StatusCode>
where
    R: MetaStore,
    S: ReleaseSource + Clone + Send + Sync + 'static,
{
    state
        .announcements()
        .delete(&ctx, &AnnouncementId::from_string(id))
        .await?;
    Ok(StatusCode::OK)
}
