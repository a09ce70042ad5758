//! HTTP Handlers

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use std::sync::Arc;

use auth::UserContext;
use auth::domain::UserRepository;
use kernel::id::PasteId;

use crate::application::config::PasteConfig;
use crate::application::{
    CreatePasteUseCase, EditPasteUseCase, GetPasteUseCase, HistoryEntry, LanguageUseCase, Page,
    PasteActionsUseCase, PasteDiff, PasteWithLangStats, UserPastesUseCase,
};
use crate::domain::entities::Paste;
use crate::domain::languages::{Language, LanguageCatalogue};
use crate::domain::repository::{LanguageDetector, PasteStore};
use crate::domain::services::{LanguageStat, PasteStats};
use crate::error::PasteResult;
use crate::presentation::dto::{CreatePasteRequest, EditPasteRequest, PageQuery, RawQuery};
use crate::presentation::encryption::encryption_keys;

/// Path the API is mounted under; used for `Location` headers
pub const API_PREFIX: &str = "/api/v3";

const ZIP_SUFFIX: &str = ".zip";

/// Shared state for paste handlers
#[derive(Clone)]
pub struct PasteAppState<R, U, D>
where
    R: PasteStore,
    U: UserRepository + Clone + Send + Sync + 'static,
    D: LanguageDetector + Clone + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub users: Arc<U>,
    pub detector: Arc<D>,
    pub catalogue: Arc<LanguageCatalogue>,
    pub config: Arc<PasteConfig>,
}

impl<R, U, D> PasteAppState<R, U, D>
where
    R: PasteStore,
    U: UserRepository + Clone + Send + Sync + 'static,
    D: LanguageDetector + Clone + Send + Sync + 'static,
{
    fn languages(&self) -> LanguageUseCase<D> {
        LanguageUseCase::new(self.catalogue.clone(), self.detector.clone())
    }

    fn reader(&self) -> GetPasteUseCase<R> {
        GetPasteUseCase::new(self.repo.clone(), self.catalogue.clone())
    }

    fn actions(&self) -> PasteActionsUseCase<R> {
        PasteActionsUseCase::new(self.repo.clone(), self.reader())
    }

    fn user_pastes(&self) -> UserPastesUseCase<R, U> {
        UserPastesUseCase::new(self.repo.clone(), self.users.clone(), self.catalogue.clone())
    }
}

/// `Content-Disposition` for a download
fn attachment(file_name: &str) -> HeaderValue {
    let safe: String = file_name
        .chars()
        .map(|c| if c == '"' || c.is_control() { '_' } else { c })
        .collect();
    HeaderValue::from_str(&format!("attachment; filename=\"{safe}\""))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}

fn zip_response(file_name: &str, data: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("application/zip")),
            (header::CONTENT_DISPOSITION, attachment(file_name)),
        ],
        data,
    )
        .into_response()
}

// ============================================================================
// Pastes
// ============================================================================

/// POST /pastes
pub async fn create_paste<R, U, D>(
    State(state): State<PasteAppState<R, U, D>>,
    ctx: UserContext,
    headers: HeaderMap,
    Json(req): Json<CreatePasteRequest>,
) -> PasteResult<Response>
where
    R: PasteStore,
    U: UserRepository + Clone + Send + Sync + 'static,
    D: LanguageDetector + Clone + Send + Sync + 'static,
{
    let keys = encryption_keys(&headers, &state.config);
    let paste = CreatePasteUseCase::new(state.repo.clone(), state.languages())
        .execute(&ctx, req.into(), &keys)
        .await?;

    let location = format!("{API_PREFIX}/pastes/{}", paste.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(paste),
    )
        .into_response())
}

/// GET /pastes/{id} and GET /pastes/{id}.zip
pub async fn get_paste<R, U, D>(
    State(state): State<PasteAppState<R, U, D>>,
    ctx: UserContext,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> PasteResult<Response>
where
    R: PasteStore,
    U: UserRepository + Clone + Send + Sync + 'static,
    D: LanguageDetector + Clone + Send + Sync + 'static,
{
    let keys = encryption_keys(&headers, &state.config);

    if let Some(id) = id.strip_suffix(ZIP_SUFFIX) {
        let archive = state
            .reader()
            .zip(&ctx, &PasteId::from_string(id), &keys)
            .await?;
        return Ok(zip_response(&archive.file_name, archive.data));
    }

    let paste = state
        .reader()
        .get(&ctx, &PasteId::from_string(id), &keys)
        .await?;
    Ok(Json(paste).into_response())
}

/// PATCH /pastes/{id}
pub async fn edit_paste<R, U, D>(
    State(state): State<PasteAppState<R, U, D>>,
    ctx: UserContext,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(req): Json<EditPasteRequest>,
) -> PasteResult<Json<Paste>>
where
    R: PasteStore,
    U: UserRepository + Clone + Send + Sync + 'static,
    D: LanguageDetector + Clone + Send + Sync + 'static,
{
    let keys = encryption_keys(&headers, &state.config);
    let paste = EditPasteUseCase::new(state.repo.clone(), state.reader(), state.languages())
        .edit(&ctx, &PasteId::from_string(id), req.into(), &keys)
        .await?;
    Ok(Json(paste))
}

/// DELETE /pastes/{id}
pub async fn delete_paste<R, U, D>(
    State(state): State<PasteAppState<R, U, D>>,
    ctx: UserContext,
    Path(id): Path<String>,
) -> PasteResult<StatusCode>
where
    R: PasteStore,
    U: UserRepository + Clone + Send + Sync + 'static,
    D: LanguageDetector + Clone + Send + Sync + 'static,
{
    state
        .actions()
        .delete(&ctx, &PasteId::from_string(id))
        .await?;
    Ok(StatusCode::OK)
}

/// GET /pastes/{id}/stats
pub async fn get_stats<R, U, D>(
    State(state): State<PasteAppState<R, U, D>>,
    ctx: UserContext,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> PasteResult<Json<PasteStats>>
where
    R: PasteStore,
    U: UserRepository + Clone + Send + Sync + 'static,
    D: LanguageDetector + Clone + Send + Sync + 'static,
{
    let keys = encryption_keys(&headers, &state.config);
    let stats = state
        .reader()
        .stats(&ctx, &PasteId::from_string(id), &keys)
        .await?;
    Ok(Json(stats))
}

/// GET /pastes/{id}/langs
pub async fn get_language_stats<R, U, D>(
    State(state): State<PasteAppState<R, U, D>>,
    ctx: UserContext,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> PasteResult<Json<Vec<LanguageStat>>>
where
    R: PasteStore,
    U: UserRepository + Clone + Send + Sync + 'static,
    D: LanguageDetector + Clone + Send + Sync + 'static,
{
    let keys = encryption_keys(&headers, &state.config);
    let stats = state
        .reader()
        .language_stats(&ctx, &PasteId::from_string(id), &keys)
        .await?;
    Ok(Json(stats))
}

/// GET /pastes/{id}/encrypted
pub async fn is_encrypted<R, U, D>(
    State(state): State<PasteAppState<R, U, D>>,
    ctx: UserContext,
    Path(id): Path<String>,
) -> PasteResult<Json<bool>>
where
    R: PasteStore,
    U: UserRepository + Clone + Send + Sync + 'static,
    D: LanguageDetector + Clone + Send + Sync + 'static,
{
    let encrypted = state
        .reader()
        .is_encrypted(&ctx, &PasteId::from_string(id))
        .await?;
    Ok(Json(encrypted))
}

/// GET /pastes/{id}/raw/{pasty_id}?history=
pub async fn get_raw<R, U, D>(
    State(state): State<PasteAppState<R, U, D>>,
    ctx: UserContext,
    headers: HeaderMap,
    Path((id, pasty_id)): Path<(String, String)>,
    Query(query): Query<RawQuery>,
) -> PasteResult<Response>
where
    R: PasteStore,
    U: UserRepository + Clone + Send + Sync + 'static,
    D: LanguageDetector + Clone + Send + Sync + 'static,
{
    let keys = encryption_keys(&headers, &state.config);
    let content = state
        .reader()
        .raw(
            &ctx,
            &PasteId::from_string(id),
            &pasty_id,
            query.history.as_deref(),
            &keys,
        )
        .await?;

    Ok((
        [(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        )],
        content,
    )
        .into_response())
}

// ============================================================================
// Owner actions
// ============================================================================

/// GET /pastes/{id}/star
pub async fn is_starred<R, U, D>(
    State(state): State<PasteAppState<R, U, D>>,
    ctx: UserContext,
    Path(id): Path<String>,
) -> PasteResult<Json<bool>>
where
    R: PasteStore,
    U: UserRepository + Clone + Send + Sync + 'static,
    D: LanguageDetector + Clone + Send + Sync + 'static,
{
    let starred = state
        .actions()
        .is_starred(&ctx, &PasteId::from_string(id))
        .await?;
    Ok(Json(starred))
}

/// POST /pastes/{id}/star
pub async fn toggle_star<R, U, D>(
    State(state): State<PasteAppState<R, U, D>>,
    ctx: UserContext,
    Path(id): Path<String>,
) -> PasteResult<StatusCode>
where
    R: PasteStore,
    U: UserRepository + Clone + Send + Sync + 'static,
    D: LanguageDetector + Clone + Send + Sync + 'static,
{
    state
        .actions()
        .toggle_star(&ctx, &PasteId::from_string(id))
        .await?;
    Ok(StatusCode::OK)
}

/// POST /pastes/{id}/pin
pub async fn toggle_pin<R, U, D>(
    State(state): State<PasteAppState<R, U, D>>,
    ctx: UserContext,
    Path(id): Path<String>,
) -> PasteResult<StatusCode>
where
    R: PasteStore,
    U: UserRepository + Clone + Send + Sync + 'static,
    D: LanguageDetector + Clone + Send + Sync + 'static,
{
    state
        .actions()
        .toggle_pin(&ctx, &PasteId::from_string(id))
        .await?;
    Ok(StatusCode::OK)
}

/// POST /pastes/{id}/private
pub async fn toggle_private<R, U, D>(
    State(state): State<PasteAppState<R, U, D>>,
    ctx: UserContext,
    Path(id): Path<String>,
) -> PasteResult<StatusCode>
where
    R: PasteStore,
    U: UserRepository + Clone + Send + Sync + 'static,
    D: LanguageDetector + Clone + Send + Sync + 'static,
{
    state
        .actions()
        .toggle_private(&ctx, &PasteId::from_string(id))
        .await?;
    Ok(StatusCode::OK)
}

/// PATCH /pastes/{id}/tags
pub async fn edit_tags<R, U, D>(
    State(state): State<PasteAppState<R, U, D>>,
    ctx: UserContext,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(tags): Json<Vec<String>>,
) -> PasteResult<Json<Paste>>
where
    R: PasteStore,
    U: UserRepository + Clone + Send + Sync + 'static,
    D: LanguageDetector + Clone + Send + Sync + 'static,
{
    let keys = encryption_keys(&headers, &state.config);
    let paste = EditPasteUseCase::new(state.repo.clone(), state.reader(), state.languages())
        .edit_tags(&ctx, &PasteId::from_string(id), tags, &keys)
        .await?;
    Ok(Json(paste))
}

// ============================================================================
// History
// ============================================================================

/// GET /pastes/{id}/history_compact
pub async fn history_compact<R, U, D>(
    State(state): State<PasteAppState<R, U, D>>,
    ctx: UserContext,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> PasteResult<Json<Vec<HistoryEntry>>>
where
    R: PasteStore,
    U: UserRepository + Clone + Send + Sync + 'static,
    D: LanguageDetector + Clone + Send + Sync + 'static,
{
    let keys = encryption_keys(&headers, &state.config);
    let history = state
        .reader()
        .history_compact(&ctx, &PasteId::from_string(id), &keys)
        .await?;
    Ok(Json(history))
}

/// GET /pastes/{id}/history/{history_id}
pub async fn get_at_edit<R, U, D>(
    State(state): State<PasteAppState<R, U, D>>,
    ctx: UserContext,
    headers: HeaderMap,
    Path((id, history_id)): Path<(String, String)>,
) -> PasteResult<Json<Paste>>
where
    R: PasteStore,
    U: UserRepository + Clone + Send + Sync + 'static,
    D: LanguageDetector + Clone + Send + Sync + 'static,
{
    let keys = encryption_keys(&headers, &state.config);
    let paste = state
        .reader()
        .at_edit(&ctx, &PasteId::from_string(id), &history_id, &keys)
        .await?;
    Ok(Json(paste))
}

/// GET /pastes/{id}/history/{history_id}/diff
pub async fn get_diff<R, U, D>(
    State(state): State<PasteAppState<R, U, D>>,
    ctx: UserContext,
    headers: HeaderMap,
    Path((id, history_id)): Path<(String, String)>,
) -> PasteResult<Json<PasteDiff>>
where
    R: PasteStore,
    U: UserRepository + Clone + Send + Sync + 'static,
    D: LanguageDetector + Clone + Send + Sync + 'static,
{
    let keys = encryption_keys(&headers, &state.config);
    let diff = state
        .reader()
        .diff(&ctx, &PasteId::from_string(id), &history_id, &keys)
        .await?;
    Ok(Json(diff))
}

// ============================================================================
// User listings
// ============================================================================

/// GET /users/{username}/pastes
pub async fn user_pastes<R, U, D>(
    State(state): State<PasteAppState<R, U, D>>,
    ctx: UserContext,
    Path(username): Path<String>,
    Query(query): Query<PageQuery>,
) -> PasteResult<Json<Page<PasteWithLangStats>>>
where
    R: PasteStore,
    U: UserRepository + Clone + Send + Sync + 'static,
    D: LanguageDetector + Clone + Send + Sync + 'static,
{
    let page = state
        .user_pastes()
        .owned_pastes(&ctx, &username, query.tag.clone(), false, query.page_request())
        .await?;
    Ok(Json(page))
}

/// GET /users/{username}/pastes/pinned
pub async fn user_pinned_pastes<R, U, D>(
    State(state): State<PasteAppState<R, U, D>>,
    ctx: UserContext,
    Path(username): Path<String>,
    Query(query): Query<PageQuery>,
) -> PasteResult<Json<Page<PasteWithLangStats>>>
where
    R: PasteStore,
    U: UserRepository + Clone + Send + Sync + 'static,
    D: LanguageDetector + Clone + Send + Sync + 'static,
{
    let page = state
        .user_pastes()
        .owned_pastes(&ctx, &username, query.tag.clone(), true, query.page_request())
        .await?;
    Ok(Json(page))
}

/// GET /users/{username}/tags
pub async fn user_tags<R, U, D>(
    State(state): State<PasteAppState<R, U, D>>,
    ctx: UserContext,
    Path(username): Path<String>,
) -> PasteResult<Json<Vec<String>>>
where
    R: PasteStore,
    U: UserRepository + Clone + Send + Sync + 'static,
    D: LanguageDetector + Clone + Send + Sync + 'static,
{
    let tags = state.user_pastes().tags(&ctx, &username).await?;
    Ok(Json(tags))
}

/// GET /users/{username}/data.zip
pub async fn export_user_data<R, U, D>(
    State(state): State<PasteAppState<R, U, D>>,
    ctx: UserContext,
    Path(username): Path<String>,
) -> PasteResult<Response>
where
    R: PasteStore,
    U: UserRepository + Clone + Send + Sync + 'static,
    D: LanguageDetector + Clone + Send + Sync + 'static,
{
    let export = state.user_pastes().export(&ctx, &username).await?;
    Ok(zip_response(&export.file_name, export.data))
}

// ============================================================================
// Languages
// ============================================================================

/// GET /langs
pub async fn list_languages<R, U, D>(
    State(state): State<PasteAppState<R, U, D>>,
) -> Json<Vec<Language>>
where
    R: PasteStore,
    U: UserRepository + Clone + Send + Sync + 'static,
    D: LanguageDetector + Clone + Send + Sync + 'static,
{
    Json(state.catalogue.all().to_vec())
}

/// GET /langs/popular
pub async fn popular_languages<R, U, D>(
    State(state): State<PasteAppState<R, U, D>>,
) -> Json<Vec<String>>
where
    R: PasteStore,
    U: UserRepository + Clone + Send + Sync + 'static,
    D: LanguageDetector + Clone + Send + Sync + 'static,
{
    Json(state.languages().popular())
}

/// GET /langs/{name}
pub async fn get_language<R, U, D>(
    State(state): State<PasteAppState<R, U, D>>,
    Path(name): Path<String>,
) -> PasteResult<Json<Language>>
where
    R: PasteStore,
    U: UserRepository + Clone + Send + Sync + 'static,
    D: LanguageDetector + Clone + Send + Sync + 'static,
{
    let language = state.languages().find(&name)?.clone();
    Ok(Json(language))
}

/// POST /langs/autodetect (JSON string body)
pub async fn autodetect_language<R, U, D>(
    State(state): State<PasteAppState<R, U, D>>,
    Json(content): Json<String>,
) -> Json<Language>
where
    R: PasteStore,
    U: UserRepository + Clone + Send + Sync + 'static,
    D: LanguageDetector + Clone + Send + Sync + 'static,
{
    let languages = state.languages();
    Json(languages.autodetect(&content).await.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attachment_header() {
        assert_eq!(
            attachment("my paste.zip").to_str().unwrap(),
            "attachment; filename=\"my paste.zip\""
        );
        assert_eq!(
            attachment("a\"b.zip").to_str().unwrap(),
            "attachment; filename=\"a_b.zip\""
        );
    }
}
