//! User Pastes Use Case
//!
//! Profile listings, tag lists and the personal data export.

use std::sync::Arc;

use auth::UserContext;
use auth::domain::{Scope, User, UserRepository};
use serde::Serialize;

use crate::application::archive::{ZipBuilder, pasty_file_names};
use crate::domain::entities::Paste;
use crate::domain::languages::LanguageCatalogue;
use crate::domain::repository::{OwnerQuery, PasteStore};
use crate::domain::services::{LanguageStat, language_stats};
use crate::error::{PasteError, PasteResult};

pub const DEFAULT_PAGE_SIZE: u32 = 15;
pub const MAX_PAGE_SIZE: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    pub fn validate(&self) -> PasteResult<()> {
        if !(1..=MAX_PAGE_SIZE).contains(&self.page_size) {
            return Err(PasteError::bad_request(format!(
                "The page size must be between 1 and {MAX_PAGE_SIZE}."
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub current_page: u32,
    pub page_size: u32,
    pub has_next_page: bool,
    pub total_pages: u32,
}

impl<T> Page<T> {
    pub fn empty(request: PageRequest) -> Self {
        Self {
            items: Vec::new(),
            current_page: request.page,
            page_size: request.page_size,
            has_next_page: false,
            total_pages: 0,
        }
    }

    pub fn new(items: Vec<T>, request: PageRequest, total_items: u64) -> Self {
        let total_pages = total_items.div_ceil(u64::from(request.page_size)) as u32;
        Self {
            items,
            current_page: request.page,
            page_size: request.page_size,
            has_next_page: i64::from(request.page) < i64::from(total_pages) - 1,
            total_pages,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasteWithLangStats {
    pub paste: Paste,
    /// Not computed for encrypted pastes
    pub language_stats: Option<Vec<LanguageStat>>,
}

/// Zip of everything stored for a user
#[derive(Debug)]
pub struct UserExport {
    pub file_name: String,
    pub data: Vec<u8>,
}

pub struct UserPastesUseCase<R, U>
where
    R: PasteStore,
    U: UserRepository + Send + Sync + 'static,
{
    repo: Arc<R>,
    users: Arc<U>,
    catalogue: Arc<LanguageCatalogue>,
}

impl<R, U> UserPastesUseCase<R, U>
where
    R: PasteStore,
    U: UserRepository + Send + Sync + 'static,
{
    pub fn new(repo: Arc<R>, users: Arc<U>, catalogue: Arc<LanguageCatalogue>) -> Self {
        Self {
            repo,
            users,
            catalogue,
        }
    }

    async fn find_user(&self, username: &str) -> PasteResult<User> {
        self.users
            .find_by_username(username)
            .await?
            .ok_or_else(|| PasteError::not_found("User not found."))
    }

    /// Pastes shown on a profile, newest first
    pub async fn owned_pastes(
        &self,
        ctx: &UserContext,
        username: &str,
        tag: Option<String>,
        pinned_only: bool,
        request: PageRequest,
    ) -> PasteResult<Page<PasteWithLangStats>> {
        request.validate()?;
        let user = self.find_user(username).await?;
        let is_self = ctx.user_is_self(&user);

        if !pinned_only && !is_self && !user.user_settings.show_all_pastes_on_profile {
            return Ok(Page::empty(request));
        }

        if tag.is_some() {
            if !is_self {
                return Err(PasteError::unauthorized(
                    "You must be authorized to view paste tags.",
                ));
            }
            ctx.require_scope(&[Scope::User, Scope::UserRead])?;
        }

        let query = OwnerQuery {
            owner_id: user.id.clone(),
            pinned_only,
            include_private: is_self && ctx.has_scope(&[Scope::Paste, Scope::PasteRead]),
            tag,
            page: request.page,
            page_size: request.page_size,
        };
        let (pastes, total) = self.repo.find_by_owner(&query).await?;

        let items = pastes
            .into_iter()
            .map(|mut paste| {
                if !is_self {
                    paste.tags.clear();
                }
                let language_stats =
                    (!paste.is_encrypted()).then(|| language_stats(&paste, &self.catalogue));
                PasteWithLangStats {
                    paste,
                    language_stats,
                }
            })
            .collect();

        Ok(Page::new(items, request, total))
    }

    /// Distinct tags over the caller's own pastes
    pub async fn tags(&self, ctx: &UserContext, username: &str) -> PasteResult<Vec<String>> {
        ctx.require_user("You must be authorized to get your own tags.")?;
        let user = self.find_user(username).await?;

        if !ctx.user_is_self(&user) {
            return Err(PasteError::unauthorized("You can only fetch your own tags."));
        }
        ctx.require_scope(&[Scope::User, Scope::UserRead])?;

        self.repo.tags_by_owner(&user.id).await
    }

    /// Profile, settings and every paste of the caller as one zip
    pub async fn export(&self, ctx: &UserContext, username: &str) -> PasteResult<UserExport> {
        ctx.require_user("You must be authorized to download your data.")?;
        let user = self.find_user(username).await?;

        if !ctx.user_is_self(&user) {
            return Err(PasteError::unauthorized(
                "You can only download your own data.",
            ));
        }
        ctx.require_scope(&[Scope::User, Scope::UserRead])?;

        let mut zip = ZipBuilder::new();
        zip.add("user.json", &to_json(&user_json(&user)?)?)?;

        let pastes = self.repo.find_all_by_owner(&user.id).await?;
        for paste in &pastes {
            let dir = format!("pastes/{}", paste.id);
            zip.add(&format!("{dir}/paste.json"), &to_json(paste)?)?;

            match &paste.encrypted {
                Some(encrypted) => {
                    zip.add(&format!("{dir}/encrypted.json"), &to_json(encrypted)?)?;
                }
                None => {
                    let names = pasty_file_names(&paste.pasties, &self.catalogue);
                    for (pasty, name) in paste.pasties.iter().zip(&names) {
                        zip.add(&format!("{dir}/{name}"), pasty.content.as_bytes())?;
                    }
                }
            }
        }

        tracing::info!(user_id = %user.id, pastes = pastes.len(), "User data exported");

        Ok(UserExport {
            file_name: format!("{}.zip", user.username.original()),
            data: zip.finish()?,
        })
    }
}

/// Public profile plus both settings documents
fn user_json(user: &User) -> PasteResult<serde_json::Value> {
    let mut json = to_value(user)?;
    if let Some(obj) = json.as_object_mut() {
        obj.insert("settings".into(), to_value(&user.settings)?);
        obj.insert("userSettings".into(), to_value(&user.user_settings)?);
    }
    Ok(json)
}

fn to_value<T: Serialize>(value: &T) -> PasteResult<serde_json::Value> {
    serde_json::to_value(value).map_err(|e| PasteError::Internal(e.to_string()))
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> PasteResult<Vec<u8>> {
    serde_json::to_vec_pretty(value).map_err(|e| PasteError::Internal(e.to_string()))
}
