//! Repository Traits

use kernel::action_log::ActionLogRepository;
use kernel::id::AnnouncementId;

use crate::domain::entities::{Announcement, GithubRelease};
use crate::error::MetaResult;

/// Announcement and site counter storage
#[trait_variant::make(MetaRepository: Send)]
pub trait LocalMetaRepository {
    async fn create_announcement(&self, announcement: &Announcement) -> MetaResult<()>;

    async fn find_announcement(&self, id: &AnnouncementId) -> MetaResult<Option<Announcement>>;

    /// Newest first
    async fn list_announcements(&self) -> MetaResult<Vec<Announcement>>;

    async fn update_announcement(&self, announcement: &Announcement) -> MetaResult<()>;

    async fn delete_announcement(&self, id: &AnnouncementId) -> MetaResult<()>;

    /// Number of pastes currently stored
    async fn count_pastes(&self) -> MetaResult<u64>;
}

/// Everything the meta use cases need from storage
pub trait MetaStore: MetaRepository + ActionLogRepository + Clone + Send + Sync + 'static {}

impl<T> MetaStore for T where T: MetaRepository + ActionLogRepository + Clone + Send + Sync + 'static
{}

/// Source of a repository's GitHub releases
#[trait_variant::make(ReleaseSource: Send)]
pub trait LocalReleaseSource {
    /// Every release of `owner/repo`, drafts included
    async fn releases(&self, owner: &str, repo: &str) -> MetaResult<Vec<GithubRelease>>;
}
