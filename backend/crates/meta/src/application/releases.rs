//! Releases Use Case
//!
//! Changelog assembled from GitHub releases, fetched once per process.

use std::sync::Arc;

use tokio::sync::OnceCell;

use crate::application::config::ReleaseRepo;
use crate::domain::entities::Release;
use crate::domain::repository::ReleaseSource;
use crate::domain::services::to_release;
use crate::error::MetaResult;

pub struct ReleasesUseCase<S>
where
    S: ReleaseSource + Send + Sync + 'static,
{
    source: Arc<S>,
    repos: Vec<ReleaseRepo>,
    cache: OnceCell<Vec<Release>>,
}

impl<S> ReleasesUseCase<S>
where
    S: ReleaseSource + Send + Sync + 'static,
{
    pub fn new(source: Arc<S>, repos: Vec<ReleaseRepo>) -> Self {
        Self {
            source,
            repos,
            cache: OnceCell::new(),
        }
    }

    /// Failed fetches are not cached; the next call retries
    pub async fn releases(&self) -> MetaResult<&[Release]> {
        let releases = self.cache.get_or_try_init(|| self.fetch()).await?;
        Ok(releases.as_slice())
    }

    async fn fetch(&self) -> MetaResult<Vec<Release>> {
        let mut releases = Vec::new();
        for repo in &self.repos {
            let fetched = self.source.releases(&repo.owner, &repo.name).await?;
            releases.extend(fetched.into_iter().filter_map(to_release));
        }

        tracing::info!(count = releases.len(), "Releases loaded from GitHub");
        Ok(releases)
    }
}
