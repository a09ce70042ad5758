//! In-memory meta repository and release source for tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use kernel::action_log::{ActionLog, ActionLogRepository, ActionLogType};
use kernel::error::app_error::AppResult;
use kernel::id::AnnouncementId;

use crate::domain::entities::{Announcement, GithubRelease};
use crate::domain::repository::{MetaRepository, ReleaseSource};
use crate::error::{MetaError, MetaResult};

#[derive(Default)]
pub struct MemoryMetaState {
    pub announcements: HashMap<String, Announcement>,
    /// Stands in for the pastes table
    pub paste_count: u64,
    pub logs: Vec<ActionLog>,
}

/// Shared in-memory store; clones see the same data
#[derive(Clone, Default)]
pub struct MemoryMetaRepository {
    state: Arc<Mutex<MemoryMetaState>>,
}

impl MemoryMetaRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Direct access for assertions and fixtures
    pub fn state(&self) -> MutexGuard<'_, MemoryMetaState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl MetaRepository for MemoryMetaRepository {
    async fn create_announcement(&self, announcement: &Announcement) -> MetaResult<()> {
        self.state()
            .announcements
            .insert(announcement.id.to_string(), announcement.clone());
        Ok(())
    }

    async fn find_announcement(&self, id: &AnnouncementId) -> MetaResult<Option<Announcement>> {
        Ok(self.state().announcements.get(id.as_str()).cloned())
    }

    async fn list_announcements(&self) -> MetaResult<Vec<Announcement>> {
        let mut all: Vec<Announcement> = self.state().announcements.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }

    async fn update_announcement(&self, announcement: &Announcement) -> MetaResult<()> {
        self.state()
            .announcements
            .insert(announcement.id.to_string(), announcement.clone());
        Ok(())
    }

    async fn delete_announcement(&self, id: &AnnouncementId) -> MetaResult<()> {
        self.state().announcements.remove(id.as_str());
        Ok(())
    }

    async fn count_pastes(&self) -> MetaResult<u64> {
        Ok(self.state().paste_count)
    }
}

impl ActionLogRepository for MemoryMetaRepository {
    async fn append(&self, log: &ActionLog) -> AppResult<()> {
        self.state().logs.push(log.clone());
        Ok(())
    }

    async fn find_by_types(&self, types: &[ActionLogType]) -> AppResult<Vec<ActionLog>> {
        let mut logs: Vec<ActionLog> = self
            .state()
            .logs
            .iter()
            .filter(|l| types.contains(&l.action_type))
            .cloned()
            .collect();
        logs.sort_by_key(|l| l.created_at);
        Ok(logs)
    }
}

/// Canned releases per `owner/repo`, counting calls
#[derive(Clone, Default)]
pub struct MemoryReleaseSource {
    releases: Arc<Mutex<HashMap<String, Vec<GithubRelease>>>>,
    calls: Arc<Mutex<usize>>,
    failing: Arc<Mutex<bool>>,
}

impl MemoryReleaseSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, owner: &str, repo: &str, releases: Vec<GithubRelease>) {
        self.releases
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(format!("{owner}/{repo}"), releases);
    }

    pub fn set_failing(&self, failing: bool) {
        *self.failing.lock().unwrap_or_else(|e| e.into_inner()) = failing;
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl ReleaseSource for MemoryReleaseSource {
    async fn releases(&self, owner: &str, repo: &str) -> MetaResult<Vec<GithubRelease>> {
        *self.calls.lock().unwrap_or_else(|e| e.into_inner()) += 1;

        if *self.failing.lock().unwrap_or_else(|e| e.into_inner()) {
            return Err(MetaError::Releases("unreachable".to_string()));
        }

        Ok(self
            .releases
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&format!("{owner}/{repo}"))
            .cloned()
            .unwrap_or_default())
    }
}
