//! In-memory paste repository for tests.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use kernel::action_log::{ActionLog, ActionLogRepository, ActionLogType};
use kernel::error::app_error::AppResult;
use kernel::id::{PasteId, UserId};

use crate::domain::entities::Paste;
use crate::domain::repository::{OwnerQuery, PasteRepository};
use crate::error::PasteResult;

#[derive(Default)]
pub struct MemoryPasteState {
    /// Stored form: encrypted pastes keep only their ciphertext
    pub pastes: HashMap<String, Paste>,
    /// (paste id, user id)
    pub stars: HashSet<(String, String)>,
    pub logs: Vec<ActionLog>,
}

impl MemoryPasteState {
    fn with_stars(&self, paste: &Paste) -> Paste {
        let mut paste = paste.clone();
        paste.stars = self
            .stars
            .iter()
            .filter(|(paste_id, _)| paste_id == paste.id.as_str())
            .count() as i64;
        paste
    }

    fn owned_by<'a>(&'a self, owner_id: &'a UserId) -> impl Iterator<Item = &'a Paste> + 'a {
        self.pastes.values().filter(move |p| p.is_owned_by(owner_id))
    }
}

/// Shared in-memory store; clones see the same data
#[derive(Clone, Default)]
pub struct MemoryPasteRepository {
    state: Arc<Mutex<MemoryPasteState>>,
}

impl MemoryPasteRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Direct access for assertions and fixtures
    pub fn state(&self) -> MutexGuard<'_, MemoryPasteState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Types of every logged action, in order
    pub fn logged(&self) -> Vec<ActionLogType> {
        self.state().logs.iter().map(|l| l.action_type).collect()
    }
}

impl PasteRepository for MemoryPasteRepository {
    async fn create(&self, paste: &Paste) -> PasteResult<()> {
        self.state()
            .pastes
            .insert(paste.id.to_string(), paste.stored_form());
        Ok(())
    }

    async fn find_by_id(&self, id: &PasteId) -> PasteResult<Option<Paste>> {
        let state = self.state();
        Ok(state.pastes.get(id.as_str()).map(|p| state.with_stars(p)))
    }

    async fn exists_by_id(&self, id: &PasteId) -> PasteResult<bool> {
        Ok(self.state().pastes.contains_key(id.as_str()))
    }

    async fn update_content(&self, paste: &Paste) -> PasteResult<()> {
        let mut state = self.state();
        if let Some(stored) = state.pastes.get_mut(paste.id.as_str()) {
            let updated = paste.stored_form();
            stored.title = updated.title;
            stored.pasties = updated.pasties;
            stored.history = updated.history;
            stored.encrypted = updated.encrypted;
        }
        Ok(())
    }

    async fn set_pinned(&self, id: &PasteId, pinned: bool) -> PasteResult<()> {
        if let Some(p) = self.state().pastes.get_mut(id.as_str()) {
            p.pinned = pinned;
        }
        Ok(())
    }

    async fn set_private(&self, id: &PasteId, private: bool) -> PasteResult<()> {
        if let Some(p) = self.state().pastes.get_mut(id.as_str()) {
            p.private = private;
        }
        Ok(())
    }

    async fn set_tags(&self, id: &PasteId, tags: &[String]) -> PasteResult<()> {
        if let Some(p) = self.state().pastes.get_mut(id.as_str()) {
            p.tags = tags.to_vec();
        }
        Ok(())
    }

    async fn delete(&self, id: &PasteId) -> PasteResult<()> {
        let mut state = self.state();
        state.pastes.remove(id.as_str());
        state.stars.retain(|(paste_id, _)| paste_id != id.as_str());
        Ok(())
    }

    async fn is_starred(&self, id: &PasteId, user_id: &UserId) -> PasteResult<bool> {
        Ok(self
            .state()
            .stars
            .contains(&(id.to_string(), user_id.to_string())))
    }

    async fn star(&self, id: &PasteId, user_id: &UserId) -> PasteResult<()> {
        self.state()
            .stars
            .insert((id.to_string(), user_id.to_string()));
        Ok(())
    }

    async fn unstar(&self, id: &PasteId, user_id: &UserId) -> PasteResult<()> {
        self.state()
            .stars
            .remove(&(id.to_string(), user_id.to_string()));
        Ok(())
    }

    async fn find_by_owner(&self, query: &OwnerQuery) -> PasteResult<(Vec<Paste>, u64)> {
        let state = self.state();
        let mut matching: Vec<&Paste> = state
            .owned_by(&query.owner_id)
            .filter(|p| query.include_private || !p.private)
            .filter(|p| !query.pinned_only || p.pinned)
            .filter(|p| query.tag.as_ref().is_none_or(|t| p.tags.contains(t)))
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = matching.len() as u64;
        let page = matching
            .into_iter()
            .skip(query.page as usize * query.page_size as usize)
            .take(query.page_size as usize)
            .map(|p| state.with_stars(p))
            .collect();

        Ok((page, total))
    }

    async fn find_all_by_owner(&self, owner_id: &UserId) -> PasteResult<Vec<Paste>> {
        let state = self.state();
        let mut pastes: Vec<Paste> = state
            .owned_by(owner_id)
            .map(|p| state.with_stars(p))
            .collect();
        pastes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(pastes)
    }

    async fn tags_by_owner(&self, owner_id: &UserId) -> PasteResult<Vec<String>> {
        let state = self.state();
        let tags: BTreeSet<String> = state
            .owned_by(owner_id)
            .flat_map(|p| p.tags.iter().cloned())
            .collect();
        Ok(tags.into_iter().collect())
    }

    async fn count(&self) -> PasteResult<u64> {
        Ok(self.state().pastes.len() as u64)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> PasteResult<Vec<PasteId>> {
        let mut state = self.state();
        let expired: Vec<String> = state
            .pastes
            .values()
            .filter(|p| p.deletes_at.is_some_and(|at| at < now))
            .map(|p| p.id.to_string())
            .collect();

        for id in &expired {
            state.pastes.remove(id);
            state.stars.retain(|(paste_id, _)| paste_id != id);
        }

        Ok(expired.into_iter().map(PasteId::from_string).collect())
    }
}

impl ActionLogRepository for MemoryPasteRepository {
    async fn append(&self, log: &ActionLog) -> AppResult<()> {
        self.state().logs.push(log.clone());
        Ok(())
    }

    async fn find_by_types(&self, types: &[ActionLogType]) -> AppResult<Vec<ActionLog>> {
        Ok(self
            .state()
            .logs
            .iter()
            .filter(|l| types.contains(&l.action_type))
            .cloned()
            .collect())
    }
}
