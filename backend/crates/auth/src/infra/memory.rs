//! In-memory repositories for tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use kernel::action_log::{ActionLog, ActionLogRepository, ActionLogType};
use kernel::error::app_error::AppResult;
use kernel::id::{AccessTokenId, ImageId, SessionSettingsId, UserId};

use crate::domain::entity::{
    access_token::AccessToken,
    image::Image,
    settings::{SessionSettings, Settings, UserSettings},
    user::User,
};
use crate::domain::repository::{
    AccessTokenRepository, ImageRepository, SessionSettingsRepository, UserRepository,
};
use crate::domain::value_object::user_name::UserName;
use crate::error::AuthResult;

#[derive(Default)]
pub struct MemoryAuthState {
    pub users: HashMap<String, User>,
    pub tokens: HashMap<String, AccessToken>,
    pub sessions: HashMap<String, SessionSettings>,
    pub images: HashMap<String, Image>,
    pub logs: Vec<ActionLog>,
}

/// Shared in-memory store; clones see the same data
#[derive(Clone, Default)]
pub struct MemoryAuthRepository {
    state: Arc<Mutex<MemoryAuthState>>,
}

impl MemoryAuthRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Direct access for assertions and fixtures
    pub fn state(&self) -> MutexGuard<'_, MemoryAuthState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Types of every logged action, in order
    pub fn logged(&self) -> Vec<ActionLogType> {
        self.state().logs.iter().map(|l| l.action_type).collect()
    }
}

impl UserRepository for MemoryAuthRepository {
    async fn create(&self, user: &User) -> AuthResult<()> {
        self.state().users.insert(user.id.to_string(), user.clone());
        Ok(())
    }

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>> {
        Ok(self.state().users.get(user_id.as_str()).cloned())
    }

    async fn find_by_username(&self, username: &str) -> AuthResult<Option<User>> {
        let canonical = UserName::canonicalize(username);
        Ok(self
            .state()
            .users
            .values()
            .find(|u| u.username.canonical() == canonical)
            .cloned())
    }

    async fn find_by_provider(
        &self,
        provider_name: &str,
        provider_id: &str,
    ) -> AuthResult<Option<User>> {
        Ok(self
            .state()
            .users
            .values()
            .find(|u| {
                u.provider_name.eq_ignore_ascii_case(provider_name) && u.provider_id == provider_id
            })
            .cloned())
    }

    async fn exists_by_id(&self, user_id: &UserId) -> AuthResult<bool> {
        Ok(self.state().users.contains_key(user_id.as_str()))
    }

    async fn exists_by_username(&self, username: &str) -> AuthResult<bool> {
        Ok(self.find_by_username(username).await?.is_some())
    }

    async fn update_username(&self, user_id: &UserId, username: &UserName) -> AuthResult<()> {
        if let Some(u) = self.state().users.get_mut(user_id.as_str()) {
            u.username = username.clone();
        }
        Ok(())
    }

    async fn update_avatar(&self, user_id: &UserId, avatar_id: Option<&ImageId>) -> AuthResult<()> {
        if let Some(u) = self.state().users.get_mut(user_id.as_str()) {
            u.avatar_id = avatar_id.cloned();
        }
        Ok(())
    }

    async fn update_settings(&self, user_id: &UserId, settings: &Settings) -> AuthResult<()> {
        if let Some(u) = self.state().users.get_mut(user_id.as_str()) {
            u.settings = settings.clone();
        }
        Ok(())
    }

    async fn update_user_settings(
        &self,
        user_id: &UserId,
        user_settings: &UserSettings,
    ) -> AuthResult<()> {
        if let Some(u) = self.state().users.get_mut(user_id.as_str()) {
            u.user_settings = user_settings.clone();
        }
        Ok(())
    }

    async fn delete(&self, user_id: &UserId) -> AuthResult<()> {
        let mut state = self.state();
        state.users.remove(user_id.as_str());
        state.tokens.retain(|_, t| &t.owner_id != user_id);
        Ok(())
    }
}

impl AccessTokenRepository for MemoryAuthRepository {
    async fn create(&self, token: &AccessToken) -> AuthResult<()> {
        self.state().tokens.insert(token.id.to_string(), token.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &AccessTokenId) -> AuthResult<Option<AccessToken>> {
        Ok(self.state().tokens.get(id.as_str()).cloned())
    }

    async fn exists_by_id(&self, id: &AccessTokenId) -> AuthResult<bool> {
        Ok(self.state().tokens.contains_key(id.as_str()))
    }

    async fn find_visible_by_owner(&self, owner_id: &UserId) -> AuthResult<Vec<AccessToken>> {
        let mut tokens: Vec<AccessToken> = self
            .state()
            .tokens
            .values()
            .filter(|t| &t.owner_id == owner_id && !t.hidden)
            .cloned()
            .collect();
        tokens.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tokens)
    }

    async fn delete(&self, id: &AccessTokenId) -> AuthResult<()> {
        self.state().tokens.remove(id.as_str());
        Ok(())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> AuthResult<Vec<UserId>> {
        let mut state = self.state();
        let expired: Vec<AccessToken> = state
            .tokens
            .values()
            .filter(|t| t.is_expired(now))
            .cloned()
            .collect();
        for t in &expired {
            state.tokens.remove(t.id.as_str());
        }
        Ok(expired.into_iter().map(|t| t.owner_id).collect())
    }
}

impl SessionSettingsRepository for MemoryAuthRepository {
    async fn create(&self, session: &SessionSettings) -> AuthResult<()> {
        self.state()
            .sessions
            .insert(session.id.to_string(), session.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &SessionSettingsId) -> AuthResult<Option<SessionSettings>> {
        Ok(self.state().sessions.get(id.as_str()).cloned())
    }

    async fn exists_by_id(&self, id: &SessionSettingsId) -> AuthResult<bool> {
        Ok(self.state().sessions.contains_key(id.as_str()))
    }

    async fn touch(&self, id: &SessionSettingsId, at: DateTime<Utc>) -> AuthResult<()> {
        if let Some(s) = self.state().sessions.get_mut(id.as_str()) {
            s.last_accessed = at;
        }
        Ok(())
    }

    async fn update(
        &self,
        id: &SessionSettingsId,
        settings: &Settings,
        at: DateTime<Utc>,
    ) -> AuthResult<()> {
        if let Some(s) = self.state().sessions.get_mut(id.as_str()) {
            s.settings = settings.clone();
            s.last_accessed = at;
        }
        Ok(())
    }

    async fn delete_idle(&self, before: DateTime<Utc>) -> AuthResult<u64> {
        let mut state = self.state();
        let len = state.sessions.len();
        state.sessions.retain(|_, s| s.last_accessed >= before);
        Ok((len - state.sessions.len()) as u64)
    }
}

impl ImageRepository for MemoryAuthRepository {
    async fn create(&self, image: &Image) -> AuthResult<()> {
        self.state().images.insert(image.id.to_string(), image.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &ImageId) -> AuthResult<Option<Image>> {
        Ok(self.state().images.get(id.as_str()).cloned())
    }

    async fn exists_by_id(&self, id: &ImageId) -> AuthResult<bool> {
        Ok(self.state().images.contains_key(id.as_str()))
    }

    async fn delete(&self, id: &ImageId) -> AuthResult<()> {
        self.state().images.remove(id.as_str());
        Ok(())
    }
}

impl ActionLogRepository for MemoryAuthRepository {
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
