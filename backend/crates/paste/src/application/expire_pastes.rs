//! Expire Pastes Use Case
//!
//! Periodic cleanup of pastes past their `deletes_at`.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use kernel::action_log::{ActionLogType, log_action};

use crate::domain::repository::PasteStore;
use crate::error::PasteResult;

pub struct ExpirePastesUseCase<R>
where
    R: PasteStore,
{
    repo: Arc<R>,
}

impl<R> ExpirePastesUseCase<R>
where
    R: PasteStore,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Delete everything expired at `now`; returns how many went
    pub async fn execute(&self, now: DateTime<Utc>) -> PasteResult<usize> {
        let expired = self.repo.delete_expired(now).await?;

        for id in &expired {
            log_action(self.repo.as_ref(), ActionLogType::PasteExpired, id.as_str()).await;
        }

        tracing::info!(count = expired.len(), "Expired pastes deleted");
        Ok(expired.len())
    }
}
