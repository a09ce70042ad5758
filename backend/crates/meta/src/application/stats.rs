//! Stats Use Case
//!
//! Version, live paste count and action-log statistics.

use std::sync::Arc;

use kernel::action_log::{ActionLogRepository, ActionLogType};

use crate::domain::entities::AppStats;
use crate::domain::repository::MetaStore;
use crate::domain::services::app_stats;
use crate::error::MetaResult;

/// Action types the statistics are computed from
const STAT_TYPES: [ActionLogType; 5] = [
    ActionLogType::PasteCreated,
    ActionLogType::PasteDeleted,
    ActionLogType::PasteExpired,
    ActionLogType::UserCreated,
    ActionLogType::UserDeleted,
];

pub struct StatsUseCase<R>
where
    R: MetaStore,
{
    repo: Arc<R>,
}

impl<R> StatsUseCase<R>
where
    R: MetaStore,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn active_pastes(&self) -> MetaResult<u64> {
        self.repo.count_pastes().await
    }

    pub async fn stats(&self) -> MetaResult<AppStats> {
        let logs = ActionLogRepository::find_by_types(self.repo.as_ref(), &STAT_TYPES).await?;
        Ok(app_stats(&logs))
    }
}
