//! Action Log
//!
//! Append-only audit trail of lifecycle events (paste created, user deleted, ...).
//! Application statistics are derived from it, so writers in every domain
//! share this vocabulary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::app_error::AppResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i16)]
pub enum ActionLogType {
    PasteCreated = 0,
    PasteDeleted = 1,
    PasteExpired = 2,
    UserCreated = 3,
    UserDeleted = 4,
    AccessTokenCreated = 5,
    AccessTokenDeleted = 6,
    AccessTokenExpired = 7,
}

impl ActionLogType {
    #[inline]
    pub const fn id(&self) -> i16 {
        *self as i16
    }

    pub fn from_id(id: i16) -> Option<Self> {
        use ActionLogType::*;
        match id {
            0 => Some(PasteCreated),
            1 => Some(PasteDeleted),
            2 => Some(PasteExpired),
            3 => Some(UserCreated),
            4 => Some(UserDeleted),
            5 => Some(AccessTokenCreated),
            6 => Some(AccessTokenDeleted),
            7 => Some(AccessTokenExpired),
            _ => None,
        }
    }

    pub const fn code(&self) -> &'static str {
        use ActionLogType::*;
        match self {
            PasteCreated => "paste_created",
            PasteDeleted => "paste_deleted",
            PasteExpired => "paste_expired",
            UserCreated => "user_created",
            UserDeleted => "user_deleted",
            AccessTokenCreated => "access_token_created",
            AccessTokenDeleted => "access_token_deleted",
            AccessTokenExpired => "access_token_expired",
        }
    }
}

impl fmt::Display for ActionLogType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A single logged action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionLog {
    pub created_at: DateTime<Utc>,
    pub action_type: ActionLogType,
    pub object_id: String,
}

impl ActionLog {
    pub fn now(action_type: ActionLogType, object_id: impl Into<String>) -> Self {
        Self {
            created_at: Utc::now(),
            action_type,
            object_id: object_id.into(),
        }
    }
}

/// Action log store
#[trait_variant::make(ActionLogRepository: Send)]
pub trait LocalActionLogRepository {
    /// Append a log entry
    async fn append(&self, log: &ActionLog) -> AppResult<()>;

    /// All entries of the given types, oldest first
    async fn find_by_types(&self, types: &[ActionLogType]) -> AppResult<Vec<ActionLog>>;
}

/// Record an action without failing the caller.
///
/// A missed audit entry only skews statistics, so the error is logged and dropped.
pub async fn log_action<R>(repo: &R, action_type: ActionLogType, object_id: &str)
where
    R: ActionLogRepository + Sync,
{
    let entry = ActionLog::now(action_type, object_id);
    if let Err(e) = repo.append(&entry).await {
        tracing::warn!(
            error = %e,
            action = %action_type,
            object_id = %object_id,
            "Failed to write action log"
        );
    }
}

// ============================================================================
// PostgreSQL implementation
// ============================================================================

#[cfg(feature = "sqlx")]
pub use pg::PgActionLogRepository;

#[cfg(feature = "sqlx")]
mod pg {
    use super::*;
    use sqlx::PgPool;

    #[derive(Clone)]
    pub struct PgActionLogRepository {
        pool: PgPool,
    }

    impl PgActionLogRepository {
        pub fn new(pool: PgPool) -> Self {
            Self { pool }
        }
    }

    #[derive(sqlx::FromRow)]
    struct ActionLogRow {
        created_at: DateTime<Utc>,
        action_type: i16,
        object_id: String,
    }

    impl ActionLogRepository for PgActionLogRepository {
        async fn append(&self, log: &ActionLog) -> AppResult<()> {
            sqlx::query(
                "INSERT INTO action_logs (created_at, action_type, object_id) VALUES ($1, $2, $3)",
            )
            .bind(log.created_at)
            .bind(log.action_type.id())
            .bind(&log.object_id)
            .execute(&self.pool)
            .await?;
            Ok(())
        }

        async fn find_by_types(&self, types: &[ActionLogType]) -> AppResult<Vec<ActionLog>> {
            let ids: Vec<i16> = types.iter().map(|t| t.id()).collect();
            let rows = sqlx::query_as::<_, ActionLogRow>(
                r#"
                SELECT created_at, action_type, object_id
                FROM action_logs
                WHERE action_type = ANY($1)
                ORDER BY created_at ASC
                "#,
            )
            .bind(&ids)
            .fetch_all(&self.pool)
            .await?;

            Ok(rows
                .into_iter()
                .filter_map(|r| {
                    Some(ActionLog {
                        created_at: r.created_at,
                        action_type: ActionLogType::from_id(r.action_type)?,
                        object_id: r.object_id,
                    })
                })
                .collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::app_error::AppError;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryLog {
        entries: Mutex<Vec<ActionLog>>,
        fail: bool,
    }

    impl ActionLogRepository for MemoryLog {
        async fn append(&self, log: &ActionLog) -> AppResult<()> {
            if self.fail {
                return Err(AppError::internal("down"));
            }
            self.entries.lock().unwrap().push(log.clone());
            Ok(())
        }

        async fn find_by_types(&self, types: &[ActionLogType]) -> AppResult<Vec<ActionLog>> {
            Ok(self
                .entries
                .lock()
                .unwrap()
                .iter()
                .filter(|l| types.contains(&l.action_type))
                .cloned()
                .collect())
        }
    }

    #[test]
    fn test_id_roundtrip() {
        for id in 0..8 {
            assert_eq!(ActionLogType::from_id(id).unwrap().id(), id);
        }
        assert_eq!(ActionLogType::from_id(8), None);
    }

    #[tokio::test]
    async fn test_log_action_appends() {
        let repo = MemoryLog::default();
        log_action(&repo, ActionLogType::PasteCreated, "abc").await;
        let logs = ActionLogRepository::find_by_types(&repo, &[ActionLogType::PasteCreated])
            .await
            .unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].object_id, "abc");
    }

    #[tokio::test]
    async fn test_log_action_swallows_errors() {
        let repo = MemoryLog {
            fail: true,
            ..Default::default()
        };
        log_action(&repo, ActionLogType::UserDeleted, "u1").await;
        assert!(repo.entries.lock().unwrap().is_empty());
    }
}
