//! PostgreSQL Repository Implementation

use chrono::{DateTime, Utc};
use kernel::action_log::{ActionLog, ActionLogRepository, ActionLogType, PgActionLogRepository};
use kernel::error::app_error::AppResult;
use kernel::id::AnnouncementId;
use sqlx::PgPool;

use crate::domain::entities::Announcement;
use crate::domain::repository::MetaRepository;
use crate::error::MetaResult;

/// PostgreSQL-backed announcements, paste counter and action log reader
#[derive(Clone)]
pub struct PgMetaRepository {
    pool: PgPool,
    logs: PgActionLogRepository,
}

impl PgMetaRepository {
    pub fn new(pool: PgPool) -> Self {
        Self {
            logs: PgActionLogRepository::new(pool.clone()),
            pool,
        }
    }
}

impl MetaRepository for PgMetaRepository {
    async fn create_announcement(&self, announcement: &Announcement) -> MetaResult<()> {
        sqlx::query(
            "INSERT INTO announcements (id, created_at, title, content) VALUES ($1, $2, $3, $4)",
        )
        .bind(announcement.id.as_str())
        .bind(announcement.created_at)
        .bind(&announcement.title)
        .bind(&announcement.content)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_announcement(&self, id: &AnnouncementId) -> MetaResult<Option<Announcement>> {
        let row = sqlx::query_as::<_, AnnouncementRow>(
            "SELECT id, created_at, title, content FROM announcements WHERE id = $1",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(AnnouncementRow::into_announcement))
    }

    async fn list_announcements(&self) -> MetaResult<Vec<Announcement>> {
        let rows = sqlx::query_as::<_, AnnouncementRow>(
            "SELECT id, created_at, title, content FROM announcements ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(AnnouncementRow::into_announcement)
            .collect())
    }

    async fn update_announcement(&self, announcement: &Announcement) -> MetaResult<()> {
        sqlx::query("UPDATE announcements SET title = $2, content = $3 WHERE id = $1")
            .bind(announcement.id.as_str())
            .bind(&announcement.title)
            .bind(&announcement.content)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_announcement(&self, id: &AnnouncementId) -> MetaResult<()> {
        sqlx::query("DELETE FROM announcements WHERE id = $1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn count_pastes(&self) -> MetaResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM pastes")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.max(0) as u64)
    }
}

impl ActionLogRepository for PgMetaRepository {
    async fn append(&self, log: &ActionLog) -> AppResult<()> {
        self.logs.append(log).await
    }

    async fn find_by_types(&self, types: &[ActionLogType]) -> AppResult<Vec<ActionLog>> {
        self.logs.find_by_types(types).await
    }
}

#[derive(sqlx::FromRow)]
struct AnnouncementRow {
    id: String,
    created_at: DateTime<Utc>,
    title: String,
    content: String,
}

impl AnnouncementRow {
    fn into_announcement(self) -> Announcement {
        Announcement {
            id: AnnouncementId::from_string(self.id),
            created_at: self.created_at,
            title: self.title,
            content: self.content,
        }
    }
}
