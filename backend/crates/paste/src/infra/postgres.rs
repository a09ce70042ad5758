//! PostgreSQL Repository Implementation

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use kernel::action_log::{ActionLog, ActionLogRepository, ActionLogType, PgActionLogRepository};
use kernel::error::app_error::AppResult;
use kernel::id::{PasteHistoryId, PasteId, UserId};
use platform::crypto::EncryptedBlob;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Transaction};

use crate::domain::entities::{EncryptedContent, Paste, PasteHistory, Pasty};
use crate::domain::repository::{OwnerQuery, PasteRepository};
use crate::error::PasteResult;

const PASTE_COLUMNS: &str = r#"
    p.id,
    p.title,
    p.created_at,
    p.expires_in,
    p.deletes_at,
    p.owner_id,
    p.private,
    p.pinned,
    p.tags,
    (SELECT COUNT(*) FROM paste_stars s WHERE s.paste_id = p.id) AS stars,
    p.encrypted_data,
    p.encryption_iv,
    p.encryption_salt,
    p.encryption_version
"#;

const OWNER_FILTER: &str = r#"
    p.owner_id = $1
    AND ($2 OR NOT p.private)
    AND (NOT $3 OR p.pinned)
    AND ($4::text IS NULL OR $4 = ANY(p.tags))
"#;

/// PostgreSQL-backed paste repository
#[derive(Clone)]
pub struct PgPasteRepository {
    pool: PgPool,
    logs: PgActionLogRepository,
}

impl PgPasteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self {
            logs: PgActionLogRepository::new(pool.clone()),
            pool,
        }
    }

    /// Attach pasties and history to loaded rows, keeping row order
    async fn hydrate(&self, rows: Vec<PasteRow>) -> PasteResult<Vec<Paste>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<String> = rows.iter().map(|r| r.id.clone()).collect();

        let pasty_rows = sqlx::query_as::<_, PastyRow>(
            r#"
            SELECT paste_id, id, title, content, language
            FROM pasties
            WHERE paste_id = ANY($1)
            ORDER BY paste_id, position
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let history_rows = sqlx::query_as::<_, HistoryRow>(
            r#"
            SELECT paste_id, id, edited_at, title, pasties
            FROM paste_history
            WHERE paste_id = ANY($1)
            ORDER BY paste_id, position
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut pasties: HashMap<String, Vec<Pasty>> = HashMap::new();
        for row in pasty_rows {
            pasties
                .entry(row.paste_id.clone())
                .or_default()
                .push(row.into_pasty());
        }

        let mut history: HashMap<String, Vec<PasteHistory>> = HashMap::new();
        for row in history_rows {
            history
                .entry(row.paste_id.clone())
                .or_default()
                .push(row.into_history());
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let p = pasties.remove(&row.id).unwrap_or_default();
                let h = history.remove(&row.id).unwrap_or_default();
                row.into_paste(p, h)
            })
            .collect())
    }

    /// Rewrite pasties and history rows inside a transaction
    async fn write_content(tx: &mut Transaction<'_, Postgres>, paste: &Paste) -> PasteResult<()> {
        sqlx::query("DELETE FROM pasties WHERE paste_id = $1")
            .bind(paste.id.as_str())
            .execute(&mut **tx)
            .await?;
        sqlx::query("DELETE FROM paste_history WHERE paste_id = $1")
            .bind(paste.id.as_str())
            .execute(&mut **tx)
            .await?;

        // Encrypted pastes keep everything inside the ciphertext
        if paste.is_encrypted() {
            return Ok(());
        }

        for (position, pasty) in paste.pasties.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO pasties (paste_id, id, position, title, content, language)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(paste.id.as_str())
            .bind(pasty.id.as_str())
            .bind(position as i32)
            .bind(&pasty.title)
            .bind(&pasty.content)
            .bind(&pasty.language)
            .execute(&mut **tx)
            .await?;
        }

        for (position, entry) in paste.history.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO paste_history (paste_id, id, position, edited_at, title, pasties)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(paste.id.as_str())
            .bind(entry.id.as_str())
            .bind(position as i32)
            .bind(entry.edited_at)
            .bind(&entry.title)
            .bind(Json(&entry.pasties))
            .execute(&mut **tx)
            .await?;
        }

        Ok(())
    }
}

// ============================================================================
// Paste Repository Implementation
// ============================================================================

impl PasteRepository for PgPasteRepository {
    async fn create(&self, paste: &Paste) -> PasteResult<()> {
        let encrypted = paste.encrypted.as_ref();
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO pastes (
                id,
                title,
                created_at,
                expires_in,
                deletes_at,
                owner_id,
                private,
                pinned,
                tags,
                encrypted_data,
                encryption_iv,
                encryption_salt,
                encryption_version
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(paste.id.as_str())
        .bind(&paste.title)
        .bind(paste.created_at)
        .bind(paste.expires_in.as_str())
        .bind(paste.deletes_at)
        .bind(paste.owner_id.as_ref().map(|id| id.as_str()))
        .bind(paste.private)
        .bind(paste.pinned)
        .bind(&paste.tags)
        .bind(encrypted.map(|e| e.blob.data.as_str()))
        .bind(encrypted.map(|e| e.blob.iv.as_str()))
        .bind(encrypted.map(|e| e.blob.salt.as_str()))
        .bind(encrypted.map(|e| e.version))
        .execute(&mut *tx)
        .await?;

        Self::write_content(&mut tx, paste).await?;
        tx.commit().await?;

        Ok(())
    }

    async fn find_by_id(&self, id: &PasteId) -> PasteResult<Option<Paste>> {
        let sql = format!("SELECT {PASTE_COLUMNS} FROM pastes p WHERE p.id = $1");
        let row = sqlx::query_as::<_, PasteRow>(&sql)
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        Ok(self.hydrate(vec![row]).await?.pop())
    }

    async fn exists_by_id(&self, id: &PasteId) -> PasteResult<bool> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM pastes WHERE id = $1)")
                .bind(id.as_str())
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    async fn update_content(&self, paste: &Paste) -> PasteResult<()> {
        let encrypted = paste.encrypted.as_ref();
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            UPDATE pastes
            SET title = $2,
                encrypted_data = $3,
                encryption_iv = $4,
                encryption_salt = $5,
                encryption_version = $6
            WHERE id = $1
            "#,
        )
        .bind(paste.id.as_str())
        .bind(&paste.title)
        .bind(encrypted.map(|e| e.blob.data.as_str()))
        .bind(encrypted.map(|e| e.blob.iv.as_str()))
        .bind(encrypted.map(|e| e.blob.salt.as_str()))
        .bind(encrypted.map(|e| e.version))
        .execute(&mut *tx)
        .await?;

        Self::write_content(&mut tx, paste).await?;
        tx.commit().await?;

        Ok(())
    }

    async fn set_pinned(&self, id: &PasteId, pinned: bool) -> PasteResult<()> {
        sqlx::query("UPDATE pastes SET pinned = $2 WHERE id = $1")
            .bind(id.as_str())
            .bind(pinned)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn set_private(&self, id: &PasteId, private: bool) -> PasteResult<()> {
        sqlx::query("UPDATE pastes SET private = $2 WHERE id = $1")
            .bind(id.as_str())
            .bind(private)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn set_tags(&self, id: &PasteId, tags: &[String]) -> PasteResult<()> {
        sqlx::query("UPDATE pastes SET tags = $2 WHERE id = $1")
            .bind(id.as_str())
            .bind(tags)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete(&self, id: &PasteId) -> PasteResult<()> {
        sqlx::query("DELETE FROM pastes WHERE id = $1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn is_starred(&self, id: &PasteId, user_id: &UserId) -> PasteResult<bool> {
        let starred = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM paste_stars WHERE paste_id = $1 AND user_id = $2)",
        )
        .bind(id.as_str())
        .bind(user_id.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(starred)
    }

    async fn star(&self, id: &PasteId, user_id: &UserId) -> PasteResult<()> {
        sqlx::query(
            "INSERT INTO paste_stars (paste_id, user_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(id.as_str())
        .bind(user_id.as_str())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn unstar(&self, id: &PasteId, user_id: &UserId) -> PasteResult<()> {
        sqlx::query("DELETE FROM paste_stars WHERE paste_id = $1 AND user_id = $2")
            .bind(id.as_str())
            .bind(user_id.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn find_by_owner(&self, query: &OwnerQuery) -> PasteResult<(Vec<Paste>, u64)> {
        let sql = format!(
            r#"
            SELECT {PASTE_COLUMNS}
            FROM pastes p
            WHERE {OWNER_FILTER}
            ORDER BY p.created_at DESC
            LIMIT $5 OFFSET $6
            "#
        );
        let rows = sqlx::query_as::<_, PasteRow>(&sql)
            .bind(query.owner_id.as_str())
            .bind(query.include_private)
            .bind(query.pinned_only)
            .bind(query.tag.as_deref())
            .bind(i64::from(query.page_size))
            .bind(i64::from(query.page) * i64::from(query.page_size))
            .fetch_all(&self.pool)
            .await?;

        let count_sql = format!("SELECT COUNT(*) FROM pastes p WHERE {OWNER_FILTER}");
        let total = sqlx::query_scalar::<_, i64>(&count_sql)
            .bind(query.owner_id.as_str())
            .bind(query.include_private)
            .bind(query.pinned_only)
            .bind(query.tag.as_deref())
            .fetch_one(&self.pool)
            .await?;

        Ok((self.hydrate(rows).await?, total.max(0) as u64))
    }

    async fn find_all_by_owner(&self, owner_id: &UserId) -> PasteResult<Vec<Paste>> {
        let sql = format!(
            "SELECT {PASTE_COLUMNS} FROM pastes p WHERE p.owner_id = $1 ORDER BY p.created_at DESC"
        );
        let rows = sqlx::query_as::<_, PasteRow>(&sql)
            .bind(owner_id.as_str())
            .fetch_all(&self.pool)
            .await?;

        self.hydrate(rows).await
    }

    async fn tags_by_owner(&self, owner_id: &UserId) -> PasteResult<Vec<String>> {
        let tags = sqlx::query_scalar::<_, String>(
            r#"
            SELECT DISTINCT tag
            FROM pastes, unnest(tags) AS tag
            WHERE owner_id = $1
            ORDER BY tag
            "#,
        )
        .bind(owner_id.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(tags)
    }

    async fn count(&self) -> PasteResult<u64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM pastes")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.max(0) as u64)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> PasteResult<Vec<PasteId>> {
        let ids = sqlx::query_scalar::<_, String>(
            "DELETE FROM pastes WHERE deletes_at IS NOT NULL AND deletes_at < $1 RETURNING id",
        )
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids.into_iter().map(PasteId::from_string).collect())
    }
}

impl ActionLogRepository for PgPasteRepository {
    async fn append(&self, log: &ActionLog) -> AppResult<()> {
        self.logs.append(log).await
    }

    async fn find_by_types(&self, types: &[ActionLogType]) -> AppResult<Vec<ActionLog>> {
        self.logs.find_by_types(types).await
    }
}

// ============================================================================
// Row types
// ============================================================================

#[derive(sqlx::FromRow)]
struct PasteRow {
    id: String,
    title: String,
    created_at: DateTime<Utc>,
    expires_in: String,
    deletes_at: Option<DateTime<Utc>>,
    owner_id: Option<String>,
    private: bool,
    pinned: bool,
    tags: Vec<String>,
    stars: i64,
    encrypted_data: Option<String>,
    encryption_iv: Option<String>,
    encryption_salt: Option<String>,
    encryption_version: Option<i16>,
}

impl PasteRow {
    fn into_paste(self, pasties: Vec<Pasty>, history: Vec<PasteHistory>) -> Paste {
        let encrypted = match (self.encrypted_data, self.encryption_iv, self.encryption_salt) {
            (Some(data), Some(iv), Some(salt)) => Some(EncryptedContent {
                blob: EncryptedBlob { data, iv, salt },
                version: self.encryption_version.unwrap_or_default(),
            }),
            _ => None,
        };

        Paste {
            id: PasteId::from_string(self.id),
            title: self.title,
            created_at: self.created_at,
            expires_in: self.expires_in.parse().unwrap_or_default(),
            deletes_at: self.deletes_at,
            owner_id: self.owner_id.map(UserId::from_string),
            private: self.private,
            pinned: self.pinned,
            tags: self.tags,
            stars: self.stars,
            pasties,
            history,
            encrypted,
        }
    }
}

#[derive(sqlx::FromRow)]
struct PastyRow {
    paste_id: String,
    id: String,
    title: String,
    content: String,
    language: String,
}

impl PastyRow {
    fn into_pasty(self) -> Pasty {
        Pasty {
            id: self.id.into(),
            title: self.title,
            content: self.content,
            language: self.language,
        }
    }
}

#[derive(sqlx::FromRow)]
struct HistoryRow {
    paste_id: String,
    id: String,
    edited_at: DateTime<Utc>,
    title: String,
    pasties: Json<Vec<Pasty>>,
}

impl HistoryRow {
    fn into_history(self) -> PasteHistory {
        PasteHistory {
            id: PasteHistoryId::from_string(self.id),
            edited_at: self.edited_at,
            title: self.title,
            pasties: self.pasties.0,
        }
    }
}
