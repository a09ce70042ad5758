//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use kernel::action_log::{ActionLog, ActionLogRepository, ActionLogType, PgActionLogRepository};
use kernel::error::app_error::AppResult;
use kernel::id::{AccessTokenId, ImageId, SessionSettingsId, UserId};
use sqlx::PgPool;
use sqlx::types::Json;

use crate::domain::entity::{
    access_token::AccessToken,
    image::Image,
    settings::{SessionSettings, Settings, UserSettings},
    user::User,
};
use crate::domain::repository::{
    AccessTokenRepository, ImageRepository, SessionSettingsRepository, UserRepository,
};
use crate::domain::value_object::{scope::Scope, user_name::UserName};
use crate::error::AuthResult;

const USER_COLUMNS: &str = r#"
    id,
    created_at,
    username,
    avatar_id,
    is_contributor,
    is_supporter,
    is_admin,
    provider_name,
    provider_id,
    show_all_pastes_on_profile,
    settings
"#;

/// PostgreSQL-backed auth repository
#[derive(Clone)]
pub struct PgAuthRepository {
    pool: PgPool,
    logs: PgActionLogRepository,
}

impl PgAuthRepository {
    pub fn new(pool: PgPool) -> Self {
        Self {
            logs: PgActionLogRepository::new(pool.clone()),
            pool,
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn find_user_where(&self, condition: &str, value: &str) -> AuthResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {condition}");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(UserRow::into_user))
    }
}

// ============================================================================
// User Repository Implementation
// ============================================================================

impl UserRepository for PgAuthRepository {
    async fn create(&self, user: &User) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users (
                id,
                created_at,
                username,
                username_canonical,
                avatar_id,
                is_contributor,
                is_supporter,
                is_admin,
                provider_name,
                provider_id,
                show_all_pastes_on_profile,
                settings
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(user.id.as_str())
        .bind(user.created_at)
        .bind(user.username.original())
        .bind(user.username.canonical())
        .bind(user.avatar_id.as_ref().map(|id| id.as_str()))
        .bind(user.is_contributor)
        .bind(user.is_supporter)
        .bind(user.is_admin)
        .bind(&user.provider_name)
        .bind(&user.provider_id)
        .bind(user.user_settings.show_all_pastes_on_profile)
        .bind(Json(&user.settings))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>> {
        self.find_user_where("id = $1", user_id.as_str()).await
    }

    async fn find_by_username(&self, username: &str) -> AuthResult<Option<User>> {
        self.find_user_where("username_canonical = $1", &UserName::canonicalize(username))
            .await
    }

    async fn find_by_provider(
        &self,
        provider_name: &str,
        provider_id: &str,
    ) -> AuthResult<Option<User>> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users WHERE lower(provider_name) = lower($1) AND provider_id = $2"
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(provider_name)
            .bind(provider_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(UserRow::into_user))
    }

    async fn exists_by_id(&self, user_id: &UserId) -> AuthResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(user_id.as_str())
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }

    async fn exists_by_username(&self, username: &str) -> AuthResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE username_canonical = $1)",
        )
        .bind(UserName::canonicalize(username))
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn update_username(&self, user_id: &UserId, username: &UserName) -> AuthResult<()> {
        sqlx::query("UPDATE users SET username = $2, username_canonical = $3 WHERE id = $1")
            .bind(user_id.as_str())
            .bind(username.original())
            .bind(username.canonical())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn update_avatar(&self, user_id: &UserId, avatar_id: Option<&ImageId>) -> AuthResult<()> {
        sqlx::query("UPDATE users SET avatar_id = $2 WHERE id = $1")
            .bind(user_id.as_str())
            .bind(avatar_id.map(|id| id.as_str()))
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn update_settings(&self, user_id: &UserId, settings: &Settings) -> AuthResult<()> {
        sqlx::query("UPDATE users SET settings = $2 WHERE id = $1")
            .bind(user_id.as_str())
            .bind(Json(settings))
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn update_user_settings(
        &self,
        user_id: &UserId,
        user_settings: &UserSettings,
    ) -> AuthResult<()> {
        sqlx::query("UPDATE users SET show_all_pastes_on_profile = $2 WHERE id = $1")
            .bind(user_id.as_str())
            .bind(user_settings.show_all_pastes_on_profile)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete(&self, user_id: &UserId) -> AuthResult<()> {
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id.as_str())
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

// ============================================================================
// Access Token Repository Implementation
// ============================================================================

impl AccessTokenRepository for PgAuthRepository {
    async fn create(&self, token: &AccessToken) -> AuthResult<()> {
        let scopes: Vec<&str> = token.scopes.iter().map(|s| s.as_str()).collect();

        sqlx::query(
            r#"
            INSERT INTO access_tokens (
                id,
                owner_id,
                token_hash,
                scopes,
                description,
                hidden,
                created_at,
                expires_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(token.id.as_str())
        .bind(token.owner_id.as_str())
        .bind(&token.token_hash)
        .bind(&scopes)
        .bind(&token.description)
        .bind(token.hidden)
        .bind(token.created_at)
        .bind(token.expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, id: &AccessTokenId) -> AuthResult<Option<AccessToken>> {
        let row = sqlx::query_as::<_, AccessTokenRow>(
            r#"
            SELECT id, owner_id, token_hash, scopes, description, hidden, created_at, expires_at
            FROM access_tokens
            WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(AccessTokenRow::into_token))
    }

    async fn exists_by_id(&self, id: &AccessTokenId) -> AuthResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM access_tokens WHERE id = $1)",
        )
        .bind(id.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn find_visible_by_owner(&self, owner_id: &UserId) -> AuthResult<Vec<AccessToken>> {
        let rows = sqlx::query_as::<_, AccessTokenRow>(
            r#"
            SELECT id, owner_id, token_hash, scopes, description, hidden, created_at, expires_at
            FROM access_tokens
            WHERE owner_id = $1 AND NOT hidden
            ORDER BY created_at DESC
            "#,
        )
        .bind(owner_id.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(AccessTokenRow::into_token).collect())
    }

    async fn delete(&self, id: &AccessTokenId) -> AuthResult<()> {
        sqlx::query("DELETE FROM access_tokens WHERE id = $1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> AuthResult<Vec<UserId>> {
        let owners = sqlx::query_scalar::<_, String>(
            "DELETE FROM access_tokens WHERE expires_at <= $1 RETURNING owner_id",
        )
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        Ok(owners.into_iter().map(UserId::from_string).collect())
    }
}

// ============================================================================
// Session Settings Repository Implementation
// ============================================================================

impl SessionSettingsRepository for PgAuthRepository {
    async fn create(&self, session: &SessionSettings) -> AuthResult<()> {
        sqlx::query("INSERT INTO session_settings (id, settings, last_accessed) VALUES ($1, $2, $3)")
            .bind(session.id.as_str())
            .bind(Json(&session.settings))
            .bind(session.last_accessed)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn find_by_id(&self, id: &SessionSettingsId) -> AuthResult<Option<SessionSettings>> {
        let row = sqlx::query_as::<_, SessionSettingsRow>(
            "SELECT id, settings, last_accessed FROM session_settings WHERE id = $1",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| SessionSettings {
            id: SessionSettingsId::from_string(r.id),
            last_accessed: r.last_accessed,
            settings: r.settings.0,
        }))
    }

    async fn exists_by_id(&self, id: &SessionSettingsId) -> AuthResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM session_settings WHERE id = $1)",
        )
        .bind(id.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn touch(&self, id: &SessionSettingsId, at: DateTime<Utc>) -> AuthResult<()> {
        sqlx::query("UPDATE session_settings SET last_accessed = $2 WHERE id = $1")
            .bind(id.as_str())
            .bind(at)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn update(
        &self,
        id: &SessionSettingsId,
        settings: &Settings,
        at: DateTime<Utc>,
    ) -> AuthResult<()> {
        sqlx::query("UPDATE session_settings SET settings = $2, last_accessed = $3 WHERE id = $1")
            .bind(id.as_str())
            .bind(Json(settings))
            .bind(at)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete_idle(&self, before: DateTime<Utc>) -> AuthResult<u64> {
        let deleted = sqlx::query("DELETE FROM session_settings WHERE last_accessed < $1")
            .bind(before)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted)
    }
}

// ============================================================================
// Image Repository Implementation
// ============================================================================

impl ImageRepository for PgAuthRepository {
    async fn create(&self, image: &Image) -> AuthResult<()> {
        sqlx::query("INSERT INTO images (id, content_type, data, created_at) VALUES ($1, $2, $3, $4)")
            .bind(image.id.as_str())
            .bind(&image.content_type)
            .bind(&image.data)
            .bind(image.created_at)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn find_by_id(&self, id: &ImageId) -> AuthResult<Option<Image>> {
        let row = sqlx::query_as::<_, ImageRow>(
            "SELECT id, content_type, data, created_at FROM images WHERE id = $1",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| Image {
            id: ImageId::from_string(r.id),
            content_type: r.content_type,
            data: r.data,
            created_at: r.created_at,
        }))
    }

    async fn exists_by_id(&self, id: &ImageId) -> AuthResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM images WHERE id = $1)")
            .bind(id.as_str())
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }

    async fn delete(&self, id: &ImageId) -> AuthResult<()> {
        sqlx::query("DELETE FROM images WHERE id = $1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

// ============================================================================
// Action Log (delegated to the kernel store)
// ============================================================================

impl ActionLogRepository for PgAuthRepository {
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
struct UserRow {
    id: String,
    created_at: DateTime<Utc>,
    username: String,
    avatar_id: Option<String>,
    is_contributor: bool,
    is_supporter: bool,
    is_admin: bool,
    provider_name: String,
    provider_id: String,
    show_all_pastes_on_profile: bool,
    settings: Json<Settings>,
}

impl UserRow {
    fn into_user(self) -> User {
        User {
            id: UserId::from_string(self.id),
            created_at: self.created_at,
            username: UserName::from_db(&self.username),
            avatar_id: self.avatar_id.map(ImageId::from_string),
            is_contributor: self.is_contributor,
            is_supporter: self.is_supporter,
            is_admin: self.is_admin,
            provider_name: self.provider_name,
            provider_id: self.provider_id,
            user_settings: UserSettings {
                show_all_pastes_on_profile: self.show_all_pastes_on_profile,
            },
            settings: self.settings.0,
        }
    }
}

#[derive(sqlx::FromRow)]
struct AccessTokenRow {
    id: String,
    owner_id: String,
    token_hash: String,
    scopes: Vec<String>,
    description: String,
    hidden: bool,
    created_at: DateTime<Utc>,
    expires_at: Option<DateTime<Utc>>,
}

impl AccessTokenRow {
    fn into_token(self) -> AccessToken {
        AccessToken {
            id: AccessTokenId::from_string(self.id),
            owner_id: UserId::from_string(self.owner_id),
            token_hash: self.token_hash,
            // Unknown scope names from older rows are dropped
            scopes: self
                .scopes
                .iter()
                .filter_map(|s| s.parse::<Scope>().ok())
                .collect(),
            description: self.description,
            hidden: self.hidden,
            created_at: self.created_at,
            expires_at: self.expires_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct SessionSettingsRow {
    id: String,
    settings: Json<Settings>,
    last_accessed: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct ImageRow {
    id: String,
    content_type: String,
    data: Vec<u8>,
    created_at: DateTime<Utc>,
}
