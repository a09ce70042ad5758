//! Access Token Use Case
//!
//! Issues, validates and revokes `{id}-{secret}` access tokens.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use kernel::action_log::{ActionLogRepository, ActionLogType, log_action};
use kernel::expires_in::ExpiresIn;
use kernel::id::{AccessTokenId, UserId, generate_while_async};

use crate::application::user_context::UserContext;
use crate::domain::entity::access_token::AccessToken;
use crate::domain::repository::{AccessTokenRepository, UserRepository};
use crate::domain::value_object::{access_token_value::AccessTokenValue, scope::Scope};
use crate::error::{AuthError, AuthResult};

/// Newly issued token; `value` is shown to the client exactly once
pub struct IssuedToken {
    pub value: AccessTokenValue,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Request to create a personal access token
#[derive(Debug, Clone, Default)]
pub struct GenerateTokenInput {
    pub scopes: Vec<Scope>,
    pub expires_in: ExpiresIn,
    pub description: String,
}

pub struct AccessTokenUseCase<T, U, L>
where
    T: AccessTokenRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    L: ActionLogRepository + Send + Sync + 'static,
{
    tokens: Arc<T>,
    users: Arc<U>,
    logs: Arc<L>,
}

impl<T, U, L> AccessTokenUseCase<T, U, L>
where
    T: AccessTokenRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    L: ActionLogRepository + Send + Sync + 'static,
{
    pub fn new(tokens: Arc<T>, users: Arc<U>, logs: Arc<L>) -> Self {
        Self {
            tokens,
            users,
            logs,
        }
    }

    /// Issue a token for `owner_id`
    pub async fn issue(
        &self,
        owner_id: &UserId,
        scopes: Vec<Scope>,
        expires_in: ExpiresIn,
        hidden: bool,
        description: String,
    ) -> AuthResult<IssuedToken> {
        let tokens = self.tokens.clone();
        let id: AccessTokenId = generate_while_async(|id| {
            let tokens = tokens.clone();
            async move { tokens.exists_by_id(&id).await }
        })
        .await?;

        let value = AccessTokenValue::generate(id.clone());
        let now = Utc::now();
        let token = AccessToken {
            id,
            owner_id: owner_id.clone(),
            token_hash: value.secret_hash(),
            scopes,
            description,
            hidden,
            created_at: now,
            expires_at: expires_in.to_deletes_at(now),
        };

        self.tokens.create(&token).await?;
        log_action(
            self.logs.as_ref(),
            ActionLogType::AccessTokenCreated,
            owner_id.as_str(),
        )
        .await;

        Ok(IssuedToken {
            value,
            expires_at: token.expires_at,
        })
    }

    /// Hidden one-month token backing the browser login cookie
    pub async fn issue_login(&self, owner_id: &UserId) -> AuthResult<IssuedToken> {
        self.issue(
            owner_id,
            Scope::LOGIN.to_vec(),
            ExpiresIn::OneMonth,
            true,
            String::new(),
        )
        .await
    }

    /// Look up a raw token. Malformed, unknown, expired or mismatching tokens yield `None`;
    /// expired ones are deleted on the way.
    pub async fn validate(&self, raw: &str) -> AuthResult<Option<AccessToken>> {
        let Some(value) = AccessTokenValue::parse(raw) else {
            return Ok(None);
        };

        let Some(token) = self.tokens.find_by_id(value.id()).await? else {
            return Ok(None);
        };

        if token.is_expired(Utc::now()) {
            self.tokens.delete(&token.id).await?;
            return Ok(None);
        }

        if !value.matches_hash(&token.token_hash) {
            return Ok(None);
        }

        Ok(Some(token))
    }

    /// Build the caller context from an optional raw token
    pub async fn resolve(&self, raw: Option<&str>) -> AuthResult<UserContext> {
        let Some(raw) = raw else {
            return Ok(UserContext::anonymous());
        };

        let Some(token) = self.validate(raw).await? else {
            return Ok(UserContext::anonymous());
        };

        match self.users.find_by_id(&token.owner_id).await? {
            Some(user) => Ok(UserContext::logged_in(user, token.scopes)),
            None => Ok(UserContext::anonymous()),
        }
    }

    pub async fn generate_for_self(
        &self,
        ctx: &UserContext,
        input: GenerateTokenInput,
    ) -> AuthResult<IssuedToken> {
        let user = ctx
            .user()
            .ok_or_else(|| AuthError::forbidden("You must be authorized to generate new access tokens."))?;
        ctx.require_scope(&[Scope::UserAccessTokens])?;

        self.issue(
            &user.id,
            input.scopes,
            input.expires_in,
            false,
            input.description,
        )
        .await
    }

    pub async fn list_for_self(&self, ctx: &UserContext) -> AuthResult<Vec<AccessToken>> {
        let user = ctx
            .user()
            .ok_or_else(|| AuthError::forbidden("You must be authorized to view access tokens."))?;
        ctx.require_scope(&[Scope::UserAccessTokens])?;

        self.tokens.find_visible_by_owner(&user.id).await
    }

    pub async fn delete_for_self(&self, ctx: &UserContext, id: &AccessTokenId) -> AuthResult<()> {
        let user = ctx
            .user()
            .ok_or_else(|| AuthError::forbidden("You must be authorized to delete access tokens."))?;
        ctx.require_scope(&[Scope::UserAccessTokens])?;

        let token = self
            .tokens
            .find_by_id(id)
            .await?
            .filter(|t| t.owner_id == user.id)
            .ok_or_else(|| AuthError::not_found("Access token not found."))?;

        self.tokens.delete(&token.id).await?;
        log_action(
            self.logs.as_ref(),
            ActionLogType::AccessTokenDeleted,
            user.id.as_str(),
        )
        .await;

        Ok(())
    }

    /// Revoke the login cookie token
    pub async fn logout(&self, raw: Option<&str>) -> AuthResult<()> {
        let token = match raw {
            Some(raw) => self.validate(raw).await?,
            None => None,
        }
        .ok_or_else(|| AuthError::unauthorized("Access token is not valid."))?;

        self.tokens.delete(&token.id).await?;
        log_action(
            self.logs.as_ref(),
            ActionLogType::AccessTokenDeleted,
            token.owner_id.as_str(),
        )
        .await;

        Ok(())
    }

    /// Delete every expired token
    pub async fn expire(&self, now: DateTime<Utc>) -> AuthResult<usize> {
        let owners = self.tokens.delete_expired(now).await?;
        for owner in &owners {
            log_action(
                self.logs.as_ref(),
                ActionLogType::AccessTokenExpired,
                owner.as_str(),
            )
            .await;
        }
        Ok(owners.len())
    }
}
