//! API DTOs (Data Transfer Objects)

use chrono::{DateTime, Utc};
use kernel::expires_in::ExpiresIn;
use serde::{Deserialize, Serialize};

use crate::application::access_tokens::IssuedToken;
use crate::domain::entity::access_token::AccessToken;
use crate::domain::value_object::scope::Scope;

// ============================================================================
// OAuth / Registration
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub state: String,
    pub code: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
}

// ============================================================================
// Access Tokens
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateAccessTokenRequest {
    #[serde(default)]
    pub scopes: Vec<Scope>,
    #[serde(default)]
    pub expires_in: ExpiresIn,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateAccessTokenResponse {
    pub access_token: String,
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<IssuedToken> for GenerateAccessTokenResponse {
    fn from(token: IssuedToken) -> Self {
        Self {
            access_token: token.value.to_string(),
            expires_at: token.expires_at,
        }
    }
}

/// Listing entry; never carries the secret
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenResponse {
    pub id: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub scopes: Vec<Scope>,
}

impl From<AccessToken> for AccessTokenResponse {
    fn from(token: AccessToken) -> Self {
        Self {
            id: token.id.into_string(),
            description: token.description,
            created_at: token.created_at,
            expires_at: token.expires_at,
            scopes: token.scopes,
        }
    }
}

// ============================================================================
// Users / Settings
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct UserQuery {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetUsernameRequest {
    pub username: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_request_defaults() {
        let req: GenerateAccessTokenRequest =
            serde_json::from_str(r#"{"scopes":["paste:read"]}"#).unwrap();
        assert_eq!(req.scopes, vec![Scope::PasteRead]);
        assert_eq!(req.expires_in, ExpiresIn::Never);
        assert!(req.description.is_empty());
    }
}
