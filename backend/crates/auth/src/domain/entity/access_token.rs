//! Access Token Entity

use chrono::{DateTime, Utc};
use kernel::id::{AccessTokenId, UserId};

use crate::domain::value_object::scope::Scope;

/// Stored access token (the secret itself is only kept as a hash)
#[derive(Debug, Clone)]
pub struct AccessToken {
    pub id: AccessTokenId,
    pub owner_id: UserId,
    pub token_hash: String,
    pub scopes: Vec<Scope>,
    pub description: String,
    /// Login cookies are hidden from the token management listing
    pub hidden: bool,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl AccessToken {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn token(expires_at: Option<DateTime<Utc>>) -> AccessToken {
        AccessToken {
            id: AccessTokenId::new(),
            owner_id: UserId::new(),
            token_hash: String::new(),
            scopes: vec![],
            description: String::new(),
            hidden: false,
            created_at: Utc::now(),
            expires_at,
        }
    }

    #[test]
    fn test_expiry() {
        let now = Utc::now();
        assert!(!token(None).is_expired(now));
        assert!(!token(Some(now + Duration::minutes(1))).is_expired(now));
        assert!(token(Some(now)).is_expired(now));
    }
}
