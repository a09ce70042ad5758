//! Client-facing access token: `{id}-{secret}`.
//!
//! Only the SHA-512 of the secret is persisted; the id locates the row.

use kernel::id::AccessTokenId;
use platform::crypto::{constant_time_eq, random_hex, sha512_hex};
use std::fmt;

/// Number of hex characters in the secret part
pub const SECRET_LEN: usize = 64;

#[derive(Clone, PartialEq, Eq)]
pub struct AccessTokenValue {
    id: AccessTokenId,
    secret: String,
}

impl AccessTokenValue {
    /// Fresh random secret for the given id
    pub fn generate(id: AccessTokenId) -> Self {
        Self {
            id,
            secret: random_hex(SECRET_LEN),
        }
    }

    /// Parse `{id}-{secret}`; `None` when malformed
    pub fn parse(raw: &str) -> Option<Self> {
        let (id, secret) = raw.trim().split_once('-')?;
        if id.is_empty() || secret.is_empty() {
            return None;
        }
        Some(Self {
            id: AccessTokenId::from_string(id),
            secret: secret.to_string(),
        })
    }

    pub fn id(&self) -> &AccessTokenId {
        &self.id
    }

    /// Hash stored in the database
    pub fn secret_hash(&self) -> String {
        sha512_hex(self.secret.as_bytes())
    }

    pub fn matches_hash(&self, stored_hash: &str) -> bool {
        constant_time_eq(self.secret_hash().as_bytes(), stored_hash.as_bytes())
    }
}

impl fmt::Display for AccessTokenValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.id, self.secret)
    }
}

// Never print the secret
impl fmt::Debug for AccessTokenValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccessTokenValue({}-***)", self.id)
    }
}
