//! Access token scopes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scope {
    #[serde(rename = "paste")]
    Paste,
    #[serde(rename = "paste:read")]
    PasteRead,
    #[serde(rename = "user")]
    User,
    #[serde(rename = "user:read")]
    UserRead,
    #[serde(rename = "user:access_tokens")]
    UserAccessTokens,
}

impl Scope {
    /// Scopes granted to the cookie issued by a browser login
    pub const LOGIN: [Scope; 3] = [Scope::Paste, Scope::User, Scope::UserAccessTokens];

    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Scope::Paste => "paste",
            Scope::PasteRead => "paste:read",
            Scope::User => "user",
            Scope::UserRead => "user:read",
            Scope::UserAccessTokens => "user:access_tokens",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "paste" => Ok(Scope::Paste),
            "paste:read" => Ok(Scope::PasteRead),
            "user" => Ok(Scope::User),
            "user:read" => Ok(Scope::UserRead),
            "user:access_tokens" => Ok(Scope::UserAccessTokens),
            other => Err(format!("Unknown scope: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_forms_agree() {
        for scope in [
            Scope::Paste,
            Scope::PasteRead,
            Scope::User,
            Scope::UserRead,
            Scope::UserAccessTokens,
        ] {
            assert_eq!(scope.as_str().parse::<Scope>().unwrap(), scope);
            assert_eq!(
                serde_json::to_string(&scope).unwrap(),
                format!("\"{}\"", scope.as_str())
            );
        }
        assert!("admin".parse::<Scope>().is_err());
    }
}
