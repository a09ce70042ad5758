//! User Entity

use chrono::{DateTime, Utc};
use kernel::id::{ImageId, UserId};
use serde::Serialize;

use crate::domain::entity::settings::{Settings, UserSettings};
use crate::domain::value_object::user_name::UserName;

/// Registered user.
///
/// Provider identity and preferences are never part of the public JSON.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub created_at: DateTime<Utc>,
    pub username: UserName,
    pub avatar_id: Option<ImageId>,
    pub is_contributor: bool,
    pub is_supporter: bool,
    pub is_admin: bool,
    #[serde(skip)]
    pub provider_name: String,
    #[serde(skip)]
    pub provider_id: String,
    #[serde(skip)]
    pub user_settings: UserSettings,
    #[serde(skip)]
    pub settings: Settings,
}

impl User {
    /// New account created from an OAuth identity
    pub fn new(
        id: UserId,
        username: UserName,
        avatar_id: Option<ImageId>,
        provider_name: impl Into<String>,
        provider_id: impl Into<String>,
    ) -> Self {
        Self {
            id,
            created_at: Utc::now(),
            username,
            avatar_id,
            is_contributor: false,
            is_supporter: false,
            is_admin: false,
            provider_name: provider_name.into(),
            provider_id: provider_id.into(),
            user_settings: UserSettings::default(),
            settings: Settings::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_json_hides_private_fields() {
        let user = User::new(
            UserId::from_string("u1u1u1u1"),
            UserName::new("myst").unwrap(),
            None,
            "GitHub",
            "42",
        );
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["username"], "myst");
        assert_eq!(json["isAdmin"], false);
        assert!(json.get("providerId").is_none());
        assert!(json.get("settings").is_none());
        assert!(json.get("userSettings").is_none());
    }
}
