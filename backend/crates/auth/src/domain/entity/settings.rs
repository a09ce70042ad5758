//! Display/editor preferences.

use chrono::{DateTime, Utc};
use kernel::id::SessionSettingsId;
use serde::{Deserialize, Serialize};

/// Editor and display preferences, stored per user or per anonymous session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub default_language: String,
    pub default_indentation_unit: String,
    pub default_indentation_width: u32,
    pub text_wrap: bool,
    pub copy_link_on_create: bool,
    pub paste_view: String,
    pub theme: String,
    pub dark_theme: String,
    pub follow_system_theme: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_language: "Autodetect".to_string(),
            default_indentation_unit: "spaces".to_string(),
            default_indentation_width: 4,
            text_wrap: true,
            copy_link_on_create: false,
            paste_view: "tabbed".to_string(),
            theme: "myst".to_string(),
            dark_theme: "myst".to_string(),
            follow_system_theme: false,
        }
    }
}

/// Account-level preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserSettings {
    pub show_all_pastes_on_profile: bool,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            show_all_pastes_on_profile: true,
        }
    }
}

/// Settings for a visitor without an account, keyed by a cookie
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub id: SessionSettingsId,
    pub last_accessed: DateTime<Utc>,
    pub settings: Settings,
}

impl SessionSettings {
    pub fn new(id: SessionSettingsId) -> Self {
        Self {
            id,
            last_accessed: Utc::now(),
            settings: Settings::default(),
        }
    }
}
