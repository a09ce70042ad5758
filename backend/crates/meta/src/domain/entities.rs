//! Domain Entities

use chrono::{DateTime, Utc};
use kernel::id::AnnouncementId;
use serde::{Deserialize, Serialize};

/// Site-wide notice shown by the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    pub id: AnnouncementId,
    pub created_at: DateTime<Utc>,
    pub title: String,
    pub content: String,
}

/// Release as returned by the GitHub REST API
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GithubRelease {
    #[serde(default)]
    pub name: Option<String>,
    pub tag_name: String,
    #[serde(default)]
    pub body: Option<String>,
    pub html_url: String,
    #[serde(default)]
    pub draft: bool,
    #[serde(default)]
    pub prerelease: bool,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
}

/// Changelog entry served to the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Release {
    pub url: String,
    pub title: String,
    pub content: String,
    pub is_prerelease: bool,
    pub released_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyPasteStats {
    /// Monday of the ISO week
    pub date: DateTime<Utc>,
    pub created: i64,
    pub deleted: i64,
    pub expired: i64,
    /// Pastes created up to and including this week
    pub total: i64,
    /// Pastes alive at the end of this week
    pub active: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppStats {
    pub active_pastes: i64,
    pub total_pastes: i64,
    pub active_users: i64,
    pub total_users: i64,
    pub weekly_paste_stats: Vec<WeeklyPasteStats>,
}
