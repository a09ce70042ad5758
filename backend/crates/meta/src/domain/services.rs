//! Domain Services
//!
//! Pure functions over releases and action logs.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use kernel::action_log::{ActionLog, ActionLogType};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::entities::{AppStats, GithubRelease, Release, WeeklyPasteStats};

/// `## changelog` headers left over in older release notes
static CHANGELOG_HEADER: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"(?i)## changelog:?\r?\n\r?\n").ok());

/// Drafts are dropped; the title falls back to the tag and always starts with `v`
pub fn to_release(release: GithubRelease) -> Option<Release> {
    if release.draft {
        return None;
    }

    let name = release.name.filter(|n| !n.is_empty());
    let mut title = name.unwrap_or(release.tag_name);
    if !title.starts_with('v') {
        title.insert(0, 'v');
    }

    let body = release.body.unwrap_or_default();
    let content = match CHANGELOG_HEADER.as_ref() {
        Some(re) => re.replace_all(&body, "").into_owned(),
        None => body,
    };

    Some(Release {
        url: release.html_url,
        title,
        content,
        is_prerelease: release.prerelease,
        released_at: release.published_at,
    })
}

/// Monday 00:00 UTC of the ISO week containing `at`
pub fn week_start(at: DateTime<Utc>) -> DateTime<Utc> {
    let day: NaiveDate = at.date_naive();
    let monday = day - Duration::days(i64::from(day.weekday().num_days_from_monday()));
    monday.and_time(chrono::NaiveTime::MIN).and_utc()
}

#[derive(Default)]
struct WeekCounts {
    created: i64,
    deleted: i64,
    expired: i64,
}

/// Totals and weekly paste activity from the action log
pub fn app_stats(logs: &[ActionLog]) -> AppStats {
    let count = |t: ActionLogType| logs.iter().filter(|l| l.action_type == t).count() as i64;

    let created = count(ActionLogType::PasteCreated);
    let total_users = count(ActionLogType::UserCreated);

    AppStats {
        active_pastes: created
            - count(ActionLogType::PasteDeleted)
            - count(ActionLogType::PasteExpired),
        total_pastes: created,
        active_users: total_users - count(ActionLogType::UserDeleted),
        total_users,
        weekly_paste_stats: weekly_paste_stats(logs),
    }
}

/// Per-week paste counts with running totals, oldest week first
pub fn weekly_paste_stats(logs: &[ActionLog]) -> Vec<WeeklyPasteStats> {
    let mut weeks: BTreeMap<DateTime<Utc>, WeekCounts> = BTreeMap::new();

    for log in logs {
        let slot = match log.action_type {
            ActionLogType::PasteCreated
            | ActionLogType::PasteDeleted
            | ActionLogType::PasteExpired => weeks.entry(week_start(log.created_at)).or_default(),
            _ => continue,
        };
        match log.action_type {
            ActionLogType::PasteCreated => slot.created += 1,
            ActionLogType::PasteDeleted => slot.deleted += 1,
            _ => slot.expired += 1,
        }
    }

    let mut total = 0;
    let mut active = 0;
    weeks
        .into_iter()
        .map(|(date, c)| {
            total += c.created;
            active += c.created - c.deleted - c.expired;
            WeeklyPasteStats {
                date,
                created: c.created,
                deleted: c.deleted,
                expired: c.expired,
                total,
                active,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 15, 30, 0).unwrap()
    }

    fn log(action_type: ActionLogType, created_at: DateTime<Utc>) -> ActionLog {
        ActionLog {
            created_at,
            action_type,
            object_id: "x".to_string(),
        }
    }

    fn github(name: Option<&str>, tag: &str, body: &str) -> GithubRelease {
        GithubRelease {
            name: name.map(str::to_string),
            tag_name: tag.to_string(),
            body: Some(body.to_string()),
            html_url: format!("https://github.com/pastemyst/pastemyst-v3/releases/{tag}"),
            ..Default::default()
        }
    }

    #[test]
    fn test_release_title() {
        let named = to_release(github(Some("v3.1.0"), "3.1.0", "")).unwrap();
        assert_eq!(named.title, "v3.1.0");

        let unnamed = to_release(github(Some(""), "3.0.0", "")).unwrap();
        assert_eq!(unnamed.title, "v3.0.0");

        let missing = to_release(github(None, "2.5", "")).unwrap();
        assert_eq!(missing.title, "v2.5");
    }

    #[test]
    fn test_release_changelog_header_removed() {
        let release = to_release(github(None, "v2", "## Changelog:\r\n\r\n- fixed things")).unwrap();
        assert_eq!(release.content, "- fixed things");

        let release = to_release(github(None, "v2", "## changelog\n\n- unix endings")).unwrap();
        assert_eq!(release.content, "- unix endings");

        // Only the header followed by a blank line goes
        let release = to_release(github(None, "v2", "## changelog\n- kept")).unwrap();
        assert_eq!(release.content, "## changelog\n- kept");
    }

    #[test]
    fn test_drafts_dropped() {
        let mut draft = github(None, "v9", "");
        draft.draft = true;
        assert!(to_release(draft).is_none());
    }

    #[test]
    fn test_week_start() {
        // 2024-01-04 is a Thursday
        assert_eq!(
            week_start(at(2024, 1, 4)),
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
        );
        // Sunday belongs to the week that started the Monday before
        assert_eq!(
            week_start(at(2024, 1, 7)),
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
        );
        // ISO weeks cross year boundaries
        assert_eq!(
            week_start(at(2021, 1, 2)),
            Utc.with_ymd_and_hms(2020, 12, 28, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_app_stats() {
        let logs = vec![
            log(ActionLogType::UserCreated, at(2024, 1, 1)),
            log(ActionLogType::PasteCreated, at(2024, 1, 2)),
            log(ActionLogType::PasteCreated, at(2024, 1, 3)),
            log(ActionLogType::PasteCreated, at(2024, 1, 10)),
            log(ActionLogType::PasteDeleted, at(2024, 1, 11)),
            log(ActionLogType::UserCreated, at(2024, 1, 12)),
            log(ActionLogType::UserDeleted, at(2024, 1, 13)),
            log(ActionLogType::PasteExpired, at(2024, 1, 24)),
            log(ActionLogType::AccessTokenCreated, at(2024, 1, 24)),
        ];

        let stats = app_stats(&logs);
        assert_eq!(stats.total_pastes, 3);
        assert_eq!(stats.active_pastes, 1);
        assert_eq!(stats.total_users, 2);
        assert_eq!(stats.active_users, 1);

        let weeks = &stats.weekly_paste_stats;
        assert_eq!(weeks.len(), 3);
        assert_eq!(weeks[0].date, week_start(at(2024, 1, 1)));
        assert_eq!((weeks[0].created, weeks[0].total, weeks[0].active), (2, 2, 2));
        assert_eq!((weeks[1].created, weeks[1].deleted), (1, 1));
        assert_eq!((weeks[1].total, weeks[1].active), (3, 2));
        assert_eq!((weeks[2].expired, weeks[2].total, weeks[2].active), (1, 3, 1));
    }

    #[test]
    fn test_empty_stats() {
        assert_eq!(app_stats(&[]), AppStats::default());
    }
}
