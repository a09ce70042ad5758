//! Use case tests for the meta crate against in-memory repositories

#[cfg(test)]
mod fixtures {
    use std::sync::Arc;

    use auth::UserContext;
    use auth::domain::{Scope, User, UserName};
    use kernel::id::UserId;

    use crate::application::{AnnouncementInput, AnnouncementUseCase, StatsUseCase};
    use crate::domain::entities::GithubRelease;
    use crate::infra::memory::MemoryMetaRepository;

    pub struct World {
        pub repo: Arc<MemoryMetaRepository>,
    }

    impl World {
        pub fn new() -> Self {
            Self {
                repo: Arc::new(MemoryMetaRepository::new()),
            }
        }

        pub fn announcements(&self) -> AnnouncementUseCase<MemoryMetaRepository> {
            AnnouncementUseCase::new(self.repo.clone())
        }

        pub fn stats(&self) -> StatsUseCase<MemoryMetaRepository> {
            StatsUseCase::new(self.repo.clone())
        }
    }

    fn user(name: &str, is_admin: bool) -> User {
        let mut user = User::new(
            UserId::new(),
            UserName::new(name).unwrap(),
            None,
            "GitHub",
            format!("gh-{name}"),
        );
        user.is_admin = is_admin;
        user
    }

    pub fn admin() -> UserContext {
        UserContext::logged_in(user("admin", true), vec![Scope::User])
    }

    pub fn member() -> UserContext {
        UserContext::logged_in(user("myst", false), vec![Scope::User])
    }

    pub fn input(title: &str, content: &str) -> AnnouncementInput {
        AnnouncementInput {
            title: title.to_string(),
            content: content.to_string(),
        }
    }

    pub fn release(name: &str, tag: &str) -> GithubRelease {
        GithubRelease {
            name: Some(name.to_string()),
            tag_name: tag.to_string(),
            body: Some(String::new()),
            html_url: format!("https://github.com/releases/{tag}"),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod announcement_tests {
    use auth::UserContext;
    use axum::http::StatusCode;
    use chrono::Duration;
    use kernel::id::AnnouncementId;

    use super::fixtures::*;
    use crate::domain::entities::Announcement;
    use crate::domain::repository::MetaRepository;

    #[tokio::test]
    async fn test_admin_creates_and_lists() {
        let world = World::new();
        let uc = world.announcements();

        assert!(uc.latest().await.unwrap().is_none());

        let first = uc.create(&admin(), input("hello", "first")).await.unwrap();
        // Force a strictly later timestamp than the first
        let later = Announcement {
            id: AnnouncementId::new(),
            created_at: first.created_at + Duration::seconds(5),
            title: "update".into(),
            content: "second".into(),
        };
        world.repo.create_announcement(&later).await.unwrap();

        let all = uc.list().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, later.id);
        assert_eq!(all[1].id, first.id);
        assert_eq!(uc.latest().await.unwrap().unwrap().id, later.id);
    }

    #[tokio::test]
    async fn test_non_admins_rejected() {
        let world = World::new();
        let uc = world.announcements();

        for ctx in [UserContext::anonymous(), member()] {
            let err = uc.create(&ctx, input("t", "c")).await.unwrap_err();
            assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
            assert_eq!(err.to_string(), "Only admins can create new announcements.");
        }

        let existing = uc.create(&admin(), input("t", "c")).await.unwrap();

        let err = uc
            .update(&member(), &existing.id, input("x", "y"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Only admins can edit announcements.");

        let err = uc.delete(&member(), &existing.id).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.to_string(), "Only admins can delete announcements.");

        assert_eq!(uc.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_title_and_content_required() {
        let world = World::new();
        let uc = world.announcements();

        let err = uc.create(&admin(), input("  ", "c")).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let err = uc.create(&admin(), input("t", "")).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        assert!(world.repo.state().announcements.is_empty());
    }

    #[tokio::test]
    async fn test_edit_keeps_id_and_date() {
        let world = World::new();
        let uc = world.announcements();
        let created = uc.create(&admin(), input("old", "old body")).await.unwrap();

        let edited = uc
            .update(&admin(), &created.id, input("new", "new body"))
            .await
            .unwrap();
        assert_eq!(edited.id, created.id);
        assert_eq!(edited.created_at, created.created_at);
        assert_eq!(edited.title, "new");

        let stored = world.repo.find_announcement(&created.id).await.unwrap().unwrap();
        assert_eq!(stored.content, "new body");
    }

    #[tokio::test]
    async fn test_missing_announcement() {
        let world = World::new();
        let uc = world.announcements();
        let missing = AnnouncementId::from_string("nope1234");

        let err = uc
            .update(&admin(), &missing, input("t", "c"))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);

        let err = uc.delete(&admin(), &missing).await.unwrap_err();
        assert_eq!(err.to_string(), "Announcement not found.");
    }

    #[tokio::test]
    async fn test_delete() {
        let world = World::new();
        let uc = world.announcements();
        let created = uc.create(&admin(), input("t", "c")).await.unwrap();

        uc.delete(&admin(), &created.id).await.unwrap();
        assert!(uc.list().await.unwrap().is_empty());
    }
}

#[cfg(test)]
mod release_tests {
    use std::sync::Arc;

    use axum::http::StatusCode;

    use super::fixtures::*;
    use crate::application::{MetaConfig, ReleasesUseCase};
    use crate::infra::memory::MemoryReleaseSource;

    fn use_case(source: &MemoryReleaseSource) -> ReleasesUseCase<MemoryReleaseSource> {
        ReleasesUseCase::new(
            Arc::new(source.clone()),
            MetaConfig::default().release_repos,
        )
    }

    #[tokio::test]
    async fn test_repos_in_order_without_drafts() {
        let source = MemoryReleaseSource::new();
        let mut draft = release("v3.2", "v3.2");
        draft.draft = true;
        source.insert(
            "pastemyst",
            "pastemyst-v3",
            vec![draft, release("v3.1", "v3.1"), release("", "3.0")],
        );
        source.insert("codemyst", "pastemyst", vec![release("2.0", "v2.0")]);

        let uc = use_case(&source);
        let titles: Vec<String> = uc
            .releases()
            .await
            .unwrap()
            .iter()
            .map(|r| r.title.clone())
            .collect();
        assert_eq!(titles, vec!["v3.1", "v3.0", "v2.0"]);
    }

    #[tokio::test]
    async fn test_cached_after_success() {
        let source = MemoryReleaseSource::new();
        source.insert("codemyst", "pastemyst", vec![release("v1", "v1")]);
        let uc = use_case(&source);

        assert_eq!(uc.releases().await.unwrap().len(), 1);
        let calls = source.calls();
        assert_eq!(calls, 2);

        source.insert("codemyst", "pastemyst", vec![]);
        assert_eq!(uc.releases().await.unwrap().len(), 1);
        assert_eq!(source.calls(), calls);
    }

    #[tokio::test]
    async fn test_failure_not_cached() {
        let source = MemoryReleaseSource::new();
        source.set_failing(true);
        let uc = use_case(&source);

        let err = uc.releases().await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);

        source.set_failing(false);
        source.insert("pastemyst", "pastemyst-v3", vec![release("v3", "v3")]);
        assert_eq!(uc.releases().await.unwrap().len(), 1);
    }
}

#[cfg(test)]
mod stats_tests {
    use chrono::{Duration, Utc};
    use kernel::action_log::{ActionLog, ActionLogRepository, ActionLogType};

    use super::fixtures::*;

    #[tokio::test]
    async fn test_active_pastes_counts_storage() {
        let world = World::new();
        world.repo.state().paste_count = 42;
        assert_eq!(world.stats().active_pastes().await.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_stats_from_logs() {
        let world = World::new();
        let week_ago = Utc::now() - Duration::weeks(1);
        let entries = [
            (ActionLogType::PasteCreated, week_ago),
            (ActionLogType::PasteCreated, week_ago),
            (ActionLogType::PasteCreated, Utc::now()),
            (ActionLogType::PasteExpired, Utc::now()),
            (ActionLogType::UserCreated, week_ago),
            (ActionLogType::AccessTokenCreated, Utc::now()),
        ];
        for (action_type, created_at) in entries {
            let log = ActionLog {
                created_at,
                action_type,
                object_id: "x".into(),
            };
            world.repo.append(&log).await.unwrap();
        }

        let stats = world.stats().stats().await.unwrap();
        assert_eq!(stats.total_pastes, 3);
        assert_eq!(stats.active_pastes, 2);
        assert_eq!(stats.total_users, 1);
        assert_eq!(stats.active_users, 1);

        let weeks = stats.weekly_paste_stats;
        assert_eq!(weeks.len(), 2);
        assert!(weeks[0].date < weeks[1].date);
        assert_eq!((weeks[1].total, weeks[1].active), (3, 2));
    }
}
