//! Use case tests for the auth crate against in-memory repositories

#[cfg(test)]
mod fixtures {
    use std::sync::Arc;

    use kernel::id::UserId;

    use crate::application::config::{AuthConfig, OAuthProviderConfig};
    use crate::domain::entity::user::User;
    use crate::domain::provider::{DownloadedImage, OAuthClient, ProviderUser};
    use crate::domain::repository::UserRepository;
    use crate::domain::value_object::user_name::UserName;
    use crate::error::{AuthError, AuthResult};
    use crate::infra::memory::MemoryAuthRepository;

    #[derive(Clone)]
    pub struct FakeOAuth {
        pub user: ProviderUser,
        pub avatar_ok: bool,
    }

    impl FakeOAuth {
        pub fn new(id: &str, username: &str) -> Self {
            Self {
                user: ProviderUser {
                    id: id.to_string(),
                    username: username.to_string(),
                    avatar_url: "https://avatars.example/1.png".to_string(),
                },
                avatar_ok: true,
            }
        }
    }

    impl OAuthClient for FakeOAuth {
        async fn exchange_code(
            &self,
            _provider: &OAuthProviderConfig,
            code: &str,
        ) -> AuthResult<String> {
            if code == "bad" {
                return Err(AuthError::Provider("bad code".to_string()));
            }
            Ok(format!("provider-token-{code}"))
        }

        async fn fetch_user(
            &self,
            _provider: &OAuthProviderConfig,
            _token: &str,
        ) -> AuthResult<ProviderUser> {
            Ok(self.user.clone())
        }

        async fn download_image(&self, _url: &str) -> AuthResult<DownloadedImage> {
            if !self.avatar_ok {
                return Err(AuthError::Provider("404".to_string()));
            }
            Ok(DownloadedImage {
                bytes: vec![0x89, 0x50, 0x4e, 0x47],
                content_type: "image/png".to_string(),
            })
        }
    }

    pub fn config() -> Arc<AuthConfig> {
        Arc::new(AuthConfig {
            providers: vec![OAuthProviderConfig::github(
                "cid",
                "csecret",
                "http://localhost:5000",
            )],
            ..AuthConfig::development()
        })
    }

    pub async fn seed_user(repo: &MemoryAuthRepository, name: &str) -> User {
        let user = User::new(
            UserId::new(),
            UserName::new(name).unwrap(),
            None,
            "GitHub",
            format!("gh-{name}"),
        );
        UserRepository::create(repo, &user).await.unwrap();
        user
    }
}

#[cfg(test)]
mod oauth_tests {
    use std::sync::Arc;

    use kernel::action_log::ActionLogType;

    use super::fixtures::*;
    use axum::extract::{Path, Query, State};
    use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
    use axum::response::Response;

    use crate::application::{AccessTokenUseCase, CallbackOutcome, OAuthUseCase};
    use crate::error::AuthError;
    use crate::infra::memory::MemoryAuthRepository;
    use crate::presentation::dto::CallbackQuery;
    use crate::presentation::handlers::{AuthAppState, login_callback};

    fn callback_state(
        repo: &Arc<MemoryAuthRepository>,
    ) -> State<AuthAppState<MemoryAuthRepository, FakeOAuth>> {
        State(AuthAppState {
            repo: repo.clone(),
            client: Arc::new(FakeOAuth::new("42", "Myst")),
            config: config(),
        })
    }

    fn cleared_state_cookie(response: &Response) -> bool {
        response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .any(|v| v.starts_with("pastemyst-oauth-state=;") && v.contains("Max-Age=0"))
    }

    fn state_of(url: &str) -> String {
        url.rsplit("state=").next().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_full_registration_flow() {
        let repo = Arc::new(MemoryAuthRepository::new());
        let oauth = OAuthUseCase::new(
            repo.clone(),
            Arc::new(FakeOAuth::new("42", "Myst")),
            config(),
        );

        let redirect = oauth.begin_login("github").unwrap();
        let state = state_of(&redirect.url);
        assert_eq!(state.len(), 32);

        let outcome = oauth
            .callback("github", &state, "code", Some(&redirect.state_cookie))
            .await
            .unwrap();
        let CallbackOutcome::NeedsRegistration {
            registration_cookie,
            suggested_username,
        } = outcome
        else {
            panic!("new identity must register first");
        };
        assert_eq!(suggested_username, "Myst");

        let (user, token) = oauth
            .register("myst", Some(&registration_cookie))
            .await
            .unwrap();
        assert_eq!(user.username.original(), "myst");
        assert_eq!(user.provider_id, "42");
        assert!(user.avatar_id.is_some());
        assert_eq!(repo.state().images.len(), 1);

        let tokens = AccessTokenUseCase::new(repo.clone(), repo.clone(), repo.clone());
        let ctx = tokens
            .resolve(Some(&token.value.to_string()))
            .await
            .unwrap();
        assert!(ctx.user_is_self(&user));

        assert_eq!(
            repo.logged(),
            vec![ActionLogType::AccessTokenCreated, ActionLogType::UserCreated]
        );

        // Second login with the same identity goes straight in
        let redirect = oauth.begin_login("github").unwrap();
        let outcome = oauth
            .callback(
                "github",
                &state_of(&redirect.url),
                "code",
                Some(&redirect.state_cookie),
            )
            .await
            .unwrap();
        assert!(matches!(outcome, CallbackOutcome::LoggedIn(_)));
    }

    #[tokio::test]
    async fn test_callback_clears_state_cookie_on_failure() {
        let repo = Arc::new(MemoryAuthRepository::new());
        let oauth = OAuthUseCase::new(
            repo.clone(),
            Arc::new(FakeOAuth::new("42", "Myst")),
            config(),
        );
        let redirect = oauth.begin_login("github").unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("pastemyst-oauth-state={}", redirect.state_cookie))
                .unwrap(),
        );

        let mismatch = login_callback(
            callback_state(&repo),
            Path("github".to_string()),
            Query(CallbackQuery {
                state: "not-the-state".to_string(),
                code: "code".to_string(),
            }),
            headers.clone(),
        )
        .await
        .unwrap();
        assert_eq!(mismatch.status(), StatusCode::BAD_REQUEST);
        assert!(cleared_state_cookie(&mismatch));

        let failed_exchange = login_callback(
            callback_state(&repo),
            Path("github".to_string()),
            Query(CallbackQuery {
                state: state_of(&redirect.url),
                code: "bad".to_string(),
            }),
            headers,
        )
        .await
        .unwrap();
        assert_eq!(failed_exchange.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(cleared_state_cookie(&failed_exchange));
    }

    #[tokio::test]
    async fn test_callback_state_checks() {
        let repo = Arc::new(MemoryAuthRepository::new());
        let oauth = OAuthUseCase::new(repo, Arc::new(FakeOAuth::new("1", "a")), config());

        assert!(matches!(
            oauth.callback("github", "s", "code", None).await,
            Err(AuthError::MissingOAuthState)
        ));

        let redirect = oauth.begin_login("github").unwrap();
        assert!(matches!(
            oauth
                .callback("github", "other", "code", Some(&redirect.state_cookie))
                .await,
            Err(AuthError::OAuthStateMismatch)
        ));

        assert!(matches!(
            oauth.begin_login("google"),
            Err(AuthError::UnknownProvider(p)) if p == "google"
        ));
    }

    #[tokio::test]
    async fn test_register_rejections() {
        let repo = Arc::new(MemoryAuthRepository::new());
        seed_user(&repo, "Taken").await;
        let oauth = OAuthUseCase::new(
            repo.clone(),
            Arc::new(FakeOAuth::new("7", "x")),
            config(),
        );

        match oauth.register("fresh", None).await {
            Err(AuthError::BadRequest(m)) => assert_eq!(m, "Missing the registration cookie."),
            other => panic!("unexpected: {:?}", other.map(|_| ())),
        }

        assert!(matches!(
            oauth.register("fresh", Some("garbage.cookie")).await,
            Err(AuthError::BadRequest(_))
        ));

        let redirect = oauth.begin_login("github").unwrap();
        let CallbackOutcome::NeedsRegistration {
            registration_cookie,
            ..
        } = oauth
            .callback(
                "github",
                &state_of(&redirect.url),
                "code",
                Some(&redirect.state_cookie),
            )
            .await
            .unwrap()
        else {
            panic!("expected registration");
        };

        match oauth.register("TAKEN", Some(&registration_cookie)).await {
            Err(AuthError::BadRequest(m)) => assert_eq!(m, "Username is already taken."),
            other => panic!("unexpected: {:?}", other.map(|_| ())),
        }

        assert!(matches!(
            oauth.register("bad name!", Some(&registration_cookie)).await,
            Err(AuthError::InvalidUserName(_))
        ));
    }

    #[tokio::test]
    async fn test_avatar_failure_is_not_fatal() {
        let repo = Arc::new(MemoryAuthRepository::new());
        let mut client = FakeOAuth::new("9", "noavatar");
        client.avatar_ok = false;
        let oauth = OAuthUseCase::new(repo.clone(), Arc::new(client), config());

        let redirect = oauth.begin_login("github").unwrap();
        let CallbackOutcome::NeedsRegistration {
            registration_cookie,
            ..
        } = oauth
            .callback(
                "github",
                &state_of(&redirect.url),
                "code",
                Some(&redirect.state_cookie),
            )
            .await
            .unwrap()
        else {
            panic!("expected registration");
        };

        let (user, _) = oauth
            .register("noavatar", Some(&registration_cookie))
            .await
            .unwrap();
        assert!(user.avatar_id.is_none());
        assert!(repo.state().images.is_empty());
    }
}

#[cfg(test)]
mod access_token_tests {
    use std::sync::Arc;

    use chrono::{Duration, Utc};
    use kernel::action_log::ActionLogType;
    use kernel::expires_in::ExpiresIn;

    use super::fixtures::*;
    use crate::application::{AccessTokenUseCase, GenerateTokenInput, UserContext};
    use crate::domain::value_object::scope::Scope;
    use crate::error::AuthError;
    use crate::infra::memory::MemoryAuthRepository;

    type Tokens = AccessTokenUseCase<MemoryAuthRepository, MemoryAuthRepository, MemoryAuthRepository>;

    fn tokens(repo: &Arc<MemoryAuthRepository>) -> Tokens {
        AccessTokenUseCase::new(repo.clone(), repo.clone(), repo.clone())
    }

    #[tokio::test]
    async fn test_generate_list_delete() {
        let repo = Arc::new(MemoryAuthRepository::new());
        let user = seed_user(&repo, "owner").await;
        let uc = tokens(&repo);

        let login = uc.issue_login(&user.id).await.unwrap();
        let ctx = uc.resolve(Some(&login.value.to_string())).await.unwrap();
        assert_eq!(ctx.scopes(), &Scope::LOGIN);

        let issued = uc
            .generate_for_self(
                &ctx,
                GenerateTokenInput {
                    scopes: vec![Scope::PasteRead],
                    expires_in: ExpiresIn::OneWeek,
                    description: "ci".to_string(),
                },
            )
            .await
            .unwrap();
        assert!(issued.expires_at.is_some());

        // The hidden login token is not listed
        let listed = uc.list_for_self(&ctx).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].description, "ci");

        uc.delete_for_self(&ctx, issued.value.id()).await.unwrap();
        assert!(uc.list_for_self(&ctx).await.unwrap().is_empty());
        assert!(repo.logged().contains(&ActionLogType::AccessTokenDeleted));
    }

    #[tokio::test]
    async fn test_cannot_delete_foreign_token() {
        let repo = Arc::new(MemoryAuthRepository::new());
        let alice = seed_user(&repo, "alice").await;
        let bob = seed_user(&repo, "bob").await;
        let uc = tokens(&repo);

        let bobs = uc
            .issue(&bob.id, vec![Scope::Paste], ExpiresIn::Never, false, String::new())
            .await
            .unwrap();

        let ctx = UserContext::logged_in(alice, Scope::LOGIN.to_vec());
        assert!(matches!(
            uc.delete_for_self(&ctx, bobs.value.id()).await,
            Err(AuthError::NotFound(_))
        ));
        assert!(uc.validate(&bobs.value.to_string()).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_scope_required_for_management() {
        let repo = Arc::new(MemoryAuthRepository::new());
        let user = seed_user(&repo, "limited").await;
        let uc = tokens(&repo);

        let ctx = UserContext::logged_in(user, vec![Scope::Paste]);
        assert!(matches!(
            uc.list_for_self(&ctx).await,
            Err(AuthError::MissingScope(Scope::UserAccessTokens))
        ));
        assert!(matches!(
            uc.list_for_self(&UserContext::anonymous()).await,
            Err(AuthError::Forbidden(_))
        ));
        let anon = UserContext::anonymous();
        let Err(err) = uc.generate_for_self(&anon, GenerateTokenInput::default()).await else {
            panic!("anonymous caller generated a token");
        };
        assert_eq!(err.status_code(), axum::http::StatusCode::FORBIDDEN);
        assert_eq!(
            err.to_string(),
            "You must be authorized to generate new access tokens."
        );
        let err = uc
            .delete_for_self(&anon, &kernel::id::AccessTokenId::from_string("gone1234"))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_invalid_tokens_are_anonymous() {
        let repo = Arc::new(MemoryAuthRepository::new());
        let user = seed_user(&repo, "someone").await;
        let uc = tokens(&repo);
        let issued = uc.issue_login(&user.id).await.unwrap();

        for raw in [
            "nodash",
            "unknown1-abc",
            &format!("{}-wrongsecret", issued.value.id()),
        ] {
            assert!(!uc.resolve(Some(raw)).await.unwrap().is_logged_in());
        }
        assert!(!uc.resolve(None).await.unwrap().is_logged_in());
    }

    #[tokio::test]
    async fn test_expired_token_is_deleted_on_use() {
        let repo = Arc::new(MemoryAuthRepository::new());
        let user = seed_user(&repo, "expiring").await;
        let uc = tokens(&repo);
        let issued = uc.issue_login(&user.id).await.unwrap();

        repo.state()
            .tokens
            .values_mut()
            .for_each(|t| t.expires_at = Some(Utc::now() - Duration::seconds(1)));

        assert!(uc.validate(&issued.value.to_string()).await.unwrap().is_none());
        assert!(repo.state().tokens.is_empty());
    }

    #[tokio::test]
    async fn test_expire_job_logs_each_owner() {
        let repo = Arc::new(MemoryAuthRepository::new());
        let user = seed_user(&repo, "batch").await;
        let uc = tokens(&repo);
        uc.issue_login(&user.id).await.unwrap();
        uc.issue(&user.id, vec![], ExpiresIn::Never, false, String::new())
            .await
            .unwrap();

        let expired = uc.expire(Utc::now() + Duration::days(40)).await.unwrap();
        assert_eq!(expired, 1);
        assert_eq!(repo.state().tokens.len(), 1);
        assert!(repo.logged().contains(&ActionLogType::AccessTokenExpired));
    }

    #[tokio::test]
    async fn test_logout() {
        let repo = Arc::new(MemoryAuthRepository::new());
        let user = seed_user(&repo, "leaving").await;
        let uc = tokens(&repo);
        let issued = uc.issue_login(&user.id).await.unwrap();

        match uc.logout(Some("nope-nope")).await {
            Err(AuthError::Unauthorized(m)) => assert_eq!(m, "Access token is not valid."),
            other => panic!("unexpected: {other:?}"),
        }
        uc.logout(Some(&issued.value.to_string())).await.unwrap();
        assert!(repo.state().tokens.is_empty());
    }
}

#[cfg(test)]
mod user_tests {
    use std::sync::Arc;

    use kernel::action_log::ActionLogType;

    use super::fixtures::*;
    use crate::application::{UserContext, UserUseCase};
    use crate::domain::value_object::scope::Scope;
    use crate::error::AuthError;
    use crate::infra::memory::MemoryAuthRepository;

    #[tokio::test]
    async fn test_lookup_is_case_insensitive() {
        let repo = Arc::new(MemoryAuthRepository::new());
        let user = seed_user(&repo, "CodeMyst").await;
        let uc = UserUseCase::new(repo);

        assert_eq!(uc.get_by_username("codemyst").await.unwrap().id, user.id);
        assert_eq!(uc.get_by_id(&user.id).await.unwrap().id, user.id);
        match uc.get_by_username("ghost").await {
            Err(AuthError::NotFound(m)) => assert_eq!(m, "User not found."),
            other => panic!("unexpected: {:?}", other.map(|u| u.id)),
        }
    }

    #[tokio::test]
    async fn test_delete_only_self() {
        let repo = Arc::new(MemoryAuthRepository::new());
        let alice = seed_user(&repo, "alice").await;
        let bob = seed_user(&repo, "bob").await;
        let uc = UserUseCase::new(repo.clone());

        let ctx = UserContext::logged_in(alice.clone(), Scope::LOGIN.to_vec());
        match uc.delete(&ctx, "bob").await {
            Err(AuthError::Unauthorized(m)) => assert_eq!(m, "You can delete only your account."),
            other => panic!("unexpected: {other:?}"),
        }

        let read_only = UserContext::logged_in(alice.clone(), vec![Scope::UserRead]);
        assert!(matches!(
            uc.delete(&read_only, "alice").await,
            Err(AuthError::MissingScope(Scope::User))
        ));

        uc.delete(&ctx, "alice").await.unwrap();
        assert!(!repo.state().users.contains_key(alice.id.as_str()));
        assert!(repo.state().users.contains_key(bob.id.as_str()));
        assert_eq!(repo.logged(), vec![ActionLogType::UserDeleted]);
    }
}

#[cfg(test)]
mod settings_tests {
    use std::sync::Arc;

    use chrono::{Duration, Utc};

    use super::fixtures::*;
    use crate::application::{ImageUseCase, SettingsUseCase, UserContext};
    use crate::domain::entity::settings::{Settings, UserSettings};
    use crate::domain::repository::UserRepository;
    use crate::domain::value_object::scope::Scope;
    use crate::error::AuthError;
    use crate::infra::memory::MemoryAuthRepository;

    #[tokio::test]
    async fn test_anonymous_session_lifecycle() {
        let repo = Arc::new(MemoryAuthRepository::new());
        let uc = SettingsUseCase::new(repo.clone());
        let anon = UserContext::anonymous();

        let first = uc.get_settings(&anon, None).await.unwrap();
        assert_eq!(first.settings, Settings::default());
        let session = first.new_session.expect("session created");

        let updated = Settings {
            theme: "dark".to_string(),
            ..Settings::default()
        };
        uc.update_settings(&anon, Some(session.as_str()), updated.clone())
            .await
            .unwrap();

        let again = uc.get_settings(&anon, Some(session.as_str())).await.unwrap();
        assert!(again.new_session.is_none());
        assert_eq!(again.settings, updated);

        // An unknown cookie starts over
        let stale = uc.get_settings(&anon, Some("missing1")).await.unwrap();
        assert!(stale.new_session.is_some());

        let removed = uc
            .expire_sessions(Utc::now() + Duration::days(31))
            .await
            .unwrap();
        assert_eq!(removed, 2);
    }

    #[tokio::test]
    async fn test_anonymous_update_errors() {
        let repo = Arc::new(MemoryAuthRepository::new());
        let uc = SettingsUseCase::new(repo);
        let anon = UserContext::anonymous();

        match uc.update_settings(&anon, None, Settings::default()).await {
            Err(AuthError::BadRequest(m)) => assert!(m.contains("session settings cookie is missing")),
            other => panic!("unexpected: {other:?}"),
        }
        match uc
            .update_settings(&anon, Some("gone1234"), Settings::default())
            .await
        {
            Err(AuthError::BadRequest(m)) => {
                assert_eq!(m, "The session settings cookie has probably expired.")
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_user_settings_and_username() {
        let repo = Arc::new(MemoryAuthRepository::new());
        let user = seed_user(&repo, "Writer").await;
        seed_user(&repo, "other").await;
        let uc = SettingsUseCase::new(repo.clone());
        let ctx = UserContext::logged_in(user.clone(), Scope::LOGIN.to_vec());

        assert!(uc.get_user_settings(&ctx).unwrap().show_all_pastes_on_profile);
        uc.update_user_settings(
            &ctx,
            UserSettings {
                show_all_pastes_on_profile: false,
            },
        )
        .await
        .unwrap();
        let stored = UserRepository::find_by_id(repo.as_ref(), &user.id)
            .await
            .unwrap()
            .unwrap();
        assert!(!stored.user_settings.show_all_pastes_on_profile);

        match uc.set_username(&ctx, "WRITER").await {
            Err(AuthError::BadRequest(m)) => assert_eq!(m, "Same username."),
            other => panic!("unexpected: {other:?}"),
        }
        match uc.set_username(&ctx, "Other").await {
            Err(AuthError::BadRequest(m)) => assert_eq!(m, "Username already taken."),
            other => panic!("unexpected: {other:?}"),
        }
        uc.set_username(&ctx, "author").await.unwrap();
        assert!(repo.find_by_username("AUTHOR").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_avatar_replacement() {
        let repo = Arc::new(MemoryAuthRepository::new());
        let user = seed_user(&repo, "pic").await;
        let uc = SettingsUseCase::new(repo.clone());
        let ctx = UserContext::logged_in(user.clone(), Scope::LOGIN.to_vec());

        assert!(matches!(
            uc.set_avatar(&ctx, "text/plain", vec![1]).await,
            Err(AuthError::BadRequest(_))
        ));

        let first = uc.set_avatar(&ctx, "image/png", vec![1]).await.unwrap();

        // The context carries the user as of the request, so refresh it
        let refreshed = UserRepository::find_by_id(repo.as_ref(), &user.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(refreshed.avatar_id.as_ref(), Some(&first));
        let ctx = UserContext::logged_in(refreshed, Scope::LOGIN.to_vec());

        let second = uc.set_avatar(&ctx, "image/webp", vec![2]).await.unwrap();
        {
            let state = repo.state();
            assert_eq!(state.images.len(), 1);
            assert!(state.images.contains_key(second.as_str()));
        }

        let images = ImageUseCase::new(repo.clone());
        let image = images.get(&second).await.unwrap();
        assert_eq!(image.content_type, "image/webp");
        assert_eq!(image.data, vec![2]);
        assert!(matches!(
            images.get(&first).await,
            Err(AuthError::NotFound(_))
        ));
    }
}
