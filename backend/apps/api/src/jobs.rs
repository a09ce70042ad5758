//! Background Jobs
//!
//! Minute-by-minute cleanup of expired pastes, access tokens and idle sessions.

use std::sync::Arc;
use std::time::Duration;

use auth::PgAuthRepository;
use auth::application::{AccessTokenUseCase, SettingsUseCase};
use chrono::Utc;
use paste::PgPasteRepository;
use paste::application::ExpirePastesUseCase;

const INTERVAL: Duration = Duration::from_secs(60);

/// Spawn the cleanup loop; runs for the process lifetime
pub fn spawn_cleanup(
    pastes: PgPasteRepository,
    auth: PgAuthRepository,
    session_idle_ttl: Duration,
) -> tokio::task::JoinHandle<()> {
    let pastes = Arc::new(pastes);
    let auth = Arc::new(auth);

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(INTERVAL);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            run_once(&pastes, &auth, session_idle_ttl).await;
        }
    })
}

/// Errors are logged and the next tick tries again
async fn run_once(
    pastes: &Arc<PgPasteRepository>,
    auth: &Arc<PgAuthRepository>,
    session_idle_ttl: Duration,
) {
    let now = Utc::now();

    if let Err(e) = ExpirePastesUseCase::new(pastes.clone()).execute(now).await {
        tracing::warn!(error = %e, "Paste expiry failed");
    }

    let tokens = AccessTokenUseCase::new(auth.clone(), auth.clone(), auth.clone());
    match tokens.expire(now).await {
        Ok(0) => {}
        Ok(count) => tracing::info!(count, "Expired access tokens deleted"),
        Err(e) => tracing::warn!(error = %e, "Access token expiry failed"),
    }

    let idle = chrono::Duration::from_std(session_idle_ttl).unwrap_or(chrono::Duration::days(30));
    match SettingsUseCase::new(auth.clone())
        .expire_sessions(now - idle)
        .await
    {
        Ok(0) => {}
        Ok(count) => tracing::info!(count, "Idle session settings deleted"),
        Err(e) => tracing::warn!(error = %e, "Session settings cleanup failed"),
    }
}
