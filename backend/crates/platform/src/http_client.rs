//! Outbound HTTP client shared by OAuth, language catalogue and release lookups.

use std::time::Duration;

/// User-Agent sent on every outbound request (GitHub rejects requests without one)
pub const USER_AGENT: &str = concat!("pastemyst/", env!("CARGO_PKG_VERSION"));

/// Build a client with the default timeout and user agent
pub fn build_client() -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(15))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_builds() {
        assert!(build_client().is_ok());
        assert!(USER_AGENT.starts_with("pastemyst/"));
    }
}
