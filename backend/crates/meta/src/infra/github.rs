//! GitHub releases client over reqwest.

use reqwest::header::ACCEPT;

use crate::domain::entities::GithubRelease;
use crate::domain::repository::ReleaseSource;
use crate::error::{MetaError, MetaResult};

const GITHUB_API: &str = "https://api.github.com";

/// GitHub's maximum page size for the releases endpoint
const PER_PAGE: usize = 100;

#[derive(Clone)]
pub struct GithubReleaseClient {
    http: reqwest::Client,
    api_url: String,
}

impl GithubReleaseClient {
    pub fn new() -> MetaResult<Self> {
        let http = platform::http_client::build_client()
            .map_err(|e| MetaError::Releases(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self::with_client(http, GITHUB_API))
    }

    pub fn with_client(http: reqwest::Client, api_url: impl Into<String>) -> Self {
        Self {
            http,
            api_url: api_url.into(),
        }
    }

    fn page_url(&self, owner: &str, repo: &str, page: usize) -> String {
        format!(
            "{}/repos/{owner}/{repo}/releases?per_page={PER_PAGE}&page={page}",
            self.api_url
        )
    }
}

fn releases_err(e: reqwest::Error) -> MetaError {
    MetaError::Releases(e.to_string())
}

impl ReleaseSource for GithubReleaseClient {
    async fn releases(&self, owner: &str, repo: &str) -> MetaResult<Vec<GithubRelease>> {
        let mut releases = Vec::new();
        let mut page = 1;

        loop {
            let response = self
                .http
                .get(self.page_url(owner, repo, page))
                .header(ACCEPT, "application/vnd.github+json")
                .send()
                .await
                .map_err(releases_err)?;

            if !response.status().is_success() {
                return Err(MetaError::Releases(format!(
                    "{owner}/{repo} returned {}",
                    response.status()
                )));
            }

            let batch: Vec<GithubRelease> = response.json().await.map_err(releases_err)?;
            let last = batch.len() < PER_PAGE;
            releases.extend(batch);

            if last {
                break;
            }
            page += 1;
        }

        tracing::debug!(owner, repo, count = releases.len(), "Fetched releases");
        Ok(releases)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_url() {
        let client = GithubReleaseClient::with_client(reqwest::Client::new(), "http://gh.test");
        assert_eq!(
            client.page_url("pastemyst", "pastemyst-v3", 2),
            "http://gh.test/repos/pastemyst/pastemyst-v3/releases?per_page=100&page=2"
        );
    }

    #[test]
    fn test_release_payload() {
        let json = r#"[{
            "name": "",
            "tag_name": "3.0.0",
            "body": "notes",
            "html_url": "https://github.com/pastemyst/pastemyst-v3/releases/tag/3.0.0",
            "draft": false,
            "prerelease": true,
            "published_at": "2024-03-01T10:00:00Z",
            "assets": []
        }]"#;
        let parsed: Vec<GithubRelease> = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].tag_name, "3.0.0");
        assert!(parsed[0].prerelease);
        assert!(parsed[0].published_at.is_some());
    }
}
