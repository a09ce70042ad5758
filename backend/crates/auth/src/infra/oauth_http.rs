//! OAuth provider client over reqwest.

use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::Value;

use crate::application::config::{OAuthProviderConfig, TokenHeaderStyle};
use crate::domain::provider::{DownloadedImage, OAuthClient, ProviderUser};
use crate::error::{AuthError, AuthResult};

#[derive(Clone)]
pub struct ReqwestOAuthClient {
    http: reqwest::Client,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

impl ReqwestOAuthClient {
    pub fn new() -> AuthResult<Self> {
        let http = platform::http_client::build_client()
            .map_err(|e| AuthError::Internal(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { http })
    }

    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }
}

fn provider_err(e: reqwest::Error) -> AuthError {
    AuthError::Provider(e.to_string())
}

/// Provider IDs are numeric on GitHub and GitLab; keep them as strings
fn field_as_string(json: &Value, field: &str) -> Option<String> {
    match json.get(field)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

impl OAuthClient for ReqwestOAuthClient {
    async fn exchange_code(&self, provider: &OAuthProviderConfig, code: &str) -> AuthResult<String> {
        let response = self
            .http
            .post(&provider.token_url)
            .header(ACCEPT, "application/json")
            .form(&[
                ("client_id", provider.client_id.as_str()),
                ("client_secret", provider.client_secret.as_str()),
                ("code", code),
                ("redirect_uri", provider.redirect_url.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(provider_err)?;

        if !response.status().is_success() {
            return Err(AuthError::Provider(format!(
                "{} token endpoint returned {}",
                provider.name,
                response.status()
            )));
        }

        let body: TokenResponse = response.json().await.map_err(provider_err)?;
        match body.access_token {
            Some(token) => Ok(token),
            None => Err(AuthError::Provider(format!(
                "{} refused the code: {}",
                provider.name,
                body.error_description
                    .or(body.error)
                    .unwrap_or_else(|| "no access token".to_string())
            ))),
        }
    }

    async fn fetch_user(
        &self,
        provider: &OAuthProviderConfig,
        token: &str,
    ) -> AuthResult<ProviderUser> {
        let authorization = match provider.token_header {
            TokenHeaderStyle::Token => format!("token {token}"),
            TokenHeaderStyle::Bearer => format!("Bearer {token}"),
        };

        let json: Value = self
            .http
            .get(&provider.user_url)
            .header(AUTHORIZATION, authorization)
            .header(ACCEPT, &provider.user_accept)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(provider_err)?
            .json()
            .await
            .map_err(provider_err)?;

        let missing = |field: &str| {
            AuthError::Provider(format!("{} user response lacks `{field}`", provider.name))
        };

        Ok(ProviderUser {
            id: field_as_string(&json, &provider.id_field)
                .ok_or_else(|| missing(&provider.id_field))?,
            username: field_as_string(&json, &provider.username_field)
                .ok_or_else(|| missing(&provider.username_field))?,
            avatar_url: field_as_string(&json, &provider.avatar_url_field).unwrap_or_default(),
        })
    }

    async fn download_image(&self, url: &str) -> AuthResult<DownloadedImage> {
        if url.is_empty() {
            return Err(AuthError::Provider("No avatar URL".to_string()));
        }

        let response = self
            .http
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(provider_err)?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("image/png")
            .to_string();

        let bytes = response.bytes().await.map_err(provider_err)?;

        Ok(DownloadedImage {
            bytes: bytes.to_vec(),
            content_type,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_ids_are_stringified() {
        let json = serde_json::json!({"id": 1234, "login": "myst", "avatar_url": null});
        assert_eq!(field_as_string(&json, "id").as_deref(), Some("1234"));
        assert_eq!(field_as_string(&json, "login").as_deref(), Some("myst"));
        assert_eq!(field_as_string(&json, "avatar_url"), None);
        assert_eq!(field_as_string(&json, "missing"), None);
    }
}
