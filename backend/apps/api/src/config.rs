//! Server Configuration
//!
//! Environment variables (optionally from `.env`) mapped onto the per-crate configs.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, bail};
use auth::config::{AuthConfig, OAuthProviderConfig};
use base64::Engine;
use base64::engine::general_purpose;
use meta::MetaConfig;
use paste::{LanguageSource, PasteConfig};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub db_max_connections: u32,
    pub host: String,
    pub port: u16,
    pub client_url: String,
    pub api_url: String,
    pub https: bool,
    /// `None` only in debug builds, where a random one is generated
    pub secret_key: Option<[u8; 32]>,
    pub github: Option<(String, String)>,
    pub gitlab: Option<(String, String)>,
    pub languages: Option<LanguageSource>,
    pub autodetect_command: Option<String>,
    pub max_body_bytes: usize,
    pub version: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok(), cfg!(debug_assertions))
    }

    /// Build from any key lookup; `debug` relaxes the secret requirement
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
        debug: bool,
    ) -> anyhow::Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_url = var("DATABASE_URL").context("DATABASE_URL must be set")?;

        let secret_key = match var("SECRET_KEY") {
            Some(b64) => Some(decode_secret(&b64)?),
            None if debug => None,
            None => bail!("SECRET_KEY must be set in production"),
        };

        let pair = |id: &str, secret: &str| Some((var(id)?, var(secret)?));

        Ok(Self {
            database_url,
            db_max_connections: parse_or(var("DB_MAX_CONNECTIONS"), 5, "DB_MAX_CONNECTIONS")?,
            host: var("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(var("API_PORT"), 5000, "API_PORT")?,
            client_url: var("CLIENT_URL").unwrap_or_else(|| "http://localhost:5173".to_string()),
            api_url: var("API_URL").unwrap_or_else(|| "http://localhost:5000".to_string()),
            https: parse_or(var("HTTPS"), false, "HTTPS")?,
            secret_key,
            github: pair("GITHUB_CLIENT_ID", "GITHUB_CLIENT_SECRET"),
            gitlab: pair("GITLAB_CLIENT_ID", "GITLAB_CLIENT_SECRET"),
            languages: var("LANGUAGES_SOURCE").map(|s| language_source(&s)),
            autodetect_command: var("AUTODETECT_COMMAND"),
            max_body_bytes: parse_or(var("MAX_BODY_BYTES"), 10 * 1024 * 1024, "MAX_BODY_BYTES")?,
            version: var("VERSION"),
        })
    }

    pub fn addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid listen address {}:{}", self.host, self.port))
    }

    pub fn auth_config(&self) -> AuthConfig {
        let base = match self.secret_key {
            Some(secret) => AuthConfig {
                secret,
                ..AuthConfig::default()
            },
            None => AuthConfig::with_random_secret(),
        };

        let mut providers = Vec::new();
        if let Some((id, secret)) = &self.github {
            providers.push(OAuthProviderConfig::github(id, secret, &self.api_url));
        }
        if let Some((id, secret)) = &self.gitlab {
            providers.push(OAuthProviderConfig::gitlab(id, secret, &self.api_url));
        }

        AuthConfig {
            client_url: self.client_url.clone(),
            cookie_secure: self.https,
            providers,
            ..base
        }
    }

    pub fn paste_config(&self) -> PasteConfig {
        let defaults = PasteConfig::default();
        PasteConfig {
            languages: self.languages.clone().unwrap_or(defaults.languages),
            autodetect_command: self
                .autodetect_command
                .clone()
                .unwrap_or(defaults.autodetect_command),
            ..defaults
        }
    }

    pub fn meta_config(&self) -> MetaConfig {
        let defaults = MetaConfig::default();
        MetaConfig {
            version: self.version.clone().unwrap_or(defaults.version),
            ..defaults
        }
    }
}

fn decode_secret(b64: &str) -> anyhow::Result<[u8; 32]> {
    let bytes = general_purpose::STANDARD
        .decode(b64.trim())
        .context("SECRET_KEY is not valid base64")?;
    <[u8; 32]>::try_from(bytes.as_slice())
        .map_err(|_| anyhow::anyhow!("SECRET_KEY must decode to 32 bytes, got {}", bytes.len()))
}

fn parse_or<T>(value: Option<String>, default: T, key: &str) -> anyhow::Result<T>
where
    T: std::str::FromStr,
{
    match value {
        Some(v) => v
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("{key} has an invalid value: {v}")),
        None => Ok(default),
    }
}

fn language_source(value: &str) -> LanguageSource {
    if value.starts_with("http://") || value.starts_with("https://") {
        LanguageSource::Url(value.to_string())
    } else {
        LanguageSource::Path(PathBuf::from(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)], debug: bool) -> anyhow::Result<AppConfig> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|k| map.get(k).cloned(), debug)
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("DATABASE_URL", "postgres://localhost/pastemyst")], true).unwrap();
        assert_eq!(config.port, 5000);
        assert_eq!(config.db_max_connections, 5);
        assert_eq!(config.max_body_bytes, 10_485_760);
        assert!(!config.https);
        assert!(config.secret_key.is_none());
        assert!(config.github.is_none());
        assert_eq!(config.addr().unwrap().to_string(), "0.0.0.0:5000");

        let auth = config.auth_config();
        assert!(!auth.cookie_secure);
        assert!(auth.providers.is_empty());
        assert_eq!(config.paste_config().autodetect_command, "guesslang-bun");
    }

    #[test]
    fn test_database_url_required() {
        assert!(load(&[], true).is_err());
    }

    #[test]
    fn test_secret_required_in_release() {
        let err = load(&[("DATABASE_URL", "postgres://x")], false).unwrap_err();
        assert!(err.to_string().contains("SECRET_KEY"));

        let key = general_purpose::STANDARD.encode([7u8; 32]);
        let config = load(&[("DATABASE_URL", "postgres://x"), ("SECRET_KEY", &key)], false).unwrap();
        assert_eq!(config.auth_config().secret, [7u8; 32]);

        let short = general_purpose::STANDARD.encode([7u8; 16]);
        assert!(load(&[("DATABASE_URL", "postgres://x"), ("SECRET_KEY", &short)], false).is_err());
    }

    #[test]
    fn test_overrides() {
        let config = load(
            &[
                ("DATABASE_URL", "postgres://x"),
                ("API_PORT", "8080"),
                ("HTTPS", "true"),
                ("API_URL", "https://paste.myst.rs"),
                ("GITHUB_CLIENT_ID", "id"),
                ("GITHUB_CLIENT_SECRET", "secret"),
                ("GITLAB_CLIENT_ID", "only-id"),
                ("LANGUAGES_SOURCE", "/srv/languages.yml"),
                ("VERSION", "3.1.0"),
            ],
            true,
        )
        .unwrap();

        assert_eq!(config.port, 8080);
        let auth = config.auth_config();
        assert!(auth.cookie_secure);
        assert_eq!(auth.providers.len(), 1);
        assert_eq!(
            auth.providers[0].redirect_url,
            "https://paste.myst.rs/api/v3/login/github/callback"
        );
        assert_eq!(
            config.paste_config().languages,
            LanguageSource::Path(PathBuf::from("/srv/languages.yml"))
        );
        assert_eq!(config.meta_config().version, "3.1.0");
    }

    #[test]
    fn test_invalid_number() {
        let err = load(&[("DATABASE_URL", "postgres://x"), ("API_PORT", "web")], true).unwrap_err();
        assert!(err.to_string().contains("API_PORT"));
    }

    #[test]
    fn test_language_source_kind() {
        assert_eq!(
            language_source("https://example.com/languages.yml"),
            LanguageSource::Url("https://example.com/languages.yml".into())
        );
    }
}
