//! Application Configuration
//!
//! Configuration for the paste application layer.

use std::path::PathBuf;

/// Pinned linguist release the catalogue is fetched from by default
pub const LINGUIST_LANGUAGES_URL: &str =
    "https://raw.githubusercontent.com/github-linguist/linguist/v7.29.0/lib/linguist/languages.yml";

/// Where `languages.yml` comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LanguageSource {
    Path(PathBuf),
    Url(String),
}

impl Default for LanguageSource {
    fn default() -> Self {
        LanguageSource::Url(LINGUIST_LANGUAGES_URL.to_string())
    }
}

/// Paste application configuration
#[derive(Debug, Clone)]
pub struct PasteConfig {
    pub languages: LanguageSource,
    /// Program run with a file path argument; prints a language name
    pub autodetect_command: String,
    /// Header carrying the key for encrypted pastes
    pub encryption_header: String,
    /// Cookie name prefix; the paste id follows it
    pub encryption_cookie_prefix: String,
}

impl Default for PasteConfig {
    fn default() -> Self {
        Self {
            languages: LanguageSource::default(),
            autodetect_command: "guesslang-bun".to_string(),
            encryption_header: "Encryption-Key".to_string(),
            encryption_cookie_prefix: "pastemyst-encryption-key-".to_string(),
        }
    }
}
