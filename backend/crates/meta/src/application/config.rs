//! Application Configuration
//!
//! Configuration for the meta application layer.

/// GitHub repository whose releases make up the changelog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseRepo {
    pub owner: String,
    pub name: String,
}

impl ReleaseRepo {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

/// Meta application configuration
#[derive(Debug, Clone)]
pub struct MetaConfig {
    /// Reported by `/meta/version`
    pub version: String,
    /// Queried in order; later repositories hold older history
    pub release_repos: Vec<ReleaseRepo>,
}

impl Default for MetaConfig {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            release_repos: vec![
                ReleaseRepo::new("pastemyst", "pastemyst-v3"),
                ReleaseRepo::new("codemyst", "pastemyst"),
            ],
        }
    }
}
