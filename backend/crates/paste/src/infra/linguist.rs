//! Linguist language catalogue loader

use std::collections::BTreeMap;

use crate::application::config::LanguageSource;
use crate::domain::languages::{LanguageCatalogue, LinguistEntry};
use crate::error::{PasteError, PasteResult};

/// Load and parse `languages.yml` from a file or URL
pub async fn load_catalogue(source: &LanguageSource) -> PasteResult<LanguageCatalogue> {
    let yaml = match source {
        LanguageSource::Path(path) => tokio::fs::read_to_string(path)
            .await
            .map_err(|e| PasteError::Catalogue(format!("{}: {e}", path.display())))?,
        LanguageSource::Url(url) => fetch(url).await?,
    };

    parse_catalogue(&yaml)
}

/// Like [`load_catalogue`], but falls back to the minimal catalogue
pub async fn load_catalogue_or_minimal(source: &LanguageSource) -> LanguageCatalogue {
    match load_catalogue(source).await {
        Ok(catalogue) => {
            tracing::info!(
                languages = catalogue.all().len(),
                "Language catalogue loaded"
            );
            catalogue
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load languages, using minimal catalogue");
            LanguageCatalogue::minimal()
        }
    }
}

pub fn parse_catalogue(yaml: &str) -> PasteResult<LanguageCatalogue> {
    let entries: BTreeMap<String, LinguistEntry> =
        serde_yaml_ng::from_str(yaml).map_err(|e| PasteError::Catalogue(e.to_string()))?;

    Ok(LanguageCatalogue::new(
        entries
            .into_iter()
            .map(|(name, entry)| entry.into_language(name))
            .collect(),
    ))
}

async fn fetch(url: &str) -> PasteResult<String> {
    let to_err = |e: reqwest::Error| PasteError::Catalogue(format!("{url}: {e}"));

    platform::http_client::build_client()
        .map_err(to_err)?
        .get(url)
        .send()
        .await
        .and_then(reqwest::Response::error_for_status)
        .map_err(to_err)?
        .text()
        .await
        .map_err(to_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const YAML: &str = r##"
Rust:
  type: programming
  color: "#dea584"
  extensions:
  - ".rs"
  - ".rs.in"
  tm_scope: source.rust
  ace_mode: rust
  codemirror_mode: rust
  codemirror_mime_type: text/x-rustsrc
  language_id: 327
C:
  type: programming
  extensions:
  - ".c"
  - ".h"
  language_id: 41
"##;

    #[test]
    fn test_parse_catalogue() {
        let catalogue = parse_catalogue(YAML).unwrap();
        let names: Vec<&str> = catalogue.all().iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["Autodetect", "C", "Rust", "Text"]);

        let rust = catalogue.find_by_name("rs").unwrap();
        assert_eq!(rust.name, "Rust");
        assert_eq!(rust.color.as_deref(), Some("#dea584"));
        assert_eq!(rust.codemirror_mime_type.as_deref(), Some("text/x-rustsrc"));
    }

    #[test]
    fn test_parse_invalid_yaml() {
        let err = parse_catalogue("- just\n- a list").unwrap_err();
        assert!(matches!(err, PasteError::Catalogue(_)));
    }

    #[tokio::test]
    async fn test_load_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(YAML.as_bytes()).unwrap();

        let catalogue = load_catalogue(&LanguageSource::Path(file.path().to_path_buf()))
            .await
            .unwrap();
        assert!(catalogue.find_by_name("C").is_ok());
    }

    #[tokio::test]
    async fn test_missing_file_falls_back() {
        let source = LanguageSource::Path("/nonexistent/languages.yml".into());
        assert!(load_catalogue(&source).await.is_err());

        let catalogue = load_catalogue_or_minimal(&source).await;
        assert_eq!(catalogue.all().len(), 2);
    }
}
