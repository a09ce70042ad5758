//! Language Use Case
//!
//! Catalogue lookups and autodetection.

use std::sync::Arc;

use crate::domain::languages::{AUTODETECT, Language, LanguageCatalogue, TEXT};
use crate::domain::repository::LanguageDetector;
use crate::error::PasteResult;

pub struct LanguageUseCase<D>
where
    D: LanguageDetector + Send + Sync + 'static,
{
    catalogue: Arc<LanguageCatalogue>,
    detector: Arc<D>,
}

impl<D> LanguageUseCase<D>
where
    D: LanguageDetector + Send + Sync + 'static,
{
    pub fn new(catalogue: Arc<LanguageCatalogue>, detector: Arc<D>) -> Self {
        Self {
            catalogue,
            detector,
        }
    }

    pub fn all(&self) -> &[Language] {
        self.catalogue.all()
    }

    pub fn popular(&self) -> Vec<String> {
        self.catalogue.popular()
    }

    pub fn find(&self, name: &str) -> PasteResult<&Language> {
        self.catalogue.find_by_name(name)
    }

    /// Detector output resolved through the catalogue; anything unusable is Text
    pub async fn autodetect(&self, content: &str) -> &Language {
        let Some(name) = self.detector.detect(content).await else {
            return self.catalogue.text();
        };

        match self.catalogue.find_by_name(name.trim()) {
            Ok(lang) if lang.name != AUTODETECT => lang,
            _ => {
                tracing::debug!(detected = %name, "Autodetected language not in catalogue");
                self.catalogue.text()
            }
        }
    }

    /// Canonical name stored on a pasty
    pub async fn resolve(&self, requested: Option<&str>, content: &str) -> PasteResult<String> {
        let Some(requested) = requested else {
            return Ok(TEXT.to_string());
        };

        let lang = self.catalogue.find_by_name(requested)?;
        if lang.name == AUTODETECT {
            return Ok(self.autodetect(content).await.name.clone());
        }
        Ok(lang.name.clone())
    }
}
