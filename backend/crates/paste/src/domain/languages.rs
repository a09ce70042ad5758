//! Language catalogue
//!
//! Languages follow GitHub linguist's `languages.yml`. Pasties store the
//! canonical name; lookups also accept aliases and file extensions.

use serde::{Deserialize, Serialize};

use crate::error::{PasteError, PasteResult};

pub const AUTODETECT: &str = "Autodetect";
pub const TEXT: &str = "Text";

const POPULAR: [&str; 28] = [
    "Autodetect",
    "Text",
    "C",
    "C#",
    "C++",
    "CSS",
    "D",
    "Dart",
    "Go",
    "Haskell",
    "HTML",
    "Java",
    "JavaScript",
    "JSON",
    "Kotlin",
    "Markdown",
    "Objective-C",
    "Perl",
    "PHP",
    "PowerShell",
    "Python",
    "Ruby",
    "Rust",
    "Scala",
    "Shell",
    "Swift",
    "TypeScript",
    "Yaml",
];

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Language {
    pub name: String,
    #[serde(rename = "type")]
    pub language_type: Option<String>,
    pub aliases: Vec<String>,
    pub codemirror_mode: Option<String>,
    pub codemirror_mime_type: Option<String>,
    pub wrap: bool,
    pub extensions: Vec<String>,
    pub color: Option<String>,
    pub tm_scope: Option<String>,
}

impl Language {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// First extension including the dot, or empty
    pub fn first_extension(&self) -> &str {
        self.extensions.first().map(String::as_str).unwrap_or("")
    }

    fn matches_extension_or_alias(&self, name: &str) -> bool {
        self.extensions
            .iter()
            .any(|e| e.strip_prefix('.').unwrap_or(e).eq_ignore_ascii_case(name))
            || self.aliases.iter().any(|a| a.eq_ignore_ascii_case(name))
    }
}

/// One entry of linguist's `languages.yml`; the map key is the name
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LinguistEntry {
    #[serde(rename = "type")]
    pub language_type: Option<String>,
    #[serde(default)]
    pub aliases: Vec<String>,
    pub codemirror_mode: Option<String>,
    pub codemirror_mime_type: Option<String>,
    #[serde(default)]
    pub wrap: bool,
    #[serde(default)]
    pub extensions: Vec<String>,
    pub color: Option<String>,
    pub tm_scope: Option<String>,
}

impl LinguistEntry {
    pub fn into_language(self, name: String) -> Language {
        Language {
            name,
            language_type: self.language_type,
            aliases: self.aliases,
            codemirror_mode: self.codemirror_mode,
            codemirror_mime_type: self.codemirror_mime_type,
            wrap: self.wrap,
            extensions: self.extensions,
            color: self.color,
            tm_scope: self.tm_scope,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LanguageCatalogue {
    languages: Vec<Language>,
}

impl LanguageCatalogue {
    /// Sort by name, put `Autodetect` first and make sure `Text` exists
    pub fn new(mut languages: Vec<Language>) -> Self {
        languages.retain(|l| l.name != AUTODETECT);
        if !languages.iter().any(|l| l.name == TEXT) {
            languages.push(Language {
                language_type: Some("prose".to_string()),
                extensions: vec![".txt".to_string()],
                ..Language::named(TEXT)
            });
        }
        languages.sort_by(|a, b| a.name.cmp(&b.name));
        languages.insert(
            0,
            Language {
                aliases: vec!["autodetect".to_string()],
                ..Language::named(AUTODETECT)
            },
        );
        Self { languages }
    }

    /// Catalogue used when `languages.yml` can't be loaded
    pub fn minimal() -> Self {
        Self::new(Vec::new())
    }

    pub fn all(&self) -> &[Language] {
        &self.languages
    }

    pub fn popular(&self) -> Vec<String> {
        POPULAR.iter().map(|s| s.to_string()).collect()
    }

    pub fn text(&self) -> &Language {
        // `new` guarantees the entry
        self.languages
            .iter()
            .find(|l| l.name == TEXT)
            .unwrap_or(&self.languages[0])
    }

    /// Exact name match wins; otherwise the first extension or alias match
    pub fn find_by_name(&self, name: &str) -> PasteResult<&Language> {
        if let Some(lang) = self
            .languages
            .iter()
            .find(|l| l.name.eq_ignore_ascii_case(name))
        {
            return Ok(lang);
        }

        self.languages
            .iter()
            .find(|l| l.matches_extension_or_alias(name))
            .ok_or(PasteError::LanguageNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lang(name: &str, aliases: &[&str], extensions: &[&str]) -> Language {
        Language {
            aliases: aliases.iter().map(|s| s.to_string()).collect(),
            extensions: extensions.iter().map(|s| s.to_string()).collect(),
            ..Language::named(name)
        }
    }

    fn catalogue() -> LanguageCatalogue {
        LanguageCatalogue::new(vec![
            lang("Rust", &["rs"], &[".rs", ".rs.in"]),
            lang("C", &[], &[".c", ".h"]),
            lang("C++", &["cpp"], &[".cpp", ".h"]),
            lang("Roff", &[], &[".d"]),
            lang("D", &[], &[".d", ".di"]),
        ])
    }

    #[test]
    fn test_ordering_and_synthetic_entries() {
        let c = catalogue();
        let names: Vec<&str> = c.all().iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["Autodetect", "C", "C++", "D", "Roff", "Rust", "Text"]);
        assert_eq!(c.text().name, "Text");
    }

    #[test]
    fn test_name_match_wins_over_extension() {
        let c = catalogue();
        // Roff also claims .d
        assert_eq!(c.find_by_name("d").unwrap().name, "D");
        assert_eq!(c.find_by_name("RUST").unwrap().name, "Rust");
    }

    #[test]
    fn test_first_extension_or_alias_match() {
        let c = catalogue();
        assert_eq!(c.find_by_name("h").unwrap().name, "C");
        assert_eq!(c.find_by_name("cpp").unwrap().name, "C++");
        assert_eq!(c.find_by_name("di").unwrap().name, "D");
        assert_eq!(c.find_by_name("autodetect").unwrap().name, "Autodetect");
    }

    #[test]
    fn test_unknown_language() {
        assert!(matches!(
            catalogue().find_by_name("brainfuck"),
            Err(PasteError::LanguageNotFound)
        ));
    }

    #[test]
    fn test_minimal_catalogue() {
        let c = LanguageCatalogue::minimal();
        assert_eq!(c.all().len(), 2);
        assert_eq!(c.text().first_extension(), ".txt");
        assert_eq!(c.popular().len(), 28);
        assert_eq!(c.popular()[0], "Autodetect");
    }

    #[test]
    fn test_json_uses_camel_case() {
        let json = serde_json::to_value(lang("Rust", &["rs"], &[".rs"])).unwrap();
        assert_eq!(json["name"], "Rust");
        assert!(json.get("codemirrorMimeType").is_some());
        assert!(json.get("tmScope").is_some());
        assert!(json.get("type").is_some());
    }
}
