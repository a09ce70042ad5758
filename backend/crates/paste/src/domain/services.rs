//! Domain Services
//!
//! Pure paste logic: tag cleanup, text and language statistics.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::domain::entities::{Paste, Pasty};
use crate::domain::languages::{Language, LanguageCatalogue};

pub const MAX_TITLE_LEN: usize = 128;
pub const MAX_PASTY_TITLE_LEN: usize = 50;

/// Trim tags and drop the empty ones
pub fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    tags.into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TextStats {
    pub lines: usize,
    pub words: usize,
    pub bytes: usize,
}

impl TextStats {
    pub fn of(content: &str) -> Self {
        Self {
            lines: platform::text::count_lines(content),
            words: platform::text::count_words(content),
            bytes: platform::text::byte_len(content),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PasteStats {
    pub lines: usize,
    pub words: usize,
    pub bytes: usize,
    pub pasties: BTreeMap<String, TextStats>,
}

/// Totals over all pasties plus a breakdown per pasty id
pub fn paste_stats(pasties: &[Pasty]) -> PasteStats {
    let mut stats = PasteStats::default();
    for pasty in pasties {
        let s = TextStats::of(&pasty.content);
        stats.lines += s.lines;
        stats.words += s.words;
        stats.bytes += s.bytes;
        stats.pasties.insert(pasty.id.to_string(), s);
    }
    stats
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LanguageStat {
    pub language: Language,
    pub percentage: f64,
}

/// Share of characters per language, largest first
pub fn language_stats(paste: &Paste, catalogue: &LanguageCatalogue) -> Vec<LanguageStat> {
    let mut chars_per_language: HashMap<&str, usize> = HashMap::new();
    let mut total = 0usize;

    for pasty in &paste.pasties {
        let chars = pasty.content.chars().count();
        *chars_per_language.entry(pasty.language.as_str()).or_default() += chars;
        total += chars;
    }

    if total == 0 {
        return Vec::new();
    }

    let mut stats: Vec<LanguageStat> = chars_per_language
        .into_iter()
        .filter(|(_, chars)| *chars > 0)
        .map(|(name, chars)| LanguageStat {
            language: catalogue
                .find_by_name(name)
                .cloned()
                .unwrap_or_else(|_| Language::named(name)),
            percentage: chars as f64 / total as f64 * 100.0,
        })
        .collect();

    stats.sort_by(|a, b| b.percentage.total_cmp(&a.percentage));
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use kernel::expires_in::ExpiresIn;
    use kernel::id::{PasteId, PastyId};

    fn pasty(id: &str, content: &str, language: &str) -> Pasty {
        Pasty {
            id: PastyId::from_string(id),
            title: String::new(),
            content: content.to_string(),
            language: language.to_string(),
        }
    }

    fn paste(pasties: Vec<Pasty>) -> Paste {
        Paste {
            id: PasteId::new(),
            title: String::new(),
            created_at: Utc::now(),
            expires_in: ExpiresIn::Never,
            deletes_at: None,
            owner_id: None,
            private: false,
            pinned: false,
            tags: vec![],
            stars: 0,
            pasties,
            history: vec![],
            encrypted: None,
        }
    }

    #[test]
    fn test_normalize_tags() {
        let tags = vec![" rust ".into(), "".into(), "   ".into(), "web".into()];
        assert_eq!(normalize_tags(tags), vec!["rust", "web"]);
    }

    #[test]
    fn test_paste_stats_totals() {
        let stats = paste_stats(&[pasty("a", "one two\nthree", "Text"), pasty("b", "é", "Text")]);
        assert_eq!(stats.lines, 3);
        assert_eq!(stats.words, 4);
        assert_eq!(stats.bytes, 15);
        assert_eq!(stats.pasties["b"], TextStats { lines: 1, words: 1, bytes: 2 });
    }

    #[test]
    fn test_language_stats_sorted_descending() {
        let catalogue = LanguageCatalogue::minimal();
        let p = paste(vec![
            pasty("a", "x", "Text"),
            pasty("b", "yyy", "Rust"),
            pasty("c", "", "Go"),
        ]);
        let stats = language_stats(&p, &catalogue);
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].language.name, "Rust");
        assert_eq!(stats[0].percentage, 75.0);
        assert_eq!(stats[1].language.name, "Text");
        assert_eq!(stats[1].percentage, 25.0);
    }

    #[test]
    fn test_language_stats_empty_content() {
        let catalogue = LanguageCatalogue::minimal();
        assert!(language_stats(&paste(vec![pasty("a", "", "Text")]), &catalogue).is_empty());
    }
}
