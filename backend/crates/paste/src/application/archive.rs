//! Zip archives of pastes.

use std::collections::HashSet;
use std::io::{Cursor, Write};

use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::domain::entities::Pasty;
use crate::domain::languages::LanguageCatalogue;
use crate::error::PasteResult;

/// In-memory zip writer
pub struct ZipBuilder {
    writer: ZipWriter<Cursor<Vec<u8>>>,
}

fn file_options() -> SimpleFileOptions {
    SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated)
}

impl ZipBuilder {
    pub fn new() -> Self {
        Self {
            writer: ZipWriter::new(Cursor::new(Vec::new())),
        }
    }

    pub fn add(&mut self, name: &str, data: &[u8]) -> PasteResult<()> {
        self.writer.start_file(name, file_options())?;
        self.writer
            .write_all(data)
            .map_err(zip::result::ZipError::Io)?;
        Ok(())
    }

    pub fn finish(self) -> PasteResult<Vec<u8>> {
        Ok(self.writer.finish()?.into_inner())
    }
}

impl Default for ZipBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// File name per pasty: title (or id) plus the language's first extension.
/// Clashing names get the pasty id appended.
pub fn pasty_file_names(pasties: &[Pasty], catalogue: &LanguageCatalogue) -> Vec<String> {
    let mut taken = HashSet::new();
    pasties
        .iter()
        .map(|pasty| {
            let ext = catalogue
                .find_by_name(&pasty.language)
                .map(|l| l.first_extension().to_string())
                .unwrap_or_default();
            let stem = if pasty.title.trim().is_empty() {
                pasty.id.to_string()
            } else {
                pasty.title.clone()
            };

            let mut name = format!("{stem}{ext}");
            if !taken.insert(name.clone()) {
                name = format!("{stem}-{}{ext}", pasty.id);
                taken.insert(name.clone());
            }
            name
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::languages::Language;
    use kernel::id::PastyId;
    use std::io::Read;

    fn pasty(id: &str, title: &str, language: &str) -> Pasty {
        Pasty {
            id: PastyId::from_string(id),
            title: title.into(),
            content: format!("content of {id}"),
            language: language.into(),
        }
    }

    #[test]
    fn test_file_names() {
        let catalogue = LanguageCatalogue::new(vec![Language {
            extensions: vec![".rs".into()],
            ..Language::named("Rust")
        }]);
        let names = pasty_file_names(
            &[
                pasty("a1a1a1a1", "main", "Rust"),
                pasty("b2b2b2b2", "", "Text"),
                pasty("c3c3c3c3", "main", "Rust"),
                pasty("d4d4d4d4", "notes", "Gone"),
            ],
            &catalogue,
        );
        assert_eq!(
            names,
            vec!["main.rs", "b2b2b2b2.txt", "main-c3c3c3c3.rs", "notes"]
        );
    }

    #[test]
    fn test_zip_contents() {
        let mut zip = ZipBuilder::new();
        zip.add("a.txt", b"hello").unwrap();
        zip.add("dir/b.json", b"{}").unwrap();
        let bytes = zip.finish().unwrap();

        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 2);
        let mut s = String::new();
        archive.by_name("a.txt").unwrap().read_to_string(&mut s).unwrap();
        assert_eq!(s, "hello");
    }
}
