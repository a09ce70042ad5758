//! Encrypted paste content
//!
//! Pasties and history of an encrypted paste are stored as one JSON document
//! encrypted with the client's passphrase.

use std::collections::HashMap;

use kernel::id::PasteId;
use platform::crypto::{self, ENCRYPTION_VERSION};

use crate::domain::entities::{EncryptedContent, PasteContent};
use crate::error::{PasteError, PasteResult};

/// Keys supplied with a request
#[derive(Debug, Clone, Default)]
pub struct EncryptionKeys {
    /// `Encryption-Key` header
    pub header: Option<String>,
    /// Per-paste cookies, keyed by paste id
    pub cookies: HashMap<String, String>,
}

impl EncryptionKeys {
    pub fn from_header(key: impl Into<String>) -> Self {
        Self {
            header: Some(key.into()),
            ..Default::default()
        }
    }

    /// Header first, then the paste's cookie
    pub fn key_for(&self, id: &PasteId) -> Option<&str> {
        self.header
            .as_deref()
            .or_else(|| self.cookies.get(id.as_str()).map(String::as_str))
    }
}

/// Encrypt with a fresh salt and IV.
///
/// Key derivation runs on the blocking pool.
pub async fn seal(content: &PasteContent, key: &str) -> PasteResult<EncryptedContent> {
    let json = serde_json::to_vec(content).map_err(|e| PasteError::Internal(e.to_string()))?;
    let key = key.to_string();
    let blob = tokio::task::spawn_blocking(move || crypto::encrypt(&key, &json))
        .await
        .map_err(|e| PasteError::Internal(e.to_string()))?;
    Ok(EncryptedContent {
        blob,
        version: ENCRYPTION_VERSION,
    })
}

/// A wrong key surfaces as either a padding failure or garbage JSON
pub async fn open(encrypted: &EncryptedContent, key: &str) -> PasteResult<PasteContent> {
    let blob = encrypted.blob.clone();
    let key = key.to_string();
    let json = tokio::task::spawn_blocking(move || crypto::decrypt(&key, &blob))
        .await
        .map_err(|e| PasteError::Internal(e.to_string()))?
        .map_err(|_| PasteError::InvalidEncryptionKey)?;
    serde_json::from_slice(&json).map_err(|_| PasteError::InvalidEncryptionKey)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Pasty;
    use kernel::id::PastyId;

    fn content() -> PasteContent {
        PasteContent {
            pasties: vec![Pasty {
                id: PastyId::from_string("a1a1a1a1"),
                title: "secret".into(),
                content: "hunter2".into(),
                language: "Text".into(),
            }],
            history: vec![],
        }
    }

    #[tokio::test]
    async fn test_seal_and_open() {
        let sealed = seal(&content(), "passphrase").await.unwrap();
        assert_eq!(sealed.version, ENCRYPTION_VERSION);
        assert!(!sealed.blob.data.contains("hunter2"));
        assert_eq!(open(&sealed, "passphrase").await.unwrap(), content());
    }

    #[tokio::test]
    async fn test_wrong_key() {
        let sealed = seal(&content(), "passphrase").await.unwrap();
        assert!(matches!(
            open(&sealed, "wrong").await,
            Err(PasteError::InvalidEncryptionKey)
        ));
    }

    #[tokio::test]
    async fn test_fresh_salt_per_seal() {
        let a = seal(&content(), "k").await.unwrap();
        let b = seal(&content(), "k").await.unwrap();
        assert_ne!(a.blob.salt, b.blob.salt);
        assert_ne!(a.blob.iv, b.blob.iv);
    }

    #[test]
    fn test_key_lookup_order() {
        let id = PasteId::from_string("p1p1p1p1");
        let mut keys = EncryptionKeys::default();
        assert_eq!(keys.key_for(&id), None);

        keys.cookies.insert("p1p1p1p1".into(), "from-cookie".into());
        assert_eq!(keys.key_for(&id), Some("from-cookie"));
        assert_eq!(keys.key_for(&PasteId::from_string("other123")), None);

        keys.header = Some("from-header".into());
        assert_eq!(keys.key_for(&id), Some("from-header"));
    }
}
