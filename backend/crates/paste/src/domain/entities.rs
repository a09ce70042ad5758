//! Domain Entities

use chrono::{DateTime, Utc};
use kernel::expires_in::ExpiresIn;
use kernel::id::{PasteHistoryId, PasteId, PastyId, UserId};
use platform::crypto::EncryptedBlob;
use serde::{Deserialize, Serialize, Serializer};

/// Single file of a paste
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pasty {
    pub id: PastyId,
    pub title: String,
    pub content: String,
    /// Canonical language name
    pub language: String,
}

/// Snapshot of a paste taken right before an edit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasteHistory {
    pub id: PasteHistoryId,
    pub edited_at: DateTime<Utc>,
    pub title: String,
    pub pasties: Vec<Pasty>,
}

/// Everything that is encrypted as one blob for encrypted pastes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasteContent {
    pub pasties: Vec<Pasty>,
    #[serde(default)]
    pub history: Vec<PasteHistory>,
}

/// Stored ciphertext of an encrypted paste
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedContent {
    #[serde(flatten)]
    pub blob: EncryptedBlob,
    pub version: i16,
}

/// A paste.
///
/// Encrypted pastes come out of storage with empty `pasties` and `history`
/// and `encrypted` set; decrypting fills them in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paste {
    pub id: PasteId,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub expires_in: ExpiresIn,
    pub deletes_at: Option<DateTime<Utc>>,
    pub owner_id: Option<UserId>,
    pub private: bool,
    pub pinned: bool,
    pub tags: Vec<String>,
    pub stars: i64,
    pub pasties: Vec<Pasty>,
    pub history: Vec<PasteHistory>,
    pub encrypted: Option<EncryptedContent>,
}

impl Paste {
    pub fn is_encrypted(&self) -> bool {
        self.encrypted.is_some()
    }

    /// Expired pastes are treated as gone
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.deletes_at.is_some_and(|at| at <= now)
    }

    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        self.owner_id.as_ref() == Some(user_id)
    }

    /// Time of the last edit
    pub fn edited_at(&self) -> Option<DateTime<Utc>> {
        self.history.last().map(|h| h.edited_at)
    }

    pub fn content(&self) -> PasteContent {
        PasteContent {
            pasties: self.pasties.clone(),
            history: self.history.clone(),
        }
    }

    pub fn find_history(&self, history_id: &str) -> Option<&PasteHistory> {
        self.history.iter().find(|h| h.id.as_str() == history_id)
    }

    /// What storage keeps: encrypted pastes lose their plaintext
    pub fn stored_form(&self) -> Paste {
        let mut stored = self.clone();
        if stored.is_encrypted() {
            stored.pasties.clear();
            stored.history.clear();
        }
        stored
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasteJson<'a> {
    id: &'a PasteId,
    title: &'a str,
    created_at: DateTime<Utc>,
    expires_in: ExpiresIn,
    deletes_at: Option<DateTime<Utc>>,
    owner_id: Option<&'a UserId>,
    private: bool,
    pinned: bool,
    tags: &'a [String],
    stars: i64,
    pasties: &'a [Pasty],
    edited_at: Option<DateTime<Utc>>,
}

// History and ciphertext stay server-side
impl Serialize for Paste {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        PasteJson {
            id: &self.id,
            title: &self.title,
            created_at: self.created_at,
            expires_in: self.expires_in,
            deletes_at: self.deletes_at,
            owner_id: self.owner_id.as_ref(),
            private: self.private,
            pinned: self.pinned,
            tags: &self.tags,
            stars: self.stars,
            pasties: &self.pasties,
            edited_at: self.edited_at(),
        }
        .serialize(serializer)
    }
}
