//! Common ID Types
//!
//! Type-safe ID wrappers for domain entities.
//!
//! Every entity is identified by a short random base36 string (`[a-z0-9]{8}`).
//! Uniqueness is not guaranteed by generation alone; callers that persist IDs
//! use [`generate_while`] / [`generate_while_async`] with an existence check.

use std::fmt;
use std::future::Future;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Length of every generated ID
pub const ID_LENGTH: usize = 8;

const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Generate a random untyped ID
pub fn random_id() -> String {
    let mut rng = rand::rng();
    (0..ID_LENGTH)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect()
}

/// Generic typed ID wrapper
///
/// Usage:
/// ```
/// use kernel::id::{Id, markers};
/// type UserId = Id<markers::User>;
/// let id = UserId::new();
/// assert_eq!(id.as_str().len(), 8);
/// ```
pub struct Id<T> {
    value: String,
    _marker: PhantomData<T>,
}

impl<T> Id<T> {
    /// Create a new random ID
    pub fn new() -> Self {
        Self::from_string(random_id())
    }

    /// Wrap an existing string (e.g. loaded from the database or a path)
    pub fn from_string(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            _marker: PhantomData,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn into_string(self) -> String {
        self.value
    }
}

/// Generate IDs until `taken` returns false
pub fn generate_while<T>(mut taken: impl FnMut(&Id<T>) -> bool) -> Id<T> {
    loop {
        let id = Id::new();
        if !taken(&id) {
            return id;
        }
    }
}

/// Async variant of [`generate_while`] for uniqueness checks against a store
pub async fn generate_while_async<T, E, F, Fut>(mut taken: F) -> Result<Id<T>, E>
where
    F: FnMut(Id<T>) -> Fut,
    Fut: Future<Output = Result<bool, E>>,
{
    loop {
        let id = Id::<T>::new();
        if !taken(id.clone()).await? {
            return Ok(id);
        }
    }
}

// Manual impls: derives would put bounds on the marker type.

impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        Self::from_string(self.value.clone())
    }
}

impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T> Eq for Id<T> {}

impl<T> Hash for Id<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<T> Default for Id<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", self.value)
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl<T> From<String> for Id<T> {
    fn from(value: String) -> Self {
        Self::from_string(value)
    }
}

impl<T> From<&str> for Id<T> {
    fn from(value: &str) -> Self {
        Self::from_string(value)
    }
}

impl<T> Serialize for Id<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.value)
    }
}

impl<'de, T> Deserialize<'de> for Id<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::from_string)
    }
}

/// Marker types for different entity IDs
pub mod markers {
    pub struct Paste;
    pub struct Pasty;
    pub struct PasteHistory;
    pub struct User;
    pub struct AccessToken;
    pub struct Image;
    pub struct SessionSettings;
    pub struct Announcement;
}

/// Type aliases for common IDs
pub type PasteId = Id<markers::Paste>;
pub type PastyId = Id<markers::Pasty>;
pub type PasteHistoryId = Id<markers::PasteHistory>;
pub type UserId = Id<markers::User>;
pub type AccessTokenId = Id<markers::AccessToken>;
pub type ImageId = Id<markers::Image>;
pub type SessionSettingsId = Id<markers::SessionSettings>;
pub type AnnouncementId = Id<markers::Announcement>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_random_id_shape() {
        for _ in 0..100 {
            let id = random_id();
            assert_eq!(id.len(), ID_LENGTH);
            assert!(id.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit()));
        }
    }

    #[test]
    fn test_generate_while_skips_taken() {
        let mut calls = 0;
        let id: PasteId = generate_while(|_| {
            calls += 1;
            calls < 3
        });
        assert_eq!(calls, 3);
        assert_eq!(id.as_str().len(), ID_LENGTH);
    }

    #[test]
    fn test_generate_while_avoids_existing() {
        let existing: HashSet<String> = (0..10).map(|_| random_id()).collect();
        let id: PastyId = generate_while(|id| existing.contains(id.as_str()));
        assert!(!existing.contains(id.as_str()));
    }

    #[tokio::test]
    async fn test_generate_while_async_propagates_error() {
        let result: Result<UserId, &str> = generate_while_async(|_| async { Err("db down") }).await;
        assert_eq!(result.unwrap_err(), "db down");
    }

    #[tokio::test]
    async fn test_generate_while_async_returns_free_id() {
        let result: Result<UserId, ()> = generate_while_async(|_| async { Ok(false) }).await;
        assert_eq!(result.unwrap().as_str().len(), ID_LENGTH);
    }

    #[test]
    fn test_id_serde_is_plain_string() {
        let id: PasteId = Id::from_string("abcd1234");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"abcd1234\"");
        let back: PasteId = serde_json::from_str("\"abcd1234\"").unwrap();
        assert_eq!(back, id);
    }
}
