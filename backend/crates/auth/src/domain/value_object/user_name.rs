//! Usernames
//!
//! The public handle in `/users/{username}`. Input is NFKC-normalized and trimmed,
//! then checked: 1 to 20 characters, each a Unicode letter or digit, `_`, `.` or `-`.
//! Case is kept for display; lookups and uniqueness use the lowercase form.

use serde::{Deserialize, Serialize};
use std::fmt;
use unicode_normalization::UnicodeNormalization;

/// In characters, after normalization
pub const USER_NAME_MAX_LENGTH: usize = 20;

const ALLOWED_SPECIAL_CHARS: &[char] = &['_', '.', '-'];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserNameError {
    Empty,
    TooLong { length: usize, max: usize },

    /// `position` counts characters, not bytes
    InvalidCharacter { char: char, position: usize },
}

impl fmt::Display for UserNameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "Username cannot be empty."),
            Self::TooLong { length, max } => {
                write!(f, "Username is too long ({length} chars, maximum {max}).")
            }
            Self::InvalidCharacter { char, position } => {
                write!(
                    f,
                    "Invalid character '{char}' at position {position}. Only letters, digits, _, . and - are allowed."
                )
            }
        }
    }
}

impl std::error::Error for UserNameError {}

/// A validated username; deserializing validates too
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserName {
    original: String,
    canonical: String,
}

impl UserName {
    pub fn new(input: impl AsRef<str>) -> Result<Self, UserNameError> {
        let original = Self::normalize_original(input.as_ref());
        Self::validate(&original)?;
        let canonical = original.to_lowercase();
        Ok(Self {
            original,
            canonical,
        })
    }

    /// As entered, case preserved
    #[inline]
    pub fn original(&self) -> &str {
        &self.original
    }

    #[inline]
    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    /// Trusted value read back from storage
    pub fn from_db(original: &str) -> Self {
        Self {
            original: original.to_string(),
            canonical: original.to_lowercase(),
        }
    }

    /// Canonical form of arbitrary input, for lookups by path segment
    pub fn canonicalize(input: &str) -> String {
        Self::normalize_original(input).to_lowercase()
    }

    /// Same name ignoring case
    pub fn eq_ignore_case(&self, other: &str) -> bool {
        self.canonical == Self::canonicalize(other)
    }

    fn normalize_original(input: &str) -> String {
        input.nfkc().collect::<String>().trim().to_string()
    }

    fn validate(name: &str) -> Result<(), UserNameError> {
        match name.chars().count() {
            0 => return Err(UserNameError::Empty),
            length if length > USER_NAME_MAX_LENGTH => {
                return Err(UserNameError::TooLong {
                    length,
                    max: USER_NAME_MAX_LENGTH,
                });
            }
            _ => {}
        }

        let invalid = name
            .chars()
            .enumerate()
            .find(|(_, c)| !c.is_alphanumeric() && !ALLOWED_SPECIAL_CHARS.contains(c));

        match invalid {
            Some((position, char)) => Err(UserNameError::InvalidCharacter { char, position }),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UserName({})", self.original)
    }
}

impl fmt::Display for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

impl TryFrom<String> for UserName {
    type Error = UserNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserName> for String {
    fn from(value: UserName) -> Self {
        value.original
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names() {
        for name in ["a", "CodeMyst", "john.doe", "snake_case", "kebab-case", "ünïcödé", "x2"] {
            assert!(UserName::new(name).is_ok(), "{name} should be valid");
        }
    }

    #[test]
    fn test_canonical_is_lowercase() {
        let name = UserName::new("  CodeMyst ").unwrap();
        assert_eq!(name.original(), "CodeMyst");
        assert_eq!(name.canonical(), "codemyst");
        assert!(name.eq_ignore_case("CODEMYST"));
    }

    #[test]
    fn test_length_limits() {
        assert_eq!(UserName::new("   "), Err(UserNameError::Empty));
        assert!(UserName::new("a".repeat(20)).is_ok());
        assert_eq!(
            UserName::new("a".repeat(21)),
            Err(UserNameError::TooLong { length: 21, max: 20 })
        );
    }

    #[test]
    fn test_invalid_characters() {
        assert_eq!(
            UserName::new("bad name"),
            Err(UserNameError::InvalidCharacter {
                char: ' ',
                position: 3
            })
        );
        assert!(UserName::new("no/slash").is_err());
        assert!(UserName::new("plus+").is_err());
    }

    #[test]
    fn test_serde_validates() {
        let ok: Result<UserName, _> = serde_json::from_str("\"myst\"");
        assert!(ok.is_ok());
        let bad: Result<UserName, _> = serde_json::from_str("\"my st\"");
        assert!(bad.is_err());
    }
}
