//! Domain names.
//!
//! Names are kept in a canonical form: ASCII-lowercased, without the
//! trailing root dot. Comparison and hashing therefore behave
//! case-insensitively, matching DNS semantics (RFC 1035 §2.3.3).

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum length of a domain name in presentation format.
const MAX_NAME_LEN: usize = 253;

/// Maximum length of a single label.
const MAX_LABEL_LEN: usize = 63;

/// A canonicalized domain name.
///
/// Construction validates label and name lengths and normalizes to
/// lowercase without a trailing dot, so two `Name`s compare equal exactly
/// when they name the same node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Name(String);

impl Name {
    /// Returns the canonical string form (lowercase, no trailing dot).
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the number of labels.
    pub fn label_count(&self) -> usize {
        self.0.split('.').count()
    }

    /// Returns true if this name is a subdomain of `other` (or equal to it).
    pub fn is_within(&self, other: &Name) -> bool {
        self == other
            || self
                .0
                .strip_suffix(other.as_str())
                .is_some_and(|rest| rest.ends_with('.'))
    }
}

impl FromStr for Name {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.strip_suffix('.').unwrap_or(s);

        if s.is_empty() {
            return Err(Error::EmptyName);
        }
        if s.len() > MAX_NAME_LEN {
            return Err(Error::NameTooLong(s.len()));
        }

        for label in s.split('.') {
            if label.is_empty() {
                return Err(Error::EmptyLabel);
            }
            if label.len() > MAX_LABEL_LEN {
                return Err(Error::LabelTooLong(label.to_string()));
            }
        }

        if let Some(c) = s.chars().find(|c| !c.is_ascii_graphic()) {
            return Err(Error::InvalidCharacter(c));
        }

        Ok(Self(s.to_ascii_lowercase()))
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_normalization() {
        let a = Name::from_str("Example.COM").unwrap();
        let b = Name::from_str("example.com.").unwrap();

        assert_eq!(a, b);
        assert_eq!(a.as_str(), "example.com");
    }

    #[test]
    fn test_name_validation() {
        assert_eq!(Name::from_str(""), Err(Error::EmptyName));
        assert_eq!(Name::from_str("a..b"), Err(Error::EmptyLabel));

        let long_label = "x".repeat(64);
        assert!(matches!(
            Name::from_str(&long_label),
            Err(Error::LabelTooLong(_))
        ));

        let long_name = ["aaaa"; 64].join(".");
        assert!(matches!(
            Name::from_str(&long_name),
            Err(Error::NameTooLong(_))
        ));
    }

    #[test]
    fn test_label_count() {
        let name = Name::from_str("www.example.com").unwrap();
        assert_eq!(name.label_count(), 3);
    }

    #[test]
    fn test_is_within() {
        let apex = Name::from_str("example.com").unwrap();
        let sub = Name::from_str("www.example.com").unwrap();
        let other = Name::from_str("notexample.com").unwrap();

        assert!(sub.is_within(&apex));
        assert!(apex.is_within(&apex));
        assert!(!other.is_within(&apex));
        assert!(!apex.is_within(&sub));
    }
}
