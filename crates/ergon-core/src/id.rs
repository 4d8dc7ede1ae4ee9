//! # Opaque Record Identifiers
//!
//! Every foreign key crossing this contract surface is an [`ObjectId`]:
//! a fixed-length opaque string of exactly 24 characters. Equality is
//! exact string match. This layer validates shape only; it never checks
//! that a referenced record exists and deliberately does not constrain
//! the character set.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Required length of every record identifier, in characters.
pub const OBJECT_ID_LEN: usize = 24;

/// Error produced when strictly constructing an [`ObjectId`] from a
/// string of the wrong length.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("identifier must be exactly {OBJECT_ID_LEN} characters, got {actual}")]
pub struct InvalidId {
    /// Character count of the rejected input.
    pub actual: usize,
}

/// Fixed-length opaque record identifier.
///
/// Serde is deliberately lenient: any JSON string deserializes, so a
/// malformed identifier inside a larger payload surfaces as a collected
/// violation with a field path instead of a fail-fast shape error.
/// [`ObjectId::parse`] is the strict constructor for programmatic use.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(pub String);

impl ObjectId {
    /// Strictly construct an identifier, rejecting wrong lengths.
    pub fn parse(value: impl Into<String>) -> Result<Self, InvalidId> {
        let value = value.into();
        let actual = value.chars().count();
        if actual == OBJECT_ID_LEN {
            Ok(Self(value))
        } else {
            Err(InvalidId { actual })
        }
    }

    /// True when the identifier has the required length.
    ///
    /// Content is not inspected: 24 characters of anything are
    /// well-formed by contract.
    pub fn is_wellformed(&self) -> bool {
        self.0.chars().count() == OBJECT_ID_LEN
    }

    /// Length error for this identifier, if it is malformed.
    pub fn wellformed_error(&self) -> Option<InvalidId> {
        let actual = self.0.chars().count();
        if actual == OBJECT_ID_LEN {
            None
        } else {
            Some(InvalidId { actual })
        }
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ObjectId {
    type Err = InvalidId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<ObjectId> for String {
    fn from(id: ObjectId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample_id() -> &'static str {
        "507f1f77bcf86cd799439011"
    }

    #[test]
    fn test_parse_accepts_exact_length() {
        let id = ObjectId::parse(sample_id()).unwrap();
        assert_eq!(id.as_str(), sample_id());
        assert!(id.is_wellformed());
    }

    #[test]
    fn test_parse_rejects_short_and_long() {
        let err = ObjectId::parse("abc").unwrap_err();
        assert_eq!(err.actual, 3);

        let err = ObjectId::parse("a".repeat(25)).unwrap_err();
        assert_eq!(err.actual, 25);
    }

    #[test]
    fn test_content_is_not_inspected() {
        // 24 characters of anything are accepted.
        let id = ObjectId::parse("!!!! ???? #### $$$$ %%%%").unwrap();
        assert!(id.is_wellformed());
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        let id = ObjectId::parse("ñ".repeat(24)).unwrap();
        assert!(id.is_wellformed());
    }

    #[test]
    fn test_serde_is_transparent() {
        let id = ObjectId::parse(sample_id()).unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", sample_id()));

        let back: ObjectId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_serde_is_lenient_about_length() {
        // Deserialization never fails on length; well-formedness is a
        // collected violation downstream.
        let id: ObjectId = serde_json::from_str("\"short\"").unwrap();
        assert!(!id.is_wellformed());
        assert_eq!(id.wellformed_error().unwrap().actual, 5);
    }

    #[test]
    fn test_from_str_round_trip() {
        let id: ObjectId = sample_id().parse().unwrap();
        assert_eq!(id.to_string(), sample_id());
    }

    proptest! {
        #[test]
        fn prop_only_length_24_parses(s in "[ -~]{0,48}") {
            let expected = s.chars().count() == OBJECT_ID_LEN;
            prop_assert_eq!(ObjectId::parse(s).is_ok(), expected);
        }
    }
}
