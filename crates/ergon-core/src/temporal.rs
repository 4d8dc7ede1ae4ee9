//! # Temporal Primitives
//!
//! Two temporal shapes cross the contract surface:
//!
//! - Strict instants (`chrono::DateTime<Utc>`) for fields the backend
//!   stamps itself: authoring metadata, invitation lifecycle,
//!   registration timestamps.
//! - [`DateString`], a tolerant human-entered date: either a full
//!   RFC 3339 date-time or a bare `YYYY-MM-DD`.
//!
//! Scheduled-exam dates accept either form on the wire and normalize to
//! a UTC instant via [`deserialize_flexible`]; a bare date lands at
//! midnight UTC.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Error produced when a date string matches neither accepted form.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid date '{value}': expected an RFC 3339 date-time or YYYY-MM-DD")]
pub struct InvalidDateString {
    /// The rejected input.
    pub value: String,
}

/// A date entered by a human: full date-time or bare calendar date.
///
/// The bare form is checked for shape only (`dddd-dd-dd`), matching the
/// wire contract; calendar validity is resolved by [`DateString::to_utc`]
/// when a consumer needs an instant. Serde is lenient like [`ObjectId`]:
/// any string deserializes and well-formedness is collected downstream.
///
/// [`ObjectId`]: crate::id::ObjectId
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DateString(pub String);

impl DateString {
    /// Strictly construct a date string, rejecting unrecognized forms.
    pub fn parse(value: impl Into<String>) -> Result<Self, InvalidDateString> {
        let value = value.into();
        if is_wellformed_date(&value) {
            Ok(Self(value))
        } else {
            Err(InvalidDateString { value })
        }
    }

    /// True when the value matches one of the two accepted forms.
    pub fn is_wellformed(&self) -> bool {
        is_wellformed_date(&self.0)
    }

    /// Normalize to a UTC instant: date-times as-is, bare dates at
    /// midnight UTC. `None` when the value does not denote a real
    /// calendar point.
    pub fn to_utc(&self) -> Option<DateTime<Utc>> {
        parse_flexible(&self.0).ok()
    }

    /// The raw value as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DateString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DateString {
    type Err = InvalidDateString;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn is_wellformed_date(value: &str) -> bool {
    DateTime::parse_from_rfc3339(value).is_ok() || is_bare_date_shape(value)
}

/// Shape check for `YYYY-MM-DD`: four digits, dash, two digits, dash,
/// two digits. Calendar validity is deliberately not checked here.
fn is_bare_date_shape(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && [0, 1, 2, 3, 5, 6, 8, 9]
            .iter()
            .all(|&i| bytes[i].is_ascii_digit())
}

/// Parse a date-time or bare date into a UTC instant.
pub fn parse_flexible(value: &str) -> Result<DateTime<Utc>, InvalidDateString> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        if is_bare_date_shape(value) {
            if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
                return Ok(DateTime::from_naive_utc_and_offset(midnight, Utc));
            }
        }
    }
    Err(InvalidDateString {
        value: value.to_string(),
    })
}

/// Deserializer for instant fields that accept either wire form.
pub fn deserialize_flexible<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_flexible(&raw).map_err(serde::de::Error::custom)
}

/// Optional-field counterpart of [`deserialize_flexible`]. Use together
/// with `#[serde(default)]`.
pub fn deserialize_flexible_opt<'de, D>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw {
        None => Ok(None),
        Some(value) => parse_flexible(&value)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_accepts_rfc3339_datetime() {
        let d = DateString::parse("2024-06-15T10:30:00Z").unwrap();
        assert!(d.is_wellformed());
        assert_eq!(d.to_utc().unwrap().hour(), 10);
    }

    #[test]
    fn test_accepts_bare_date() {
        let d = DateString::parse("2024-06-15").unwrap();
        let instant = d.to_utc().unwrap();
        assert_eq!(instant.hour(), 0);
        assert_eq!(instant.minute(), 0);
    }

    #[test]
    fn test_rejects_other_forms() {
        assert!(DateString::parse("15/06/2024").is_err());
        assert!(DateString::parse("2024-6-15").is_err());
        assert!(DateString::parse("next tuesday").is_err());
        assert!(DateString::parse("").is_err());
    }

    #[test]
    fn test_bare_shape_is_not_calendar_checked() {
        // Shape passes; normalization to an instant does not.
        let d = DateString::parse("2024-99-99").unwrap();
        assert!(d.is_wellformed());
        assert!(d.to_utc().is_none());
    }

    #[test]
    fn test_serde_is_lenient() {
        let d: DateString = serde_json::from_str("\"garbage\"").unwrap();
        assert!(!d.is_wellformed());
    }

    #[test]
    fn test_parse_flexible_datetime_keeps_instant() {
        let instant = parse_flexible("2024-06-15T10:30:00-03:00").unwrap();
        assert_eq!(instant.hour(), 13);
    }

    #[test]
    fn test_deserialize_flexible_through_struct() {
        #[derive(Deserialize)]
        struct Holder {
            #[serde(deserialize_with = "deserialize_flexible")]
            at: DateTime<Utc>,
        }

        let full: Holder = serde_json::from_str(r#"{"at":"2024-06-15T10:30:00Z"}"#).unwrap();
        assert_eq!(full.at.hour(), 10);

        let bare: Holder = serde_json::from_str(r#"{"at":"2024-06-15"}"#).unwrap();
        assert_eq!(bare.at.hour(), 0);

        let bad = serde_json::from_str::<Holder>(r#"{"at":"whenever"}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_deserialize_flexible_opt_absent_and_present() {
        #[derive(Deserialize)]
        struct Holder {
            #[serde(default, deserialize_with = "deserialize_flexible_opt")]
            at: Option<DateTime<Utc>>,
        }

        let absent: Holder = serde_json::from_str("{}").unwrap();
        assert!(absent.at.is_none());

        let present: Holder = serde_json::from_str(r#"{"at":"2024-06-15"}"#).unwrap();
        assert!(present.at.is_some());
    }
}
