//! # String Normalization
//!
//! The uniform trim-or-absent contract for free-text input: values are
//! trimmed, and an optional value whose trimmed form is empty becomes
//! absent, never an empty string. This is a semantic contract, not a
//! cosmetic one: downstream presence and uniqueness checks must not see
//! whitespace-only input as present.
//!
//! Required text fields are trimmed in place and left to the constraint
//! checks, so that `"   "` in a required slot is reported as a missing
//! value rather than silently erased.

use serde::de::IntoDeserializer;
use serde::{Deserialize, Deserializer};

/// In-place normalization applied between deserialization and
/// constraint validation. Implementations must be idempotent.
pub trait Normalize {
    fn normalize(&mut self);
}

/// Trim a required text field in place.
pub fn trim(field: &mut String) {
    let trimmed = field.trim();
    if trimmed.len() != field.len() {
        *field = trimmed.to_string();
    }
}

/// Trim an optional text field in place, keeping an empty result.
///
/// Used for update payloads of canonically-required fields, where an
/// explicit empty value must be rejected rather than treated as absent.
pub fn trim_opt(field: &mut Option<String>) {
    if let Some(value) = field {
        trim(value);
    }
}

/// The trim-or-absent contract for optional free text.
pub fn clean(field: &mut Option<String>) {
    *field = field.take().and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else if trimmed.len() == value.len() {
            Some(value)
        } else {
            Some(trimmed.to_string())
        }
    });
}

/// Deserializer for optional enum fields that wire-accept the empty
/// string as "not chosen". `""` and `null` become `None`; any other
/// string must be a member of the enum. Use together with
/// `#[serde(default)]`.
pub fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw {
        None => Ok(None),
        Some(value) if value.is_empty() => Ok(None),
        Some(value) => T::deserialize(value.into_deserializer()).map(Some),
    }
}
