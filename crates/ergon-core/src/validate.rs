//! # Violation Collection
//!
//! Validation failures are structured data: an ordered list of
//! (field path, human-readable message) pairs. Paths are dot-joined with
//! numeric segments for array indices (`hijos.2.edad`). Nothing here
//! throws opaque errors or logs; the consumer translates violations into
//! UI or API responses.
//!
//! ## Atomicity
//!
//! A payload either passes every rule or is rejected whole. Defaults are
//! never partially applied: deserialization, normalization, and
//! constraint checks all run on an owned value that is discarded on
//! error.

use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::id::ObjectId;
use crate::normalize::Normalize;

/// A single field-level violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Dot-joined path to the offending field; empty for the payload root.
    pub path: String,
    /// Human-readable message, kept verbatim where the contract
    /// specifies a literal text.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "  (root): {}", self.message)
        } else {
            write!(f, "  {}: {}", self.path, self.message)
        }
    }
}

/// Ordered collection of violations for one payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Violations(Vec<Violation>);

impl Violations {
    /// Empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a violation at `path`.
    pub fn push(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.0.push(Violation {
            path: path.into(),
            message: message.into(),
        });
    }

    /// Append every violation from `other`, preserving order.
    pub fn merge(&mut self, other: Violations) {
        self.0.extend(other.0);
    }

    /// Number of violations.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no violation was recorded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// All violations, in the order they were recorded.
    pub fn as_slice(&self) -> &[Violation] {
        &self.0
    }

    /// Iterate over the recorded violations.
    pub fn iter(&self) -> std::slice::Iter<'_, Violation> {
        self.0.iter()
    }

    /// True when some violation is located at `path`.
    pub fn contains_path(&self, path: &str) -> bool {
        self.0.iter().any(|v| v.path == path)
    }

    /// Consume into the inner vector.
    pub fn into_inner(self) -> Vec<Violation> {
        self.0
    }

    /// `Ok(())` when empty, otherwise `Err(self)`.
    pub fn into_result(self) -> Result<(), Violations> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, violation) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{violation}")?;
        }
        Ok(())
    }
}

impl IntoIterator for Violations {
    type Item = Violation;
    type IntoIter = std::vec::IntoIter<Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Failure to validate a payload against a contract.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// One or more field rules were violated.
    #[error("'{entity}' validation failed:\n{violations}")]
    Invalid {
        /// Registry name of the contract that rejected the payload.
        entity: &'static str,
        /// Structured list of individual violations.
        violations: Violations,
    },

    /// The payload could not be deserialized into the expected shape
    /// (wrong primitive type, malformed nesting).
    #[error("'{entity}' payload has the wrong shape: {message}")]
    Shape {
        /// Registry name of the contract that rejected the payload.
        entity: &'static str,
        /// Deserializer message describing the mismatch.
        message: String,
    },
}

impl ValidationError {
    /// Registry name of the contract that produced this error.
    pub fn entity(&self) -> &'static str {
        match self {
            Self::Invalid { entity, .. } | Self::Shape { entity, .. } => entity,
        }
    }

    /// The collected violations, when this is a field-rule failure.
    pub fn violations(&self) -> Option<&Violations> {
        match self {
            Self::Invalid { violations, .. } => Some(violations),
            Self::Shape { .. } => None,
        }
    }
}

/// Per-field and cross-field constraint checks, collected rather than
/// thrown.
pub trait Validate {
    /// Record violations into `out`, prefixing nested paths with `path`.
    fn collect(&self, path: &str, out: &mut Violations);

    /// Validate the value as a payload root.
    fn validate(&self) -> Result<(), Violations> {
        let mut out = Violations::new();
        self.collect("", &mut out);
        out.into_result()
    }
}

/// Join a path prefix and a field name with a dot.
pub fn field_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

/// Join a path prefix and an array index.
pub fn index_path(prefix: &str, index: usize) -> String {
    field_path(prefix, &index.to_string())
}

// ─── Shared field checks ────────────────────────────────────────────────

/// Require non-empty text (the value is expected to be pre-trimmed).
pub fn require_nonempty(out: &mut Violations, path: String, value: &str, message: &str) {
    if value.is_empty() {
        out.push(path, message);
    }
}

/// Check identifier well-formedness.
pub fn check_id(out: &mut Violations, path: String, id: &ObjectId) {
    if let Some(err) = id.wellformed_error() {
        out.push(path, err.to_string());
    }
}

/// Check well-formedness of an optional identifier.
pub fn check_id_opt(out: &mut Violations, path: String, id: Option<&ObjectId>) {
    if let Some(id) = id {
        check_id(out, path, id);
    }
}

/// Minimal plausibility check for an email address: one `@`, non-empty
/// local part, dotted domain, no whitespace.
pub fn is_plausible_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && domain.len() >= 3
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !value.chars().any(char::is_whitespace)
        && !value.contains("..")
}

/// Check email plausibility with the contract's literal message.
pub fn check_email(out: &mut Violations, path: String, value: &str, message: &str) {
    if !is_plausible_email(value) {
        out.push(path, message);
    }
}

/// Check an inclusive numeric range.
pub fn check_range<T>(out: &mut Violations, path: String, value: T, min: T, max: T)
where
    T: PartialOrd + fmt::Display + Copy,
{
    if value < min || value > max {
        out.push(path, format!("must be between {min} and {max}"));
    }
}

/// Full pipeline for standalone shapes that carry no field-descriptor
/// table (filters, operation payloads, aggregates): deserialize,
/// normalize, then validate, rejecting atomically.
pub fn parse_payload<T>(entity: &'static str, payload: &Value) -> Result<T, ValidationError>
where
    T: DeserializeOwned + Normalize + Validate,
{
    let mut value: T = serde_json::from_value(payload.clone())
        .map_err(|e| ValidationError::Shape {
            entity,
            message: e.to_string(),
        })?;
    value.normalize();
    match value.validate() {
        Ok(()) => Ok(value),
        Err(violations) => Err(ValidationError::Invalid { entity, violations }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[test]
    fn test_violation_display_with_path() {
        let v = Violation {
            path: "hijos.2.edad".to_string(),
            message: "must be between 0 and 50".to_string(),
        };
        assert_eq!(v.to_string(), "  hijos.2.edad: must be between 0 and 50");
    }

    #[test]
    fn test_violation_display_root() {
        let v = Violation {
            path: String::new(),
            message: "expected a JSON object".to_string(),
        };
        assert!(v.to_string().contains("(root)"));
    }

    #[test]
    fn test_violations_collect_and_display() {
        let mut out = Violations::new();
        out.push("dni", "DNI es requerido");
        out.push("email", "Email inválido");
        assert_eq!(out.len(), 2);
        assert!(out.contains_path("dni"));
        assert!(!out.contains_path("cuil"));

        let rendered = out.to_string();
        assert!(rendered.contains("  dni: DNI es requerido"));
        assert!(rendered.contains("  email: Email inválido"));
    }

    #[test]
    fn test_into_result() {
        assert!(Violations::new().into_result().is_ok());

        let mut out = Violations::new();
        out.push("x", "bad");
        assert!(out.into_result().is_err());
    }

    #[test]
    fn test_field_and_index_paths() {
        assert_eq!(field_path("", "dni"), "dni");
        assert_eq!(field_path("settings", "maxMembers"), "settings.maxMembers");
        assert_eq!(index_path("hijos", 2), "hijos.2");
    }

    #[test]
    fn test_email_plausibility() {
        assert!(is_plausible_email("ana@clinica.ar"));
        assert!(is_plausible_email("a.b+c@sub.dominio.com"));
        assert!(!is_plausible_email("sin-arroba"));
        assert!(!is_plausible_email("@dominio.com"));
        assert!(!is_plausible_email("ana@dominio"));
        assert!(!is_plausible_email("ana@.com"));
        assert!(!is_plausible_email("ana @dominio.com"));
        assert!(!is_plausible_email("ana@dominio..com"));
    }

    #[test]
    fn test_check_range_bounds() {
        let mut out = Violations::new();
        check_range(&mut out, "edad".to_string(), 120u32, 0, 120);
        assert!(out.is_empty());

        check_range(&mut out, "edad".to_string(), 121u32, 0, 120);
        assert_eq!(out.len(), 1);
        assert_eq!(out.as_slice()[0].message, "must be between 0 and 120");
    }

    #[test]
    fn test_parse_payload_shape_error() {
        #[derive(Debug, Deserialize)]
        struct Probe {
            #[allow(dead_code)]
            count: u32,
        }
        impl Normalize for Probe {
            fn normalize(&mut self) {}
        }
        impl Validate for Probe {
            fn collect(&self, _path: &str, _out: &mut Violations) {}
        }

        let err =
            parse_payload::<Probe>("probe", &serde_json::json!({ "count": "diez" })).unwrap_err();
        assert!(matches!(err, ValidationError::Shape { entity: "probe", .. }));
        assert!(err.violations().is_none());
    }

    #[test]
    fn test_parse_payload_collects_violations() {
        #[derive(Debug, Deserialize)]
        struct Probe {
            name: String,
        }
        impl Normalize for Probe {
            fn normalize(&mut self) {
                crate::normalize::trim(&mut self.name);
            }
        }
        impl Validate for Probe {
            fn collect(&self, path: &str, out: &mut Violations) {
                require_nonempty(out, field_path(path, "name"), &self.name, "name is required");
            }
        }

        let err =
            parse_payload::<Probe>("probe", &serde_json::json!({ "name": "   " })).unwrap_err();
        let violations = err.violations().unwrap();
        assert!(violations.contains_path("name"));
    }
}
