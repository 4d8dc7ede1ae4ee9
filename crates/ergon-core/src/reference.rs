//! # Polymorphic Entity References
//!
//! Relationship fields on some entities carry either a bare identifier
//! or a populated summary object, depending on whether the producer
//! expanded the reference. The union is untagged on the wire: a JSON
//! string is a bare identifier, a JSON object is a summary. Consumers
//! must pattern-match; neither shape may be assumed.

use serde::{Deserialize, Serialize};

use crate::id::ObjectId;
use crate::validate::{check_id, Validate, Violations};

/// A reference that is either a bare identifier or a populated summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reference<T> {
    /// Bare identifier.
    Id(ObjectId),
    /// Populated summary object; carries its own optional identifier.
    Summary(T),
}

impl<T> Reference<T> {
    /// The bare identifier, when the reference is not populated.
    pub fn as_id(&self) -> Option<&ObjectId> {
        match self {
            Reference::Id(id) => Some(id),
            Reference::Summary(_) => None,
        }
    }

    /// The populated summary, when present.
    pub fn as_summary(&self) -> Option<&T> {
        match self {
            Reference::Id(_) => None,
            Reference::Summary(summary) => Some(summary),
        }
    }

    /// True when the producer expanded the reference.
    pub fn is_populated(&self) -> bool {
        matches!(self, Reference::Summary(_))
    }
}

impl<T: Validate> Validate for Reference<T> {
    fn collect(&self, path: &str, out: &mut Violations) {
        match self {
            Reference::Id(id) => check_id(out, path.to_string(), id),
            Reference::Summary(summary) => summary.collect(path, out),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::{field_path, require_nonempty};
    use serde_json::json;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Probe {
        name: String,
    }

    impl Validate for Probe {
        fn collect(&self, path: &str, out: &mut Violations) {
            require_nonempty(out, field_path(path, "name"), &self.name, "name is required");
        }
    }

    #[test]
    fn test_string_deserializes_to_id() {
        let r: Reference<Probe> =
            serde_json::from_value(json!("507f1f77bcf86cd799439011")).unwrap();
        assert!(!r.is_populated());
        assert_eq!(r.as_id().unwrap().as_str(), "507f1f77bcf86cd799439011");
    }

    #[test]
    fn test_object_deserializes_to_summary() {
        let r: Reference<Probe> = serde_json::from_value(json!({ "name": "Guardia" })).unwrap();
        assert!(r.is_populated());
        assert_eq!(r.as_summary().unwrap().name, "Guardia");
        assert!(r.as_id().is_none());
    }

    #[test]
    fn test_serialize_round_trip_keeps_shape() {
        let id: Reference<Probe> =
            Reference::Id(ObjectId::parse("507f1f77bcf86cd799439011").unwrap());
        assert_eq!(serde_json::to_value(&id).unwrap(), json!("507f1f77bcf86cd799439011"));

        let summary: Reference<Probe> = Reference::Summary(Probe { name: "Guardia".into() });
        assert_eq!(serde_json::to_value(&summary).unwrap(), json!({ "name": "Guardia" }));
    }

    #[test]
    fn test_validate_dispatches_per_variant() {
        let bad_id: Reference<Probe> = Reference::Id(ObjectId("x".to_string()));
        let violations = bad_id.validate().unwrap_err();
        assert!(violations.contains_path(""));

        let bad_summary: Reference<Probe> = Reference::Summary(Probe { name: String::new() });
        let mut out = Violations::new();
        bad_summary.collect("role", &mut out);
        assert!(out.contains_path("role.name"));
    }
}
