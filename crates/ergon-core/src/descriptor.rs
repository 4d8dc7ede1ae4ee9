//! # Entity Field Descriptors
//!
//! Every entity declares one static table describing its canonical
//! fields. The create/update/public/document projections are computed
//! from that table, never restated by hand, which keeps the
//! single-source-of-truth property: omission, partial-ing, and
//! redaction are table transformations.
//!
//! ## Projection rules
//!
//! | Role          | Create | Update   | Public | Document |
//! |---------------|--------|----------|--------|----------|
//! | Identifier    | drop   | optional | keep   | required |
//! | Tenant        | drop   | reject   | keep   | required |
//! | Data          | keep   | optional | keep   | keep     |
//! | Immutable     | keep   | reject   | keep   | keep     |
//! | ServerManaged | drop   | drop     | keep   | keep     |
//! | Sensitive     | keep   | optional | drop   | keep     |
//!
//! The authoring mixin is dropped from Create; on Update its creation
//! half (`createdBy`, `createdAt`) is rejected and its update half
//! stays optional. "Drop" follows the entity's strictness mode: strict
//! entities reject the field outright, non-strict entities silently
//! discard it.
//!
//! ## Screening
//!
//! [`EntityDescriptor::screen`] applies the table to a raw JSON payload
//! before deserialization: unknown-field policy, immutability
//! rejection, required-field presence (with the entity's literal
//! messages), and top-level closed-enum membership. The full pipeline
//! is [`EntityDescriptor::parse`]:
//! screen → deserialize → normalize → validate, rejecting atomically.

use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::authoring;
use crate::normalize::Normalize;
use crate::validate::{Validate, ValidationError, Violations};

/// How a field participates in projection derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRole {
    /// The `_id` primary identifier.
    Identifier,
    /// Owning-organization reference: injected by middleware on create,
    /// frozen afterward, required non-null for documents.
    Tenant,
    /// Ordinary updatable field.
    Data,
    /// Set at creation, never updatable (a clinical record's patient).
    Immutable,
    /// Owned by the backend (lifecycle state, computed blocks); never
    /// accepted from create or update payloads.
    ServerManaged,
    /// Accepted on input, redacted from the public view.
    Sensitive,
}

/// Operation-specific projections of a canonical schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaVariant {
    /// Fully-formed stored record.
    Canonical,
    /// Creation payload; middleware injects what it omits.
    Create,
    /// Partial update payload.
    Update,
    /// Redacted view safe to expose.
    Public,
    /// Stored record with required identifier.
    Document,
}

impl SchemaVariant {
    /// All projections.
    pub const ALL: [SchemaVariant; 5] = [
        SchemaVariant::Canonical,
        SchemaVariant::Create,
        SchemaVariant::Update,
        SchemaVariant::Public,
        SchemaVariant::Document,
    ];

    /// Lowercase name used in diagnostics.
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaVariant::Canonical => "canonical",
            SchemaVariant::Create => "create",
            SchemaVariant::Update => "update",
            SchemaVariant::Public => "public",
            SchemaVariant::Document => "document",
        }
    }
}

impl fmt::Display for SchemaVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One canonical field of an entity.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// Wire name, as serialized.
    pub name: &'static str,
    /// Whether the canonical schema requires the field to be present.
    pub required: bool,
    /// Projection role.
    pub role: FieldRole,
    /// Literal message reported when a required field is missing; the
    /// entity modules keep their original texts here.
    pub message: Option<&'static str>,
    /// Closed vocabulary for top-level string enum fields, as wire
    /// spellings. Include `""` only where the contract lists it.
    pub values: Option<&'static [&'static str]>,
}

impl FieldSpec {
    /// Field with the given requiredness and role.
    pub const fn new(name: &'static str, required: bool, role: FieldRole) -> Self {
        Self {
            name,
            required,
            role,
            message: None,
            values: None,
        }
    }

    /// Attach the literal required-field message.
    pub const fn message(mut self, text: &'static str) -> Self {
        self.message = Some(text);
        self
    }

    /// Attach the closed vocabulary for membership screening.
    pub const fn values(mut self, values: &'static [&'static str]) -> Self {
        self.values = Some(values);
        self
    }
}

/// What screening decides for one payload key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Disposition {
    /// Key belongs to the projection.
    Accept,
    /// Key is silently discarded.
    Drop,
    /// Key is rejected with the given message.
    Reject(&'static str),
}

const MSG_IMMUTABLE: &str = "cannot be changed after creation";
const MSG_NOT_ACCEPTED: &str = "not accepted in this payload";
const MSG_UNRECOGNIZED: &str = "unrecognized field";

/// Canonical field table plus screening policy for one entity.
#[derive(Debug, Clone, Copy)]
pub struct EntityDescriptor {
    /// Registry name of the entity.
    pub entity: &'static str,
    /// Strict entities reject unknown fields; non-strict entities drop
    /// them.
    pub strict: bool,
    /// Whether the authoring mixin is flattened into the record.
    pub audited: bool,
    /// Canonical fields in wire order.
    pub fields: &'static [FieldSpec],
    /// Projections this entity exposes as typed structs.
    pub variants: &'static [SchemaVariant],
}

impl EntityDescriptor {
    /// Look up a canonical field by wire name.
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Whether the projection carries the named field.
    pub fn accepts(&self, variant: SchemaVariant, name: &str) -> bool {
        matches!(self.disposition(variant, name), Disposition::Accept)
    }

    /// Whether the field must be present and non-null in the projection.
    pub fn required_in(&self, variant: SchemaVariant, spec: &FieldSpec) -> bool {
        if !self.accepts(variant, spec.name) {
            return false;
        }
        match variant {
            SchemaVariant::Update => false,
            SchemaVariant::Document => {
                spec.required
                    || matches!(spec.role, FieldRole::Identifier | FieldRole::Tenant)
            }
            _ => spec.required,
        }
    }

    fn drop_or_reject(&self, message: &'static str) -> Disposition {
        if self.strict {
            Disposition::Reject(message)
        } else {
            Disposition::Drop
        }
    }

    fn disposition(&self, variant: SchemaVariant, key: &str) -> Disposition {
        use FieldRole::*;
        use SchemaVariant::*;

        if self.audited && authoring::WIRE_FIELDS.contains(&key) {
            return match variant {
                Canonical | Public | Document => Disposition::Accept,
                Create => self.drop_or_reject(MSG_NOT_ACCEPTED),
                Update => {
                    if authoring::CREATION_FIELDS.contains(&key) {
                        Disposition::Reject(MSG_IMMUTABLE)
                    } else {
                        Disposition::Accept
                    }
                }
            };
        }

        let Some(spec) = self.field(key) else {
            return self.drop_or_reject(MSG_UNRECOGNIZED);
        };

        match (variant, spec.role) {
            (Canonical | Document, _) => Disposition::Accept,
            (Create, Identifier | Tenant | ServerManaged) => {
                self.drop_or_reject(MSG_NOT_ACCEPTED)
            }
            (Create, _) => Disposition::Accept,
            (Update, Tenant | Immutable) => Disposition::Reject(MSG_IMMUTABLE),
            (Update, ServerManaged) => self.drop_or_reject(MSG_NOT_ACCEPTED),
            (Update, _) => Disposition::Accept,
            (Public, Sensitive) => Disposition::Drop,
            (Public, _) => Disposition::Accept,
        }
    }

    /// Screen a raw payload against the projection: unknown-field
    /// policy, immutability, required presence, top-level enum
    /// membership. Returns every violation found.
    pub fn screen(&self, variant: SchemaVariant, payload: &Value) -> Violations {
        let mut out = Violations::new();
        let Some(object) = payload.as_object() else {
            out.push("", "expected a JSON object");
            return out;
        };

        for (key, value) in object {
            match self.disposition(variant, key) {
                Disposition::Accept => {
                    if let (Some(spec), Some(candidate)) = (self.field(key), value.as_str()) {
                        if let Some(allowed) = spec.values {
                            if !allowed.contains(&candidate) {
                                out.push(key.clone(), membership_message(allowed));
                            }
                        }
                    }
                }
                Disposition::Drop => {}
                Disposition::Reject(message) => out.push(key.clone(), message),
            }
        }

        for spec in self.fields {
            if self.required_in(variant, spec) {
                let missing = object.get(spec.name).map_or(true, Value::is_null);
                if missing {
                    out.push(spec.name, spec.message.unwrap_or("is required"));
                }
            }
        }

        out
    }

    /// Full pipeline: screen, deserialize into the projection's typed
    /// struct, normalize, validate. The payload is rejected atomically:
    /// either every rule passes or no value is produced.
    pub fn parse<T>(&self, variant: SchemaVariant, payload: &Value) -> Result<T, ValidationError>
    where
        T: DeserializeOwned + Normalize + Validate,
    {
        let screened = self.screen(variant, payload);
        if !screened.is_empty() {
            tracing::debug!(
                entity = self.entity,
                variant = %variant,
                violations = screened.len(),
                "payload rejected during screening"
            );
            return Err(ValidationError::Invalid {
                entity: self.entity,
                violations: screened,
            });
        }

        let mut value: T = serde_json::from_value(payload.clone()).map_err(|e| {
            ValidationError::Shape {
                entity: self.entity,
                message: e.to_string(),
            }
        })?;
        value.normalize();
        match value.validate() {
            Ok(()) => Ok(value),
            Err(violations) => Err(ValidationError::Invalid {
                entity: self.entity,
                violations,
            }),
        }
    }
}

fn membership_message(allowed: &[&str]) -> String {
    let list = allowed
        .iter()
        .map(|v| format!("'{v}'"))
        .collect::<Vec<_>>()
        .join(", ");
    format!("must be one of: {list}")
}
