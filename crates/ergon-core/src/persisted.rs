//! # Persisted Document Variant
//!
//! [`Persisted<T>`] types a record already confirmed stored: the `_id`
//! is promoted from optional to required and sits flattened next to the
//! canonical fields, so the wire shape is identical to the canonical
//! record plus a mandatory identifier.

use serde::{Deserialize, Serialize};

use crate::id::ObjectId;
use crate::normalize::Normalize;
use crate::validate::{check_id, field_path, Validate, Violations};

/// A canonical record with its required stored identifier.
///
/// On deserialization the outer struct consumes the `_id` key, so the
/// canonical record's own optional identifier is left unset; keep it
/// that way when constructing values programmatically, otherwise
/// serialization would emit the key twice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Persisted<T> {
    /// Required record identifier.
    #[serde(rename = "_id")]
    pub id: ObjectId,
    /// The canonical record.
    #[serde(flatten)]
    pub record: T,
}

impl<T> Persisted<T> {
    /// Wrap a canonical record with its stored identifier.
    pub fn new(id: ObjectId, record: T) -> Self {
        Self { id, record }
    }

    /// Unwrap the canonical record, discarding the identifier.
    pub fn into_inner(self) -> T {
        self.record
    }
}

impl<T: Normalize> Normalize for Persisted<T> {
    fn normalize(&mut self) {
        self.record.normalize();
    }
}

impl<T: Validate> Validate for Persisted<T> {
    fn collect(&self, path: &str, out: &mut Violations) {
        check_id(out, field_path(path, "_id"), &self.id);
        self.record.collect(path, out);
    }
}
