//! # Authoring Metadata
//!
//! The audited-entity mixin flattened into nearly every record: who
//! created it, when, and an append-only trail of modifications. The
//! trail is never reordered or pruned by this layer; consumers append
//! entries, they do not rewrite history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::ObjectId;
use crate::normalize::{clean, Normalize};
use crate::validate::{check_id, check_id_opt, field_path, index_path, Validate, Violations};

/// Wire names contributed by the mixin, used by descriptor screening.
pub const WIRE_FIELDS: [&str; 4] = ["createdBy", "modifiedBy", "createdAt", "updatedAt"];

/// Wire names of the creation half of the mixin, immutable after create.
pub const CREATION_FIELDS: [&str; 2] = ["createdBy", "createdAt"];

/// One entry in an entity's modification trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Modification {
    /// User who made the change.
    pub user: ObjectId,
    /// Instant of the change.
    pub updated_at: DateTime<Utc>,
    /// Optional free-text action label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

/// Authoring metadata shared by audited entities.
///
/// Flattened into each record with `#[serde(flatten)]`; create payloads
/// never carry these fields, the backend stamps them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Authoring {
    /// Creator, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<ObjectId>,
    /// Append-only modification trail; defaults to empty.
    #[serde(default)]
    pub modified_by: Vec<Modification>,
    /// Creation instant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Last-update instant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Normalize for Authoring {
    fn normalize(&mut self) {
        for modification in &mut self.modified_by {
            clean(&mut modification.action);
        }
    }
}

impl Validate for Authoring {
    fn collect(&self, path: &str, out: &mut Violations) {
        check_id_opt(out, field_path(path, "createdBy"), self.created_by.as_ref());
        let trail = field_path(path, "modifiedBy");
        for (i, modification) in self.modified_by.iter().enumerate() {
            check_id(
                out,
                field_path(&index_path(&trail, i), "user"),
                &modification.user,
            );
        }
    }
}
