//! # Organization (Tenant Root)
//!
//! The top-level tenant: every patient, company, and clinical record is
//! scoped to exactly one organization. Organizations are created by an
//! admin actor and soft-deactivated through `isActive`; this layer
//! never models hard deletion.

use serde::{Deserialize, Serialize};

use ergon_core::descriptor::{EntityDescriptor, FieldRole, FieldSpec, SchemaVariant};
use ergon_core::normalize::{clean, trim, Normalize};
use ergon_core::validate::{field_path, require_nonempty, Validate, Violations};
use ergon_core::{Authoring, ObjectId};

const MSG_NAME: &str = "Nombre de la organización es requerido";

fn default_true() -> bool {
    true
}

fn default_timezone() -> String {
    "America/Argentina/Buenos_Aires".to_string()
}

fn default_language() -> String {
    "es".to_string()
}

fn default_currency() -> String {
    "ARS".to_string()
}

fn default_date_format() -> String {
    "DD/MM/YYYY".to_string()
}

/// Per-tenant display and isolation settings, all defaulted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationSettings {
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default = "default_date_format")]
    pub date_format: String,
    /// Whether records may be read across tenant boundaries.
    #[serde(default)]
    pub allow_cross_organization_access: bool,
}

impl Default for OrganizationSettings {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            language: default_language(),
            currency: default_currency(),
            date_format: default_date_format(),
            allow_cross_organization_access: false,
        }
    }
}

/// Canonical organization record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<OrganizationSettings>,
    #[serde(flatten)]
    pub authoring: Authoring,
}

impl Normalize for Organization {
    fn normalize(&mut self) {
        trim(&mut self.name);
        clean(&mut self.description);
        self.authoring.normalize();
    }
}

impl Validate for Organization {
    fn collect(&self, path: &str, out: &mut Violations) {
        ergon_core::validate::check_id_opt(out, field_path(path, "_id"), self.id.as_ref());
        require_nonempty(out, field_path(path, "name"), &self.name, MSG_NAME);
        self.authoring.collect(path, out);
    }
}

/// Creation payload; the backend stamps identifier and authoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationCreate {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<OrganizationSettings>,
}

impl Normalize for OrganizationCreate {
    fn normalize(&mut self) {
        trim(&mut self.name);
        clean(&mut self.description);
    }
}

impl Validate for OrganizationCreate {
    fn collect(&self, path: &str, out: &mut Violations) {
        require_nonempty(out, field_path(path, "name"), &self.name, MSG_NAME);
    }
}

/// Field table; the organization is its own tenant, so no field carries
/// the tenant role.
pub static ORGANIZATION: EntityDescriptor = EntityDescriptor {
    entity: "organization",
    strict: false,
    audited: true,
    fields: &[
        FieldSpec::new("_id", false, FieldRole::Identifier),
        FieldSpec::new("name", true, FieldRole::Data).message(MSG_NAME),
        FieldSpec::new("description", false, FieldRole::Data),
        FieldSpec::new("isActive", false, FieldRole::Data),
        FieldSpec::new("settings", false, FieldRole::Data),
    ],
    variants: &[
        SchemaVariant::Canonical,
        SchemaVariant::Create,
        SchemaVariant::Document,
    ],
};
