//! # Role and Permission Vocabulary
//!
//! The flat permission namespace and the role records that group it.
//! Permissions are a closed vocabulary of `<resource>_<action>` tokens
//! plus the standalone administrative and reporting grants; a role's
//! permission set has set semantics (de-duplicated, order-independent),
//! so it is stored as an ordered set even though the wire shape is a
//! sequence.
//!
//! Authorization itself lives outside this package; only the vocabulary
//! is defined here.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use ergon_core::descriptor::{EntityDescriptor, FieldRole, FieldSpec, SchemaVariant};
use ergon_core::normalize::{clean, trim, Normalize};
use ergon_core::validate::{check_id_opt, field_path, require_nonempty, Validate, Violations};
use ergon_core::{Authoring, ObjectId};

const MSG_NAME: &str = "Nombre del rol es requerido";

fn default_true() -> bool {
    true
}

/// A single permission token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    UserRead,
    UserCreate,
    UserUpdate,
    UserDelete,
    PatientRead,
    PatientCreate,
    PatientUpdate,
    PatientDelete,
    CompanyRead,
    CompanyCreate,
    CompanyUpdate,
    CompanyDelete,
    HistoriaRead,
    HistoriaCreate,
    HistoriaUpdate,
    HistoriaDelete,
    Admin,
    SuperAdmin,
    UserManagement,
    ReportsRead,
    AnalyticsRead,
}

impl Permission {
    /// The full vocabulary, in wire order.
    pub const ALL: [Permission; 21] = [
        Permission::UserRead,
        Permission::UserCreate,
        Permission::UserUpdate,
        Permission::UserDelete,
        Permission::PatientRead,
        Permission::PatientCreate,
        Permission::PatientUpdate,
        Permission::PatientDelete,
        Permission::CompanyRead,
        Permission::CompanyCreate,
        Permission::CompanyUpdate,
        Permission::CompanyDelete,
        Permission::HistoriaRead,
        Permission::HistoriaCreate,
        Permission::HistoriaUpdate,
        Permission::HistoriaDelete,
        Permission::Admin,
        Permission::SuperAdmin,
        Permission::UserManagement,
        Permission::ReportsRead,
        Permission::AnalyticsRead,
    ];

    /// Wire spelling of the token.
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::UserRead => "user_read",
            Permission::UserCreate => "user_create",
            Permission::UserUpdate => "user_update",
            Permission::UserDelete => "user_delete",
            Permission::PatientRead => "patient_read",
            Permission::PatientCreate => "patient_create",
            Permission::PatientUpdate => "patient_update",
            Permission::PatientDelete => "patient_delete",
            Permission::CompanyRead => "company_read",
            Permission::CompanyCreate => "company_create",
            Permission::CompanyUpdate => "company_update",
            Permission::CompanyDelete => "company_delete",
            Permission::HistoriaRead => "historia_read",
            Permission::HistoriaCreate => "historia_create",
            Permission::HistoriaUpdate => "historia_update",
            Permission::HistoriaDelete => "historia_delete",
            Permission::Admin => "admin",
            Permission::SuperAdmin => "super_admin",
            Permission::UserManagement => "user_management",
            Permission::ReportsRead => "reports_read",
            Permission::AnalyticsRead => "analytics_read",
        }
    }

    /// Whether the token is one of the standalone administrative grants
    /// rather than a per-resource CRUD token.
    pub fn is_administrative(&self) -> bool {
        matches!(
            self,
            Permission::Admin | Permission::SuperAdmin | Permission::UserManagement
        )
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Permission::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| format!("unknown permission: {s}"))
    }
}

/// Canonical role record.
///
/// `isSystem` marks roles protected from deletion by convention; this
/// layer records the flag and enforces nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Deserializing through a set de-duplicates wire repetitions.
    #[serde(default)]
    pub permissions: BTreeSet<Permission>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_system: bool,
    #[serde(flatten)]
    pub authoring: Authoring,
}

impl Normalize for Role {
    fn normalize(&mut self) {
        trim(&mut self.name);
        clean(&mut self.description);
        self.authoring.normalize();
    }
}

impl Validate for Role {
    fn collect(&self, path: &str, out: &mut Violations) {
        check_id_opt(out, field_path(path, "_id"), self.id.as_ref());
        require_nonempty(out, field_path(path, "name"), &self.name, MSG_NAME);
        self.authoring.collect(path, out);
    }
}

/// Creation payload; the system flag is backend-owned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleCreate {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub permissions: BTreeSet<Permission>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl Normalize for RoleCreate {
    fn normalize(&mut self) {
        trim(&mut self.name);
        clean(&mut self.description);
    }
}

impl Validate for RoleCreate {
    fn collect(&self, path: &str, out: &mut Violations) {
        require_nonempty(out, field_path(path, "name"), &self.name, MSG_NAME);
    }
}

pub static ROLE: EntityDescriptor = EntityDescriptor {
    entity: "role",
    strict: false,
    audited: true,
    fields: &[
        FieldSpec::new("_id", false, FieldRole::Identifier),
        FieldSpec::new("name", true, FieldRole::Data).message(MSG_NAME),
        FieldSpec::new("description", false, FieldRole::Data),
        FieldSpec::new("permissions", false, FieldRole::Data),
        FieldSpec::new("isActive", false, FieldRole::Data),
        FieldSpec::new("isSystem", false, FieldRole::ServerManaged),
    ],
    variants: &[
        SchemaVariant::Canonical,
        SchemaVariant::Create,
        SchemaVariant::Document,
    ],
};
