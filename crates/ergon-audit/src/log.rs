//! # Audit Log
//!
//! The append-only compliance record. Unlike every other entity, the
//! audit schema is strict: an unknown field in an audit row is rejected
//! outright, because a compliance record that silently drops data is
//! worse than one that refuses it. Rows are never updated; `archived`
//! is the only lifecycle transition, and it is flipped by a retention
//! job outside this layer.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use ergon_core::descriptor::{EntityDescriptor, FieldRole, FieldSpec, SchemaVariant};
use ergon_core::normalize::{blank_as_none, clean, trim, Normalize};
use ergon_core::pagination::{check_bounds, default_page, default_review_limit, SortOrder};
use ergon_core::validate::{
    check_id_opt, field_path, require_nonempty, Validate, Violations,
};
use ergon_core::{DateString, ObjectId};

/// What happened. SCREAMING_SNAKE on the wire, grouped into categories
/// by [`AuditAction::category`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    // Access
    View,
    Export,
    Print,
    // Modification
    Create,
    Update,
    Delete,
    // Authentication
    Login,
    Logout,
    LoginFailed,
    PasswordChange,
    // Administration
    PermissionChange,
    RoleAssigned,
    UserCreated,
    UserDeactivated,
    ConfigChange,
    // Security events
    UnauthorizedAccess,
    SuspiciousActivity,
    DataBreachAttempt,
}

/// Category an action belongs to, for reporting roll-ups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditCategory {
    Access,
    Modification,
    Auth,
    Admin,
    Security,
}

impl AuditAction {
    /// All actions.
    pub const ALL: [AuditAction; 18] = [
        AuditAction::View,
        AuditAction::Export,
        AuditAction::Print,
        AuditAction::Create,
        AuditAction::Update,
        AuditAction::Delete,
        AuditAction::Login,
        AuditAction::Logout,
        AuditAction::LoginFailed,
        AuditAction::PasswordChange,
        AuditAction::PermissionChange,
        AuditAction::RoleAssigned,
        AuditAction::UserCreated,
        AuditAction::UserDeactivated,
        AuditAction::ConfigChange,
        AuditAction::UnauthorizedAccess,
        AuditAction::SuspiciousActivity,
        AuditAction::DataBreachAttempt,
    ];

    /// Wire spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::View => "VIEW",
            AuditAction::Export => "EXPORT",
            AuditAction::Print => "PRINT",
            AuditAction::Create => "CREATE",
            AuditAction::Update => "UPDATE",
            AuditAction::Delete => "DELETE",
            AuditAction::Login => "LOGIN",
            AuditAction::Logout => "LOGOUT",
            AuditAction::LoginFailed => "LOGIN_FAILED",
            AuditAction::PasswordChange => "PASSWORD_CHANGE",
            AuditAction::PermissionChange => "PERMISSION_CHANGE",
            AuditAction::RoleAssigned => "ROLE_ASSIGNED",
            AuditAction::UserCreated => "USER_CREATED",
            AuditAction::UserDeactivated => "USER_DEACTIVATED",
            AuditAction::ConfigChange => "CONFIG_CHANGE",
            AuditAction::UnauthorizedAccess => "UNAUTHORIZED_ACCESS",
            AuditAction::SuspiciousActivity => "SUSPICIOUS_ACTIVITY",
            AuditAction::DataBreachAttempt => "DATA_BREACH_ATTEMPT",
        }
    }

    /// Reporting category.
    pub fn category(&self) -> AuditCategory {
        use AuditAction::*;
        match self {
            View | Export | Print => AuditCategory::Access,
            Create | Update | Delete => AuditCategory::Modification,
            Login | Logout | LoginFailed | PasswordChange => AuditCategory::Auth,
            PermissionChange | RoleAssigned | UserCreated | UserDeactivated | ConfigChange => {
                AuditCategory::Admin
            }
            UnauthorizedAccess | SuspiciousActivity | DataBreachAttempt => AuditCategory::Security,
        }
    }

    /// Security events are worth flagging regardless of row severity.
    pub fn is_security_event(&self) -> bool {
        self.category() == AuditCategory::Security
    }
}

/// What the action touched.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditResource {
    Patient,
    HistoriaClinica,
    Empresa,
    User,
    Role,
    Team,
    Organization,
    Invitation,
    Notification,
    ScheduledExam,
    Report,
    System,
}

impl AuditResource {
    /// All resources.
    pub const ALL: [AuditResource; 12] = [
        AuditResource::Patient,
        AuditResource::HistoriaClinica,
        AuditResource::Empresa,
        AuditResource::User,
        AuditResource::Role,
        AuditResource::Team,
        AuditResource::Organization,
        AuditResource::Invitation,
        AuditResource::Notification,
        AuditResource::ScheduledExam,
        AuditResource::Report,
        AuditResource::System,
    ];

    /// Wire spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditResource::Patient => "PATIENT",
            AuditResource::HistoriaClinica => "HISTORIA_CLINICA",
            AuditResource::Empresa => "EMPRESA",
            AuditResource::User => "USER",
            AuditResource::Role => "ROLE",
            AuditResource::Team => "TEAM",
            AuditResource::Organization => "ORGANIZATION",
            AuditResource::Invitation => "INVITATION",
            AuditResource::Notification => "NOTIFICATION",
            AuditResource::ScheduledExam => "SCHEDULED_EXAM",
            AuditResource::Report => "REPORT",
            AuditResource::System => "SYSTEM",
        }
    }
}

/// Row severity.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditSeverity {
    #[default]
    Low,
    Medium,
    High,
    Critical,
}

impl AuditSeverity {
    /// All severities, lowest first.
    pub const ALL: [AuditSeverity; 4] = [
        AuditSeverity::Low,
        AuditSeverity::Medium,
        AuditSeverity::High,
        AuditSeverity::Critical,
    ];

    /// Wire spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditSeverity::Low => "LOW",
            AuditSeverity::Medium => "MEDIUM",
            AuditSeverity::High => "HIGH",
            AuditSeverity::Critical => "CRITICAL",
        }
    }
}

/// Where the request came from, when resolvable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Geolocation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

/// What the request came from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub browser: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_type: Option<String>,
}

fn default_timestamp() -> DateTime<Utc> {
    Utc::now()
}

fn default_true() -> bool {
    true
}

fn is_true(value: &bool) -> bool {
    *value
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// One audit row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AuditLog {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub action: AuditAction,
    pub resource: AuditResource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<ObjectId>,
    /// Human description of what happened.
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<ObjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<ObjectId>,
    #[serde(default = "default_timestamp")]
    pub timestamp: DateTime<Utc>,
    pub ip_address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geolocation: Option<Geolocation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<DeviceInfo>,
    #[serde(default)]
    pub severity: AuditSeverity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BTreeMap<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_values: Option<BTreeMap<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_values: Option<BTreeMap<String, Value>>,
    /// Compliance field: the patient whose data was touched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<ObjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_associate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retention_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub archived: bool,
}

impl Normalize for AuditLog {
    fn normalize(&mut self) {
        trim(&mut self.description);
        trim(&mut self.ip_address);
        clean(&mut self.user_name);
        clean(&mut self.session_id);
        clean(&mut self.business_associate);
        clean(&mut self.purpose);
        clean(&mut self.error_message);
    }
}

impl Validate for AuditLog {
    fn collect(&self, path: &str, out: &mut Violations) {
        check_id_opt(out, field_path(path, "_id"), self.id.as_ref());
        require_nonempty(
            out,
            field_path(path, "description"),
            &self.description,
            "description is required",
        );
        require_nonempty(
            out,
            field_path(path, "ipAddress"),
            &self.ip_address,
            "IP address is required",
        );
        check_id_opt(out, field_path(path, "resourceId"), self.resource_id.as_ref());
        check_id_opt(out, field_path(path, "userId"), self.user_id.as_ref());
        check_id_opt(out, field_path(path, "organization"), self.organization.as_ref());
        check_id_opt(out, field_path(path, "patientId"), self.patient_id.as_ref());
        if !self.success && self.error_message.is_none() {
            out.push(
                field_path(path, "errorMessage"),
                "required when success is false",
            );
        }
    }
}

const ACTION_VALUES: &[&str] = &[
    "VIEW",
    "EXPORT",
    "PRINT",
    "CREATE",
    "UPDATE",
    "DELETE",
    "LOGIN",
    "LOGOUT",
    "LOGIN_FAILED",
    "PASSWORD_CHANGE",
    "PERMISSION_CHANGE",
    "ROLE_ASSIGNED",
    "USER_CREATED",
    "USER_DEACTIVATED",
    "CONFIG_CHANGE",
    "UNAUTHORIZED_ACCESS",
    "SUSPICIOUS_ACTIVITY",
    "DATA_BREACH_ATTEMPT",
];

const RESOURCE_VALUES: &[&str] = &[
    "PATIENT",
    "HISTORIA_CLINICA",
    "EMPRESA",
    "USER",
    "ROLE",
    "TEAM",
    "ORGANIZATION",
    "INVITATION",
    "NOTIFICATION",
    "SCHEDULED_EXAM",
    "REPORT",
    "SYSTEM",
];

const SEVERITY_VALUES: &[&str] = &["LOW", "MEDIUM", "HIGH", "CRITICAL"];

/// Strict: a compliance row with an undocumented field is rejected, not
/// quietly trimmed. Rows are append-only, so no update or public
/// projection exists.
pub static AUDIT_LOG: EntityDescriptor = EntityDescriptor {
    entity: "auditLog",
    strict: true,
    audited: false,
    fields: &[
        FieldSpec::new("_id", false, FieldRole::Identifier),
        FieldSpec::new("action", true, FieldRole::Data).values(ACTION_VALUES),
        FieldSpec::new("resource", true, FieldRole::Data).values(RESOURCE_VALUES),
        FieldSpec::new("resourceId", false, FieldRole::Data),
        FieldSpec::new("description", true, FieldRole::Data).message("description is required"),
        FieldSpec::new("userId", false, FieldRole::Data),
        FieldSpec::new("userName", false, FieldRole::Data),
        FieldSpec::new("organization", false, FieldRole::Data),
        FieldSpec::new("timestamp", false, FieldRole::Data),
        FieldSpec::new("ipAddress", true, FieldRole::Data).message("IP address is required"),
        FieldSpec::new("geolocation", false, FieldRole::Data),
        FieldSpec::new("device", false, FieldRole::Data),
        FieldSpec::new("severity", false, FieldRole::Data).values(SEVERITY_VALUES),
        FieldSpec::new("sessionId", false, FieldRole::Data),
        FieldSpec::new("metadata", false, FieldRole::Data),
        FieldSpec::new("oldValues", false, FieldRole::Data),
        FieldSpec::new("newValues", false, FieldRole::Data),
        FieldSpec::new("patientId", false, FieldRole::Data),
        FieldSpec::new("businessAssociate", false, FieldRole::Data),
        FieldSpec::new("purpose", false, FieldRole::Data),
        FieldSpec::new("success", false, FieldRole::Data),
        FieldSpec::new("errorMessage", false, FieldRole::Data),
        FieldSpec::new("retentionDate", false, FieldRole::Data),
        FieldSpec::new("archived", false, FieldRole::Data),
    ],
    variants: &[
        SchemaVariant::Canonical,
        SchemaVariant::Create,
        SchemaVariant::Document,
    ],
};

/// Query parameters for the audit review surface. Pages of 50 by
/// default, newest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<ObjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<ObjectId>,
    #[serde(default, deserialize_with = "blank_as_none")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<AuditAction>,
    #[serde(default, deserialize_with = "blank_as_none")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<AuditResource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<ObjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateString>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateString>,
    #[serde(default, deserialize_with = "blank_as_none")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<AuditSeverity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_review_limit")]
    pub limit: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
    #[serde(default = "default_sort_by")]
    pub sort_by: String,
    #[serde(default)]
    pub sort_order: SortOrder,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_archived: Option<bool>,
}

fn default_sort_by() -> String {
    "timestamp".to_string()
}

impl Default for AuditLogFilters {
    fn default() -> Self {
        Self {
            user_id: None,
            patient_id: None,
            action: None,
            resource: None,
            resource_id: None,
            start_date: None,
            end_date: None,
            severity: None,
            search: None,
            page: default_page(),
            limit: default_review_limit(),
            offset: None,
            sort_by: default_sort_by(),
            sort_order: SortOrder::default(),
            include_archived: None,
        }
    }
}

impl Normalize for AuditLogFilters {
    fn normalize(&mut self) {
        clean(&mut self.search);
        trim(&mut self.sort_by);
    }
}

impl Validate for AuditLogFilters {
    fn collect(&self, path: &str, out: &mut Violations) {
        check_bounds(out, path, self.page, self.limit);
        check_id_opt(out, field_path(path, "userId"), self.user_id.as_ref());
        check_id_opt(out, field_path(path, "patientId"), self.patient_id.as_ref());
        check_id_opt(out, field_path(path, "resourceId"), self.resource_id.as_ref());
        for (name, value) in [
            ("startDate", self.start_date.as_ref()),
            ("endDate", self.end_date.as_ref()),
        ] {
            if let Some(date) = value {
                if !date.is_wellformed() {
                    out.push(
                        field_path(path, name),
                        "expected an RFC 3339 date-time or YYYY-MM-DD",
                    );
                }
            }
        }
    }
}

/// Read-side statistics shape for the audit dashboard. Histogram keys
/// are the enum wire spellings; producers fill them, this layer only
/// validates shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditStats {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub by_action: BTreeMap<AuditAction, u64>,
    #[serde(default)]
    pub by_severity: BTreeMap<AuditSeverity, u64>,
    #[serde(default)]
    pub failures: u64,
}
