//! # Admin Aggregates
//!
//! Read-side shapes for cross-entity reporting: dashboard counts,
//! relationship breakdowns, the admin activity feed, and the user
//! management listing filters. These are output contracts: they state
//! the shape a reporting service must produce, never how it is
//! computed.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use ergon_core::normalize::{blank_as_none, clean, Normalize};
use ergon_core::pagination::{check_bounds, default_page, default_review_limit};
use ergon_core::validate::{check_id, check_id_opt, field_path, index_path, Validate, Violations};
use ergon_core::ObjectId;

/// Top-line entity counts for the admin panel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    pub users: u64,
    pub roles: u64,
    pub organizations: u64,
    pub teams: u64,
    pub permissions: u64,
}

/// Patients grouped under one company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmpresaBreakdown {
    pub empresa_id: ObjectId,
    pub empresa_name: String,
    pub count: u64,
}

/// Clinical records grouped under one patient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PacienteBreakdown {
    pub paciente_id: ObjectId,
    pub paciente_name: String,
    pub count: u64,
}

/// Records created by one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserBreakdown {
    pub user_id: ObjectId,
    pub user_name: String,
    pub count: u64,
}

/// Per-user creation counts, split by entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsByUser {
    #[serde(default)]
    pub pacientes: Vec<UserBreakdown>,
    #[serde(default)]
    pub empresas: Vec<UserBreakdown>,
    #[serde(default)]
    pub historias: Vec<UserBreakdown>,
}

/// Relationship breakdowns behind the dashboard drill-downs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardRelationships {
    #[serde(default)]
    pub pacientes_by_empresa: Vec<EmpresaBreakdown>,
    #[serde(default)]
    pub historias_by_paciente: Vec<PacienteBreakdown>,
    #[serde(default)]
    pub stats_by_user: StatsByUser,
}

/// Clinical dashboard counts plus optional drill-down data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub pacientes: u64,
    pub empresas: u64,
    pub historias_clinicas: u64,
    pub usuarios: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationships: Option<DashboardRelationships>,
}

fn collect_user_breakdowns(out: &mut Violations, prefix: String, rows: &[UserBreakdown]) {
    for (i, row) in rows.iter().enumerate() {
        check_id(out, field_path(&index_path(&prefix, i), "userId"), &row.user_id);
    }
}

impl Normalize for DashboardStats {
    fn normalize(&mut self) {}
}

impl Validate for DashboardStats {
    fn collect(&self, path: &str, out: &mut Violations) {
        let Some(rel) = &self.relationships else {
            return;
        };
        let rel_path = field_path(path, "relationships");
        for (i, row) in rel.pacientes_by_empresa.iter().enumerate() {
            let prefix = index_path(&field_path(&rel_path, "pacientesByEmpresa"), i);
            check_id(out, field_path(&prefix, "empresaId"), &row.empresa_id);
        }
        for (i, row) in rel.historias_by_paciente.iter().enumerate() {
            let prefix = index_path(&field_path(&rel_path, "historiasByPaciente"), i);
            check_id(out, field_path(&prefix, "pacienteId"), &row.paciente_id);
        }
        let by_user = field_path(&rel_path, "statsByUser");
        collect_user_breakdowns(
            out,
            field_path(&by_user, "pacientes"),
            &rel.stats_by_user.pacientes,
        );
        collect_user_breakdowns(
            out,
            field_path(&by_user, "empresas"),
            &rel.stats_by_user.empresas,
        );
        collect_user_breakdowns(
            out,
            field_path(&by_user, "historias"),
            &rel.stats_by_user.historias,
        );
    }
}

/// One entry of the admin activity feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLog {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user: ObjectId,
    pub action: String,
    pub resource: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<ObjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<BTreeMap<String, Value>>,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    /// Organization context of the activity.
    pub organization: ObjectId,
}

impl Normalize for ActivityLog {
    fn normalize(&mut self) {
        clean(&mut self.ip);
        clean(&mut self.user_agent);
    }
}

impl Validate for ActivityLog {
    fn collect(&self, path: &str, out: &mut Violations) {
        check_id_opt(out, field_path(path, "_id"), self.id.as_ref());
        check_id(out, field_path(path, "user"), &self.user);
        check_id_opt(out, field_path(path, "resourceId"), self.resource_id.as_ref());
        check_id(out, field_path(path, "organization"), &self.organization);
    }
}

/// Account-status filter on the user management listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    #[default]
    All,
    Active,
    Inactive,
}

/// Query parameters for the admin user-management listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserManagementFilters {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_review_limit")]
    pub limit: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub status: Option<AccountStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<ObjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<ObjectId>,
}

impl UserManagementFilters {
    /// Effective status; an omitted or blank value means `all`.
    pub fn status(&self) -> AccountStatus {
        self.status.unwrap_or_default()
    }
}

impl Default for UserManagementFilters {
    fn default() -> Self {
        Self {
            page: default_page(),
            limit: default_review_limit(),
            search: None,
            status: None,
            role: None,
            team: None,
        }
    }
}

impl Normalize for UserManagementFilters {
    fn normalize(&mut self) {
        clean(&mut self.search);
    }
}

impl Validate for UserManagementFilters {
    fn collect(&self, path: &str, out: &mut Violations) {
        check_bounds(out, path, self.page, self.limit);
        check_id_opt(out, field_path(path, "role"), self.role.as_ref());
        check_id_opt(out, field_path(path, "team"), self.team.as_ref());
    }
}
