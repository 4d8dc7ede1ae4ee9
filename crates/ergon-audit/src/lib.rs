//! # Ergon Audit Contracts
//!
//! The compliance and administration read-side of the platform: the
//! append-only audit log with its strict schema ([`log`]), and the
//! admin dashboard aggregates and listing filters ([`admin`]).

pub mod admin;
pub mod log;

pub use admin::{
    AccountStatus, ActivityLog, AdminStats, DashboardRelationships, DashboardStats,
    EmpresaBreakdown, PacienteBreakdown, StatsByUser, UserBreakdown, UserManagementFilters,
};
pub use log::{
    AuditAction, AuditCategory, AuditLog, AuditLogFilters, AuditResource, AuditSeverity,
    AuditStats, DeviceInfo, Geolocation, AUDIT_LOG,
};
