//! # Scheduled Exams
//!
//! A scheduling event: one company, one exam type, one date, a roster
//! of registered patients. The event-level status enum is advisory and
//! lives on the query surface; the per-patient registration status is
//! the sub-state machine this layer actually validates. Generated
//! clinical-record links and the statistics block are computed by the
//! backend and never accepted from callers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ergon_core::descriptor::{EntityDescriptor, FieldRole, FieldSpec, SchemaVariant};
use ergon_core::normalize::{blank_as_none, clean, trim, trim_opt, Normalize};
use ergon_core::temporal::{deserialize_flexible, deserialize_flexible_opt};
use ergon_core::validate::{
    check_id, check_id_opt, field_path, index_path, require_nonempty, Validate, Violations,
};
use ergon_core::{Authoring, DateString, ObjectId};

const MSG_NAME: &str = "Nombre del examen programado es requerido";
const MSG_LOCATION: &str = "Ubicación es requerida";

/// Advisory event lifecycle, used on the query surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduledExamStatus {
    #[default]
    Draft,
    OpenRegistration,
    Closed,
    InProgress,
    Completed,
    Cancelled,
}

impl ScheduledExamStatus {
    /// All statuses, in workflow order.
    pub const ALL: [ScheduledExamStatus; 6] = [
        ScheduledExamStatus::Draft,
        ScheduledExamStatus::OpenRegistration,
        ScheduledExamStatus::Closed,
        ScheduledExamStatus::InProgress,
        ScheduledExamStatus::Completed,
        ScheduledExamStatus::Cancelled,
    ];

    /// Wire spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            ScheduledExamStatus::Draft => "draft",
            ScheduledExamStatus::OpenRegistration => "open_registration",
            ScheduledExamStatus::Closed => "closed",
            ScheduledExamStatus::InProgress => "in_progress",
            ScheduledExamStatus::Completed => "completed",
            ScheduledExamStatus::Cancelled => "cancelled",
        }
    }

    /// True once the event can no longer progress.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ScheduledExamStatus::Completed | ScheduledExamStatus::Cancelled
        )
    }
}

/// Occupational exam type, shared with clinical records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExamType {
    /// Pre-employment.
    Ingreso,
    /// Periodic health check.
    Periodico,
    /// Exit exam.
    Egreso,
    /// Sector change.
    CambioSector,
}

impl ExamType {
    /// All exam types.
    pub const ALL: [ExamType; 4] = [
        ExamType::Ingreso,
        ExamType::Periodico,
        ExamType::Egreso,
        ExamType::CambioSector,
    ];

    /// Wire spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            ExamType::Ingreso => "ingreso",
            ExamType::Periodico => "periodico",
            ExamType::Egreso => "egreso",
            ExamType::CambioSector => "cambio_sector",
        }
    }
}

/// Per-patient registration state within one event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatientRegistrationStatus {
    /// Assigned to the event.
    #[default]
    Registered,
    /// Confirmed attendance.
    Confirmed,
    /// Clinical record created.
    Completed,
    /// Did not attend.
    NoShow,
}

impl PatientRegistrationStatus {
    /// All registration statuses.
    pub const ALL: [PatientRegistrationStatus; 4] = [
        PatientRegistrationStatus::Registered,
        PatientRegistrationStatus::Confirmed,
        PatientRegistrationStatus::Completed,
        PatientRegistrationStatus::NoShow,
    ];

    /// Wire spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            PatientRegistrationStatus::Registered => "registered",
            PatientRegistrationStatus::Confirmed => "confirmed",
            PatientRegistrationStatus::Completed => "completed",
            PatientRegistrationStatus::NoShow => "no_show",
        }
    }

    /// True once the registration can no longer progress.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PatientRegistrationStatus::Completed | PatientRegistrationStatus::NoShow
        )
    }

    /// Whether `next` is a legal successor state.
    pub fn can_transition_to(&self, next: PatientRegistrationStatus) -> bool {
        use PatientRegistrationStatus::*;
        match self {
            Registered => matches!(next, Confirmed | Completed | NoShow),
            Confirmed => matches!(next, Completed | NoShow),
            Completed | NoShow => false,
        }
    }
}

fn default_registered_at() -> DateTime<Utc> {
    Utc::now()
}

/// One patient's registration within a scheduled exam.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientRegistration {
    pub patient: ObjectId,
    #[serde(default)]
    pub status: PatientRegistrationStatus,
    #[serde(default = "default_registered_at")]
    pub registered_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    /// Special instructions for this patient.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// 0 is normal; higher means priority.
    #[serde(default)]
    pub priority: i32,
}

impl Normalize for PatientRegistration {
    fn normalize(&mut self) {
        clean(&mut self.notes);
    }
}

impl Validate for PatientRegistration {
    fn collect(&self, path: &str, out: &mut Violations) {
        check_id(out, field_path(path, "patient"), &self.patient);
    }
}

/// Registration fields without the patient reference, for roster
/// management payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationData {
    #[serde(default)]
    pub status: PatientRegistrationStatus,
    #[serde(default = "default_registered_at")]
    pub registered_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub priority: i32,
}

/// Backend-computed roster statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledExamStats {
    #[serde(default)]
    pub total_registered: u32,
    #[serde(default)]
    pub total_completed: u32,
    #[serde(default)]
    pub completion_rate: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

/// Canonical scheduled exam.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledExam {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Accepts either wire form; a bare date lands at midnight UTC.
    #[serde(deserialize_with = "deserialize_flexible")]
    pub exam_date: DateTime<Utc>,
    pub location: String,
    /// Company whose workers are examined.
    pub company: ObjectId,
    pub exam_type: ExamType,
    #[serde(default)]
    pub assigned_staff: Vec<ObjectId>,
    #[serde(default)]
    pub registered_patients: Vec<PatientRegistration>,
    /// Clinical records generated from this event.
    #[serde(default)]
    pub generated_historias: Vec<ObjectId>,
    pub organization: ObjectId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<ScheduledExamStats>,
    #[serde(flatten)]
    pub authoring: Authoring,
}

fn collect_id_list(out: &mut Violations, prefix: String, ids: &[ObjectId]) {
    for (i, id) in ids.iter().enumerate() {
        check_id(out, index_path(&prefix, i), id);
    }
}

impl Normalize for ScheduledExam {
    fn normalize(&mut self) {
        trim(&mut self.name);
        trim(&mut self.location);
        clean(&mut self.description);
        for registration in &mut self.registered_patients {
            registration.normalize();
        }
        self.authoring.normalize();
    }
}

impl Validate for ScheduledExam {
    fn collect(&self, path: &str, out: &mut Violations) {
        check_id_opt(out, field_path(path, "_id"), self.id.as_ref());
        require_nonempty(out, field_path(path, "name"), &self.name, MSG_NAME);
        require_nonempty(out, field_path(path, "location"), &self.location, MSG_LOCATION);
        check_id(out, field_path(path, "company"), &self.company);
        check_id(out, field_path(path, "organization"), &self.organization);
        collect_id_list(out, field_path(path, "assignedStaff"), &self.assigned_staff);
        collect_id_list(
            out,
            field_path(path, "generatedHistorias"),
            &self.generated_historias,
        );
        for (i, registration) in self.registered_patients.iter().enumerate() {
            let prefix = index_path(&field_path(path, "registeredPatients"), i);
            registration.collect(&prefix, out);
        }
        self.authoring.collect(path, out);
    }
}

/// Creation payload; generated links, stats, and the organization are
/// backend-owned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledExamCreate {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(deserialize_with = "deserialize_flexible")]
    pub exam_date: DateTime<Utc>,
    pub location: String,
    pub company: ObjectId,
    pub exam_type: ExamType,
    #[serde(default)]
    pub assigned_staff: Vec<ObjectId>,
    #[serde(default)]
    pub registered_patients: Vec<PatientRegistration>,
}

impl Normalize for ScheduledExamCreate {
    fn normalize(&mut self) {
        trim(&mut self.name);
        trim(&mut self.location);
        clean(&mut self.description);
        for registration in &mut self.registered_patients {
            registration.normalize();
        }
    }
}

impl Validate for ScheduledExamCreate {
    fn collect(&self, path: &str, out: &mut Violations) {
        require_nonempty(out, field_path(path, "name"), &self.name, MSG_NAME);
        require_nonempty(out, field_path(path, "location"), &self.location, MSG_LOCATION);
        check_id(out, field_path(path, "company"), &self.company);
        collect_id_list(out, field_path(path, "assignedStaff"), &self.assigned_staff);
        for (i, registration) in self.registered_patients.iter().enumerate() {
            let prefix = index_path(&field_path(path, "registeredPatients"), i);
            registration.collect(&prefix, out);
        }
    }
}

/// Partial update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledExamUpdate {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_flexible_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub exam_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<ObjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exam_type: Option<ExamType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_staff: Option<Vec<ObjectId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registered_patients: Option<Vec<PatientRegistration>>,
}

impl Normalize for ScheduledExamUpdate {
    fn normalize(&mut self) {
        trim_opt(&mut self.name);
        trim_opt(&mut self.location);
        clean(&mut self.description);
        if let Some(registrations) = &mut self.registered_patients {
            for registration in registrations {
                registration.normalize();
            }
        }
    }
}

impl Validate for ScheduledExamUpdate {
    fn collect(&self, path: &str, out: &mut Violations) {
        check_id_opt(out, field_path(path, "_id"), self.id.as_ref());
        if let Some(name) = &self.name {
            require_nonempty(out, field_path(path, "name"), name, MSG_NAME);
        }
        if let Some(location) = &self.location {
            require_nonempty(out, field_path(path, "location"), location, MSG_LOCATION);
        }
        check_id_opt(out, field_path(path, "company"), self.company.as_ref());
        if let Some(staff) = &self.assigned_staff {
            collect_id_list(out, field_path(path, "assignedStaff"), staff);
        }
        if let Some(registrations) = &self.registered_patients {
            for (i, registration) in registrations.iter().enumerate() {
                let prefix = index_path(&field_path(path, "registeredPatients"), i);
                registration.collect(&prefix, out);
            }
        }
    }
}

// ─── Roster operations ──────────────────────────────────────────────────

/// What to do with one patient on the roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatientActionKind {
    Add,
    Remove,
    Update,
}

/// One roster change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientAction {
    pub patient_id: ObjectId,
    pub action: PatientActionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registration_data: Option<RegistrationData>,
}

/// Batch roster management for one event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagePatients {
    pub scheduled_exam_id: ObjectId,
    pub patients: Vec<PatientAction>,
}

impl Normalize for ManagePatients {
    fn normalize(&mut self) {
        for action in &mut self.patients {
            if let Some(data) = &mut action.registration_data {
                clean(&mut data.notes);
            }
        }
    }
}

impl Validate for ManagePatients {
    fn collect(&self, path: &str, out: &mut Violations) {
        check_id(
            out,
            field_path(path, "scheduledExamId"),
            &self.scheduled_exam_id,
        );
        for (i, action) in self.patients.iter().enumerate() {
            let prefix = index_path(&field_path(path, "patients"), i);
            check_id(out, field_path(&prefix, "patientId"), &action.patient_id);
        }
    }
}

/// Move one registration to a new status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePatientRegistration {
    pub scheduled_exam_id: ObjectId,
    pub patient_id: ObjectId,
    pub status: PatientRegistrationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Normalize for UpdatePatientRegistration {
    fn normalize(&mut self) {
        clean(&mut self.notes);
    }
}

impl Validate for UpdatePatientRegistration {
    fn collect(&self, path: &str, out: &mut Violations) {
        check_id(
            out,
            field_path(path, "scheduledExamId"),
            &self.scheduled_exam_id,
        );
        check_id(out, field_path(path, "patientId"), &self.patient_id);
    }
}

/// Values to prefill in generated clinical records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrefillData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fecha: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tipo_examen: Option<String>,
}

/// Generate clinical records for registered patients. When no patient
/// list is given, the backend generates for the whole roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateHistorias {
    pub scheduled_exam_id: ObjectId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_ids: Option<Vec<ObjectId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefill_data: Option<PrefillData>,
}

impl Normalize for GenerateHistorias {
    fn normalize(&mut self) {
        if let Some(data) = &mut self.prefill_data {
            clean(&mut data.fecha);
            clean(&mut data.tipo_examen);
        }
    }
}

impl Validate for GenerateHistorias {
    fn collect(&self, path: &str, out: &mut Violations) {
        check_id(
            out,
            field_path(path, "scheduledExamId"),
            &self.scheduled_exam_id,
        );
        if let Some(ids) = &self.patient_ids {
            collect_id_list(out, field_path(path, "patientIds"), ids);
        }
    }
}

/// Query parameters for scheduled-exam listings; unpaginated by
/// contract.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledExamFilters {
    #[serde(default, deserialize_with = "blank_as_none")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ScheduledExamStatus>,
    #[serde(default, deserialize_with = "blank_as_none")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exam_type: Option<ExamType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<ObjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_staff: Option<ObjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_from: Option<DateString>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_to: Option<DateString>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl Normalize for ScheduledExamFilters {
    fn normalize(&mut self) {
        clean(&mut self.location);
    }
}

impl Validate for ScheduledExamFilters {
    fn collect(&self, path: &str, out: &mut Violations) {
        check_id_opt(out, field_path(path, "company"), self.company.as_ref());
        check_id_opt(
            out,
            field_path(path, "assignedStaff"),
            self.assigned_staff.as_ref(),
        );
        for (name, value) in [
            ("dateFrom", self.date_from.as_ref()),
            ("dateTo", self.date_to.as_ref()),
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

const STATUS_VALUES: &[&str] = &[
    "draft",
    "open_registration",
    "closed",
    "in_progress",
    "completed",
    "cancelled",
];

const EXAM_TYPE_VALUES: &[&str] = &["ingreso", "periodico", "egreso", "cambio_sector"];

pub static SCHEDULED_EXAM: EntityDescriptor = EntityDescriptor {
    entity: "scheduledExam",
    strict: false,
    audited: true,
    fields: &[
        FieldSpec::new("_id", false, FieldRole::Identifier),
        FieldSpec::new("name", true, FieldRole::Data).message(MSG_NAME),
        FieldSpec::new("description", false, FieldRole::Data),
        FieldSpec::new("examDate", true, FieldRole::Data),
        FieldSpec::new("location", true, FieldRole::Data).message(MSG_LOCATION),
        FieldSpec::new("company", true, FieldRole::Data),
        FieldSpec::new("examType", true, FieldRole::Data).values(EXAM_TYPE_VALUES),
        FieldSpec::new("assignedStaff", false, FieldRole::Data),
        FieldSpec::new("registeredPatients", false, FieldRole::Data),
        FieldSpec::new("generatedHistorias", false, FieldRole::ServerManaged),
        FieldSpec::new("organization", true, FieldRole::Tenant),
        FieldSpec::new("stats", false, FieldRole::ServerManaged),
    ],
    variants: &SchemaVariant::ALL,
};
