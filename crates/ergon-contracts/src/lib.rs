//! # Ergon Contracts
//!
//! Umbrella crate for the Ergon occupational-health contract package.
//! Depend on this crate to get every entity schema, the shared
//! primitives, and the [`registry`] that maps entity names to their
//! field descriptors.
//!
//! The package is a pure validation layer: no I/O, no persistence, no
//! transport. A frontend validates form input against the create
//! variants; a backend validates request bodies and query strings
//! against the create/update/filter variants and injects tenant and
//! authoring fields itself.

pub mod registry;

pub use ergon_core::{
    ApiResponse, Authoring, DateString, EntityDescriptor, FieldRole, FieldSpec, InvalidDateString,
    InvalidId, Modification, Normalize, ObjectId, Pagination, Persisted, Reference, SchemaVariant,
    SortOrder, Validate, ValidationError, Violation, Violations,
};

pub use ergon_identity::{
    AuthState, ChangePassword, Invitation, InvitationCreate, InvitationResponse, InvitationRole,
    InvitationStatus, Login, MarkNotificationRead, Notification, NotificationChannels,
    NotificationCreate, NotificationType, Organization, OrganizationCreate, OrganizationRef,
    OrganizationSettings, Permission, RelatedEntityType, RespondToInvitation, Role, RoleCreate,
    RoleRef, Team, TeamCreate, TeamRef, TeamSettings, Theme, User, UserCreate, UserPreferences,
    UserProfile, UserProfileUpdate, UserPublic,
};

pub use ergon_clinical::{
    AntecedentesLaborales, AntecedentesPersonalesFamiliares, Aptitud, ClasificacionAptitud,
    DeclaracionJurada, Empresa, EmpresaCreate, EmpresaFilters, EmpresaUpdate, EstadoCivil, Examen,
    ExamenCheckbox, ExamenComplementario, ExamenesComplementarios, ExamType, Firmas,
    GenerateHistorias, Hijo, HistoriaClinica, HistoriaClinicaCreate, HistoriaClinicaFilters,
    HistoriaClinicaUpdate, ManagePatients, Paciente, PacienteCreate, PacienteFilters,
    PacienteUpdate, PatientAction, PatientActionKind, PatientRegistration,
    PatientRegistrationStatus, Preexistencias, PrefillData, RegistrationData, ScheduledExam,
    ScheduledExamCreate, ScheduledExamFilters, ScheduledExamStats, ScheduledExamStatus,
    ScheduledExamUpdate, Sector, Sexo, UpdatePatientRegistration,
};

pub use ergon_audit::{
    AccountStatus, ActivityLog, AdminStats, AuditAction, AuditCategory, AuditLog, AuditLogFilters,
    AuditResource, AuditSeverity, AuditStats, DashboardRelationships, DashboardStats, DeviceInfo,
    EmpresaBreakdown, Geolocation, PacienteBreakdown, StatsByUser, UserBreakdown,
    UserManagementFilters,
};
