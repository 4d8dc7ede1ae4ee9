//! # Ergon Clinical Contracts
//!
//! Validation schemas for the occupational-health side of the platform:
//! the companies whose workers are examined ([`empresa`]), the workers
//! themselves ([`paciente`]), their clinical records ([`historia`]),
//! and the scheduled exam events that generate those records
//! ([`scheduled_exam`]).
//!
//! Domain vocabulary stays in Spanish where the medical forms use it;
//! scheduling and registration vocabulary is English, matching the wire
//! contract.

pub mod empresa;
pub mod historia;
pub mod paciente;
pub mod scheduled_exam;

pub use empresa::{Empresa, EmpresaCreate, EmpresaFilters, EmpresaUpdate, Sector};
pub use historia::{
    AntecedentesLaborales, AntecedentesPersonalesFamiliares, Aptitud, ClasificacionAptitud,
    DeclaracionJurada, Examen, ExamenCheckbox, ExamenComplementario, ExamenesComplementarios,
    Firmas, HistoriaClinica, HistoriaClinicaCreate, HistoriaClinicaFilters, HistoriaClinicaUpdate,
    Preexistencias,
};
pub use paciente::{
    EstadoCivil, Hijo, Paciente, PacienteCreate, PacienteFilters, PacienteUpdate, Sexo,
};
pub use scheduled_exam::{
    ExamType, GenerateHistorias, ManagePatients, PatientAction, PatientActionKind,
    PatientRegistration, PatientRegistrationStatus, PrefillData, RegistrationData, ScheduledExam,
    ScheduledExamCreate, ScheduledExamFilters, ScheduledExamStats, ScheduledExamStatus,
    ScheduledExamUpdate, UpdatePatientRegistration,
};
