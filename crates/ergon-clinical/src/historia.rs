//! # Historia Clínica (Clinical Record)
//!
//! The medical record produced by one occupational exam of one patient.
//! Two references are immutable once the record exists: the patient and
//! the owning organization. The medical sections are free-form keyed
//! maps because each clinic configures its own form rows; this layer
//! validates structure, not medical content.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use ergon_core::descriptor::{EntityDescriptor, FieldRole, FieldSpec, SchemaVariant};
use ergon_core::normalize::{clean, trim, trim_opt, Normalize};
use ergon_core::pagination::{check_bounds, default_limit, default_page};
use ergon_core::validate::{
    check_id, check_id_opt, field_path, require_nonempty, Validate, Violations,
};
use ergon_core::{Authoring, DateString, ObjectId};

const MSG_FECHA: &str = "Fecha es requerida";

// ─── Medical sub-sections ───────────────────────────────────────────────

/// Personal and family medical history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AntecedentesPersonalesFamiliares {
    #[serde(default)]
    pub checkboxes: BTreeMap<String, bool>,
    #[serde(default)]
    pub valores: BTreeMap<String, String>,
    #[serde(default)]
    pub inmunizaciones: Vec<String>,
    #[serde(default)]
    pub observaciones: String,
}

/// Occupational history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AntecedentesLaborales {
    #[serde(default)]
    pub trabajos_previos: String,
    #[serde(default)]
    pub exposicion_riesgos: String,
    #[serde(default)]
    pub accidentes_trabajo: String,
    #[serde(default)]
    pub incapacidades_secuelas: String,
}

/// Per-item fitness mark: normal, abnormal, or not yet marked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Aptitud {
    N,
    A,
    #[default]
    #[serde(rename = "")]
    SinMarcar,
}

/// One checkbox row of the physical exam.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamenCheckbox {
    #[serde(default)]
    pub aptitud: Aptitud,
}

/// Physical exam: free-form keyed values plus per-item fitness marks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Examen {
    #[serde(default)]
    pub valores: BTreeMap<String, String>,
    #[serde(default)]
    pub checkboxes: BTreeMap<String, ExamenCheckbox>,
    #[serde(default)]
    pub observaciones: String,
    #[serde(rename = "numeroRX", default)]
    pub numero_rx: String,
}

/// One complementary exam row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamenComplementario {
    #[serde(default)]
    pub solicitado: bool,
    #[serde(default)]
    pub fecha: String,
    #[serde(default)]
    pub n: bool,
    #[serde(default)]
    pub a: bool,
    #[serde(default)]
    pub aptitud: Aptitud,
}

/// The complementary-exams section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamenesComplementarios {
    #[serde(default)]
    pub examenes: BTreeMap<String, ExamenComplementario>,
    #[serde(default)]
    pub observaciones: String,
}

/// With-or-without pre-existing conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Preexistencias {
    #[serde(rename = "con")]
    Con,
    #[serde(rename = "sin")]
    Sin,
    #[serde(rename = "")]
    SinMarcar,
}

/// Overall fitness classification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClasificacionAptitud {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aptitud: Option<Aptitud>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub con_preexistencias: Option<Preexistencias>,
}

/// Sworn-declaration signatures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Firmas {
    #[serde(default)]
    pub firma_empleado: String,
    #[serde(default)]
    pub firma_medico: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeclaracionJurada {
    #[serde(default)]
    pub firmas: Firmas,
}

// ─── Canonical record and variants ──────────────────────────────────────

/// Canonical clinical record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoriaClinica {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// Exam date as entered on the form.
    pub fecha: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tipo_examen: Option<String>,
    /// Examined patient; immutable after creation.
    pub paciente: ObjectId,
    /// Owning organization; immutable after creation.
    pub organization: ObjectId,
    /// Scheduling event the record was generated from, when any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_exam: Option<ObjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub antecedentes_personales_familiares: Option<AntecedentesPersonalesFamiliares>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub antecedentes_laborales: Option<AntecedentesLaborales>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub examen: Option<Examen>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub examenes_complementarios: Option<ExamenesComplementarios>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tareas_desempenar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calificacion_empresarial: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clasificacion_aptitud: Option<ClasificacionAptitud>,
    /// Findings narrative.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub informe_hallazgos: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declaracion_jurada: Option<DeclaracionJurada>,
    #[serde(flatten)]
    pub authoring: Authoring,
}

fn normalize_narratives(
    tipo_examen: &mut Option<String>,
    tareas: &mut Option<String>,
    calificacion: &mut Option<String>,
    informe: &mut Option<String>,
) {
    clean(tipo_examen);
    clean(tareas);
    clean(calificacion);
    clean(informe);
}

impl Normalize for HistoriaClinica {
    fn normalize(&mut self) {
        trim(&mut self.fecha);
        normalize_narratives(
            &mut self.tipo_examen,
            &mut self.tareas_desempenar,
            &mut self.calificacion_empresarial,
            &mut self.informe_hallazgos,
        );
        self.authoring.normalize();
    }
}

impl Validate for HistoriaClinica {
    fn collect(&self, path: &str, out: &mut Violations) {
        check_id_opt(out, field_path(path, "_id"), self.id.as_ref());
        require_nonempty(out, field_path(path, "fecha"), &self.fecha, MSG_FECHA);
        check_id(out, field_path(path, "paciente"), &self.paciente);
        check_id(out, field_path(path, "organization"), &self.organization);
        check_id_opt(out, field_path(path, "scheduledExam"), self.scheduled_exam.as_ref());
        self.authoring.collect(path, out);
    }
}

/// Creation payload; the patient comes from the caller, the
/// organization from middleware.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoriaClinicaCreate {
    pub fecha: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tipo_examen: Option<String>,
    pub paciente: ObjectId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_exam: Option<ObjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub antecedentes_personales_familiares: Option<AntecedentesPersonalesFamiliares>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub antecedentes_laborales: Option<AntecedentesLaborales>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub examen: Option<Examen>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub examenes_complementarios: Option<ExamenesComplementarios>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tareas_desempenar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calificacion_empresarial: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clasificacion_aptitud: Option<ClasificacionAptitud>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub informe_hallazgos: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declaracion_jurada: Option<DeclaracionJurada>,
}

impl Normalize for HistoriaClinicaCreate {
    fn normalize(&mut self) {
        trim(&mut self.fecha);
        normalize_narratives(
            &mut self.tipo_examen,
            &mut self.tareas_desempenar,
            &mut self.calificacion_empresarial,
            &mut self.informe_hallazgos,
        );
    }
}

impl Validate for HistoriaClinicaCreate {
    fn collect(&self, path: &str, out: &mut Violations) {
        require_nonempty(out, field_path(path, "fecha"), &self.fecha, MSG_FECHA);
        check_id(out, field_path(path, "paciente"), &self.paciente);
        check_id_opt(out, field_path(path, "scheduledExam"), self.scheduled_exam.as_ref());
    }
}

/// Partial update; patient and organization stay frozen.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoriaClinicaUpdate {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fecha: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tipo_examen: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_exam: Option<ObjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub antecedentes_personales_familiares: Option<AntecedentesPersonalesFamiliares>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub antecedentes_laborales: Option<AntecedentesLaborales>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub examen: Option<Examen>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub examenes_complementarios: Option<ExamenesComplementarios>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tareas_desempenar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calificacion_empresarial: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clasificacion_aptitud: Option<ClasificacionAptitud>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub informe_hallazgos: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declaracion_jurada: Option<DeclaracionJurada>,
}

impl Normalize for HistoriaClinicaUpdate {
    fn normalize(&mut self) {
        trim_opt(&mut self.fecha);
        normalize_narratives(
            &mut self.tipo_examen,
            &mut self.tareas_desempenar,
            &mut self.calificacion_empresarial,
            &mut self.informe_hallazgos,
        );
    }
}

impl Validate for HistoriaClinicaUpdate {
    fn collect(&self, path: &str, out: &mut Violations) {
        check_id_opt(out, field_path(path, "_id"), self.id.as_ref());
        if let Some(fecha) = &self.fecha {
            require_nonempty(out, field_path(path, "fecha"), fecha, MSG_FECHA);
        }
        check_id_opt(out, field_path(path, "scheduledExam"), self.scheduled_exam.as_ref());
    }
}

/// Query parameters for clinical-record listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoriaClinicaFilters {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paciente: Option<ObjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub empresa: Option<ObjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tipo_examen: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fecha_desde: Option<DateString>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fecha_hasta: Option<DateString>,
}

impl Normalize for HistoriaClinicaFilters {
    fn normalize(&mut self) {
        clean(&mut self.search);
        clean(&mut self.tipo_examen);
    }
}

impl Validate for HistoriaClinicaFilters {
    fn collect(&self, path: &str, out: &mut Violations) {
        check_bounds(out, path, self.page, self.limit);
        check_id_opt(out, field_path(path, "paciente"), self.paciente.as_ref());
        check_id_opt(out, field_path(path, "empresa"), self.empresa.as_ref());
        for (name, value) in [
            ("fechaDesde", self.fecha_desde.as_ref()),
            ("fechaHasta", self.fecha_hasta.as_ref()),
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

pub static HISTORIA_CLINICA: EntityDescriptor = EntityDescriptor {
    entity: "historiaClinica",
    strict: false,
    audited: true,
    fields: &[
        FieldSpec::new("_id", false, FieldRole::Identifier),
        FieldSpec::new("fecha", true, FieldRole::Data).message(MSG_FECHA),
        FieldSpec::new("tipoExamen", false, FieldRole::Data),
        FieldSpec::new("paciente", true, FieldRole::Immutable),
        FieldSpec::new("organization", true, FieldRole::Tenant),
        FieldSpec::new("scheduledExam", false, FieldRole::Data),
        FieldSpec::new("antecedentesPersonalesFamiliares", false, FieldRole::Data),
        FieldSpec::new("antecedentesLaborales", false, FieldRole::Data),
        FieldSpec::new("examen", false, FieldRole::Data),
        FieldSpec::new("examenesComplementarios", false, FieldRole::Data),
        FieldSpec::new("tareasDesempenar", false, FieldRole::Data),
        FieldSpec::new("calificacionEmpresarial", false, FieldRole::Data),
        FieldSpec::new("clasificacionAptitud", false, FieldRole::Data),
        FieldSpec::new("informeHallazgos", false, FieldRole::Data),
        FieldSpec::new("declaracionJurada", false, FieldRole::Data),
    ],
    variants: &SchemaVariant::ALL,
};

#[cfg(test)]
mod tests {
    use super::*;
    use ergon_core::Persisted;
    use serde_json::json;

    fn paciente() -> &'static str {
        "507f1f77bcf86cd799439011"
    }

    fn org() -> &'static str {
        "507f1f77bcf86cd799439012"
    }

    #[test]
    fn test_create_keeps_patient_drops_tenant() {
        assert!(HISTORIA_CLINICA.accepts(SchemaVariant::Create, "paciente"));
        assert!(!HISTORIA_CLINICA.accepts(SchemaVariant::Create, "organization"));

        let parsed: HistoriaClinicaCreate = HISTORIA_CLINICA
            .parse(
                SchemaVariant::Create,
                &json!({ "fecha": "2024-06-15", "paciente": paciente() }),
            )
            .unwrap();
        assert_eq!(parsed.fecha, "2024-06-15");
    }

    #[test]
    fn test_update_rejects_both_immutable_references() {
        for frozen in ["paciente", "organization"] {
            let violations =
                HISTORIA_CLINICA.screen(SchemaVariant::Update, &json!({ frozen: paciente() }));
            assert!(violations.contains_path(frozen), "{frozen} must be frozen");
        }

        let single = HISTORIA_CLINICA.screen(
            SchemaVariant::Update,
            &json!({ "informeHallazgos": "Sin hallazgos" }),
        );
        assert!(single.is_empty());
    }

    #[test]
    fn test_exam_sections_default_empty() {
        let examen: Examen = serde_json::from_value(json!({})).unwrap();
        assert!(examen.valores.is_empty());
        assert!(examen.checkboxes.is_empty());
        assert_eq!(examen.numero_rx, "");

        let seccion: AntecedentesPersonalesFamiliares = serde_json::from_value(json!({})).unwrap();
        assert!(seccion.inmunizaciones.is_empty());
    }

    #[test]
    fn test_aptitud_accepts_empty_member() {
        let marked: ExamenCheckbox = serde_json::from_value(json!({ "aptitud": "A" })).unwrap();
        assert_eq!(marked.aptitud, Aptitud::A);

        let unmarked: ExamenCheckbox = serde_json::from_value(json!({ "aptitud": "" })).unwrap();
        assert_eq!(unmarked.aptitud, Aptitud::SinMarcar);

        assert!(serde_json::from_value::<ExamenCheckbox>(json!({ "aptitud": "X" })).is_err());

        // The empty member serializes back as the empty string.
        assert_eq!(serde_json::to_value(Aptitud::SinMarcar).unwrap(), json!(""));
    }

    #[test]
    fn test_clasificacion_vocabulary() {
        let c: ClasificacionAptitud =
            serde_json::from_value(json!({ "aptitud": "N", "conPreexistencias": "sin" })).unwrap();
        assert_eq!(c.con_preexistencias, Some(Preexistencias::Sin));

        assert!(
            serde_json::from_value::<ClasificacionAptitud>(json!({ "conPreexistencias": "none" }))
                .is_err()
        );
    }

    #[test]
    fn test_physical_exam_round_trip() {
        let historia: HistoriaClinica = serde_json::from_value(json!({
            "fecha": "2024-06-15",
            "paciente": paciente(),
            "organization": org(),
            "examen": {
                "valores": { "peso": "82", "talla": "1.78" },
                "checkboxes": { "piel": { "aptitud": "N" }, "torax": { "aptitud": "" } },
                "numeroRX": "RX-102"
            },
            "declaracionJurada": { "firmas": { "firmaMedico": "Dra. Paz" } }
        }))
        .unwrap();

        let examen = historia.examen.as_ref().unwrap();
        assert_eq!(examen.valores["peso"], "82");
        assert_eq!(examen.checkboxes["piel"].aptitud, Aptitud::N);

        let value = serde_json::to_value(&historia).unwrap();
        assert_eq!(value["examen"]["numeroRX"], "RX-102");
        assert_eq!(value["declaracionJurada"]["firmas"]["firmaEmpleado"], "");
    }

    #[test]
    fn test_document_variant_promotes_id() {
        let missing = serde_json::from_value::<Persisted<HistoriaClinica>>(json!({
            "fecha": "2024-06-15", "paciente": paciente(), "organization": org()
        }));
        assert!(missing.is_err());

        let doc: Persisted<HistoriaClinica> = serde_json::from_value(json!({
            "_id": "507f1f77bcf86cd799439099",
            "fecha": "2024-06-15",
            "paciente": paciente(),
            "organization": org()
        }))
        .unwrap();
        assert_eq!(doc.id.as_str(), "507f1f77bcf86cd799439099");
    }

    #[test]
    fn test_filters_date_range_shape() {
        let filters: HistoriaClinicaFilters = serde_json::from_value(json!({
            "paciente": paciente(),
            "fechaDesde": "2024-01-01",
            "fechaHasta": "2024-06-30T23:59:59Z"
        }))
        .unwrap();
        assert!(filters.validate().is_ok());

        let bad: HistoriaClinicaFilters =
            serde_json::from_value(json!({ "fechaDesde": "01/06/2024" })).unwrap();
        let violations = bad.validate().unwrap_err();
        assert!(violations.contains_path("fechaDesde"));
    }
}
