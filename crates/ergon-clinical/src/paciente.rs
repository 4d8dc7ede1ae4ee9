//! # Paciente (Patient)
//!
//! The worker under occupational-health care. Identity fields are
//! required and trimmed; the national id (DNI) is required and must be
//! digits only. Demographic enums accept the empty string on the wire
//! and normalize it to absent.

use std::fmt;

use serde::{Deserialize, Serialize};

use ergon_core::descriptor::{EntityDescriptor, FieldRole, FieldSpec, SchemaVariant};
use ergon_core::normalize::{blank_as_none, clean, trim, trim_opt, Normalize};
use ergon_core::pagination::{check_bounds, default_limit, default_page};
use ergon_core::validate::{
    check_email, check_id, check_id_opt, check_range, field_path, index_path, require_nonempty,
    Validate, Violations,
};
use ergon_core::{Authoring, ObjectId};

const MSG_APELLIDO: &str = "Apellido es requerido";
const MSG_NOMBRES: &str = "Nombres es requerido";
const MSG_DNI: &str = "DNI es requerido";
const MSG_DNI_DIGITS: &str = "DNI debe contener solo números";

/// Maximum accepted age for a patient.
pub const MAX_EDAD: u32 = 120;
/// Maximum accepted age for a dependent child record.
pub const MAX_EDAD_HIJO: u32 = 50;

fn default_true() -> bool {
    true
}

/// Sex code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sexo {
    M,
    F,
    Otro,
}

impl Sexo {
    pub const ALL: [Sexo; 3] = [Sexo::M, Sexo::F, Sexo::Otro];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sexo::M => "M",
            Sexo::F => "F",
            Sexo::Otro => "Otro",
        }
    }
}

impl fmt::Display for Sexo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Marital status, in the Spanish descriptive vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EstadoCivil {
    #[serde(rename = "Soltero/a")]
    Soltero,
    #[serde(rename = "Casado/a")]
    Casado,
    #[serde(rename = "Divorciado/a")]
    Divorciado,
    #[serde(rename = "Viudo/a")]
    Viudo,
    #[serde(rename = "Unión Civil")]
    UnionCivil,
}

impl EstadoCivil {
    pub const ALL: [EstadoCivil; 5] = [
        EstadoCivil::Soltero,
        EstadoCivil::Casado,
        EstadoCivil::Divorciado,
        EstadoCivil::Viudo,
        EstadoCivil::UnionCivil,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EstadoCivil::Soltero => "Soltero/a",
            EstadoCivil::Casado => "Casado/a",
            EstadoCivil::Divorciado => "Divorciado/a",
            EstadoCivil::Viudo => "Viudo/a",
            EstadoCivil::UnionCivil => "Unión Civil",
        }
    }
}

/// Dependent child sub-record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hijo {
    pub edad: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observaciones: Option<String>,
}

impl Normalize for Hijo {
    fn normalize(&mut self) {
        clean(&mut self.observaciones);
    }
}

impl Validate for Hijo {
    fn collect(&self, path: &str, out: &mut Violations) {
        check_range(out, field_path(path, "edad"), self.edad, 0, MAX_EDAD_HIJO);
    }
}

/// Canonical patient record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paciente {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub apellido: String,
    pub nombres: String,
    /// National id, digits only.
    pub dni: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cuil: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nacionalidad: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fecha_nacimiento: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edad: Option<u32>,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub sexo: Option<Sexo>,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub estado_civil: Option<EstadoCivil>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domicilio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telefono: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Job position.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub puesto: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fecha_ingreso: Option<String>,
    #[serde(default)]
    pub hijos: Vec<Hijo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estudios: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub titulos: Option<String>,
    /// Employing company.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub empresa: Option<ObjectId>,
    /// Scheduled exams the patient is enrolled in; maintained by exam
    /// management, never by patient payloads.
    #[serde(default)]
    pub scheduled_exams: Vec<ObjectId>,
    /// Owning organization; required once stored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<ObjectId>,
    #[serde(default = "default_true")]
    pub activo: bool,
    #[serde(flatten)]
    pub authoring: Authoring,
}

fn collect_dni(path: &str, out: &mut Violations, dni: &str) {
    if dni.is_empty() {
        out.push(field_path(path, "dni"), MSG_DNI);
    } else if !dni.bytes().all(|b| b.is_ascii_digit()) {
        out.push(field_path(path, "dni"), MSG_DNI_DIGITS);
    }
}

fn collect_optionals(
    path: &str,
    out: &mut Violations,
    edad: Option<u32>,
    email: Option<&String>,
    hijos: &[Hijo],
    empresa: Option<&ObjectId>,
) {
    if let Some(edad) = edad {
        check_range(out, field_path(path, "edad"), edad, 0, MAX_EDAD);
    }
    if let Some(email) = email {
        check_email(out, field_path(path, "email"), email, "Email inválido");
    }
    let hijos_path = field_path(path, "hijos");
    for (i, hijo) in hijos.iter().enumerate() {
        hijo.collect(&index_path(&hijos_path, i), out);
    }
    check_id_opt(out, field_path(path, "empresa"), empresa);
}

impl Normalize for Paciente {
    fn normalize(&mut self) {
        trim(&mut self.apellido);
        trim(&mut self.nombres);
        trim(&mut self.dni);
        clean(&mut self.cuil);
        clean(&mut self.nacionalidad);
        clean(&mut self.fecha_nacimiento);
        clean(&mut self.domicilio);
        clean(&mut self.telefono);
        clean(&mut self.email);
        clean(&mut self.puesto);
        clean(&mut self.fecha_ingreso);
        clean(&mut self.estudios);
        clean(&mut self.titulos);
        for hijo in &mut self.hijos {
            hijo.normalize();
        }
        self.authoring.normalize();
    }
}

impl Validate for Paciente {
    fn collect(&self, path: &str, out: &mut Violations) {
        check_id_opt(out, field_path(path, "_id"), self.id.as_ref());
        require_nonempty(out, field_path(path, "apellido"), &self.apellido, MSG_APELLIDO);
        require_nonempty(out, field_path(path, "nombres"), &self.nombres, MSG_NOMBRES);
        collect_dni(path, out, &self.dni);
        collect_optionals(
            path,
            out,
            self.edad,
            self.email.as_ref(),
            &self.hijos,
            self.empresa.as_ref(),
        );
        let exams_path = field_path(path, "scheduledExams");
        for (i, exam) in self.scheduled_exams.iter().enumerate() {
            check_id(out, index_path(&exams_path, i), exam);
        }
        check_id_opt(out, field_path(path, "organization"), self.organization.as_ref());
        self.authoring.collect(path, out);
    }
}

/// Creation payload; tenant and exam enrollment are backend-owned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PacienteCreate {
    pub apellido: String,
    pub nombres: String,
    pub dni: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cuil: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nacionalidad: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fecha_nacimiento: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edad: Option<u32>,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub sexo: Option<Sexo>,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub estado_civil: Option<EstadoCivil>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domicilio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telefono: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub puesto: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fecha_ingreso: Option<String>,
    #[serde(default)]
    pub hijos: Vec<Hijo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estudios: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub titulos: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub empresa: Option<ObjectId>,
    #[serde(default = "default_true")]
    pub activo: bool,
}

impl Normalize for PacienteCreate {
    fn normalize(&mut self) {
        trim(&mut self.apellido);
        trim(&mut self.nombres);
        trim(&mut self.dni);
        clean(&mut self.cuil);
        clean(&mut self.nacionalidad);
        clean(&mut self.fecha_nacimiento);
        clean(&mut self.domicilio);
        clean(&mut self.telefono);
        clean(&mut self.email);
        clean(&mut self.puesto);
        clean(&mut self.fecha_ingreso);
        clean(&mut self.estudios);
        clean(&mut self.titulos);
        for hijo in &mut self.hijos {
            hijo.normalize();
        }
    }
}

impl Validate for PacienteCreate {
    fn collect(&self, path: &str, out: &mut Violations) {
        require_nonempty(out, field_path(path, "apellido"), &self.apellido, MSG_APELLIDO);
        require_nonempty(out, field_path(path, "nombres"), &self.nombres, MSG_NOMBRES);
        collect_dni(path, out, &self.dni);
        collect_optionals(
            path,
            out,
            self.edad,
            self.email.as_ref(),
            &self.hijos,
            self.empresa.as_ref(),
        );
    }
}

/// Partial update; tenant and exam enrollment stay frozen.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PacienteUpdate {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apellido: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nombres: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dni: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cuil: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nacionalidad: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fecha_nacimiento: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edad: Option<u32>,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub sexo: Option<Sexo>,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub estado_civil: Option<EstadoCivil>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domicilio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telefono: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub puesto: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fecha_ingreso: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hijos: Option<Vec<Hijo>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estudios: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub titulos: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub empresa: Option<ObjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activo: Option<bool>,
}

impl Normalize for PacienteUpdate {
    fn normalize(&mut self) {
        trim_opt(&mut self.apellido);
        trim_opt(&mut self.nombres);
        trim_opt(&mut self.dni);
        clean(&mut self.cuil);
        clean(&mut self.nacionalidad);
        clean(&mut self.fecha_nacimiento);
        clean(&mut self.domicilio);
        clean(&mut self.telefono);
        clean(&mut self.email);
        clean(&mut self.puesto);
        clean(&mut self.fecha_ingreso);
        clean(&mut self.estudios);
        clean(&mut self.titulos);
        if let Some(hijos) = &mut self.hijos {
            for hijo in hijos {
                hijo.normalize();
            }
        }
    }
}

impl Validate for PacienteUpdate {
    fn collect(&self, path: &str, out: &mut Violations) {
        check_id_opt(out, field_path(path, "_id"), self.id.as_ref());
        if let Some(apellido) = &self.apellido {
            require_nonempty(out, field_path(path, "apellido"), apellido, MSG_APELLIDO);
        }
        if let Some(nombres) = &self.nombres {
            require_nonempty(out, field_path(path, "nombres"), nombres, MSG_NOMBRES);
        }
        if let Some(dni) = &self.dni {
            collect_dni(path, out, dni);
        }
        collect_optionals(
            path,
            out,
            self.edad,
            self.email.as_ref(),
            self.hijos.as_deref().unwrap_or(&[]),
            self.empresa.as_ref(),
        );
    }
}

/// Query parameters for patient listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PacienteFilters {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub empresa: Option<ObjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activo: Option<bool>,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub sexo: Option<Sexo>,
}

impl Normalize for PacienteFilters {
    fn normalize(&mut self) {
        clean(&mut self.search);
    }
}

impl Validate for PacienteFilters {
    fn collect(&self, path: &str, out: &mut Violations) {
        check_bounds(out, path, self.page, self.limit);
        check_id_opt(out, field_path(path, "empresa"), self.empresa.as_ref());
    }
}

const SEXO_VALUES: &[&str] = &["M", "F", "Otro", ""];
const ESTADO_CIVIL_VALUES: &[&str] = &[
    "Soltero/a",
    "Casado/a",
    "Divorciado/a",
    "Viudo/a",
    "Unión Civil",
    "",
];

pub static PACIENTE: EntityDescriptor = EntityDescriptor {
    entity: "paciente",
    strict: false,
    audited: true,
    fields: &[
        FieldSpec::new("_id", false, FieldRole::Identifier),
        FieldSpec::new("apellido", true, FieldRole::Data).message(MSG_APELLIDO),
        FieldSpec::new("nombres", true, FieldRole::Data).message(MSG_NOMBRES),
        FieldSpec::new("dni", true, FieldRole::Data).message(MSG_DNI),
        FieldSpec::new("cuil", false, FieldRole::Data),
        FieldSpec::new("nacionalidad", false, FieldRole::Data),
        FieldSpec::new("fechaNacimiento", false, FieldRole::Data),
        FieldSpec::new("edad", false, FieldRole::Data),
        FieldSpec::new("sexo", false, FieldRole::Data).values(SEXO_VALUES),
        FieldSpec::new("estadoCivil", false, FieldRole::Data).values(ESTADO_CIVIL_VALUES),
        FieldSpec::new("domicilio", false, FieldRole::Data),
        FieldSpec::new("telefono", false, FieldRole::Data),
        FieldSpec::new("email", false, FieldRole::Data),
        FieldSpec::new("puesto", false, FieldRole::Data),
        FieldSpec::new("fechaIngreso", false, FieldRole::Data),
        FieldSpec::new("hijos", false, FieldRole::Data),
        FieldSpec::new("estudios", false, FieldRole::Data),
        FieldSpec::new("titulos", false, FieldRole::Data),
        FieldSpec::new("empresa", false, FieldRole::Data),
        FieldSpec::new("scheduledExams", false, FieldRole::ServerManaged),
        FieldSpec::new("organization", false, FieldRole::Tenant),
        FieldSpec::new("activo", false, FieldRole::Data),
    ],
    variants: &SchemaVariant::ALL,
};

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn minimal() -> serde_json::Value {
        json!({ "apellido": "García", "nombres": "Ana María", "dni": "28456789" })
    }

    #[test]
    fn test_create_accepts_minimal() {
        let parsed: PacienteCreate = PACIENTE.parse(SchemaVariant::Create, &minimal()).unwrap();
        assert_eq!(parsed.apellido, "García");
        assert!(parsed.hijos.is_empty());
        assert!(parsed.activo);
    }

    #[test]
    fn test_dni_must_be_digits_only() {
        let mut payload = minimal();
        payload["dni"] = json!("28.456.789");
        let err = PACIENTE
            .parse::<PacienteCreate>(SchemaVariant::Create, &payload)
            .unwrap_err();
        let violations = err.violations().unwrap();
        assert!(violations.contains_path("dni"));
        assert!(violations.to_string().contains(MSG_DNI_DIGITS));
    }

    #[test]
    fn test_missing_dni_uses_literal_message() {
        let violations = PACIENTE.screen(
            SchemaVariant::Create,
            &json!({ "apellido": "García", "nombres": "Ana" }),
        );
        assert!(violations.contains_path("dni"));
        assert!(violations.to_string().contains(MSG_DNI));
    }

    #[test]
    fn test_blank_sexo_and_estado_civil_normalize_to_absent() {
        let mut payload = minimal();
        payload["sexo"] = json!("");
        payload["estadoCivil"] = json!("");
        let parsed: PacienteCreate = PACIENTE.parse(SchemaVariant::Create, &payload).unwrap();
        assert!(parsed.sexo.is_none());
        assert!(parsed.estado_civil.is_none());
    }

    #[test]
    fn test_descriptive_english_vocabulary_is_rejected() {
        let mut payload = minimal();
        payload["sexo"] = json!("female");
        let violations = PACIENTE.screen(SchemaVariant::Create, &payload);
        assert!(violations.contains_path("sexo"));

        let mut payload = minimal();
        payload["estadoCivil"] = json!("married");
        let violations = PACIENTE.screen(SchemaVariant::Create, &payload);
        assert!(violations.contains_path("estadoCivil"));
    }

    #[test]
    fn test_estado_civil_spellings() {
        for estado in EstadoCivil::ALL {
            let json = serde_json::to_string(&estado).unwrap();
            assert_eq!(json, format!("\"{}\"", estado.as_str()));
        }
    }

    #[test]
    fn test_hijo_age_bounds() {
        let mut payload = minimal();
        payload["hijos"] = json!([{ "edad": 12 }, { "edad": 51, "observaciones": "x" }]);
        let err = PACIENTE
            .parse::<PacienteCreate>(SchemaVariant::Create, &payload)
            .unwrap_err();
        let violations = err.violations().unwrap();
        assert!(violations.contains_path("hijos.1.edad"));
        assert!(!violations.contains_path("hijos.0.edad"));
    }

    #[test]
    fn test_patient_age_upper_bound() {
        let mut payload = minimal();
        payload["edad"] = json!(121);
        let err = PACIENTE
            .parse::<PacienteCreate>(SchemaVariant::Create, &payload)
            .unwrap_err();
        assert!(err.violations().unwrap().contains_path("edad"));
    }

    #[test]
    fn test_update_freezes_tenant_and_enrollment() {
        let frozen = PACIENTE.screen(
            SchemaVariant::Update,
            &json!({ "organization": "507f1f77bcf86cd799439011" }),
        );
        assert!(frozen.contains_path("organization"));

        // Enrollment is backend-owned: dropped silently in this
        // non-strict entity.
        let dropped = PACIENTE.screen(
            SchemaVariant::Update,
            &json!({ "scheduledExams": ["507f1f77bcf86cd799439011"] }),
        );
        assert!(dropped.is_empty());
    }

    #[test]
    fn test_filters_legacy_free_shape() {
        let filters: PacienteFilters = serde_json::from_value(json!({
            "search": "  garcía  ",
            "sexo": "F",
            "empresa": "507f1f77bcf86cd799439011"
        }))
        .unwrap();
        let mut filters = filters;
        filters.normalize();
        assert_eq!(filters.search.as_deref(), Some("garcía"));
        assert_eq!(filters.sexo, Some(Sexo::F));
        assert!(filters.validate().is_ok());
    }

    #[test]
    fn test_canonical_round_trip_is_stable() {
        let paciente: Paciente = serde_json::from_value(json!({
            "apellido": "García",
            "nombres": "Ana",
            "dni": "28456789",
            "sexo": "F",
            "organization": "507f1f77bcf86cd799439011",
            "hijos": [{ "edad": 4 }]
        }))
        .unwrap();
        let mut normalized = paciente.clone();
        normalized.normalize();
        assert_eq!(normalized, paciente);

        let value = serde_json::to_value(&paciente).unwrap();
        let back: Paciente = serde_json::from_value(value).unwrap();
        assert_eq!(back, paciente);
    }
}
