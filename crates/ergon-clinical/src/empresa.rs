//! # Empresa (Company)
//!
//! A company whose workers undergo occupational exams. Contact fields
//! follow the trim-or-absent contract; a whitespace-only value is never
//! stored as present.

use std::fmt;

use serde::{Deserialize, Serialize};

use ergon_core::descriptor::{EntityDescriptor, FieldRole, FieldSpec, SchemaVariant};
use ergon_core::normalize::{blank_as_none, clean, trim, trim_opt, Normalize};
use ergon_core::pagination::{check_bounds, default_limit, default_page};
use ergon_core::validate::{
    check_email, check_id, check_id_opt, field_path, require_nonempty, Validate, Violations,
};
use ergon_core::{Authoring, ObjectId};

const MSG_NOMBRE: &str = "Nombre de la empresa es requerido";

fn default_true() -> bool {
    true
}

/// Business sector, a closed vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sector {
    Construccion,
    Manufactura,
    Servicios,
    Tecnologia,
    Salud,
    Educacion,
    Retail,
    Alimentario,
    Logistica,
    Otros,
}

impl Sector {
    pub const ALL: [Sector; 10] = [
        Sector::Construccion,
        Sector::Manufactura,
        Sector::Servicios,
        Sector::Tecnologia,
        Sector::Salud,
        Sector::Educacion,
        Sector::Retail,
        Sector::Alimentario,
        Sector::Logistica,
        Sector::Otros,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sector::Construccion => "construccion",
            Sector::Manufactura => "manufactura",
            Sector::Servicios => "servicios",
            Sector::Tecnologia => "tecnologia",
            Sector::Salud => "salud",
            Sector::Educacion => "educacion",
            Sector::Retail => "retail",
            Sector::Alimentario => "alimentario",
            Sector::Logistica => "logistica",
            Sector::Otros => "otros",
        }
    }
}

impl fmt::Display for Sector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical company record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Empresa {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub nombre: String,
    /// Tax identifier (CUIT).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cuit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sector: Option<Sector>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descripcion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direccion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telefono: Option<String>,
    /// Blank submits normalize to absent, like every other contact field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Contact person.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contacto: Option<String>,
    /// Owning organization.
    pub organization: ObjectId,
    #[serde(default = "default_true")]
    pub activa: bool,
    #[serde(flatten)]
    pub authoring: Authoring,
}

fn normalize_contact(
    cuit: &mut Option<String>,
    descripcion: &mut Option<String>,
    direccion: &mut Option<String>,
    telefono: &mut Option<String>,
    email: &mut Option<String>,
    contacto: &mut Option<String>,
) {
    clean(cuit);
    clean(descripcion);
    clean(direccion);
    clean(telefono);
    clean(email);
    clean(contacto);
}

fn collect_email(path: &str, out: &mut Violations, email: Option<&String>) {
    if let Some(email) = email {
        check_email(out, field_path(path, "email"), email, "Email inválido");
    }
}

impl Normalize for Empresa {
    fn normalize(&mut self) {
        trim(&mut self.nombre);
        normalize_contact(
            &mut self.cuit,
            &mut self.descripcion,
            &mut self.direccion,
            &mut self.telefono,
            &mut self.email,
            &mut self.contacto,
        );
        self.authoring.normalize();
    }
}

impl Validate for Empresa {
    fn collect(&self, path: &str, out: &mut Violations) {
        check_id_opt(out, field_path(path, "_id"), self.id.as_ref());
        require_nonempty(out, field_path(path, "nombre"), &self.nombre, MSG_NOMBRE);
        collect_email(path, out, self.email.as_ref());
        check_id(out, field_path(path, "organization"), &self.organization);
        self.authoring.collect(path, out);
    }
}

/// Creation payload; the organization is injected by middleware.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmpresaCreate {
    pub nombre: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cuit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sector: Option<Sector>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descripcion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direccion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telefono: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contacto: Option<String>,
    #[serde(default = "default_true")]
    pub activa: bool,
}

impl Normalize for EmpresaCreate {
    fn normalize(&mut self) {
        trim(&mut self.nombre);
        normalize_contact(
            &mut self.cuit,
            &mut self.descripcion,
            &mut self.direccion,
            &mut self.telefono,
            &mut self.email,
            &mut self.contacto,
        );
    }
}

impl Validate for EmpresaCreate {
    fn collect(&self, path: &str, out: &mut Violations) {
        require_nonempty(out, field_path(path, "nombre"), &self.nombre, MSG_NOMBRE);
        collect_email(path, out, self.email.as_ref());
    }
}

/// Partial update; the owning organization is frozen.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmpresaUpdate {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nombre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cuit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sector: Option<Sector>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descripcion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direccion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telefono: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contacto: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activa: Option<bool>,
}

impl Normalize for EmpresaUpdate {
    fn normalize(&mut self) {
        // A supplied name stays present even when blank, so the blank is
        // rejected instead of silently ignored.
        trim_opt(&mut self.nombre);
        normalize_contact(
            &mut self.cuit,
            &mut self.descripcion,
            &mut self.direccion,
            &mut self.telefono,
            &mut self.email,
            &mut self.contacto,
        );
    }
}

impl Validate for EmpresaUpdate {
    fn collect(&self, path: &str, out: &mut Violations) {
        check_id_opt(out, field_path(path, "_id"), self.id.as_ref());
        if let Some(nombre) = &self.nombre {
            require_nonempty(out, field_path(path, "nombre"), nombre, MSG_NOMBRE);
        }
        collect_email(path, out, self.email.as_ref());
    }
}

/// Query parameters for company listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmpresaFilters {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub sector: Option<Sector>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activa: Option<bool>,
}

impl Default for EmpresaFilters {
    fn default() -> Self {
        Self {
            page: default_page(),
            limit: default_limit(),
            search: None,
            sector: None,
            activa: None,
        }
    }
}

impl Normalize for EmpresaFilters {
    fn normalize(&mut self) {
        clean(&mut self.search);
    }
}

impl Validate for EmpresaFilters {
    fn collect(&self, path: &str, out: &mut Violations) {
        check_bounds(out, path, self.page, self.limit);
    }
}

const SECTOR_VALUES: &[&str] = &[
    "construccion",
    "manufactura",
    "servicios",
    "tecnologia",
    "salud",
    "educacion",
    "retail",
    "alimentario",
    "logistica",
    "otros",
];

pub static EMPRESA: EntityDescriptor = EntityDescriptor {
    entity: "empresa",
    strict: false,
    audited: true,
    fields: &[
        FieldSpec::new("_id", false, FieldRole::Identifier),
        FieldSpec::new("nombre", true, FieldRole::Data).message(MSG_NOMBRE),
        FieldSpec::new("cuit", false, FieldRole::Data),
        FieldSpec::new("sector", false, FieldRole::Data).values(SECTOR_VALUES),
        FieldSpec::new("descripcion", false, FieldRole::Data),
        FieldSpec::new("direccion", false, FieldRole::Data),
        FieldSpec::new("telefono", false, FieldRole::Data),
        FieldSpec::new("email", false, FieldRole::Data),
        FieldSpec::new("contacto", false, FieldRole::Data),
        FieldSpec::new("organization", true, FieldRole::Tenant),
        FieldSpec::new("activa", false, FieldRole::Data),
    ],
    variants: &SchemaVariant::ALL,
};

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn org() -> &'static str {
        "507f1f77bcf86cd799439011"
    }

    #[test]
    fn test_create_normalizes_contact_fields() {
        let parsed: EmpresaCreate = EMPRESA
            .parse(
                SchemaVariant::Create,
                &json!({
                    "nombre": "  Acme SA  ",
                    "cuit": "  30-12345678-9  ",
                    "telefono": "   ",
                    "email": ""
                }),
            )
            .unwrap();
        assert_eq!(parsed.nombre, "Acme SA");
        assert_eq!(parsed.cuit.as_deref(), Some("30-12345678-9"));
        assert!(parsed.telefono.is_none());
        assert!(parsed.email.is_none());
    }

    #[test]
    fn test_sector_vocabulary_is_closed() {
        for sector in Sector::ALL {
            let json = serde_json::to_string(&sector).unwrap();
            assert_eq!(json, format!("\"{}\"", sector.as_str()));
        }
        assert!(serde_json::from_str::<Sector>("\"mineria\"").is_err());
        assert!(serde_json::from_str::<Sector>("\"todos\"").is_err());

        let violations = EMPRESA.screen(
            SchemaVariant::Create,
            &json!({ "nombre": "Acme", "sector": "mineria" }),
        );
        assert!(violations.contains_path("sector"));
    }

    #[test]
    fn test_invalid_email_rejected_when_present() {
        let err = EMPRESA
            .parse::<EmpresaCreate>(
                SchemaVariant::Create,
                &json!({ "nombre": "Acme", "email": "contacto" }),
            )
            .unwrap_err();
        assert!(err.violations().unwrap().contains_path("email"));
    }

    #[test]
    fn test_update_freezes_tenant() {
        let violations = EMPRESA.screen(SchemaVariant::Update, &json!({ "organization": org() }));
        assert!(violations.contains_path("organization"));

        let single: EmpresaUpdate = EMPRESA
            .parse(SchemaVariant::Update, &json!({ "telefono": "11-4444-5555" }))
            .unwrap();
        assert_eq!(single.telefono.as_deref(), Some("11-4444-5555"));
        assert!(single.nombre.is_none());
    }

    #[test]
    fn test_update_rejects_explicit_blank_name() {
        let err = EMPRESA
            .parse::<EmpresaUpdate>(SchemaVariant::Update, &json!({ "nombre": "   " }))
            .unwrap_err();
        assert!(err.violations().unwrap().contains_path("nombre"));
    }

    #[test]
    fn test_filters_defaults_and_blank_sector() {
        let filters: EmpresaFilters = serde_json::from_value(json!({})).unwrap();
        assert_eq!(filters, EmpresaFilters::default());
        assert_eq!(filters.page, 1);
        assert_eq!(filters.limit, 10);

        let blank: EmpresaFilters = serde_json::from_value(json!({ "sector": "" })).unwrap();
        assert!(blank.sector.is_none());

        let chosen: EmpresaFilters = serde_json::from_value(json!({ "sector": "salud" })).unwrap();
        assert_eq!(chosen.sector, Some(Sector::Salud));
    }

    #[test]
    fn test_document_requires_id_and_tenant() {
        let violations = EMPRESA.screen(SchemaVariant::Document, &json!({ "nombre": "Acme" }));
        assert!(violations.contains_path("_id"));
        assert!(violations.contains_path("organization"));
    }
}
