//! # Team
//!
//! A working group inside one organization. The owning organization is
//! injected by middleware on create and frozen afterward.

use serde::{Deserialize, Serialize};

use ergon_core::descriptor::{EntityDescriptor, FieldRole, FieldSpec, SchemaVariant};
use ergon_core::normalize::{clean, trim, Normalize};
use ergon_core::validate::{
    check_id, check_id_opt, field_path, require_nonempty, Validate, Violations,
};
use ergon_core::{Authoring, ObjectId};

const MSG_NAME: &str = "Nombre del equipo es requerido";

fn default_true() -> bool {
    true
}

/// Team-level access settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamSettings {
    #[serde(default)]
    pub allow_cross_team_access: bool,
    /// Permission tokens granted to members by default.
    #[serde(default)]
    pub default_permissions: Vec<String>,
    /// Cap on membership, at least 1 when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_members: Option<u32>,
}

impl Validate for TeamSettings {
    fn collect(&self, path: &str, out: &mut Violations) {
        if self.max_members == Some(0) {
            out.push(field_path(path, "maxMembers"), "must be at least 1");
        }
    }
}

/// Canonical team record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Owning organization.
    pub organization: ObjectId,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<TeamSettings>,
    #[serde(flatten)]
    pub authoring: Authoring,
}

impl Normalize for Team {
    fn normalize(&mut self) {
        trim(&mut self.name);
        clean(&mut self.description);
        self.authoring.normalize();
    }
}

impl Validate for Team {
    fn collect(&self, path: &str, out: &mut Violations) {
        check_id_opt(out, field_path(path, "_id"), self.id.as_ref());
        require_nonempty(out, field_path(path, "name"), &self.name, MSG_NAME);
        check_id(out, field_path(path, "organization"), &self.organization);
        if let Some(settings) = &self.settings {
            settings.collect(&field_path(path, "settings"), out);
        }
        self.authoring.collect(path, out);
    }
}

/// Creation payload; the organization is injected by middleware.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamCreate {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<TeamSettings>,
}

impl Normalize for TeamCreate {
    fn normalize(&mut self) {
        trim(&mut self.name);
        clean(&mut self.description);
    }
}

impl Validate for TeamCreate {
    fn collect(&self, path: &str, out: &mut Violations) {
        require_nonempty(out, field_path(path, "name"), &self.name, MSG_NAME);
        if let Some(settings) = &self.settings {
            settings.collect(&field_path(path, "settings"), out);
        }
    }
}

pub static TEAM: EntityDescriptor = EntityDescriptor {
    entity: "team",
    strict: false,
    audited: true,
    fields: &[
        FieldSpec::new("_id", false, FieldRole::Identifier),
        FieldSpec::new("name", true, FieldRole::Data).message(MSG_NAME),
        FieldSpec::new("description", false, FieldRole::Data),
        FieldSpec::new("organization", true, FieldRole::Tenant),
        FieldSpec::new("isActive", false, FieldRole::Data),
        FieldSpec::new("settings", false, FieldRole::Data),
    ],
    variants: &[
        SchemaVariant::Canonical,
        SchemaVariant::Create,
        SchemaVariant::Document,
    ],
};

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn org() -> &'static str {
        "507f1f77bcf86cd799439011"
    }

    #[test]
    fn test_create_omits_tenant() {
        assert!(!TEAM.accepts(SchemaVariant::Create, "organization"));
        let parsed: TeamCreate = TEAM
            .parse(SchemaVariant::Create, &json!({ "name": "Guardia Norte" }))
            .unwrap();
        assert_eq!(parsed.name, "Guardia Norte");
        assert!(parsed.is_active);
    }

    #[test]
    fn test_canonical_requires_tenant() {
        let violations = TEAM.screen(SchemaVariant::Canonical, &json!({ "name": "Guardia" }));
        assert!(violations.contains_path("organization"));
    }

    #[test]
    fn test_max_members_lower_bound() {
        let team: Team = serde_json::from_value(json!({
            "name": "Guardia",
            "organization": org(),
            "settings": { "maxMembers": 0 }
        }))
        .unwrap();
        let violations = team.validate().unwrap_err();
        assert!(violations.contains_path("settings.maxMembers"));

        let ok: Team = serde_json::from_value(json!({
            "name": "Guardia",
            "organization": org(),
            "settings": { "maxMembers": 1, "defaultPermissions": ["patient_read"] }
        }))
        .unwrap();
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_settings_defaults() {
        let settings: TeamSettings = serde_json::from_value(json!({})).unwrap();
        assert!(!settings.allow_cross_team_access);
        assert!(settings.default_permissions.is_empty());
        assert!(settings.max_members.is_none());
    }
}
