//! # Legacy Vocabulary Upgrade
//!
//! The contract surface speaks one vocabulary: tenants are
//! `organization`, patient sex is coded `M`/`F`/`Otro`, marital status
//! uses the Spanish descriptive forms. Callers still emitting the older
//! client-era vocabulary go through [`upgrade`] before validation; the
//! canonical schemas themselves never accept both forms.
//!
//! Upgrading is explicit and boundary-only. Nothing in the validation
//! pipeline calls it implicitly, so a canonical consumer pays nothing
//! and a legacy payload that skips the boundary fails screening with
//! ordinary violations.

use serde_json::{Map, Value};

/// Sex codes: descriptive legacy values to canonical codes.
const SEX_UPGRADES: [(&str, &str); 3] = [("male", "M"), ("female", "F"), ("other", "Otro")];

/// Marital status: descriptive English to the Spanish vocabulary.
const MARITAL_UPGRADES: [(&str, &str); 5] = [
    ("single", "Soltero/a"),
    ("married", "Casado/a"),
    ("divorced", "Divorciado/a"),
    ("widowed", "Viudo/a"),
    ("civil_union", "Unión Civil"),
];

/// Notification types minted under the client naming.
const NOTIFICATION_TYPE_UPGRADES: [(&str, &str); 3] = [
    ("user_joined_client", "user_joined_organization"),
    ("user_left_client", "user_left_organization"),
    ("client_created", "organization_created"),
];

/// Rewrite a legacy payload for `entity` into the canonical vocabulary.
///
/// Returns `true` when anything was rewritten; an already-canonical
/// payload is left untouched. Non-object payloads are never rewritten.
/// Entity names are the registry names; unknown names upgrade nothing.
pub fn upgrade(entity: &str, payload: &mut Value) -> bool {
    let Some(object) = payload.as_object_mut() else {
        return false;
    };

    let changed = match entity {
        "organization" => upgrade_organization(object),
        "team" | "invitation" | "empresa" | "paciente" | "historiaClinica"
        | "scheduledExam" | "activityLog" => rename_key(entity, object, "client", "organization"),
        "user" => upgrade_user(object),
        "notification" => upgrade_notification(object),
        "pacienteFilters" => upgrade_paciente_filters(object),
        "empresaFilters" => upgrade_empresa_filters(object),
        "adminStats" => rename_key(entity, object, "clients", "organizations"),
        _ => false,
    };

    // Demographic vocabulary applies wherever the fields occur.
    let demographics = match entity {
        "paciente" | "pacienteFilters" => {
            let sexo = map_string(entity, object, "sexo", &SEX_UPGRADES);
            let estado = map_string(entity, object, "estadoCivil", &MARITAL_UPGRADES);
            sexo | estado
        }
        _ => false,
    };

    changed | demographics
}

fn upgrade_organization(object: &mut Map<String, Value>) -> bool {
    let Some(settings) = object.get_mut("settings").and_then(Value::as_object_mut) else {
        return false;
    };
    rename_key(
        "organization",
        settings,
        "allowCrossClientAccess",
        "allowCrossOrganizationAccess",
    )
}

fn upgrade_user(object: &mut Map<String, Value>) -> bool {
    let mut changed = rename_key("user", object, "settings", "preferences");

    // The legacy profile carried form-compat duplicates of the user's
    // own identity fields, plus a nested copy of itself. Hoist both.
    let hoisted: Vec<(String, Value)> =
        match object.get_mut("profile").and_then(Value::as_object_mut) {
            Some(profile) => {
                let mut hoisted = Vec::new();
                for key in ["name", "lastName", "email"] {
                    if let Some(value) = profile.remove(key) {
                        hoisted.push((key.to_string(), value));
                    }
                }
                if let Some(Value::Object(nested)) = profile.remove("profile") {
                    tracing::debug!(entity = "user", "hoisted nested legacy profile object");
                    for (key, value) in nested {
                        profile.entry(key).or_insert(value);
                    }
                    changed = true;
                }
                hoisted
            }
            None => Vec::new(),
        };

    for (key, value) in hoisted {
        tracing::debug!(entity = "user", field = %key, "hoisted profile duplicate to record root");
        object.entry(key).or_insert(value);
        changed = true;
    }

    changed
}

fn upgrade_notification(object: &mut Map<String, Value>) -> bool {
    let kind = map_string("notification", object, "type", &NOTIFICATION_TYPE_UPGRADES);
    let related = map_string(
        "notification",
        object,
        "relatedType",
        &[("client", "organization")],
    );
    kind | related
}

fn upgrade_paciente_filters(object: &mut Map<String, Value>) -> bool {
    rename_key("pacienteFilters", object, "query", "search")
}

fn upgrade_empresa_filters(object: &mut Map<String, Value>) -> bool {
    // `todos` was a sentinel meaning "no sector filter".
    if object.get("sector").and_then(Value::as_str) == Some("todos") {
        object.remove("sector");
        tracing::debug!(entity = "empresaFilters", "removed legacy sector sentinel 'todos'");
        return true;
    }
    false
}

/// Move `from` to `to` unless the canonical key is already present, in
/// which case the legacy duplicate is dropped.
fn rename_key(entity: &str, object: &mut Map<String, Value>, from: &str, to: &str) -> bool {
    let Some(value) = object.remove(from) else {
        return false;
    };
    if object.contains_key(to) {
        tracing::debug!(entity, from, to, "dropped legacy key shadowed by canonical key");
    } else {
        tracing::debug!(entity, from, to, "renamed legacy key");
        object.insert(to.to_string(), value);
    }
    true
}

/// Replace a string field's value through an upgrade table.
fn map_string(
    entity: &str,
    object: &mut Map<String, Value>,
    key: &str,
    table: &[(&str, &str)],
) -> bool {
    let Some(current) = object.get(key).and_then(Value::as_str) else {
        return false;
    };
    let Some((_, canonical)) = table.iter().find(|(legacy, _)| *legacy == current) else {
        return false;
    };
    tracing::debug!(entity, field = key, from = current, to = canonical, "upgraded legacy value");
    object.insert(key.to_string(), Value::String((*canonical).to_string()));
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_canonical_payload_is_untouched() {
        let mut payload = json!({
            "nombre": "Acme SA",
            "organization": "507f1f77bcf86cd799439011"
        });
        let before = payload.clone();
        assert!(!upgrade("empresa", &mut payload));
        assert_eq!(payload, before);
    }

    #[test]
    fn test_client_key_becomes_organization() {
        let mut payload = json!({ "nombre": "Acme SA", "client": "507f1f77bcf86cd799439011" });
        assert!(upgrade("empresa", &mut payload));
        assert_eq!(payload["organization"], "507f1f77bcf86cd799439011");
        assert!(payload.get("client").is_none());
    }

    #[test]
    fn test_shadowed_legacy_key_is_dropped() {
        let mut payload = json!({
            "client": "aaaaaaaaaaaaaaaaaaaaaaaa",
            "organization": "507f1f77bcf86cd799439011"
        });
        assert!(upgrade("paciente", &mut payload));
        assert_eq!(payload["organization"], "507f1f77bcf86cd799439011");
        assert!(payload.get("client").is_none());
    }

    #[test]
    fn test_organization_settings_flag() {
        let mut payload = json!({ "settings": { "allowCrossClientAccess": true } });
        assert!(upgrade("organization", &mut payload));
        assert_eq!(payload["settings"]["allowCrossOrganizationAccess"], true);
        assert!(payload["settings"].get("allowCrossClientAccess").is_none());
    }

    #[test]
    fn test_paciente_demographics() {
        let mut payload = json!({ "sexo": "female", "estadoCivil": "married" });
        assert!(upgrade("paciente", &mut payload));
        assert_eq!(payload["sexo"], "F");
        assert_eq!(payload["estadoCivil"], "Casado/a");
    }

    #[test]
    fn test_canonical_demographics_pass_through() {
        let mut payload = json!({ "sexo": "F", "estadoCivil": "Casado/a" });
        assert!(!upgrade("paciente", &mut payload));
    }

    #[test]
    fn test_notification_types() {
        let mut payload = json!({ "type": "user_joined_client", "relatedType": "client" });
        assert!(upgrade("notification", &mut payload));
        assert_eq!(payload["type"], "user_joined_organization");
        assert_eq!(payload["relatedType"], "organization");

        let mut orphan = json!({ "type": "user_left_client" });
        assert!(upgrade("notification", &mut orphan));
        assert_eq!(orphan["type"], "user_left_organization");
    }

    #[test]
    fn test_user_settings_and_profile_hoisting() {
        let mut payload = json!({
            "userName": "mgarcia",
            "settings": { "theme": "dark" },
            "profile": {
                "phone": "11-5555-0000",
                "name": "María",
                "email": "maria@clinica.ar",
                "profile": { "department": "Medicina Laboral", "phone": "ignored" }
            }
        });
        assert!(upgrade("user", &mut payload));

        assert_eq!(payload["preferences"]["theme"], "dark");
        assert!(payload.get("settings").is_none());
        // Duplicates hoist to the root without clobbering.
        assert_eq!(payload["name"], "María");
        assert_eq!(payload["email"], "maria@clinica.ar");
        // Nested profile merges without overwriting existing keys.
        assert_eq!(payload["profile"]["phone"], "11-5555-0000");
        assert_eq!(payload["profile"]["department"], "Medicina Laboral");
        assert!(payload["profile"].get("profile").is_none());
        assert!(payload["profile"].get("name").is_none());
    }

    #[test]
    fn test_filter_upgrades() {
        let mut paciente = json!({ "query": "garcia" });
        assert!(upgrade("pacienteFilters", &mut paciente));
        assert_eq!(paciente["search"], "garcia");

        let mut empresa = json!({ "sector": "todos" });
        assert!(upgrade("empresaFilters", &mut empresa));
        assert!(empresa.get("sector").is_none());

        let mut kept = json!({ "sector": "salud" });
        assert!(!upgrade("empresaFilters", &mut kept));
        assert_eq!(kept["sector"], "salud");
    }

    #[test]
    fn test_admin_stats_counts() {
        let mut payload = json!({ "users": 4, "clients": 2 });
        assert!(upgrade("adminStats", &mut payload));
        assert_eq!(payload["organizations"], 2);
    }

    #[test]
    fn test_unknown_entity_and_non_object() {
        assert!(!upgrade("mystery", &mut json!({ "client": "x" })));
        assert!(!upgrade("empresa", &mut json!(["client"])));
    }
}
