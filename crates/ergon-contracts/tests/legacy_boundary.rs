//! End-to-end behavior of the legacy-vocabulary boundary: a client-era
//! payload fails canonical screening as-is, passes after an explicit
//! upgrade, and the upgraded value carries the canonical vocabulary.

use serde_json::json;

use ergon_contracts::registry;
use ergon_contracts::{EstadoCivil, Paciente, SchemaVariant, Sexo};
use ergon_core::legacy;

const ORG: &str = "507f1f77bcf86cd799439011";

#[test]
fn legacy_paciente_upgrades_then_validates() {
    let mut payload = json!({
        "apellido": "Pereyra",
        "nombres": "Juan",
        "dni": "30123456",
        "sexo": "male",
        "estadoCivil": "married",
        "client": ORG
    });

    // As-is, the demographic values are outside the canonical vocabulary.
    let paciente = registry::descriptor("paciente").unwrap();
    let before = paciente.screen(SchemaVariant::Canonical, &payload);
    assert!(before.contains_path("sexo"));
    assert!(before.contains_path("estadoCivil"));

    assert!(legacy::upgrade("paciente", &mut payload));

    let canonical: Paciente = paciente.parse(SchemaVariant::Canonical, &payload).unwrap();
    assert_eq!(canonical.sexo, Some(Sexo::M));
    assert_eq!(canonical.estado_civil, Some(EstadoCivil::Casado));
    assert_eq!(canonical.organization.as_ref().unwrap().as_str(), ORG);
}

#[test]
fn legacy_notification_type_upgrades_past_membership_screen() {
    let notification = registry::descriptor("notification").unwrap();
    let mut payload = json!({
        "userId": ORG,
        "type": "user_joined_client",
        "title": "Nuevo integrante",
        "message": "Juan se unió a la organización"
    });

    assert!(notification
        .screen(SchemaVariant::Create, &payload)
        .contains_path("type"));

    assert!(legacy::upgrade("notification", &mut payload));
    assert_eq!(payload["type"], "user_joined_organization");
    assert!(notification
        .screen(SchemaVariant::Create, &payload)
        .is_empty());
}

#[test]
fn upgrade_is_idempotent() {
    let mut payload = json!({
        "sexo": "female",
        "estadoCivil": "single",
        "client": ORG
    });
    assert!(legacy::upgrade("paciente", &mut payload));
    let once = payload.clone();
    assert!(!legacy::upgrade("paciente", &mut payload));
    assert_eq!(payload, once);
}

#[test]
fn canonical_schemas_never_accept_the_legacy_tenant_key() {
    // The upgrade is the only way in: `client` is not a canonical field,
    // so lenient entities drop it rather than treat it as a tenant.
    let empresa = registry::descriptor("empresa").unwrap();
    let payload = json!({ "nombre": "Acme SA", "client": ORG });
    let violations = empresa.screen(SchemaVariant::Document, &payload);
    assert!(violations.contains_path("organization"));
}
