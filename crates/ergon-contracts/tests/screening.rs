//! Cross-entity screening behavior: immutability on update, strict
//! versus lenient unknown-field policy, sensitive-field redaction, and
//! the cross-field password refinement.

use serde_json::json;

use ergon_contracts::registry;
use ergon_contracts::{ChangePassword, SchemaVariant};
use ergon_core::validate::parse_payload;

const ORG: &str = "507f1f77bcf86cd799439011";

#[test]
fn update_rejects_tenant_field_on_every_tenant_scoped_entity() {
    for name in [
        "team",
        "empresa",
        "paciente",
        "historiaClinica",
        "scheduledExam",
    ] {
        let descriptor = registry::descriptor(name).unwrap();
        if !descriptor.variants.contains(&SchemaVariant::Update) {
            continue;
        }
        let violations = descriptor.screen(SchemaVariant::Update, &json!({ "organization": ORG }));
        assert!(
            violations.contains_path("organization"),
            "{name} must freeze its tenant on update"
        );
    }
}

#[test]
fn update_rejects_creation_authoring_fields() {
    let empresa = registry::descriptor("empresa").unwrap();
    for frozen in ["createdAt", "createdBy"] {
        let violations =
            empresa.screen(SchemaVariant::Update, &json!({ frozen: "2024-01-01T00:00:00Z" }));
        assert!(violations.contains_path(frozen), "{frozen} must be frozen");
    }
    // The mutable half of the mixin stays updatable.
    assert!(empresa
        .screen(
            SchemaVariant::Update,
            &json!({ "updatedAt": "2024-01-01T00:00:00Z" })
        )
        .is_empty());
}

#[test]
fn update_accepts_single_field_payload() {
    let empresa = registry::descriptor("empresa").unwrap();
    assert!(empresa
        .screen(SchemaVariant::Update, &json!({ "telefono": "0261-455-0000" }))
        .is_empty());
    assert!(empresa.screen(SchemaVariant::Update, &json!({})).is_empty());
}

#[test]
fn unknown_fields_dropped_everywhere_but_audit() {
    let probe = json!({ "campoInventado": 1 });
    for descriptor in registry::ALL {
        let violations = descriptor.screen(SchemaVariant::Canonical, &probe);
        if descriptor.entity == "auditLog" {
            assert!(
                violations.contains_path("campoInventado"),
                "audit log must reject unknown fields"
            );
        } else {
            assert!(
                !violations.contains_path("campoInventado"),
                "{} must drop unknown fields silently",
                descriptor.entity
            );
        }
    }
}

#[test]
fn public_variant_redacts_password_only() {
    let user = registry::descriptor("user").unwrap();
    assert!(!user.accepts(SchemaVariant::Public, "password"));
    for visible in ["userName", "email", "name", "organizations", "lastLogin"] {
        assert!(
            user.accepts(SchemaVariant::Public, visible),
            "{visible} belongs to the public view"
        );
    }
}

#[test]
fn password_change_refinement_targets_confirmation_field() {
    let ok: Result<ChangePassword, _> = parse_payload(
        "changePassword",
        &json!({
            "currentPassword": "x",
            "newPassword": "abcdef",
            "confirmPassword": "abcdef"
        }),
    );
    assert!(ok.is_ok());

    let err = parse_payload::<ChangePassword>(
        "changePassword",
        &json!({
            "currentPassword": "x",
            "newPassword": "abcdef",
            "confirmPassword": "abcdeg"
        }),
    )
    .unwrap_err();
    let violations = err.violations().unwrap();
    assert!(violations.contains_path("confirmPassword"));
    assert!(!violations.contains_path("newPassword"));
    assert!(violations.to_string().contains("Las contraseñas no coinciden"));
}

#[test]
fn server_managed_fields_never_reach_create() {
    for (entity, field) in [
        ("user", "lastLogin"),
        ("notification", "isRead"),
        ("invitation", "status"),
        ("invitation", "invitationToken"),
        ("scheduledExam", "generatedHistorias"),
        ("scheduledExam", "stats"),
        ("paciente", "scheduledExams"),
    ] {
        let descriptor = registry::descriptor(entity).unwrap();
        assert!(
            !descriptor.accepts(SchemaVariant::Create, field),
            "{entity}.{field} is backend-owned"
        );
    }
}
