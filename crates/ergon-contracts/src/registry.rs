//! # Schema Registry
//!
//! The entity-name to descriptor mapping both consumers resolve against
//! when routing a payload: the frontend to pick the form schema, the
//! backend to pick the create/update/filter schema for a request body.
//! Names are the wire spellings used in API routes.

use ergon_core::EntityDescriptor;

use ergon_audit::log::AUDIT_LOG;
use ergon_clinical::empresa::EMPRESA;
use ergon_clinical::historia::HISTORIA_CLINICA;
use ergon_clinical::paciente::PACIENTE;
use ergon_clinical::scheduled_exam::SCHEDULED_EXAM;
use ergon_identity::invitation::INVITATION;
use ergon_identity::notification::NOTIFICATION;
use ergon_identity::organization::ORGANIZATION;
use ergon_identity::role::ROLE;
use ergon_identity::team::TEAM;
use ergon_identity::user::USER;

/// Every registered entity, in registry order.
pub static ALL: [&EntityDescriptor; 11] = [
    &ORGANIZATION,
    &TEAM,
    &ROLE,
    &USER,
    &INVITATION,
    &NOTIFICATION,
    &EMPRESA,
    &PACIENTE,
    &HISTORIA_CLINICA,
    &SCHEDULED_EXAM,
    &AUDIT_LOG,
];

/// Resolve an entity name to its descriptor.
pub fn descriptor(entity: &str) -> Option<&'static EntityDescriptor> {
    ALL.iter().copied().find(|d| d.entity == entity)
}

/// The registered entity names, in registry order.
pub fn entity_names() -> impl Iterator<Item = &'static str> {
    ALL.iter().map(|d| d.entity)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_entity_resolves_by_its_own_name() {
        for d in ALL {
            let resolved = descriptor(d.entity).unwrap();
            assert_eq!(resolved.entity, d.entity);
        }
        assert!(descriptor("cliente").is_none());
        assert!(descriptor("").is_none());
    }

    #[test]
    fn test_registry_names_are_unique() {
        let mut names: Vec<&str> = entity_names().collect();
        assert_eq!(names.len(), 11);
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 11);
    }

    #[test]
    fn test_only_audit_log_is_strict() {
        for d in ALL {
            assert_eq!(d.strict, d.entity == "auditLog", "{}", d.entity);
        }
    }

    #[test]
    fn test_audit_log_is_the_only_unaudited_entity() {
        // Every stored entity carries the authoring mixin except the
        // audit log, which is itself the audit trail.
        for d in ALL {
            assert_eq!(d.audited, d.entity != "auditLog", "{}", d.entity);
        }
    }
}
