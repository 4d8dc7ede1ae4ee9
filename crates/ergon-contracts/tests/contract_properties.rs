//! Property checks over the contract primitives, quantified with
//! proptest: identifier length is the only identifier rule, the
//! trim-or-absent contract holds for arbitrary free text, and closed
//! vocabularies accept exactly their members.

use proptest::prelude::*;
use serde_json::json;

use ergon_contracts::registry;
use ergon_contracts::{EmpresaCreate, ObjectId, SchemaVariant, Sector};
use ergon_core::OBJECT_ID_LEN;

proptest! {
    #[test]
    fn identifier_accepts_exactly_len_24(s in "[a-zA-Z0-9]{0,48}") {
        let parsed = ObjectId::parse(s.clone());
        prop_assert_eq!(parsed.is_ok(), s.len() == OBJECT_ID_LEN);
    }

    #[test]
    fn identifier_content_is_not_inspected(s in "\\PC{24}") {
        // 24 characters of anything pass; only length is checked.
        prop_assert!(ObjectId::parse(s).is_ok());
    }

    #[test]
    fn free_text_is_trimmed_or_absent(raw in "\\s{0,4}[a-zA-Z0-9 ]{0,20}\\s{0,4}") {
        let empresa = registry::descriptor("empresa").unwrap();
        let payload = json!({ "nombre": "Acme SA", "contacto": raw.clone() });
        let created: EmpresaCreate = empresa
            .parse(SchemaVariant::Create, &payload)
            .expect("optional free text never fails validation");
        match created.contacto {
            None => prop_assert!(raw.trim().is_empty()),
            Some(value) => {
                prop_assert_eq!(value.as_str(), raw.trim());
                prop_assert!(!value.is_empty());
            }
        }
    }

    #[test]
    fn sector_vocabulary_is_closed(candidate in "[a-z_]{1,16}") {
        let member = Sector::ALL.iter().any(|s| s.as_str() == candidate);
        let parsed = serde_json::from_value::<Sector>(json!(candidate));
        prop_assert_eq!(parsed.is_ok(), member);
    }

    #[test]
    fn screening_never_panics_on_arbitrary_keys(key in "[a-zA-Z]{1,20}", value in any::<i64>()) {
        let payload = json!({ key: value });
        for descriptor in registry::ALL {
            for variant in descriptor.variants {
                let _ = descriptor.screen(*variant, &payload);
            }
        }
    }
}

#[test]
fn whitespace_only_required_field_is_reported_missing_style() {
    // "   " in a required slot is a violation, never silently erased.
    let empresa = registry::descriptor("empresa").unwrap();
    let err = empresa
        .parse::<EmpresaCreate>(SchemaVariant::Create, &json!({ "nombre": "   " }))
        .unwrap_err();
    assert!(err.violations().unwrap().contains_path("nombre"));
}
