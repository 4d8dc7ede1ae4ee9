//! # Notifications
//!
//! In-app notifications produced as side-effects of invitation and role
//! events (the production of them lives outside this package). Read
//! state is server-managed: a create payload never carries it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ergon_core::descriptor::{EntityDescriptor, FieldRole, FieldSpec, SchemaVariant};
use ergon_core::normalize::{clean, trim, Normalize};
use ergon_core::validate::{
    check_id, check_id_opt, field_path, require_nonempty, Validate, Violations,
};
use ergon_core::{Authoring, ObjectId};

/// Lifecycle events a notification can announce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    InvitationReceived,
    InvitationAccepted,
    InvitationDeclined,
    UserJoinedOrganization,
    UserLeftOrganization,
    OrganizationCreated,
    RoleChanged,
}

impl NotificationType {
    pub const ALL: [NotificationType; 7] = [
        NotificationType::InvitationReceived,
        NotificationType::InvitationAccepted,
        NotificationType::InvitationDeclined,
        NotificationType::UserJoinedOrganization,
        NotificationType::UserLeftOrganization,
        NotificationType::OrganizationCreated,
        NotificationType::RoleChanged,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::InvitationReceived => "invitation_received",
            NotificationType::InvitationAccepted => "invitation_accepted",
            NotificationType::InvitationDeclined => "invitation_declined",
            NotificationType::UserJoinedOrganization => "user_joined_organization",
            NotificationType::UserLeftOrganization => "user_left_organization",
            NotificationType::OrganizationCreated => "organization_created",
            NotificationType::RoleChanged => "role_changed",
        }
    }
}

/// Kind of entity a notification points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelatedEntityType {
    Invitation,
    User,
    Organization,
}

/// Canonical notification record, scoped to its recipient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// Recipient.
    pub user_id: ObjectId,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub title: String,
    pub message: String,
    /// Entity the notification refers to, when any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_id: Option<ObjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_type: Option<RelatedEntityType>,
    #[serde(default)]
    pub is_read: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_at: Option<DateTime<Utc>>,
    /// Optional action button.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_url: Option<String>,
    #[serde(flatten)]
    pub authoring: Authoring,
}

impl Normalize for Notification {
    fn normalize(&mut self) {
        trim(&mut self.title);
        trim(&mut self.message);
        clean(&mut self.action_label);
        clean(&mut self.action_url);
        self.authoring.normalize();
    }
}

impl Validate for Notification {
    fn collect(&self, path: &str, out: &mut Violations) {
        check_id_opt(out, field_path(path, "_id"), self.id.as_ref());
        check_id(out, field_path(path, "userId"), &self.user_id);
        require_nonempty(out, field_path(path, "title"), &self.title, "is required");
        require_nonempty(out, field_path(path, "message"), &self.message, "is required");
        check_id_opt(out, field_path(path, "relatedId"), self.related_id.as_ref());
        self.authoring.collect(path, out);
    }
}

/// Creation payload; read state is stamped by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationCreate {
    pub user_id: ObjectId,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub title: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_id: Option<ObjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_type: Option<RelatedEntityType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_url: Option<String>,
}

impl Normalize for NotificationCreate {
    fn normalize(&mut self) {
        trim(&mut self.title);
        trim(&mut self.message);
        clean(&mut self.action_label);
        clean(&mut self.action_url);
    }
}

impl Validate for NotificationCreate {
    fn collect(&self, path: &str, out: &mut Violations) {
        check_id(out, field_path(path, "userId"), &self.user_id);
        require_nonempty(out, field_path(path, "title"), &self.title, "is required");
        require_nonempty(out, field_path(path, "message"), &self.message, "is required");
        check_id_opt(out, field_path(path, "relatedId"), self.related_id.as_ref());
    }
}

/// Marks one notification as read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkNotificationRead {
    pub notification_id: ObjectId,
}

impl Normalize for MarkNotificationRead {
    fn normalize(&mut self) {}
}

impl Validate for MarkNotificationRead {
    fn collect(&self, path: &str, out: &mut Violations) {
        check_id(out, field_path(path, "notificationId"), &self.notification_id);
    }
}

const TYPE_VALUES: &[&str] = &[
    "invitation_received",
    "invitation_accepted",
    "invitation_declined",
    "user_joined_organization",
    "user_left_organization",
    "organization_created",
    "role_changed",
];
const RELATED_TYPE_VALUES: &[&str] = &["invitation", "user", "organization"];

pub static NOTIFICATION: EntityDescriptor = EntityDescriptor {
    entity: "notification",
    strict: false,
    audited: true,
    fields: &[
        FieldSpec::new("_id", false, FieldRole::Identifier),
        FieldSpec::new("userId", true, FieldRole::Immutable),
        FieldSpec::new("type", true, FieldRole::Data).values(TYPE_VALUES),
        FieldSpec::new("title", true, FieldRole::Data),
        FieldSpec::new("message", true, FieldRole::Data),
        FieldSpec::new("relatedId", false, FieldRole::Data),
        FieldSpec::new("relatedType", false, FieldRole::Data).values(RELATED_TYPE_VALUES),
        FieldSpec::new("isRead", false, FieldRole::ServerManaged),
        FieldSpec::new("readAt", false, FieldRole::ServerManaged),
        FieldSpec::new("actionLabel", false, FieldRole::Data),
        FieldSpec::new("actionUrl", false, FieldRole::Data),
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

    fn recipient() -> &'static str {
        "507f1f77bcf86cd799439011"
    }

    #[test]
    fn test_type_vocabulary_round_trips() {
        for kind in NotificationType::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
        // Legacy client-era values are not members.
        assert!(serde_json::from_str::<NotificationType>("\"user_joined_client\"").is_err());
        assert!(serde_json::from_str::<NotificationType>("\"client_created\"").is_err());
    }

    #[test]
    fn test_create_omits_read_state() {
        assert!(!NOTIFICATION.accepts(SchemaVariant::Create, "isRead"));
        assert!(!NOTIFICATION.accepts(SchemaVariant::Create, "readAt"));

        let parsed: NotificationCreate = NOTIFICATION
            .parse(
                SchemaVariant::Create,
                &json!({
                    "userId": recipient(),
                    "type": "invitation_received",
                    "title": "Invitación",
                    "message": "Fuiste invitado a Clínica Central",
                    "relatedType": "invitation"
                }),
            )
            .unwrap();
        assert_eq!(parsed.kind, NotificationType::InvitationReceived);
        assert_eq!(parsed.related_type, Some(RelatedEntityType::Invitation));
    }

    #[test]
    fn test_unknown_type_screened_with_path() {
        let violations = NOTIFICATION.screen(
            SchemaVariant::Create,
            &json!({
                "userId": recipient(),
                "type": "user_joined_client",
                "title": "t",
                "message": "m"
            }),
        );
        assert!(violations.contains_path("type"));
    }

    #[test]
    fn test_canonical_defaults_unread() {
        let notification: Notification = serde_json::from_value(json!({
            "userId": recipient(),
            "type": "role_changed",
            "title": "Rol actualizado",
            "message": "Ahora sos auditor"
        }))
        .unwrap();
        assert!(!notification.is_read);
        assert!(notification.read_at.is_none());
    }

    #[test]
    fn test_mark_read_checks_identifier() {
        let payload = MarkNotificationRead {
            notification_id: ObjectId("x".to_string()),
        };
        let violations = payload.validate().unwrap_err();
        assert!(violations.contains_path("notificationId"));
    }
}
