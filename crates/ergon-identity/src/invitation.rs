//! # Invitation Lifecycle
//!
//! Inviting a user into an organization. The status machine has one
//! non-terminal state:
//!
//! ```text
//! pending ──▶ accepted (terminal)
//!    │
//!    ├─────▶ declined (terminal)
//!    │
//!    └─────▶ expired  (terminal)
//! ```
//!
//! Expiry is server-managed: an invitation lapses seven days after it
//! was sent. The create payload therefore carries neither lifecycle
//! fields nor the email token; the backend mints both.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use ergon_core::descriptor::{EntityDescriptor, FieldRole, FieldSpec, SchemaVariant};
use ergon_core::normalize::{clean, trim, Normalize};
use ergon_core::validate::{check_email, check_id, check_id_opt, field_path, Validate, Violations};
use ergon_core::{Authoring, ObjectId};

const MSG_EMAIL: &str = "Email inválido";

/// Days until a sent invitation expires.
pub const EXPIRY_DAYS: i64 = 7;

/// Expiry instant for an invitation sent at `sent_at`.
pub fn expires_after(sent_at: DateTime<Utc>) -> DateTime<Utc> {
    sent_at + Duration::days(EXPIRY_DAYS)
}

/// Lifecycle state of an invitation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvitationStatus {
    #[default]
    Pending,
    Accepted,
    Declined,
    Expired,
}

impl InvitationStatus {
    pub const ALL: [InvitationStatus; 4] = [
        InvitationStatus::Pending,
        InvitationStatus::Accepted,
        InvitationStatus::Declined,
        InvitationStatus::Expired,
    ];

    /// Every state except `pending` is terminal: once resolved, an
    /// invitation never changes state again.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, InvitationStatus::Pending)
    }

    /// Whether the status may move to `to`.
    pub fn can_transition_to(&self, to: InvitationStatus) -> bool {
        matches!(self, InvitationStatus::Pending) && to.is_terminal()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InvitationStatus::Pending => "pending",
            InvitationStatus::Accepted => "accepted",
            InvitationStatus::Declined => "declined",
            InvitationStatus::Expired => "expired",
        }
    }
}

/// Role granted to the invitee on acceptance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvitationRole {
    Admin,
    #[default]
    User,
    Viewer,
}

impl InvitationRole {
    pub const ALL: [InvitationRole; 3] = [
        InvitationRole::Admin,
        InvitationRole::User,
        InvitationRole::Viewer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InvitationRole::Admin => "admin",
            InvitationRole::User => "user",
            InvitationRole::Viewer => "viewer",
        }
    }
}

/// Canonical invitation record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invitation {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// Target address the invitation is mailed to.
    pub email: String,
    /// User who sent the invitation.
    pub invited_by: ObjectId,
    /// Target organization; injected by middleware on create.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<ObjectId>,
    #[serde(default)]
    pub role: InvitationRole,
    #[serde(default)]
    pub status: InvitationStatus,
    /// Optional note from the inviter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default = "Utc::now")]
    pub sent_at: DateTime<Utc>,
    /// Always `sentAt` + seven days; stored denormalized for queries.
    pub expires_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responded_at: Option<DateTime<Utc>>,
    /// Registered user who resolved the invitation, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responded_by: Option<ObjectId>,
    /// Opaque token embedded in the email link.
    pub invitation_token: String,
    #[serde(flatten)]
    pub authoring: Authoring,
}

impl Normalize for Invitation {
    fn normalize(&mut self) {
        trim(&mut self.email);
        clean(&mut self.message);
        self.authoring.normalize();
    }
}

impl Validate for Invitation {
    fn collect(&self, path: &str, out: &mut Violations) {
        check_id_opt(out, field_path(path, "_id"), self.id.as_ref());
        check_email(out, field_path(path, "email"), &self.email, MSG_EMAIL);
        check_id(out, field_path(path, "invitedBy"), &self.invited_by);
        check_id_opt(out, field_path(path, "organization"), self.organization.as_ref());
        check_id_opt(out, field_path(path, "respondedBy"), self.responded_by.as_ref());
        self.authoring.collect(path, out);
    }
}

/// Creation payload: the backend injects the organization and mints
/// status, timestamps, and the token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvitationCreate {
    pub email: String,
    pub invited_by: ObjectId,
    #[serde(default)]
    pub role: InvitationRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Normalize for InvitationCreate {
    fn normalize(&mut self) {
        trim(&mut self.email);
        clean(&mut self.message);
    }
}

impl Validate for InvitationCreate {
    fn collect(&self, path: &str, out: &mut Violations) {
        check_email(out, field_path(path, "email"), &self.email, MSG_EMAIL);
        check_id(out, field_path(path, "invitedBy"), &self.invited_by);
    }
}

/// The invitee's answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvitationResponse {
    Accept,
    Decline,
}

/// Payload resolving an invitation from its emailed token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RespondToInvitation {
    pub invitation_token: String,
    pub response: InvitationResponse,
}

impl Normalize for RespondToInvitation {
    fn normalize(&mut self) {
        trim(&mut self.invitation_token);
    }
}

impl Validate for RespondToInvitation {
    fn collect(&self, path: &str, out: &mut Violations) {
        ergon_core::validate::require_nonempty(
            out,
            field_path(path, "invitationToken"),
            &self.invitation_token,
            "is required",
        );
    }
}

const STATUS_VALUES: &[&str] = &["pending", "accepted", "declined", "expired"];
const ROLE_VALUES: &[&str] = &["admin", "user", "viewer"];

pub static INVITATION: EntityDescriptor = EntityDescriptor {
    entity: "invitation",
    strict: false,
    audited: true,
    fields: &[
        FieldSpec::new("_id", false, FieldRole::Identifier),
        FieldSpec::new("email", true, FieldRole::Data).message(MSG_EMAIL),
        FieldSpec::new("invitedBy", true, FieldRole::Immutable),
        FieldSpec::new("organization", false, FieldRole::Tenant),
        FieldSpec::new("role", false, FieldRole::Data).values(ROLE_VALUES),
        FieldSpec::new("status", false, FieldRole::ServerManaged).values(STATUS_VALUES),
        FieldSpec::new("message", false, FieldRole::Data),
        FieldSpec::new("sentAt", false, FieldRole::ServerManaged),
        FieldSpec::new("expiresAt", true, FieldRole::ServerManaged),
        FieldSpec::new("respondedAt", false, FieldRole::ServerManaged),
        FieldSpec::new("respondedBy", false, FieldRole::ServerManaged),
        FieldSpec::new("invitationToken", true, FieldRole::ServerManaged),
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
    use chrono::TimeZone;
    use serde_json::json;

    fn inviter() -> &'static str {
        "507f1f77bcf86cd799439011"
    }

    #[test]
    fn test_expiry_is_seven_days_after_sent() {
        let sent = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let expires = expires_after(sent);
        assert_eq!(expires, Utc.with_ymd_and_hms(2024, 6, 8, 12, 0, 0).unwrap());
    }

    #[test]
    fn test_pending_is_the_only_non_terminal_state() {
        for status in InvitationStatus::ALL {
            assert_eq!(status.is_terminal(), status != InvitationStatus::Pending);
        }
    }

    #[test]
    fn test_resolved_invitations_never_move_again() {
        assert!(InvitationStatus::Pending.can_transition_to(InvitationStatus::Accepted));
        assert!(InvitationStatus::Pending.can_transition_to(InvitationStatus::Expired));
        assert!(!InvitationStatus::Pending.can_transition_to(InvitationStatus::Pending));
        assert!(!InvitationStatus::Accepted.can_transition_to(InvitationStatus::Declined));
        assert!(!InvitationStatus::Expired.can_transition_to(InvitationStatus::Pending));
    }

    #[test]
    fn test_create_omits_lifecycle_and_token() {
        for injected in [
            "status",
            "sentAt",
            "expiresAt",
            "respondedAt",
            "respondedBy",
            "invitationToken",
            "organization",
        ] {
            assert!(
                !INVITATION.accepts(SchemaVariant::Create, injected),
                "{injected} should not be accepted on create"
            );
        }

        let parsed: InvitationCreate = INVITATION
            .parse(
                SchemaVariant::Create,
                &json!({ "email": "nuevo@clinica.ar", "invitedBy": inviter() }),
            )
            .unwrap();
        assert_eq!(parsed.role, InvitationRole::User);
        assert!(parsed.message.is_none());
    }

    #[test]
    fn test_canonical_requires_token_and_expiry() {
        let violations = INVITATION.screen(
            SchemaVariant::Canonical,
            &json!({ "email": "nuevo@clinica.ar", "invitedBy": inviter() }),
        );
        assert!(violations.contains_path("expiresAt"));
        assert!(violations.contains_path("invitationToken"));
    }

    #[test]
    fn test_status_membership_screened() {
        let violations = INVITATION.screen(
            SchemaVariant::Canonical,
            &json!({
                "email": "nuevo@clinica.ar",
                "invitedBy": inviter(),
                "expiresAt": "2024-06-08T12:00:00Z",
                "invitationToken": "tok",
                "status": "on-hold"
            }),
        );
        assert!(violations.contains_path("status"));
    }

    #[test]
    fn test_canonical_defaults() {
        let invitation: Invitation = serde_json::from_value(json!({
            "email": "nuevo@clinica.ar",
            "invitedBy": inviter(),
            "expiresAt": "2024-06-08T12:00:00Z",
            "invitationToken": "tok-abc123"
        }))
        .unwrap();
        assert_eq!(invitation.status, InvitationStatus::Pending);
        assert_eq!(invitation.role, InvitationRole::User);
    }
}
