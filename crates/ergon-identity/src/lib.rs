//! # Ergon Identity Contracts
//!
//! Validation schemas for the identity side of the platform: the tenant
//! root ([`organization`]), [`team`]s and [`role`]s within it, [`user`]
//! accounts with their polymorphic organizational references, and the
//! [`invitation`]/[`notification`] flow that brings users in.
//!
//! Each module exposes the canonical record type, its derived
//! create/update/public variants, and a `static` field descriptor from
//! which projection membership is computed.

pub mod invitation;
pub mod notification;
pub mod organization;
pub mod role;
pub mod team;
pub mod user;

pub use invitation::{
    Invitation, InvitationCreate, InvitationResponse, InvitationRole, InvitationStatus,
    RespondToInvitation,
};
pub use notification::{
    MarkNotificationRead, Notification, NotificationCreate, NotificationType, RelatedEntityType,
};
pub use organization::{Organization, OrganizationCreate, OrganizationSettings};
pub use role::{Permission, Role, RoleCreate};
pub use team::{Team, TeamCreate, TeamSettings};
pub use user::{
    AuthState, ChangePassword, Login, NotificationChannels, OrganizationRef, RoleRef, TeamRef,
    Theme, User, UserCreate, UserPreferences, UserProfile, UserProfileUpdate, UserPublic,
};
