//! # User Account Contracts
//!
//! The user record and its operation payloads: creation, the public
//! (password-redacted) view, self-service profile updates, the
//! password-change refinement, login, and the client-side auth state.
//!
//! A user's organizational relationships are polymorphic on the wire:
//! each may arrive as a bare identifier or as a populated summary
//! object, so they are typed through [`Reference`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ergon_core::descriptor::{EntityDescriptor, FieldRole, FieldSpec, SchemaVariant};
use ergon_core::normalize::{clean, trim, Normalize};
use ergon_core::validate::{
    check_email, check_id_opt, field_path, index_path, require_nonempty, Validate, Violations,
};
use ergon_core::{Authoring, ObjectId, Reference};

const MSG_USERNAME: &str = "Nombre de usuario es requerido";
const MSG_EMAIL: &str = "Email inválido";
const MSG_NAME: &str = "Nombre es requerido";
const MSG_CURRENT_PASSWORD: &str = "Contraseña actual es requerida";
const MSG_PASSWORD: &str = "Contraseña es requerida";
const MSG_NEW_PASSWORD: &str = "La nueva contraseña debe tener al menos 6 caracteres";
const MSG_PASSWORD_MISMATCH: &str = "Las contraseñas no coinciden";

/// Minimum accepted password length.
pub const MIN_PASSWORD_LEN: usize = 6;

fn default_true() -> bool {
    true
}

fn default_language() -> String {
    "es".to_string()
}

// ─── Reference Summaries ────────────────────────────────────────────────

/// Populated form of an organization reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganizationRef {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
}

impl Validate for OrganizationRef {
    fn collect(&self, path: &str, out: &mut Violations) {
        check_id_opt(out, field_path(path, "_id"), self.id.as_ref());
    }
}

/// Populated form of a team reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamRef {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
}

impl Validate for TeamRef {
    fn collect(&self, path: &str, out: &mut Violations) {
        check_id_opt(out, field_path(path, "_id"), self.id.as_ref());
    }
}

/// Populated form of a role reference, optionally carrying the
/// effective permission tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleRef {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Vec<String>>,
}

impl Validate for RoleRef {
    fn collect(&self, path: &str, out: &mut Violations) {
        check_id_opt(out, field_path(path, "_id"), self.id.as_ref());
    }
}

// ─── Sub-objects ────────────────────────────────────────────────────────

/// Free-text profile details, all optional and trim-or-absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl Normalize for UserProfile {
    fn normalize(&mut self) {
        clean(&mut self.avatar);
        clean(&mut self.phone);
        clean(&mut self.department);
        clean(&mut self.position);
        clean(&mut self.bio);
        clean(&mut self.address);
    }
}

/// Interface theme choice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
    Auto,
}

impl Theme {
    pub const ALL: [Theme; 3] = [Theme::Light, Theme::Dark, Theme::Auto];

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::Auto => "auto",
        }
    }
}

/// Per-channel notification toggles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationChannels {
    #[serde(default = "default_true")]
    pub email: bool,
    #[serde(default = "default_true")]
    pub push: bool,
    #[serde(default)]
    pub sms: bool,
    #[serde(default = "default_true")]
    pub browser: bool,
}

impl Default for NotificationChannels {
    fn default() -> Self {
        Self {
            email: true,
            push: true,
            sms: false,
            browser: true,
        }
    }
}

/// User preferences block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferences {
    #[serde(default)]
    pub theme: Theme,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notifications: Option<NotificationChannels>,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            theme: Theme::Light,
            language: default_language(),
            notifications: None,
        }
    }
}

// ─── Canonical record and variants ──────────────────────────────────────

/// Canonical user record.
///
/// `password` is only ever present on create/update payloads; the
/// public view redacts it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// A user may belong to one or many organizations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organizations: Option<Vec<Reference<OrganizationRef>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<Reference<TeamRef>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Reference<RoleRef>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<UserProfile>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_email_verified: bool,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferences: Option<UserPreferences>,
    #[serde(flatten)]
    pub authoring: Authoring,
}

fn collect_identity(
    path: &str,
    out: &mut Violations,
    user_name: &str,
    email: &str,
    name: &str,
) {
    require_nonempty(out, field_path(path, "userName"), user_name, MSG_USERNAME);
    check_email(out, field_path(path, "email"), email, MSG_EMAIL);
    require_nonempty(out, field_path(path, "name"), name, MSG_NAME);
}

fn collect_relationships(
    path: &str,
    out: &mut Violations,
    organizations: Option<&Vec<Reference<OrganizationRef>>>,
    team: Option<&Reference<TeamRef>>,
    role: Option<&Reference<RoleRef>>,
) {
    if let Some(organizations) = organizations {
        let prefix = field_path(path, "organizations");
        for (i, reference) in organizations.iter().enumerate() {
            reference.collect(&index_path(&prefix, i), out);
        }
    }
    if let Some(team) = team {
        team.collect(&field_path(path, "team"), out);
    }
    if let Some(role) = role {
        role.collect(&field_path(path, "role"), out);
    }
}

impl Normalize for User {
    fn normalize(&mut self) {
        trim(&mut self.user_name);
        trim(&mut self.email);
        trim(&mut self.name);
        clean(&mut self.last_name);
        if let Some(profile) = &mut self.profile {
            profile.normalize();
        }
        self.authoring.normalize();
    }
}

impl Validate for User {
    fn collect(&self, path: &str, out: &mut Violations) {
        check_id_opt(out, field_path(path, "_id"), self.id.as_ref());
        collect_identity(path, out, &self.user_name, &self.email, &self.name);
        collect_relationships(
            path,
            out,
            self.organizations.as_ref(),
            self.team.as_ref(),
            self.role.as_ref(),
        );
        self.authoring.collect(path, out);
    }
}

/// Creation payload; last-login and authoring are backend-stamped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCreate {
    pub user_name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organizations: Option<Vec<Reference<OrganizationRef>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<Reference<TeamRef>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Reference<RoleRef>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<UserProfile>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_email_verified: bool,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferences: Option<UserPreferences>,
}

impl Normalize for UserCreate {
    fn normalize(&mut self) {
        trim(&mut self.user_name);
        trim(&mut self.email);
        trim(&mut self.name);
        clean(&mut self.last_name);
        if let Some(profile) = &mut self.profile {
            profile.normalize();
        }
    }
}

impl Validate for UserCreate {
    fn collect(&self, path: &str, out: &mut Violations) {
        collect_identity(path, out, &self.user_name, &self.email, &self.name);
        collect_relationships(
            path,
            out,
            self.organizations.as_ref(),
            self.team.as_ref(),
            self.role.as_ref(),
        );
    }
}

/// Password-redacted view, the only shape safe to expose.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPublic {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_name: String,
    pub email: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organizations: Option<Vec<Reference<OrganizationRef>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<Reference<TeamRef>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Reference<RoleRef>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<UserProfile>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_email_verified: bool,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferences: Option<UserPreferences>,
    #[serde(flatten)]
    pub authoring: Authoring,
}

impl From<User> for UserPublic {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            user_name: user.user_name,
            email: user.email,
            name: user.name,
            last_name: user.last_name,
            organizations: user.organizations,
            team: user.team,
            role: user.role,
            profile: user.profile,
            is_active: user.is_active,
            is_email_verified: user.is_email_verified,
            is_verified: user.is_verified,
            last_login: user.last_login,
            preferences: user.preferences,
            authoring: user.authoring,
        }
    }
}

/// Self-service profile edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfileUpdate {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<UserProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferences: Option<UserPreferences>,
}

impl Normalize for UserProfileUpdate {
    fn normalize(&mut self) {
        trim(&mut self.name);
        trim(&mut self.email);
        clean(&mut self.last_name);
        if let Some(profile) = &mut self.profile {
            profile.normalize();
        }
    }
}

impl Validate for UserProfileUpdate {
    fn collect(&self, path: &str, out: &mut Violations) {
        require_nonempty(out, field_path(path, "name"), &self.name, MSG_NAME);
        check_email(out, field_path(path, "email"), &self.email, MSG_EMAIL);
    }
}

/// Password-change request with its cross-field refinement: the new
/// password and its confirmation must be byte-equal, and a mismatch is
/// reported at `confirmPassword`, not at the form root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePassword {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

impl Normalize for ChangePassword {
    // Passwords are never trimmed; whitespace is significant.
    fn normalize(&mut self) {}
}

impl Validate for ChangePassword {
    fn collect(&self, path: &str, out: &mut Violations) {
        require_nonempty(
            out,
            field_path(path, "currentPassword"),
            &self.current_password,
            MSG_CURRENT_PASSWORD,
        );
        if self.new_password.len() < MIN_PASSWORD_LEN {
            out.push(field_path(path, "newPassword"), MSG_NEW_PASSWORD);
        }
        if self.new_password != self.confirm_password {
            out.push(field_path(path, "confirmPassword"), MSG_PASSWORD_MISMATCH);
        }
    }
}

/// Login form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Login {
    pub user_name: String,
    pub password: String,
}

impl Normalize for Login {
    fn normalize(&mut self) {
        trim(&mut self.user_name);
    }
}

impl Validate for Login {
    fn collect(&self, path: &str, out: &mut Violations) {
        require_nonempty(out, field_path(path, "userName"), &self.user_name, MSG_USERNAME);
        require_nonempty(out, field_path(path, "password"), &self.password, MSG_PASSWORD);
    }
}

/// Client-side authentication state. Nulls are explicit on the wire,
/// so absent and null both deserialize and null serializes back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthState {
    pub user: Option<UserPublic>,
    pub token: Option<String>,
    pub is_loading: bool,
    pub error: Option<String>,
}

pub static USER: EntityDescriptor = EntityDescriptor {
    entity: "user",
    strict: false,
    audited: true,
    fields: &[
        FieldSpec::new("_id", false, FieldRole::Identifier),
        FieldSpec::new("userName", true, FieldRole::Data).message(MSG_USERNAME),
        FieldSpec::new("email", true, FieldRole::Data).message(MSG_EMAIL),
        FieldSpec::new("password", false, FieldRole::Sensitive),
        FieldSpec::new("name", true, FieldRole::Data).message(MSG_NAME),
        FieldSpec::new("lastName", false, FieldRole::Data),
        FieldSpec::new("organizations", false, FieldRole::Data),
        FieldSpec::new("team", false, FieldRole::Data),
        FieldSpec::new("role", false, FieldRole::Data),
        FieldSpec::new("profile", false, FieldRole::Data),
        FieldSpec::new("isActive", false, FieldRole::Data),
        FieldSpec::new("isEmailVerified", false, FieldRole::Data),
        FieldSpec::new("isVerified", false, FieldRole::Data),
        FieldSpec::new("lastLogin", false, FieldRole::ServerManaged),
        FieldSpec::new("preferences", false, FieldRole::Data),
    ],
    variants: &[
        SchemaVariant::Canonical,
        SchemaVariant::Create,
        SchemaVariant::Public,
        SchemaVariant::Document,
    ],
};
