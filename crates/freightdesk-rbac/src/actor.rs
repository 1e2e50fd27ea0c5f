//! # Actor
//!
//! The signed-in user as seen by access control: roles, departments,
//! permissions and the account-status flags reported by the backend.
//!
//! The actor is built once per session from the backend user payload and is
//! shared read-only afterwards. Changes go through [`Actor::merge`], which
//! produces a new value instead of mutating the old one.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;

use crate::departments::Department;
use crate::permissions::Permission;
use crate::roles::Role;

/// An authenticated back-office user.
///
/// Deserializes from the backend's camelCase user payload. The role,
/// department and permission sets are never null: an absent or `null` set
/// becomes an empty set. Unknown tags are rejected at deserialization.
///
/// # Example
///
/// ```
/// use freightdesk_rbac::{Actor, Permission, Role};
///
/// let actor = Actor::new("42")
///     .with_roles([Role::User])
///     .with_permissions([Permission::Approval]);
///
/// assert!(actor.roles.contains(&Role::User));
/// assert!(actor.is_active());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    /// Opaque identifier (numeric ids are kept as their decimal string).
    #[serde(deserialize_with = "opaque_id")]
    pub id: String,

    /// Login name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Email address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Display name.
    #[serde(default, alias = "fullName", skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    /// Coarse-grained roles.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub roles: BTreeSet<Role>,

    /// Organizational units.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub departments: BTreeSet<Department>,

    /// Fine-grained permissions.
    #[serde(default, alias = "authorities", deserialize_with = "null_as_empty")]
    pub permissions: BTreeSet<Permission>,

    /// Linked customer/carrier record for external actors.
    ///
    /// Scopes data queries only; never consulted for access decisions.
    #[serde(default, deserialize_with = "opaque_id_opt", skip_serializing_if = "Option::is_none")]
    pub connection_id: Option<String>,

    /// Account is enabled.
    #[serde(default = "default_true", deserialize_with = "null_as_false")]
    pub enabled: bool,

    /// Account is not locked.
    #[serde(default = "default_true", deserialize_with = "null_as_false")]
    pub account_non_locked: bool,

    /// Account is not expired.
    #[serde(default = "default_true", deserialize_with = "null_as_false")]
    pub account_non_expired: bool,

    /// Credentials are not expired.
    #[serde(default = "default_true", deserialize_with = "null_as_false")]
    pub credentials_non_expired: bool,
}

/// Outcome of checking the account-status flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    /// Every flag holds.
    Active,
    /// `enabled` is false.
    Disabled,
    /// `account_non_locked` is false.
    Locked,
    /// `account_non_expired` is false.
    Expired,
    /// `credentials_non_expired` is false.
    CredentialsExpired,
}

impl Actor {
    /// Create an active actor with no roles, departments or permissions.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: None,
            email: None,
            display_name: None,
            roles: BTreeSet::new(),
            departments: BTreeSet::new(),
            permissions: BTreeSet::new(),
            connection_id: None,
            enabled: true,
            account_non_locked: true,
            account_non_expired: true,
            credentials_non_expired: true,
        }
    }

    /// Set the login name.
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Replace the role set.
    pub fn with_roles(mut self, roles: impl IntoIterator<Item = Role>) -> Self {
        self.roles = roles.into_iter().collect();
        self
    }

    /// Replace the department set.
    pub fn with_departments(mut self, departments: impl IntoIterator<Item = Department>) -> Self {
        self.departments = departments.into_iter().collect();
        self
    }

    /// Replace the permission set.
    pub fn with_permissions(mut self, permissions: impl IntoIterator<Item = Permission>) -> Self {
        self.permissions = permissions.into_iter().collect();
        self
    }

    /// Link the actor to an external customer/carrier record.
    pub fn with_connection_id(mut self, connection_id: impl Into<String>) -> Self {
        self.connection_id = Some(connection_id.into());
        self
    }

    /// Check the account-status flags, first failing flag wins.
    pub fn account_status(&self) -> AccountStatus {
        if !self.enabled {
            AccountStatus::Disabled
        } else if !self.account_non_locked {
            AccountStatus::Locked
        } else if !self.account_non_expired {
            AccountStatus::Expired
        } else if !self.credentials_non_expired {
            AccountStatus::CredentialsExpired
        } else {
            AccountStatus::Active
        }
    }

    /// Check if all four account-status flags hold.
    pub fn is_active(&self) -> bool {
        self.account_status() == AccountStatus::Active
    }

    /// Produce a new actor with the fields present in `update` replaced.
    ///
    /// The identifier never changes.
    pub fn merge(&self, update: ActorUpdate) -> Actor {
        let mut next = self.clone();
        if let Some(username) = update.username {
            next.username = Some(username);
        }
        if let Some(email) = update.email {
            next.email = Some(email);
        }
        if let Some(display_name) = update.display_name {
            next.display_name = Some(display_name);
        }
        if let Some(roles) = update.roles {
            next.roles = roles;
        }
        if let Some(departments) = update.departments {
            next.departments = departments;
        }
        if let Some(permissions) = update.permissions {
            next.permissions = permissions;
        }
        if let Some(connection_id) = update.connection_id {
            next.connection_id = Some(connection_id);
        }
        next
    }
}

/// A partial set of actor fields for [`Actor::merge`].
///
/// Absent fields keep their previous value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorUpdate {
    /// New login name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// New email address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// New display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Replacement role set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<BTreeSet<Role>>,
    /// Replacement department set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub departments: Option<BTreeSet<Department>>,
    /// Replacement permission set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<BTreeSet<Permission>>,
    /// New external-entity link.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_id: Option<String>,
}

impl ActorUpdate {
    /// Update only the display name.
    pub fn display_name(name: impl Into<String>) -> Self {
        Self {
            display_name: Some(name.into()),
            ..Default::default()
        }
    }

    /// Update only the email address.
    pub fn email(email: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            ..Default::default()
        }
    }
}

fn default_true() -> bool {
    true
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<BTreeSet<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Ord,
{
    Ok(Option::<BTreeSet<T>>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_false<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(i64),
}

impl From<RawId> for String {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Text(s) => s,
            RawId::Number(n) => n.to_string(),
        }
    }
}

fn opaque_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    RawId::deserialize(deserializer).map(String::from)
}

fn opaque_id_opt<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<RawId>::deserialize(deserializer)?.map(String::from))
}
