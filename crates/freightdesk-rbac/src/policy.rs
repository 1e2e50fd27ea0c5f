//! # Policy
//!
//! Stateless access decisions over an optional [`Actor`].
//!
//! Every function is total: a missing actor and empty inputs have defined
//! boolean outcomes. Note the deliberate asymmetry between the two
//! permission checks:
//!
//! ```text
//! has_any_permission(actor, [])  == false   (nothing to match)
//! has_all_permissions(actor, []) == true    (nothing required)
//! ```

use serde::{Deserialize, Serialize};

use crate::actor::Actor;
use crate::departments::Department;
use crate::permissions::Permission;
use crate::roles::Role;

/// Check if the actor has a role.
pub fn has_role(actor: Option<&Actor>, role: Role) -> bool {
    actor.is_some_and(|a| a.roles.contains(&role))
}

/// Check if the actor has at least one of the roles. Empty input is false.
pub fn has_any_role(actor: Option<&Actor>, roles: &[Role]) -> bool {
    actor.is_some_and(|a| roles.iter().any(|r| a.roles.contains(r)))
}

/// Check if the actor belongs to a department.
pub fn has_any_department(actor: Option<&Actor>, department: Department) -> bool {
    actor.is_some_and(|a| a.departments.contains(&department))
}

/// Check if the actor belongs to at least one of the departments. Empty input is false.
pub fn has_any_department_of(actor: Option<&Actor>, departments: &[Department]) -> bool {
    actor.is_some_and(|a| departments.iter().any(|d| a.departments.contains(d)))
}

/// Check if the actor holds a permission.
pub fn has_permission(actor: Option<&Actor>, permission: Permission) -> bool {
    actor.is_some_and(|a| a.permissions.contains(&permission))
}

/// Check if the actor holds at least one of the permissions.
///
/// An empty list yields `false`, so an empty requirement can never turn into
/// a blanket grant.
pub fn has_any_permission(actor: Option<&Actor>, permissions: &[Permission]) -> bool {
    actor.is_some_and(|a| permissions.iter().any(|p| a.permissions.contains(p)))
}

/// Check if the actor holds every one of the permissions.
///
/// An empty list yields `true` when an actor is present: nothing is required.
pub fn has_all_permissions(actor: Option<&Actor>, permissions: &[Permission]) -> bool {
    actor.is_some_and(|a| permissions.iter().all(|p| a.permissions.contains(p)))
}

/// Composite check used by protected routes.
///
/// - the actor must exist
/// - a non-empty `required_roles` needs at least one matching role; empty means no role restriction
/// - a non-empty `required_permissions` needs all of them
///
/// # Example
///
/// ```
/// use freightdesk_rbac::{is_authorized, Actor, Permission, Role};
///
/// let actor = Actor::new("1")
///     .with_roles([Role::User])
///     .with_permissions([Permission::Approval]);
///
/// assert!(is_authorized(Some(&actor), &[Role::User], &[Permission::Approval]));
/// assert!(!is_authorized(Some(&actor), &[Role::Admin], &[]));
/// assert!(!is_authorized(None, &[], &[]));
/// ```
pub fn is_authorized(
    actor: Option<&Actor>,
    required_roles: &[Role],
    required_permissions: &[Permission],
) -> bool {
    let Some(actor) = actor else {
        return false;
    };

    let roles_ok = required_roles.is_empty() || has_any_role(Some(actor), required_roles);
    let permissions_ok = has_all_permissions(Some(actor), required_permissions);

    roles_ok && permissions_ok
}

/// How a requirement's permission list is matched.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PermissionMatch {
    /// Every listed permission is needed.
    #[default]
    All,
    /// One listed permission is enough.
    Any,
}

/// A bundled access requirement, as attached to routes, menu items and buttons.
///
/// Each dimension restricts only when non-empty:
/// - `roles`: ANY
/// - `permissions`: ALL or ANY per `permission_match`
/// - `departments`: ANY
///
/// [`Requirement::none`] therefore passes for every present actor.
///
/// # Example
///
/// ```
/// use freightdesk_rbac::{satisfies, Actor, Department, Permission, Requirement, Role};
///
/// let req = Requirement::roles([Role::User])
///     .with_any_permission([Permission::CheckOperation, Permission::CreditCardOperation])
///     .with_departments([Department::Finance]);
///
/// let actor = Actor::new("1")
///     .with_roles([Role::User])
///     .with_departments([Department::Finance])
///     .with_permissions([Permission::CreditCardOperation]);
///
/// assert!(satisfies(Some(&actor), &req));
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Requirement {
    /// Roles, any one suffices.
    #[serde(default)]
    pub roles: Vec<Role>,
    /// Permissions, matched per `permission_match`.
    #[serde(default)]
    pub permissions: Vec<Permission>,
    /// ALL or ANY semantics for `permissions`.
    #[serde(default)]
    pub permission_match: PermissionMatch,
    /// Departments, any one suffices.
    #[serde(default)]
    pub departments: Vec<Department>,
}

impl Requirement {
    /// No restriction.
    pub fn none() -> Self {
        Self::default()
    }

    /// Require any one of the roles.
    pub fn roles(roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            roles: roles.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Require a single role.
    pub fn role(role: Role) -> Self {
        Self::roles([role])
    }

    /// Require every one of the permissions.
    pub fn all_permissions(permissions: impl IntoIterator<Item = Permission>) -> Self {
        Self::none().with_all_permissions(permissions)
    }

    /// Require any one of the permissions.
    pub fn any_permission(permissions: impl IntoIterator<Item = Permission>) -> Self {
        Self::none().with_any_permission(permissions)
    }

    /// Require a single permission.
    pub fn permission(permission: Permission) -> Self {
        Self::all_permissions([permission])
    }

    /// Require membership in any one of the departments.
    pub fn departments(departments: impl IntoIterator<Item = Department>) -> Self {
        Self::none().with_departments(departments)
    }

    /// Add an ALL permission list.
    pub fn with_all_permissions(mut self, permissions: impl IntoIterator<Item = Permission>) -> Self {
        self.permissions = permissions.into_iter().collect();
        self.permission_match = PermissionMatch::All;
        self
    }

    /// Add an ANY permission list.
    pub fn with_any_permission(mut self, permissions: impl IntoIterator<Item = Permission>) -> Self {
        self.permissions = permissions.into_iter().collect();
        self.permission_match = PermissionMatch::Any;
        self
    }

    /// Add a department list.
    pub fn with_departments(mut self, departments: impl IntoIterator<Item = Department>) -> Self {
        self.departments = departments.into_iter().collect();
        self
    }

    /// Check if no dimension restricts anything.
    pub fn is_unrestricted(&self) -> bool {
        self.roles.is_empty() && self.permissions.is_empty() && self.departments.is_empty()
    }
}

/// Evaluate a [`Requirement`] against an actor.
///
/// Without an actor the answer is `false`, even for an unrestricted requirement.
pub fn satisfies(actor: Option<&Actor>, requirement: &Requirement) -> bool {
    if actor.is_none() {
        return false;
    }

    let permissions_ok = match requirement.permission_match {
        PermissionMatch::All => has_all_permissions(actor, &requirement.permissions),
        PermissionMatch::Any => {
            requirement.permissions.is_empty() || has_any_permission(actor, &requirement.permissions)
        }
    };

    let departments_ok = requirement.departments.is_empty()
        || has_any_department_of(actor, &requirement.departments);

    is_authorized(actor, &requirement.roles, &[]) && permissions_ok && departments_ok
}
