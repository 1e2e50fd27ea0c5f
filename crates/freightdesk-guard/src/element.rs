//! Element-level guard for buttons and actions.
//!
//! Renders or renders nothing. No placeholder, no redirect.

use freightdesk_auth::SessionState;
use freightdesk_rbac::{satisfies, Department, Permission, Requirement, Role};

/// Guard for a single UI element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementGuard {
    requirement: Requirement,
}

impl ElementGuard {
    /// Guard an element with a bundled requirement.
    pub fn new(requirement: Requirement) -> Self {
        Self { requirement }
    }

    /// Require a single role.
    pub fn role(role: Role) -> Self {
        Self::new(Requirement::role(role))
    }

    /// Require any one of the roles.
    pub fn any_role(roles: impl IntoIterator<Item = Role>) -> Self {
        Self::new(Requirement::roles(roles))
    }

    /// Require a single permission.
    pub fn permission(permission: Permission) -> Self {
        Self::new(Requirement::permission(permission))
    }

    /// Require every one of the permissions.
    pub fn all_permissions(permissions: impl IntoIterator<Item = Permission>) -> Self {
        Self::new(Requirement::all_permissions(permissions))
    }

    /// Require any one of the permissions.
    pub fn any_permission(permissions: impl IntoIterator<Item = Permission>) -> Self {
        Self::new(Requirement::any_permission(permissions))
    }

    /// Require membership in a department.
    pub fn department(department: Department) -> Self {
        Self::new(Requirement::departments([department]))
    }

    /// Require membership in any one of the departments.
    pub fn any_department(departments: impl IntoIterator<Item = Department>) -> Self {
        Self::new(Requirement::departments(departments))
    }

    /// The requirement this guard enforces.
    pub fn requirement(&self) -> &Requirement {
        &self.requirement
    }

    /// Check if the element renders.
    ///
    /// Nothing renders while the session is still restoring. Once resolved,
    /// an element without a requirement always renders.
    pub fn allows(&self, state: &SessionState) -> bool {
        if state.is_pending() {
            return false;
        }
        self.requirement.is_unrestricted() || satisfies(state.actor(), &self.requirement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use freightdesk_rbac::Actor;
    use std::sync::Arc;

    fn signed_in(actor: Actor) -> SessionState {
        SessionState::Authenticated(Arc::new(actor))
    }

    #[test]
    fn test_permission_button() {
        let approve = ElementGuard::permission(Permission::Approval);
        let approver = Actor::new("a").with_permissions([Permission::Approval]);
        let viewer = Actor::new("v").with_permissions([Permission::ReportView]);

        assert!(approve.allows(&signed_in(approver)));
        assert!(!approve.allows(&signed_in(viewer)));
        assert!(!approve.allows(&SessionState::Unauthenticated));
    }

    #[test]
    fn test_department_element() {
        let guard = ElementGuard::any_department([Department::Finance, Department::Accounting]);
        let accountant = Actor::new("a").with_departments([Department::Accounting]);
        let sales = Actor::new("s").with_departments([Department::Sales]);

        assert!(guard.allows(&signed_in(accountant)));
        assert!(!guard.allows(&signed_in(sales)));
    }

    #[test]
    fn test_no_requirement_always_renders_once_resolved() {
        let guard = ElementGuard::default();
        assert!(guard.allows(&SessionState::Unauthenticated));
        assert!(guard.allows(&signed_in(Actor::new("x"))));
        assert!(!guard.allows(&SessionState::Unloaded));
        assert!(!guard.allows(&SessionState::Loading));
    }

    #[test]
    fn test_any_permission_element() {
        let guard = ElementGuard::any_permission([Permission::CheckOperation, Permission::CreditCardOperation]);
        let actor = Actor::new("f").with_permissions([Permission::CreditCardOperation]);
        assert!(guard.allows(&signed_in(actor)));
    }
}
