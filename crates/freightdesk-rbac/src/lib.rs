//! # FreightDesk RBAC
//!
//! Identity model and policy evaluation for the FreightDesk back office.
//!
//! ## Overview
//!
//! The freightdesk-rbac crate handles:
//! - **Roles**: ADMIN, USER, TRANSPORTER, COMPANY
//! - **Departments**: ACCOUNTING, FINANCE, MANAGEMENT, SALES, EXTERNAL
//! - **Permissions**: Operation-scoped tags (APPROVAL, ORDER_OPERATION, SETTING, ...)
//! - **Actor**: The signed-in user carrying the three sets plus account flags
//! - **Policy**: Pure decision functions over `Option<&Actor>`
//!
//! ## Architecture
//!
//! ```text
//! Actor { roles, departments, permissions, account flags }
//!    │
//!    ▼
//! policy::{has_role, has_permission, has_any_permission,
//!          has_all_permissions, has_any_department, is_authorized}
//!    │
//!    ▼
//! Requirement (roles ANY, permissions ALL|ANY, departments ANY) ──► satisfies()
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use freightdesk_rbac::{is_authorized, has_all_permissions, Actor, Permission, Role};
//!
//! let actor = Actor::new("42")
//!     .with_roles([Role::Admin])
//!     .with_permissions([Permission::OrderOperation]);
//!
//! assert!(is_authorized(Some(&actor), &[Role::Admin], &[]));
//! assert!(!has_all_permissions(
//!     Some(&actor),
//!     &[Permission::OrderOperation, Permission::Setting],
//! ));
//! ```
//!
//! ## Integration with freightdesk-auth
//!
//! The session in `freightdesk-auth` owns the current actor and hands out
//! `Arc<Actor>` snapshots; guards in `freightdesk-guard` evaluate them here.

pub mod actor;
pub mod departments;
pub mod error;
pub mod permissions;
pub mod policy;
pub mod roles;

// Re-export main types for convenience
pub use actor::{AccountStatus, Actor, ActorUpdate};
pub use departments::Department;
pub use error::UnknownTag;
pub use permissions::Permission;
pub use policy::{
    has_all_permissions, has_any_department, has_any_department_of, has_any_permission,
    has_any_role, has_permission, has_role, is_authorized, satisfies, PermissionMatch,
    Requirement,
};
pub use roles::Role;
