//! # FreightDesk Guards
//!
//! Enforcement points for the back office. Every guard is a pure decision
//! over a [`SessionState`] snapshot; navigation and rendering are left to
//! the UI layer.
//!
//! ## Overview
//!
//! - **Route guard**: page level, redirects to login or to a landing page
//! - **Component guard**: nested regions, hides inline by default
//! - **Element guard**: single buttons and actions, render or nothing
//! - **Route table / menu**: the back-office pages and the menu built from them
//!
//! All guards delegate to [`freightdesk_rbac::satisfies`] and never
//! re-implement the predicate. A guard without a requirement always renders,
//! and no guard decides anything while the session is still loading.
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use freightdesk_auth::SessionState;
//! use freightdesk_guard::{RouteDecision, RouteTable};
//! use freightdesk_rbac::{Actor, Role};
//!
//! let routes = RouteTable::backoffice();
//! let carrier = Actor::new("7").with_roles([Role::Transporter]);
//! let state = SessionState::Authenticated(Arc::new(carrier));
//!
//! match routes.evaluate(&state, "/users") {
//!     RouteDecision::Redirect(redirect) => assert_eq!(redirect.to_url(), "/transporter/deliveries"),
//!     other => panic!("unexpected {:?}", other),
//! }
//! ```

pub mod component;
pub mod decision;
pub mod element;
pub mod landing;
pub mod nav;
pub mod route;
pub mod table;

pub use component::{ComponentGuard, Fallback};
pub use decision::{ComponentDecision, Redirect, RouteDecision, RETURN_PARAM};
pub use element::ElementGuard;
pub use landing::LandingPages;
pub use nav::{visible_sections, DashboardSection, NavItem, NavMenu};
pub use route::{OnUnauthorized, RouteGuard, DEFAULT_LOGIN_PATH};
pub use table::{RouteEntry, RouteTable};
