//! Component-level guard.
//!
//! Same decision contract as [`RouteGuard`], for nested regions inside an
//! already-guarded page. By default an unauthorized region is suppressed
//! inline instead of navigating away.

use freightdesk_auth::SessionState;
use freightdesk_rbac::{Permission, Requirement, Role};

use crate::decision::{ComponentDecision, RouteDecision};
use crate::landing::LandingPages;
use crate::route::RouteGuard;

/// What an unauthorized component does.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Fallback {
    /// Render nothing.
    #[default]
    Hide,
    /// Behave like a route guard: redirect or show access denied.
    Redirect,
}

/// Guard wrapping a UI component.
#[derive(Debug, Clone)]
pub struct ComponentGuard {
    route: RouteGuard,
    fallback: Fallback,
}

impl ComponentGuard {
    /// Guard a component with a bundled requirement, hiding it when unmet.
    pub fn new(requirement: Requirement) -> Self {
        Self {
            route: RouteGuard::new(requirement),
            fallback: Fallback::default(),
        }
    }

    /// Any of `roles`, all of `permissions`. Empty lists do not restrict.
    pub fn protected(
        roles: impl IntoIterator<Item = Role>,
        permissions: impl IntoIterator<Item = Permission>,
    ) -> Self {
        Self::new(Requirement::roles(roles).with_all_permissions(permissions))
    }

    /// Redirect instead of hiding.
    pub fn redirecting(mut self) -> Self {
        self.fallback = Fallback::Redirect;
        self
    }

    /// Redirect with a specific landing-page mapping.
    pub fn with_landing(mut self, landing: LandingPages) -> Self {
        self.route = self.route.with_landing(landing);
        self
    }

    /// What happens when the requirement is not met.
    pub fn fallback(&self) -> Fallback {
        self.fallback
    }

    /// The requirement this guard enforces.
    pub fn requirement(&self) -> &Requirement {
        self.route.requirement()
    }

    /// Decide whether the component renders.
    ///
    /// `current_path` is the page hosting the component, used as the
    /// post-login return target when redirecting.
    pub fn evaluate(&self, state: &SessionState, current_path: &str) -> ComponentDecision {
        match (self.route.evaluate(state, current_path), self.fallback) {
            (RouteDecision::Pending, _) => ComponentDecision::Pending,
            (RouteDecision::Allow, _) => ComponentDecision::Render,
            (_, Fallback::Hide) => ComponentDecision::Hide,
            (RouteDecision::Redirect(redirect), Fallback::Redirect) => {
                ComponentDecision::Redirect(redirect)
            }
            (RouteDecision::Deny, Fallback::Redirect) => ComponentDecision::Denied,
        }
    }
}

impl From<RouteGuard> for ComponentGuard {
    fn from(route: RouteGuard) -> Self {
        Self {
            route,
            fallback: Fallback::Redirect,
        }
    }
}
