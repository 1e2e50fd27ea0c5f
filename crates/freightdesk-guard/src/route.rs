//! Route-level guard.
//!
//! Wraps a navigable page. The decision order is fixed:
//!
//! 1. session still restoring → [`RouteDecision::Pending`] (never redirect early)
//! 2. not signed in → login, remembering the requested path
//! 3. requirement satisfied → [`RouteDecision::Allow`]
//! 4. otherwise → landing page, or the access-denied view
//!
//! An authenticated actor is never sent to login.

use freightdesk_auth::SessionState;
use freightdesk_rbac::{satisfies, Permission, Requirement, Role};
use tracing::debug;

use crate::decision::{Redirect, RouteDecision};
use crate::landing::LandingPages;

/// Default login page.
pub const DEFAULT_LOGIN_PATH: &str = "/login";

/// What happens to a signed-in actor who lacks the privileges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OnUnauthorized {
    /// Redirect to the actor's landing page.
    #[default]
    Landing,
    /// Show the access-denied view in place.
    AccessDenied,
}

/// Guard for a single route.
#[derive(Debug, Clone)]
pub struct RouteGuard {
    requirement: Requirement,
    login_path: String,
    landing: LandingPages,
    on_unauthorized: OnUnauthorized,
}

impl RouteGuard {
    /// Guard a route with a bundled requirement.
    pub fn new(requirement: Requirement) -> Self {
        Self {
            requirement,
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            landing: LandingPages::default(),
            on_unauthorized: OnUnauthorized::default(),
        }
    }

    /// Guard a route the classic way: any of `roles`, all of `permissions`.
    ///
    /// Empty lists do not restrict.
    pub fn protected(
        roles: impl IntoIterator<Item = Role>,
        permissions: impl IntoIterator<Item = Permission>,
    ) -> Self {
        Self::new(Requirement::roles(roles).with_all_permissions(permissions))
    }

    /// Guard a route that only needs a signed-in actor.
    pub fn authenticated() -> Self {
        Self::new(Requirement::none())
    }

    /// Use a different login page.
    pub fn with_login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = path.into();
        self
    }

    /// Use a different landing-page mapping.
    pub fn with_landing(mut self, landing: LandingPages) -> Self {
        self.landing = landing;
        self
    }

    /// Show the access-denied view instead of redirecting.
    pub fn deny_in_place(mut self) -> Self {
        self.on_unauthorized = OnUnauthorized::AccessDenied;
        self
    }

    /// The requirement this guard enforces.
    pub fn requirement(&self) -> &Requirement {
        &self.requirement
    }

    /// Decide what to do with a navigation to `requested_path`.
    pub fn evaluate(&self, state: &SessionState, requested_path: &str) -> RouteDecision {
        match state {
            SessionState::Unloaded | SessionState::Loading => RouteDecision::Pending,
            SessionState::Unauthenticated => {
                debug!(path = requested_path, "Not signed in, redirecting to login");
                RouteDecision::Redirect(Redirect::Login {
                    login_path: self.login_path.clone(),
                    return_to: requested_path.to_string(),
                })
            }
            SessionState::Authenticated(actor) => {
                if satisfies(Some(&**actor), &self.requirement) {
                    return RouteDecision::Allow;
                }

                debug!(path = requested_path, actor_id = %actor.id, "Insufficient privileges");
                match self.on_unauthorized {
                    OnUnauthorized::AccessDenied => RouteDecision::Deny,
                    OnUnauthorized::Landing => match self.landing.for_actor(actor) {
                        Some(path) if !same_page(path, requested_path) => {
                            RouteDecision::Redirect(Redirect::Landing {
                                path: path.to_string(),
                            })
                        }
                        _ => RouteDecision::Deny,
                    },
                }
            }
        }
    }
}

/// Path without query, fragment or trailing slash; `/` for the root.
pub(crate) fn normalize_path(path: &str) -> &str {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    let trimmed = path[..end].trim_end_matches('/');
    if trimmed.is_empty() {
        "/"
    } else {
        trimmed
    }
}

fn same_page(a: &str, b: &str) -> bool {
    normalize_path(a) == normalize_path(b)
}
