//! Guard outcomes.
//!
//! Guards only decide; the UI layer performs the navigation or
//! rendering these values describe.

use serde::{Deserialize, Serialize};

/// Query parameter carrying the originally requested path to the login page.
pub const RETURN_PARAM: &str = "returnUrl";

/// Where a guard sends the user instead of the requested page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Redirect {
    /// Not signed in: go to login, then come back.
    Login {
        /// Login page path.
        login_path: String,
        /// Path to return to after signing in.
        return_to: String,
    },
    /// Signed in without enough privileges: go to the actor's landing page.
    Landing {
        /// Landing page path.
        path: String,
    },
}

impl Redirect {
    /// Render the redirect as a navigable URL.
    ///
    /// # Example
    ///
    /// ```
    /// use freightdesk_guard::Redirect;
    ///
    /// let redirect = Redirect::Login {
    ///     login_path: "/login".to_string(),
    ///     return_to: "/orders?page=2".to_string(),
    /// };
    /// assert_eq!(redirect.to_url(), "/login?returnUrl=%2Forders%3Fpage%3D2");
    /// ```
    pub fn to_url(&self) -> String {
        match self {
            Redirect::Login {
                login_path,
                return_to,
            } => {
                if return_to.is_empty() || return_to == "/" || return_to == login_path {
                    login_path.clone()
                } else {
                    format!(
                        "{}?{}={}",
                        login_path,
                        RETURN_PARAM,
                        urlencoding::encode(return_to)
                    )
                }
            }
            Redirect::Landing { path } => path.clone(),
        }
    }

    /// Check if this redirect goes to the login page.
    pub fn is_login(&self) -> bool {
        matches!(self, Redirect::Login { .. })
    }
}

/// Outcome of a route guard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", content = "redirect", rename_all = "snake_case")]
pub enum RouteDecision {
    /// Session still restoring: show a neutral placeholder, do not redirect.
    Pending,
    /// Render the page.
    Allow,
    /// Navigate elsewhere.
    Redirect(Redirect),
    /// Show the access-denied view.
    Deny,
}

impl RouteDecision {
    /// Check if the page may render.
    pub fn is_allowed(&self) -> bool {
        matches!(self, RouteDecision::Allow)
    }
}

/// Outcome of a component guard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", content = "redirect", rename_all = "snake_case")]
pub enum ComponentDecision {
    /// Session still restoring.
    Pending,
    /// Render the wrapped component.
    Render,
    /// Render nothing in its place.
    Hide,
    /// Navigate elsewhere.
    Redirect(Redirect),
    /// Show the access-denied view in its place.
    Denied,
}

impl ComponentDecision {
    /// Check if the wrapped component renders.
    pub fn is_rendered(&self) -> bool {
        matches!(self, ComponentDecision::Render)
    }
}
