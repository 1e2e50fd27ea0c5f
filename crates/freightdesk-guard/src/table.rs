//! Back-office route table.
//!
//! Maps page paths to the requirement guarding them. Lookup matches whole
//! path segments and the longest matching prefix wins, so `/finance/checks`
//! is governed by its own entry rather than by `/finance`.

use freightdesk_auth::SessionState;
use freightdesk_rbac::{Department, Permission, Requirement, Role};
use serde::{Deserialize, Serialize};

use crate::decision::RouteDecision;
use crate::landing::LandingPages;
use crate::route::{normalize_path, RouteGuard};

/// A guarded page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteEntry {
    /// Normalized path prefix.
    pub path: String,
    /// Requirement for the page and everything below it.
    pub requirement: Requirement,
}

/// Ordered set of guarded pages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
    #[serde(default)]
    landing: Option<LandingPages>,
}

const BACK_OFFICE: [Role; 2] = [Role::Admin, Role::User];
const FINANCE_DEPARTMENTS: [Department; 3] =
    [Department::Finance, Department::Accounting, Department::Management];

impl RouteTable {
    /// Empty table: every page only needs a signed-in actor.
    pub fn new() -> Self {
        Self::default()
    }

    /// The FreightDesk back-office pages.
    pub fn backoffice() -> Self {
        let staff = || Requirement::roles(BACK_OFFICE);
        let finance = || staff().with_departments(FINANCE_DEPARTMENTS);

        Self::new()
            .route("/dashboard", staff())
            .route("/orders", staff().with_all_permissions([Permission::OrderOperation]))
            .route("/offers", staff().with_all_permissions([Permission::OfferOperation]))
            .route(
                "/deliveries",
                staff().with_all_permissions([Permission::DeliveryOperation]),
            )
            .route(
                "/deliveries/plan",
                staff().with_all_permissions([
                    Permission::DeliveryOperation,
                    Permission::VehicleOperation,
                ]),
            )
            .route("/vehicles", staff().with_all_permissions([Permission::VehicleOperation]))
            .route(
                "/customers",
                staff().with_all_permissions([Permission::CustomerOperation]),
            )
            .route("/finance", finance().with_all_permissions([Permission::FinanceOperation]))
            .route("/finance/checks", finance().with_all_permissions([Permission::CheckOperation]))
            .route(
                "/finance/credit-cards",
                finance().with_all_permissions([Permission::CreditCardOperation]),
            )
            .route(
                "/finance/letters-of-guarantee",
                finance().with_all_permissions([Permission::LetterOfGuaranteeOperation]),
            )
            .route("/approvals", staff().with_all_permissions([Permission::Approval]))
            .route("/reports", staff().with_all_permissions([Permission::ReportView]))
            .route(
                "/users",
                Requirement::role(Role::Admin).with_all_permissions([Permission::UserManagement]),
            )
            .route(
                "/settings",
                Requirement::role(Role::Admin).with_all_permissions([Permission::Setting]),
            )
            .route("/transporter", Requirement::role(Role::Transporter))
            .route("/company", Requirement::role(Role::Company))
            .route("/profile", Requirement::none())
    }

    /// Add or replace a page.
    pub fn route(mut self, path: impl Into<String>, requirement: Requirement) -> Self {
        let path = normalize_path(&path.into()).to_string();
        match self.entries.iter_mut().find(|e| e.path == path) {
            Some(entry) => entry.requirement = requirement,
            None => self.entries.push(RouteEntry { path, requirement }),
        }
        self
    }

    /// Landing pages used by the guards this table builds.
    pub fn with_landing(mut self, landing: LandingPages) -> Self {
        self.landing = Some(landing);
        self
    }

    /// Registered pages, in insertion order.
    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    /// Requirement of the longest registered prefix of `path`.
    pub fn requirement_for(&self, path: &str) -> Option<&Requirement> {
        let path = normalize_path(path);
        self.entries
            .iter()
            .filter(|entry| is_segment_prefix(&entry.path, path))
            .max_by_key(|entry| entry.path.len())
            .map(|entry| &entry.requirement)
    }

    /// Guard for `path`. Unknown paths only need a signed-in actor.
    pub fn guard_for(&self, path: &str) -> RouteGuard {
        let guard = match self.requirement_for(path) {
            Some(requirement) => RouteGuard::new(requirement.clone()),
            None => RouteGuard::authenticated(),
        };
        match &self.landing {
            Some(landing) => guard.with_landing(landing.clone()),
            None => guard,
        }
    }

    /// Evaluate a navigation to `path`.
    pub fn evaluate(&self, state: &SessionState, path: &str) -> RouteDecision {
        self.guard_for(path).evaluate(state, path)
    }
}

fn is_segment_prefix(prefix: &str, path: &str) -> bool {
    if prefix == "/" {
        return true;
    }
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}
