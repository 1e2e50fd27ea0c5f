//! Role-appropriate landing pages.

use freightdesk_rbac::{Actor, Role};
use serde::{Deserialize, Serialize};

/// Maps roles to the page an actor starts on.
///
/// Entries are checked in order; the first role the actor holds wins, so
/// list the most privileged role first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LandingPages {
    entries: Vec<(Role, String)>,
    fallback: Option<String>,
}

impl Default for LandingPages {
    fn default() -> Self {
        Self::backoffice()
    }
}

impl LandingPages {
    /// Empty mapping with no fallback.
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
            fallback: None,
        }
    }

    /// The back-office defaults.
    ///
    /// | Role        | Landing page              |
    /// |-------------|---------------------------|
    /// | ADMIN       | `/dashboard`              |
    /// | USER        | `/dashboard`              |
    /// | TRANSPORTER | `/transporter/deliveries` |
    /// | COMPANY     | `/company/orders`         |
    pub fn backoffice() -> Self {
        Self::empty()
            .with(Role::Admin, "/dashboard")
            .with(Role::User, "/dashboard")
            .with(Role::Transporter, "/transporter/deliveries")
            .with(Role::Company, "/company/orders")
    }

    /// Append a role mapping.
    pub fn with(mut self, role: Role, path: impl Into<String>) -> Self {
        self.entries.push((role, path.into()));
        self
    }

    /// Page for actors matching no entry.
    pub fn with_fallback(mut self, path: impl Into<String>) -> Self {
        self.fallback = Some(path.into());
        self
    }

    /// Landing page for an actor.
    pub fn for_actor(&self, actor: &Actor) -> Option<&str> {
        self.entries
            .iter()
            .find(|(role, _)| actor.roles.contains(role))
            .map(|(_, path)| path.as_str())
            .or(self.fallback.as_deref())
    }
}
