//! Navigation menu and dashboard sections filtered by the current actor.

use freightdesk_rbac::{satisfies, Actor, Department, Permission, Requirement, Role};
use serde::{Deserialize, Serialize};

use crate::table::RouteTable;

/// One menu entry. Groups have children and usually no path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavItem {
    /// Stable identifier.
    pub key: String,
    /// Display text.
    pub label: String,
    /// Link target; `None` for groups.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Requirement for showing the entry.
    #[serde(default)]
    pub requirement: Requirement,
    /// Nested entries.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NavItem>,
}

impl NavItem {
    /// A leaf linking to `path`.
    pub fn link(key: &str, label: &str, path: &str, requirement: Requirement) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            path: Some(path.to_string()),
            requirement,
            children: Vec::new(),
        }
    }

    /// A group of links.
    pub fn group(key: &str, label: &str, children: Vec<NavItem>) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            path: None,
            requirement: Requirement::none(),
            children,
        }
    }

    /// Check if the entry has children.
    pub fn is_group(&self) -> bool {
        !self.children.is_empty()
    }

    /// Copy of this item with only the children `actor` may see.
    ///
    /// `None` when the item itself is hidden, or when it is a group left
    /// without visible children.
    fn visible_for(&self, actor: &Actor) -> Option<NavItem> {
        if !satisfies(Some(actor), &self.requirement) {
            return None;
        }
        if !self.is_group() {
            return Some(self.clone());
        }

        let children: Vec<NavItem> = self
            .children
            .iter()
            .filter_map(|child| child.visible_for(actor))
            .collect();
        if children.is_empty() {
            return None;
        }
        Some(NavItem {
            children,
            ..self.clone()
        })
    }
}

/// The side menu.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavMenu {
    /// Top-level entries.
    pub items: Vec<NavItem>,
}

impl NavMenu {
    /// Menu from top-level entries.
    pub fn new(items: Vec<NavItem>) -> Self {
        Self { items }
    }

    /// The back-office menu, each link guarded like the page it opens.
    pub fn backoffice(routes: &RouteTable) -> Self {
        let link = |key: &str, label: &str, path: &str| {
            let requirement = routes.requirement_for(path).cloned().unwrap_or_default();
            NavItem::link(key, label, path, requirement)
        };

        Self::new(vec![
            link("dashboard", "Dashboard", "/dashboard"),
            NavItem::group(
                "sales",
                "Sales",
                vec![
                    link("orders", "Orders", "/orders"),
                    link("offers", "Offers", "/offers"),
                    link("customers", "Customers", "/customers"),
                ],
            ),
            NavItem::group(
                "operations",
                "Operations",
                vec![
                    link("deliveries", "Deliveries", "/deliveries"),
                    link("delivery-plan", "Delivery plan", "/deliveries/plan"),
                    link("vehicles", "Vehicles", "/vehicles"),
                ],
            ),
            NavItem::group(
                "finance",
                "Finance",
                vec![
                    link("finance-summary", "Summary", "/finance"),
                    link("checks", "Checks", "/finance/checks"),
                    link("credit-cards", "Credit cards", "/finance/credit-cards"),
                    link(
                        "letters-of-guarantee",
                        "Letters of guarantee",
                        "/finance/letters-of-guarantee",
                    ),
                ],
            ),
            link("approvals", "Approvals", "/approvals"),
            link("reports", "Reports", "/reports"),
            NavItem::group(
                "admin",
                "Administration",
                vec![
                    link("users", "Users", "/users"),
                    link("settings", "Settings", "/settings"),
                ],
            ),
            link("transporter-deliveries", "My deliveries", "/transporter/deliveries"),
            link("company-orders", "My orders", "/company/orders"),
            link("profile", "Profile", "/profile"),
        ])
    }

    /// The menu as `actor` sees it. Signed-out visitors see nothing.
    pub fn visible_for(&self, actor: Option<&Actor>) -> NavMenu {
        let Some(actor) = actor else {
            return NavMenu::default();
        };
        NavMenu::new(
            self.items
                .iter()
                .filter_map(|item| item.visible_for(actor))
                .collect(),
        )
    }

    /// Keys of every visible entry, depth first.
    pub fn keys(&self) -> Vec<&str> {
        fn walk<'a>(items: &'a [NavItem], out: &mut Vec<&'a str>) {
            for item in items {
                out.push(&item.key);
                walk(&item.children, out);
            }
        }
        let mut out = Vec::new();
        walk(&self.items, &mut out);
        out
    }
}

/// Dashboard panels, gated by department.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DashboardSection {
    /// Open orders and offers.
    Sales,
    /// Deliveries in progress.
    Operations,
    /// Receivables, checks and card balances.
    Finance,
    /// Items awaiting approval.
    Approvals,
}

impl DashboardSection {
    /// All sections, in display order.
    pub fn all() -> [DashboardSection; 4] {
        [
            DashboardSection::Sales,
            DashboardSection::Operations,
            DashboardSection::Finance,
            DashboardSection::Approvals,
        ]
    }

    /// Requirement for seeing the section.
    pub fn requirement(&self) -> Requirement {
        let staff = Requirement::roles([Role::Admin, Role::User]);
        match self {
            DashboardSection::Sales => {
                staff.with_departments([Department::Sales, Department::Management])
            }
            DashboardSection::Operations => staff,
            DashboardSection::Finance => staff.with_departments([
                Department::Finance,
                Department::Accounting,
                Department::Management,
            ]),
            DashboardSection::Approvals => staff
                .with_departments([Department::Management])
                .with_all_permissions([Permission::Approval]),
        }
    }
}

/// Sections `actor` may see, in display order.
pub fn visible_sections(actor: Option<&Actor>) -> Vec<DashboardSection> {
    DashboardSection::all()
        .into_iter()
        .filter(|section| satisfies(actor, &section.requirement()))
        .collect()
}
