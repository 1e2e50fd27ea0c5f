//! # Permissions
//!
//! Fine-grained, operation-scoped capability tags (the backend calls them
//! authorities). Unlike roles they are checked per action: a button, a form
//! submit, a page.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{deserialize_tag, UnknownTag};

/// An operation-scoped permission.
///
/// # Example
///
/// ```
/// use freightdesk_rbac::Permission;
///
/// let perm = Permission::parse("order_operation").unwrap();
/// assert_eq!(perm, Permission::OrderOperation);
/// assert_eq!(perm.to_string(), "ORDER_OPERATION");
/// ```
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Permission {
    /// Approve or reject pending orders, offers and payments.
    Approval,

    /// Create and edit orders.
    OrderOperation,

    /// Create and edit offers.
    OfferOperation,

    /// Plan and update deliveries.
    DeliveryOperation,

    /// Manage the vehicle fleet.
    VehicleOperation,

    /// Manage customer records.
    CustomerOperation,

    /// General finance bookkeeping.
    FinanceOperation,

    /// Register and settle checks.
    CheckOperation,

    /// Manage company credit cards.
    CreditCardOperation,

    /// Manage letters of guarantee.
    LetterOfGuaranteeOperation,

    /// View reports and summaries.
    ReportView,

    /// Invite users and assign roles.
    UserManagement,

    /// Change application settings.
    Setting,
}

impl Permission {
    /// Get the wire representation of the permission.
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::Approval => "APPROVAL",
            Permission::OrderOperation => "ORDER_OPERATION",
            Permission::OfferOperation => "OFFER_OPERATION",
            Permission::DeliveryOperation => "DELIVERY_OPERATION",
            Permission::VehicleOperation => "VEHICLE_OPERATION",
            Permission::CustomerOperation => "CUSTOMER_OPERATION",
            Permission::FinanceOperation => "FINANCE_OPERATION",
            Permission::CheckOperation => "CHECK_OPERATION",
            Permission::CreditCardOperation => "CREDIT_CARD_OPERATION",
            Permission::LetterOfGuaranteeOperation => "LETTER_OF_GUARANTEE_OPERATION",
            Permission::ReportView => "REPORT_VIEW",
            Permission::UserManagement => "USER_MANAGEMENT",
            Permission::Setting => "SETTING",
        }
    }

    /// Parse a permission from its tag (case-insensitive).
    ///
    /// # Returns
    ///
    /// `Some(Permission)` if valid, `None` otherwise
    pub fn parse(s: &str) -> Option<Self> {
        let upper = s.trim().to_uppercase();
        Self::all().into_iter().find(|p| p.as_str() == upper)
    }

    /// All permissions.
    pub fn all() -> [Permission; 13] {
        [
            Permission::Approval,
            Permission::OrderOperation,
            Permission::OfferOperation,
            Permission::DeliveryOperation,
            Permission::VehicleOperation,
            Permission::CustomerOperation,
            Permission::FinanceOperation,
            Permission::CheckOperation,
            Permission::CreditCardOperation,
            Permission::LetterOfGuaranteeOperation,
            Permission::ReportView,
            Permission::UserManagement,
            Permission::Setting,
        ]
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = UnknownTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| UnknownTag::new("permission", s))
    }
}

impl<'de> Deserialize<'de> for Permission {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_tag(deserializer)
    }
}
