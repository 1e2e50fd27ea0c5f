//! # Departments
//!
//! Organizational-unit tags. Departments drive dashboard-section visibility.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{deserialize_tag, UnknownTag};

/// Department an actor belongs to.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Department {
    /// Bookkeeping and invoicing.
    Accounting,
    /// Checks, credit cards, letters of guarantee.
    Finance,
    /// Company management.
    Management,
    /// Offers and customer orders.
    Sales,
    /// Anyone outside the company (carriers, customers).
    External,
}

impl Department {
    /// Get the wire representation of the department.
    pub fn as_str(&self) -> &'static str {
        match self {
            Department::Accounting => "ACCOUNTING",
            Department::Finance => "FINANCE",
            Department::Management => "MANAGEMENT",
            Department::Sales => "SALES",
            Department::External => "EXTERNAL",
        }
    }

    /// Parse a department from its tag (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "ACCOUNTING" => Some(Department::Accounting),
            "FINANCE" => Some(Department::Finance),
            "MANAGEMENT" => Some(Department::Management),
            "SALES" => Some(Department::Sales),
            "EXTERNAL" => Some(Department::External),
            _ => None,
        }
    }

    /// All departments.
    pub fn all() -> [Department; 5] {
        [
            Department::Accounting,
            Department::Finance,
            Department::Management,
            Department::Sales,
            Department::External,
        ]
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Department {
    type Err = UnknownTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| UnknownTag::new("department", s))
    }
}

impl<'de> Deserialize<'de> for Department {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_tag(deserializer)
    }
}
