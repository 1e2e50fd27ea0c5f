//! # Roles
//!
//! Coarse-grained identity categories for back-office actors.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{deserialize_tag, UnknownTag};

/// Role carried by an actor.
///
/// Roles decide which part of the back office an actor lands in:
/// - **Admin**: Full back-office access
/// - **User**: Internal staff (sales, accounting, finance, management)
/// - **Transporter**: External carrier working on deliveries
/// - **Company**: External customer account, scoped by `connection_id`
///
/// # Example
///
/// ```
/// use freightdesk_rbac::Role;
///
/// assert_eq!(Role::parse("ADMIN"), Some(Role::Admin));
/// assert_eq!(Role::parse("transporter"), Some(Role::Transporter));
/// assert_eq!(Role::Company.as_str(), "COMPANY");
/// ```
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Full back-office administrator.
    Admin,

    /// Internal staff member.
    User,

    /// External carrier.
    Transporter,

    /// External customer account.
    Company,
}

impl Role {
    /// Get the wire representation of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::User => "USER",
            Role::Transporter => "TRANSPORTER",
            Role::Company => "COMPANY",
        }
    }

    /// Parse a role from its tag (case-insensitive).
    ///
    /// A `ROLE_` prefix is accepted as well.
    ///
    /// # Returns
    ///
    /// `Some(Role)` if valid, `None` otherwise
    pub fn parse(s: &str) -> Option<Self> {
        let upper = s.trim().to_uppercase();
        match upper.strip_prefix("ROLE_").unwrap_or(&upper) {
            "ADMIN" => Some(Role::Admin),
            "USER" => Some(Role::User),
            "TRANSPORTER" => Some(Role::Transporter),
            "COMPANY" => Some(Role::Company),
            _ => None,
        }
    }

    /// All roles, most privileged first.
    pub fn all() -> [Role; 4] {
        [Role::Admin, Role::User, Role::Transporter, Role::Company]
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| UnknownTag::new("role", s))
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_tag(deserializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse() {
        assert_eq!(Role::parse("ADMIN"), Some(Role::Admin));
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
        assert_eq!(Role::parse("ROLE_COMPANY"), Some(Role::Company));
        assert_eq!(Role::parse("SUPERUSER"), None);
    }

    #[test]
    fn test_role_from_str_error() {
        let err = "OWNER".parse::<Role>().unwrap_err();
        assert_eq!(err.to_string(), "unknown role tag: OWNER");
    }

    #[test]
    fn test_role_serde() {
        let json = serde_json::to_string(&Role::Transporter).unwrap();
        assert_eq!(json, "\"TRANSPORTER\"");

        let role: Role = serde_json::from_str("\"USER\"").unwrap();
        assert_eq!(role, Role::User);

        assert!(serde_json::from_str::<Role>("\"GUEST\"").is_err());
    }

    #[test]
    fn test_role_deserialize_accepts_parse_forms() {
        let roles: Vec<Role> =
            serde_json::from_str(r#"["ROLE_ADMIN", "user", "Company"]"#).unwrap();
        assert_eq!(roles, vec![Role::Admin, Role::User, Role::Company]);

        let err = serde_json::from_str::<Role>("\"ROLE_OWNER\"").unwrap_err();
        assert!(err.to_string().contains("unknown role tag: ROLE_OWNER"));
    }
}
