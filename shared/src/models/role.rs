//! Staff roles and the front-of-house areas each role may open

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::types::ParseEnumError;

/// Account role stored on every user
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", try_from = "String")]
pub enum Role {
    Owner,
    Admin,
    Kitchen,
    Cashier,
    Staff,
    Employee,
}

impl Role {
    pub const ALL: [Role; 6] = [
        Role::Owner,
        Role::Admin,
        Role::Kitchen,
        Role::Cashier,
        Role::Staff,
        Role::Employee,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Owner => "OWNER",
            Role::Admin => "ADMIN",
            Role::Kitchen => "KITCHEN",
            Role::Cashier => "CASHIER",
            Role::Staff => "STAFF",
            Role::Employee => "EMPLOYEE",
        }
    }

    /// Vietnamese label shown in the staff UI
    pub fn display_name(&self) -> &'static str {
        match self {
            Role::Owner => "Chủ nhà hàng",
            Role::Admin => "Quản lý",
            Role::Kitchen => "Bếp",
            Role::Cashier => "Thu ngân",
            Role::Staff | Role::Employee => "Nhân viên",
        }
    }

    /// Route prefixes the role may open
    pub fn allowed_routes(&self) -> &'static [&'static str] {
        match self {
            Role::Owner => &["/admin", "/manager", "/kitchen", "/cashier", "/staff"],
            Role::Admin => &["/admin"],
            Role::Kitchen => &["/kitchen"],
            Role::Cashier => &["/cashier"],
            Role::Staff | Role::Employee => &["/staff"],
        }
    }

    /// Landing page after login
    pub fn default_route(&self) -> &'static str {
        match self {
            Role::Owner | Role::Admin => "/admin",
            Role::Kitchen => "/kitchen",
            Role::Cashier => "/cashier",
            Role::Staff | Role::Employee => "/staff",
        }
    }

    /// Prefix match on whole path segments, so `/admin` covers `/admin/menu`
    /// but not `/administrator`.
    pub fn can_access(&self, path: &str) -> bool {
        self.allowed_routes().iter().any(|prefix| {
            path == *prefix
                || path
                    .strip_prefix(prefix)
                    .map(|rest| rest.starts_with('/') || rest.starts_with('?'))
                    .unwrap_or(false)
        })
    }

    /// Owner and admin manage menu, staff, bank accounts and reports
    pub fn is_manager(&self) -> bool {
        matches!(self, Role::Owner | Role::Admin)
    }

    /// Roles that work the kitchen display
    pub fn is_kitchen(&self) -> bool {
        self.is_manager() || matches!(self, Role::Kitchen)
    }

    /// Roles that take payments
    pub fn is_cashier(&self) -> bool {
        self.is_manager() || matches!(self, Role::Cashier)
    }
}

impl FromStr for Role {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "OWNER" => Ok(Role::Owner),
            "ADMIN" => Ok(Role::Admin),
            "KITCHEN" => Ok(Role::Kitchen),
            "CASHIER" => Ok(Role::Cashier),
            "STAFF" => Ok(Role::Staff),
            "EMPLOYEE" => Ok(Role::Employee),
            _ => Err(ParseEnumError::new("role", s)),
        }
    }
}

crate::text_enum!(Role);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_reaches_every_area() {
        for path in ["/admin", "/manager/shift", "/kitchen", "/cashier", "/staff"] {
            assert!(Role::Owner.can_access(path), "{path}");
        }
    }

    #[test]
    fn prefix_must_end_on_segment() {
        assert!(Role::Admin.can_access("/admin/menu"));
        assert!(!Role::Admin.can_access("/administrator"));
        assert!(!Role::Kitchen.can_access("/cashier"));
    }

    #[test]
    fn parses_legacy_lowercase_roles() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!(" staff ".parse::<Role>().unwrap(), Role::Staff);
        assert!("chef".parse::<Role>().is_err());
    }

    #[test]
    fn request_bodies_accept_lowercase_roles() {
        let role: Role = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(role, Role::Admin);
        assert_eq!(serde_json::to_string(&role).unwrap(), "\"ADMIN\"");
    }
}
