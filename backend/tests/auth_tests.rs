//! Authentication and authorization tests
//!
//! Property-based and unit tests for:
//! - Property 1: Route Access Matches Role Prefixes
//! - Property 2: Role Parsing Round-Trips Through Storage
//! - Property 3: Credential Validation

use proptest::prelude::*;
use shared::{validate_password, validate_username, Role};

// ============================================================================
// Property Test Strategies
// ============================================================================

fn role_strategy() -> impl Strategy<Value = Role> {
    prop::sample::select(Role::ALL.to_vec())
}

/// Sub-paths under a front-of-house area
fn sub_path_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        "/[a-z]{1,12}",
        "/[a-z]{1,8}/[0-9]{1,4}",
    ]
}

/// Valid login names
fn username_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_.]{2,30}"
}

// ============================================================================
// Property-Based Tests
// ============================================================================

proptest! {
    /// Property 1: Route Access Matches Role Prefixes
    /// Every path under one of the role's allowed prefixes is accessible.
    #[test]
    fn test_allowed_prefixes_grant_access(
        role in role_strategy(),
        sub in sub_path_strategy(),
    ) {
        for prefix in role.allowed_routes() {
            let path = format!("{}{}", prefix, sub);
            prop_assert!(role.can_access(&path), "{} should open {}", role, path);
        }
    }

    /// Property 1: Route Access Matches Role Prefixes
    /// A path is accessible only if some allowed prefix covers it.
    #[test]
    fn test_access_implies_prefix(
        role in role_strategy(),
        path in "/[a-z]{1,10}(/[a-z0-9]{1,6})?",
    ) {
        if role.can_access(&path) {
            prop_assert!(role.allowed_routes().iter().any(|p| path.starts_with(p)));
        }
    }

    /// Property 1: Route Access Matches Role Prefixes
    /// The landing page after login is always accessible.
    #[test]
    fn test_default_route_is_accessible(role in role_strategy()) {
        prop_assert!(role.can_access(role.default_route()));
    }

    /// Property 2: Role Parsing Round-Trips Through Storage
    #[test]
    fn test_role_text_round_trip(role in role_strategy()) {
        let stored = role.as_str().to_string();
        prop_assert_eq!(Role::try_from(stored.clone()).unwrap(), role);
        prop_assert_eq!(stored.to_lowercase().parse::<Role>().unwrap(), role);
    }

    /// Property 3: Credential Validation
    #[test]
    fn test_generated_usernames_are_valid(username in username_strategy()) {
        prop_assert!(validate_username(&username).is_ok());
    }

    /// Property 3: Credential Validation
    /// Passwords are counted in characters, not bytes.
    #[test]
    fn test_password_length_rule(password in "\\PC{0,12}") {
        let ok = password.chars().count() >= 6;
        prop_assert_eq!(validate_password(&password).is_ok(), ok);
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Owner reaches every area
    #[test]
    fn test_owner_routes() {
        for path in ["/admin", "/manager/reports", "/kitchen", "/cashier", "/staff/orders"] {
            assert!(Role::Owner.can_access(path), "{}", path);
        }
    }

    /// Kitchen and cashier are confined to their screens
    #[test]
    fn test_single_area_roles() {
        assert!(Role::Kitchen.can_access("/kitchen"));
        assert!(!Role::Kitchen.can_access("/cashier"));
        assert!(Role::Cashier.can_access("/cashier/shift"));
        assert!(!Role::Cashier.can_access("/admin"));
    }

    /// Prefix match respects path segments
    #[test]
    fn test_prefix_does_not_leak_into_longer_segment() {
        assert!(!Role::Admin.can_access("/administrator"));
        assert!(Role::Admin.can_access("/admin?tab=menu"));
    }

    /// Staff and employee share the floor page
    #[test]
    fn test_staff_and_employee() {
        assert_eq!(Role::Staff.default_route(), "/staff");
        assert_eq!(Role::Employee.default_route(), "/staff");
        assert_eq!(Role::Employee.display_name(), "Nhân viên");
    }

    /// Legacy lowercase role names from older accounts
    #[test]
    fn test_legacy_role_names() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("staff".parse::<Role>().unwrap(), Role::Staff);
        assert!("waiter".parse::<Role>().is_err());
    }

    /// JSON bodies accept the same spellings as the parser
    #[test]
    fn test_role_json_case() {
        let role: Role = serde_json::from_str("\"cashier\"").unwrap();
        assert_eq!(role, Role::Cashier);
        assert_eq!(serde_json::to_string(&role).unwrap(), "\"CASHIER\"");
        assert!(serde_json::from_str::<Role>("\"waiter\"").is_err());
    }

    /// Manager guards
    #[test]
    fn test_role_groups() {
        assert!(Role::Owner.is_manager());
        assert!(Role::Admin.is_kitchen());
        assert!(Role::Admin.is_cashier());
        assert!(!Role::Kitchen.is_cashier());
        assert!(!Role::Staff.is_kitchen());
    }

    /// Usernames reject spaces and accents
    #[test]
    fn test_username_rules() {
        assert!(validate_username("thu.ngan_01").is_ok());
        assert!(validate_username("ab").is_err());
        assert!(validate_username("nguyễn").is_err());
        assert!(validate_username("has space").is_err());
    }
}
