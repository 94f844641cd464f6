//! Employee tests
//!
//! Tests for staff records including:
//! - Property 20: Position Grants a Role
//! - Property 21: Vietnamese Phone Numbers

use proptest::prelude::*;
use shared::{role_for_position, validate_vn_phone, Role, POSITIONS};

// ============================================================================
// Property Test Strategies
// ============================================================================

/// Mobile prefixes in use by Vietnamese carriers
fn prefix_strategy() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec!["090", "091", "093", "097", "098", "086", "070", "081"])
}

fn local_phone_strategy() -> impl Strategy<Value = String> {
    (prefix_strategy(), "[0-9]{7}").prop_map(|(prefix, rest)| format!("{}{}", prefix, rest))
}

// ============================================================================
// Property-Based Tests
// ============================================================================

proptest! {
    /// Property 20: Position Grants a Role
    /// Positions outside the form list fall back to the plain employee role.
    #[test]
    fn test_unknown_position(position in "[A-Za-z ]{0,20}") {
        prop_assert_eq!(role_for_position(&position), Role::Employee);
    }

    /// Property 21: Vietnamese Phone Numbers
    #[test]
    fn test_domestic_numbers(phone in local_phone_strategy()) {
        prop_assert!(validate_vn_phone(&phone).is_ok());
        let spaced = format!("{} {} {}", &phone[..3], &phone[3..6], &phone[6..]);
        prop_assert!(validate_vn_phone(&spaced).is_ok());
    }

    /// Property 21: Vietnamese Phone Numbers
    /// +84 replaces the leading zero.
    #[test]
    fn test_international_numbers(phone in local_phone_strategy()) {
        let international = format!("+84{}", &phone[1..]);
        prop_assert!(validate_vn_phone(&international).is_ok());
    }

    /// Property 21: Vietnamese Phone Numbers
    #[test]
    fn test_wrong_length_rejected(digits in "0[0-9]{3,8}") {
        prop_assert!(validate_vn_phone(&digits).is_err());
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Each listed position maps to the expected role
    #[test]
    fn test_position_roles() {
        assert_eq!(role_for_position("Quản lý"), Role::Owner);
        assert_eq!(role_for_position("Đầu bếp"), Role::Kitchen);
        assert_eq!(role_for_position(" Phó bếp "), Role::Kitchen);
        assert_eq!(role_for_position("Thu ngân"), Role::Cashier);
        assert_eq!(role_for_position("Phục vụ"), Role::Employee);
        assert_eq!(role_for_position("Bảo vệ"), Role::Employee);
    }

    /// The form list has no duplicates
    #[test]
    fn test_positions_unique() {
        let mut sorted = POSITIONS.to_vec();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), POSITIONS.len());
    }

    /// Letters and missing prefixes are rejected
    #[test]
    fn test_bad_phones() {
        assert!(validate_vn_phone("").is_err());
        assert!(validate_vn_phone("84901234567").is_err());
        assert!(validate_vn_phone("0901-234-567").is_ok());
        assert!(validate_vn_phone("0901.234.56x").is_err());
    }
}
