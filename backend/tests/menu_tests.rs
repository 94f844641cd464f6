//! Menu and table tests
//!
//! Property-based and unit tests for:
//! - Property 17: Menu Search Is Case-Insensitive
//! - Property 18: Table QR Links
//! - Property 19: Price and Capacity Validation

use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::{
    menu_matches_search, ordering_url, validate_price, validate_table_capacity,
    validate_table_number, MenuStatus, TableStatus, DEFAULT_TABLE_CAPACITY,
};

// ============================================================================
// Property Test Strategies
// ============================================================================

fn dish_name_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z]{2,12}( [A-Za-z]{2,10}){0,2}"
}

fn base_url_strategy() -> impl Strategy<Value = String> {
    "https?://[a-z]{3,10}\\.(vn|com)(:[0-9]{4})?/?"
}

// ============================================================================
// Property-Based Tests
// ============================================================================

proptest! {
    /// Property 17: Menu Search Is Case-Insensitive
    /// Any slice of the name, in any case, finds the dish.
    #[test]
    fn test_name_slices_match(name in dish_name_strategy(), start in 0usize..4, len in 1usize..6) {
        let start = start.min(name.len() - 1);
        let end = (start + len).min(name.len());
        let needle = &name[start..end];
        prop_assert!(menu_matches_search(&name, None, &needle.to_uppercase()));
        prop_assert!(menu_matches_search(&name, None, &needle.to_lowercase()));
    }

    /// Property 17: Menu Search Is Case-Insensitive
    /// Blank searches match everything.
    #[test]
    fn test_blank_search(name in dish_name_strategy(), spaces in " {0,3}") {
        prop_assert!(menu_matches_search(&name, None, &spaces));
    }

    /// Property 18: Table QR Links
    #[test]
    fn test_ordering_url_shape(base in base_url_strategy(), table in 1i32..500, token in "[A-Za-z0-9_-]{22}") {
        let url = ordering_url(&base, table, Some(&token));
        let expected = format!("/goimon?table={}&token={}", table, token);
        prop_assert!(url.contains(&expected));
        prop_assert!(!url.contains("//goimon"));
        let plain = ordering_url(&base, table, None);
        let expected_plain = format!("/goimon?table={}", table);
        prop_assert!(plain.ends_with(&expected_plain));
    }

    /// Property 19: Price and Capacity Validation
    #[test]
    fn test_price_must_be_positive(cents in -100_000i64..100_000) {
        let price = Decimal::new(cents, 2);
        prop_assert_eq!(validate_price(price).is_ok(), cents > 0);
    }

    /// Property 19: Price and Capacity Validation
    /// A third decimal place would be rounded away by the database.
    #[test]
    fn test_price_scale(mills in 1i64..1_000_000) {
        let price = Decimal::new(mills, 3);
        prop_assert_eq!(validate_price(price).is_ok(), mills % 10 == 0);
    }

    /// Property 19: Price and Capacity Validation
    #[test]
    fn test_capacity_range(capacity in -5i32..80) {
        prop_assert_eq!(validate_table_capacity(capacity).is_ok(), (1..=50).contains(&capacity));
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Description is searched too
    #[test]
    fn test_search_description() {
        assert!(menu_matches_search("Phở bò", Some("Nước dùng hầm xương"), "XƯƠNG"));
        assert!(!menu_matches_search("Phở bò", None, "gà"));
    }

    /// Only AVAILABLE dishes can be ordered
    #[test]
    fn test_orderable() {
        assert!(MenuStatus::Available.is_orderable());
        assert!(!MenuStatus::Unavailable.is_orderable());
        assert_eq!("unavailable".parse::<MenuStatus>().unwrap(), MenuStatus::Unavailable);
        assert!("SOLD_OUT".parse::<MenuStatus>().is_err());
    }

    /// Legacy EMPTY table status reads as AVAILABLE
    #[test]
    fn test_legacy_empty_table() {
        assert_eq!("EMPTY".parse::<TableStatus>().unwrap(), TableStatus::Available);
        let status: TableStatus = serde_json::from_str("\"EMPTY\"").unwrap();
        assert_eq!(status, TableStatus::Available);
        assert_eq!(TableStatus::default().as_str(), "AVAILABLE");
    }

    /// Worked QR link
    #[test]
    fn test_qr_link_example() {
        assert_eq!(
            ordering_url("http://localhost:3000/", 7, Some("abc")),
            "http://localhost:3000/goimon?table=7&token=abc"
        );
        assert_eq!(ordering_url("http://localhost:3000", 7, Some("")), "http://localhost:3000/goimon?table=7");
    }

    /// Table defaults and numbering
    #[test]
    fn test_table_rules() {
        assert_eq!(DEFAULT_TABLE_CAPACITY, 4);
        assert!(validate_table_number(1).is_ok());
        assert!(validate_table_number(0).is_err());
    }
}
