//! Bank account tests
//!
//! Property-based and unit tests for:
//! - Property 22: Account Number Normalization
//! - Property 23: Account Holder Normalization
//! - Property 24: Supported Bank Lookup

use proptest::prelude::*;
use shared::{
    default_logo, find_bank, normalize_account_holder, normalize_account_number,
    BankAccountStatus, SUPPORTED_BANKS,
};

// ============================================================================
// Property Test Strategies
// ============================================================================

fn account_digits_strategy() -> impl Strategy<Value = String> {
    "[0-9]{6,20}"
}

/// Insert spaces and dashes between digits the way people type them
fn separated_strategy() -> impl Strategy<Value = (String, String)> {
    (
        account_digits_strategy(),
        prop::collection::vec(prop_oneof![Just(""), Just(" "), Just("-")], 20),
    )
        .prop_map(|(digits, seps)| {
            let typed: String = digits
                .chars()
                .zip(seps.iter())
                .map(|(c, sep)| format!("{}{}", c, sep))
                .collect();
            (digits, typed)
        })
}

fn holder_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z]{2,8}( {1,3}[a-zA-Z]{1,8}){0,3}"
}

fn bank_strategy() -> impl Strategy<Value = &'static shared::SupportedBank> {
    prop::sample::select(SUPPORTED_BANKS.iter().collect::<Vec<_>>())
}

// ============================================================================
// Property-Based Tests
// ============================================================================

proptest! {
    /// Property 22: Account Number Normalization
    #[test]
    fn test_separators_stripped((digits, typed) in separated_strategy()) {
        prop_assert_eq!(normalize_account_number(&typed).unwrap(), digits);
    }

    /// Property 22: Account Number Normalization
    #[test]
    fn test_length_bounds(digits in "[0-9]{1,30}") {
        prop_assert_eq!(
            normalize_account_number(&digits).is_ok(),
            (6..=20).contains(&digits.len())
        );
    }

    /// Property 23: Account Holder Normalization
    /// Result is upper-case with single spaces and is idempotent.
    #[test]
    fn test_holder_normalized(raw in holder_strategy()) {
        let holder = normalize_account_holder(&raw).unwrap();
        prop_assert_eq!(holder.clone(), holder.to_uppercase());
        prop_assert!(!holder.contains("  "));
        prop_assert_eq!(normalize_account_holder(&holder).unwrap(), holder);
    }

    /// Property 24: Supported Bank Lookup
    /// Banks are found by code or name regardless of case.
    #[test]
    fn test_find_bank(bank in bank_strategy()) {
        prop_assert_eq!(find_bank(&bank.code.to_lowercase()), Some(bank));
        prop_assert_eq!(find_bank(&bank.name.to_uppercase()), Some(bank));
        prop_assert_eq!(default_logo(bank.code).chars().count(), bank.code.chars().count().min(3));
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Ten banks with distinct codes
    #[test]
    fn test_bank_list() {
        assert_eq!(SUPPORTED_BANKS.len(), 10);
        let mut codes: Vec<_> = SUPPORTED_BANKS.iter().map(|b| b.code).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), 10);
    }

    /// Unknown banks are not guessed
    #[test]
    fn test_unknown_bank() {
        assert!(find_bank("Ngân hàng ABC").is_none());
        assert!(find_bank("").is_none());
    }

    /// Logo badges
    #[test]
    fn test_default_logo() {
        assert_eq!(default_logo("Vietcombank"), "VIE");
        assert_eq!(default_logo(" mb "), "MB");
    }

    /// Locked is the inactive state
    #[test]
    fn test_status() {
        assert_eq!(BankAccountStatus::from_active(true), BankAccountStatus::Active);
        assert_eq!(BankAccountStatus::from_active(false).as_str(), "locked");
        assert_eq!(serde_json::to_string(&BankAccountStatus::Locked).unwrap(), "\"locked\"");
    }

    /// Digits and letters do not mix
    #[test]
    fn test_invalid_inputs() {
        assert!(normalize_account_number("1234 5678 9O").is_err());
        assert!(normalize_account_holder(" a ").is_err());
        assert!(normalize_account_holder("Trần Thị B.").is_err());
    }
}
