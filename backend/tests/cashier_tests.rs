//! Cashier tests
//!
//! Property-based and unit tests for:
//! - Property 11: Bill Breakdown Rounding
//! - Property 12: Split Shares Sum to the Total
//! - Property 13: Shift Averages

use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::{
    average_amount, round_money, split_bill, ChargeRates, PaymentBreakdown, PaymentMethod,
    MAX_SPLIT_COUNT,
};
use std::str::FromStr;

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

// ============================================================================
// Property Test Strategies
// ============================================================================

/// Order totals with cents, up to 50 million VND
fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..5_000_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

fn split_count_strategy() -> impl Strategy<Value = u32> {
    2u32..=20
}

// ============================================================================
// Property-Based Tests
// ============================================================================

proptest! {
    /// Property 11: Bill Breakdown Rounding
    /// Every component has at most 2 decimal places and total = sum of parts.
    #[test]
    fn test_breakdown_components(subtotal in amount_strategy()) {
        let b = PaymentBreakdown::compute(subtotal, &ChargeRates::default());
        prop_assert!(b.tax.scale() <= 2);
        prop_assert!(b.service_charge.scale() <= 2);
        prop_assert_eq!(b.total, b.subtotal + b.tax + b.service_charge);
        prop_assert_eq!(b.tax, round_money(subtotal * dec("0.10")));
        prop_assert_eq!(b.service_charge, round_money(subtotal * dec("0.05")));
    }

    /// Property 11: Bill Breakdown Rounding
    /// Surcharges never reduce the bill.
    #[test]
    fn test_breakdown_not_below_subtotal(subtotal in amount_strategy()) {
        let b = PaymentBreakdown::compute(subtotal, &ChargeRates::default());
        prop_assert!(b.total >= b.subtotal);
    }

    /// Property 12: Split Shares Sum to the Total
    #[test]
    fn test_split_sums_to_total(total in amount_strategy(), count in split_count_strategy()) {
        let split = split_bill(total, count).unwrap();
        prop_assert_eq!(split.splits.len(), count as usize);
        prop_assert_eq!(split.splits.iter().copied().sum::<Decimal>(), total);
    }

    /// Property 12: Split Shares Sum to the Total
    /// All but the last share equal the rounded per-person amount, and the
    /// last one differs from it by less than the number of guests in cents.
    #[test]
    fn test_split_shares(total in amount_strategy(), count in split_count_strategy()) {
        let split = split_bill(total, count).unwrap();
        let (last, rest) = split.splits.split_last().unwrap();
        prop_assert!(rest.iter().all(|s| *s == split.amount_per_person));
        let drift = (*last - split.amount_per_person).abs();
        prop_assert!(drift <= Decimal::new(count as i64, 2));
    }

    /// Property 12: Split Shares Sum to the Total
    #[test]
    fn test_split_needs_two_guests(total in amount_strategy(), count in 0u32..2) {
        prop_assert!(split_bill(total, count).is_err());
    }

    /// Property 13: Shift Averages
    #[test]
    fn test_average_amount(total in amount_strategy(), count in 1i64..500) {
        let avg = average_amount(total, count);
        prop_assert!(avg.scale() <= 2);
        prop_assert!(avg <= total);
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// 250,000 VND bill
    #[test]
    fn test_breakdown_example() {
        let b = PaymentBreakdown::compute(dec("250000"), &ChargeRates::default());
        assert_eq!(b.tax, dec("25000"));
        assert_eq!(b.service_charge, dec("12500"));
        assert_eq!(b.total, dec("287500"));
    }

    /// Half-cent rounds away from zero
    #[test]
    fn test_breakdown_rounding() {
        let b = PaymentBreakdown::compute(dec("0.25"), &ChargeRates::default());
        // 0.025 → 0.03, 0.0125 → 0.01
        assert_eq!(b.tax, dec("0.03"));
        assert_eq!(b.service_charge, dec("0.01"));
        assert_eq!(b.total, dec("0.29"));
    }

    /// Custom rates from configuration
    #[test]
    fn test_breakdown_custom_rates() {
        let rates = ChargeRates {
            tax_rate: dec("0.08"),
            service_charge_rate: Decimal::ZERO,
        };
        let b = PaymentBreakdown::compute(dec("100000"), &rates);
        assert_eq!(b.total, dec("108000"));
    }

    /// Three guests share 100,000
    #[test]
    fn test_split_three_ways() {
        let split = split_bill(dec("100000"), 3).unwrap();
        assert_eq!(split.amount_per_person, dec("33333.33"));
        assert_eq!(split.splits, vec![dec("33333.33"), dec("33333.33"), dec("33333.34")]);
    }

    /// Single-guest split is rejected
    #[test]
    fn test_split_count_one() {
        assert_eq!(split_bill(dec("100"), 1).unwrap_err(), "Split count must be at least 2");
    }

    /// A huge guest count is refused before any shares are built
    #[test]
    fn test_split_count_capped() {
        assert_eq!(split_bill(dec("100"), MAX_SPLIT_COUNT).unwrap().splits.len(), 50);
        assert_eq!(
            split_bill(dec("100"), MAX_SPLIT_COUNT + 1).unwrap_err(),
            "Split count must be at most 50"
        );
        assert!(split_bill(dec("100"), u32::MAX).is_err());
    }

    /// No transactions means zero average
    #[test]
    fn test_average_without_orders() {
        assert_eq!(average_amount(dec("500000"), 0), Decimal::ZERO);
        assert_eq!(average_amount(dec("100"), 3), dec("33.33"));
    }

    /// Payment methods as the cashier page sends them
    #[test]
    fn test_payment_method_parsing() {
        assert_eq!("cash".parse::<PaymentMethod>().unwrap(), PaymentMethod::Cash);
        assert_eq!("bank_transfer".parse::<PaymentMethod>().unwrap(), PaymentMethod::BankTransfer);
        assert_eq!("transfer".parse::<PaymentMethod>().unwrap(), PaymentMethod::BankTransfer);
        assert_eq!(PaymentMethod::default(), PaymentMethod::Cash);
        assert!("card".parse::<PaymentMethod>().is_err());
    }
}
