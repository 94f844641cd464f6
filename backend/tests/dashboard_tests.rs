//! Sales dashboard tests
//!
//! Tests for report figures including:
//! - Property 25: Category Shares
//! - Property 26: Revenue Periods
//! - Property 27: Report Date Ranges

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::{revenue_share, round_one_decimal, DateRange, RevenuePeriod};
use std::str::FromStr;

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

// ============================================================================
// Property Test Strategies
// ============================================================================

fn revenue_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..1_000_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

fn day_strategy() -> impl Strategy<Value = NaiveDate> {
    (0i64..3_650).prop_map(|offset| NaiveDate::from_ymd_opt(2020, 1, 1).unwrap() + Duration::days(offset))
}

// ============================================================================
// Property-Based Tests
// ============================================================================

proptest! {
    /// Property 25: Category Shares
    /// A part of the total is between 0% and 100%.
    #[test]
    fn test_share_bounds(a in revenue_strategy(), b in revenue_strategy()) {
        let whole = a + b;
        let share = revenue_share(a, whole);
        prop_assert!(share >= Decimal::ZERO);
        prop_assert!(share <= Decimal::from(100));
        prop_assert!(share.scale() <= 2);
    }

    /// Property 25: Category Shares
    /// Shares of a split add up to 100% within rounding.
    #[test]
    fn test_shares_add_up(parts in prop::collection::vec(revenue_strategy(), 1..8)) {
        let whole: Decimal = parts.iter().copied().sum();
        prop_assume!(!whole.is_zero());
        let total: Decimal = parts.iter().map(|p| revenue_share(*p, whole)).sum();
        let drift = (total - Decimal::from(100)).abs();
        prop_assert!(drift <= Decimal::new(parts.len() as i64, 2));
    }

    /// Property 26: Revenue Periods
    #[test]
    fn test_period_parsing(period in prop::sample::select(vec!["daily", "WEEKLY", "Monthly"])) {
        let parsed = RevenuePeriod::from_str(period).unwrap();
        prop_assert_eq!(parsed.as_str(), period.to_lowercase());
    }

    /// Property 27: Report Date Ranges
    #[test]
    fn test_range_order(a in day_strategy(), b in day_strategy()) {
        let range = DateRange::new(a, b);
        prop_assert_eq!(range.is_ok(), a <= b);
        if let Ok(range) = range {
            prop_assert!(range.contains(a));
            prop_assert!(range.contains(b));
            prop_assert!(!range.contains(b + Duration::days(1)));
        }
    }

    /// Average preparation time keeps one decimal
    #[test]
    fn test_round_one_decimal(tenths in 0i64..100_000) {
        let value = tenths as f64 / 10.0;
        prop_assert!((round_one_decimal(value) - value).abs() < 1e-9);
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// No sales means a zero share, not a division error
    #[test]
    fn test_share_of_nothing() {
        assert_eq!(revenue_share(dec("0"), dec("0")), Decimal::ZERO);
    }

    /// One of three equal categories
    #[test]
    fn test_share_example() {
        assert_eq!(revenue_share(dec("100000"), dec("300000")), dec("33.33"));
        assert_eq!(revenue_share(dec("150000"), dec("200000")), dec("75"));
    }

    /// PostgreSQL truncation units
    #[test]
    fn test_trunc_units() {
        assert_eq!(RevenuePeriod::Daily.trunc_unit(), "day");
        assert_eq!(RevenuePeriod::Weekly.trunc_unit(), "week");
        assert_eq!(RevenuePeriod::Monthly.trunc_unit(), "month");
        assert_eq!(RevenuePeriod::default(), RevenuePeriod::Daily);
        assert!("yearly".parse::<RevenuePeriod>().is_err());
    }

    /// A single day contains only itself
    #[test]
    fn test_single_day() {
        let day = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
        let range = DateRange::single_day(day);
        assert!(range.contains(day));
        assert!(!range.contains(day.succ_opt().unwrap()));
    }

    /// Half a tenth rounds up
    #[test]
    fn test_round_one_decimal_example() {
        assert_eq!(round_one_decimal(12.34), 12.3);
        assert_eq!(round_one_decimal(12.36), 12.4);
    }
}
