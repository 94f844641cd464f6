//! Inventory management tests
//!
//! Tests for stock tracking including:
//! - Property 14: Stock Status Derivation
//! - Property 15: Stock Balance Accuracy
//! - Property 16: Expiry Warnings

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::{
    apply_movement, is_expired, is_expiring_soon, stock_value, MovementKind, StockError,
    StockStatus, EXPIRY_WARNING_DAYS,
};
use std::str::FromStr;

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

// ============================================================================
// Property Test Strategies
// ============================================================================

/// Stock levels with 3 decimal places (kg, litres, pieces)
fn level_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..1_000_000).prop_map(|milli| Decimal::new(milli, 3))
}

fn positive_quantity_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..100_000).prop_map(|milli| Decimal::new(milli, 3))
}

fn movement_strategy() -> impl Strategy<Value = (MovementKind, Decimal)> {
    (
        prop_oneof![Just(MovementKind::In), Just(MovementKind::Out)],
        positive_quantity_strategy(),
    )
}

// ============================================================================
// Property-Based Tests
// ============================================================================

proptest! {
    /// Property 14: Stock Status Derivation
    #[test]
    fn test_status_from_levels(stock in level_strategy(), min_stock in level_strategy()) {
        let status = StockStatus::from_levels(stock, min_stock);
        let expected = if stock.is_zero() {
            StockStatus::Out
        } else if stock < min_stock {
            StockStatus::Low
        } else {
            StockStatus::Ok
        };
        prop_assert_eq!(status, expected);
    }

    /// Property 15: Stock Balance Accuracy
    /// Applying a run of movements gives initial + Σin − Σout for the
    /// movements that were accepted, and stock never goes negative.
    #[test]
    fn test_balance_after_movements(
        initial in level_strategy(),
        movements in prop::collection::vec(movement_strategy(), 0..40),
    ) {
        let mut stock = initial;
        let mut total_in = Decimal::ZERO;
        let mut total_out = Decimal::ZERO;

        for (kind, quantity) in movements {
            match apply_movement(stock, kind, quantity) {
                Ok(next) => {
                    match kind {
                        MovementKind::In => total_in += quantity,
                        MovementKind::Out => total_out += quantity,
                    }
                    stock = next;
                }
                Err(StockError::Insufficient { available, requested }) => {
                    prop_assert_eq!(kind, MovementKind::Out);
                    prop_assert_eq!(available, stock);
                    prop_assert!(requested > available);
                }
                Err(StockError::NonPositiveQuantity) => prop_assert!(false, "quantity was positive"),
                Err(StockError::TooPrecise) => prop_assert!(false, "quantity had 3 decimals"),
            }
            prop_assert!(stock >= Decimal::ZERO);
        }

        prop_assert_eq!(stock, initial + total_in - total_out);
    }

    /// Property 15: Stock Balance Accuracy
    #[test]
    fn test_non_positive_quantity_rejected(stock in level_strategy(), quantity in -1_000i64..=0) {
        let quantity = Decimal::new(quantity, 3);
        prop_assert_eq!(
            apply_movement(stock, MovementKind::In, quantity),
            Err(StockError::NonPositiveQuantity)
        );
    }

    /// Property 15: Stock Balance Accuracy
    #[test]
    fn test_stock_value(levels in prop::collection::vec((level_strategy(), level_strategy()), 0..20)) {
        let expected: Decimal = levels.iter().map(|(s, p)| *s * *p).sum();
        prop_assert_eq!(stock_value(levels), expected);
    }

    /// Property 16: Expiry Warnings
    #[test]
    fn test_expiry_window(offset in -30i64..30) {
        let today = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
        let expiry = Some(today + Duration::days(offset));
        prop_assert_eq!(is_expiring_soon(expiry, today), (0..=EXPIRY_WARNING_DAYS).contains(&offset));
        prop_assert_eq!(is_expired(expiry, today), offset < 0);
        prop_assert!(!(is_expiring_soon(expiry, today) && is_expired(expiry, today)));
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// The ledger stores 3 decimals, finer quantities are refused
    #[test]
    fn test_sub_gram_quantity_rejected() {
        assert_eq!(
            apply_movement(dec("5"), MovementKind::In, dec("0.0001")),
            Err(StockError::TooPrecise)
        );
        assert_eq!(apply_movement(dec("5"), MovementKind::In, dec("0.5000")), Ok(dec("5.5")));
    }

    /// Receiving stock
    #[test]
    fn test_stock_in() {
        assert_eq!(apply_movement(dec("2.5"), MovementKind::In, dec("10")).unwrap(), dec("12.5"));
    }

    /// Issuing exactly what is left empties the shelf
    #[test]
    fn test_stock_out_to_zero() {
        let left = apply_movement(dec("4"), MovementKind::Out, dec("4")).unwrap();
        assert!(left.is_zero());
        assert_eq!(StockStatus::from_levels(left, dec("1")), StockStatus::Out);
    }

    /// Over-issuing is refused with the available amount
    #[test]
    fn test_stock_out_too_much() {
        let err = apply_movement(dec("1.5"), MovementKind::Out, dec("2")).unwrap_err();
        assert_eq!(
            err,
            StockError::Insufficient {
                available: dec("1.5"),
                requested: dec("2"),
            }
        );
    }

    /// Default movement reasons
    #[test]
    fn test_default_reasons() {
        assert_eq!(MovementKind::In.default_reason(), "Nhập kho");
        assert_eq!(MovementKind::Out.default_reason(), "Xuất kho");
    }

    /// Status filter values
    #[test]
    fn test_status_parsing() {
        assert_eq!("LOW".parse::<StockStatus>().unwrap(), StockStatus::Low);
        assert_eq!(StockStatus::Out.to_string(), "out");
        assert!("empty".parse::<StockStatus>().is_err());
    }

    /// Items without an expiry date never warn
    #[test]
    fn test_no_expiry_date() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
        assert!(!is_expiring_soon(None, today));
        assert!(!is_expired(None, today));
    }

    /// Minimum equal to stock is still ok
    #[test]
    fn test_status_at_minimum() {
        assert_eq!(StockStatus::from_levels(dec("5"), dec("5")), StockStatus::Ok);
        assert_eq!(StockStatus::from_levels(dec("4.999"), dec("5")), StockStatus::Low);
    }
}
