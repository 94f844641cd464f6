//! Bill breakdown and split payments

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::types::{round_money, ParseEnumError};

/// Surcharges applied on top of the order total
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ChargeRates {
    pub tax_rate: Decimal,
    pub service_charge_rate: Decimal,
}

impl Default for ChargeRates {
    fn default() -> Self {
        Self {
            // 10% VAT, 5% service
            tax_rate: Decimal::new(10, 2),
            service_charge_rate: Decimal::new(5, 2),
        }
    }
}

/// What the cashier shows before taking payment
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentBreakdown {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub service_charge: Decimal,
    pub total: Decimal,
}

impl PaymentBreakdown {
    pub fn compute(subtotal: Decimal, rates: &ChargeRates) -> Self {
        let tax = round_money(subtotal * rates.tax_rate);
        let service_charge = round_money(subtotal * rates.service_charge_rate);
        Self {
            subtotal,
            tax,
            service_charge,
            total: round_money(subtotal + tax + service_charge),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum PaymentMethod {
    #[default]
    Cash,
    BankTransfer,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::BankTransfer => "bank_transfer",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cash" => Ok(PaymentMethod::Cash),
            "bank_transfer" | "transfer" => Ok(PaymentMethod::BankTransfer),
            _ => Err(ParseEnumError::new("payment method", s)),
        }
    }
}

crate::text_enum!(PaymentMethod);

/// Most guests one bill can be split between
pub const MAX_SPLIT_COUNT: u32 = 50;

/// A bill divided evenly between guests
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SplitPayment {
    pub total_amount: Decimal,
    pub split_count: u32,
    pub amount_per_person: Decimal,
    pub splits: Vec<Decimal>,
}

/// Split `total` into `count` shares rounded to 2 dp. The last share takes
/// the rounding remainder so the shares always add up to the total.
pub fn split_bill(total: Decimal, count: u32) -> Result<SplitPayment, &'static str> {
    if count < 2 {
        return Err("Split count must be at least 2");
    }
    if count > MAX_SPLIT_COUNT {
        return Err("Split count must be at most 50");
    }
    if total < Decimal::ZERO {
        return Err("Total must not be negative");
    }
    let per_person = round_money(total / Decimal::from(count));
    let mut splits = vec![per_person; count as usize];
    let assigned = per_person * Decimal::from(count - 1);
    if let Some(last) = splits.last_mut() {
        *last = total - assigned;
    }
    Ok(SplitPayment {
        total_amount: total,
        split_count: count,
        amount_per_person: per_person,
        splits,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn breakdown_applies_tax_and_service() {
        let b = PaymentBreakdown::compute(Decimal::from(100_000), &ChargeRates::default());
        assert_eq!(b.tax, Decimal::from(10_000));
        assert_eq!(b.service_charge, Decimal::from(5_000));
        assert_eq!(b.total, Decimal::from(115_000));
    }

    #[test]
    fn split_remainder_goes_to_last_share() {
        let split = split_bill(Decimal::from(100), 3).unwrap();
        assert_eq!(split.amount_per_person, Decimal::new(3333, 2));
        assert_eq!(split.splits[2], Decimal::new(3334, 2));
        assert_eq!(split.splits.iter().copied().sum::<Decimal>(), Decimal::from(100));
    }

    #[test]
    fn split_count_is_capped() {
        assert!(split_bill(Decimal::from(100), MAX_SPLIT_COUNT).is_ok());
        assert_eq!(
            split_bill(Decimal::from(100), MAX_SPLIT_COUNT + 1).unwrap_err(),
            "Split count must be at most 50"
        );
        assert!(split_bill(Decimal::from(100), u32::MAX).is_err());
    }
}
