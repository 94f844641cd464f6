//! Ingredient stock: levels, movements and expiry

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

use crate::types::ParseEnumError;
use crate::validation::{validate_scale, QUANTITY_SCALE};

pub const DEFAULT_SUPPLIER: &str = "Chưa có thông tin";
pub const DEFAULT_STOCK_IN_REASON: &str = "Nhập kho";
pub const DEFAULT_STOCK_OUT_REASON: &str = "Xuất kho";
pub const INITIAL_STOCK_REASON: &str = "Nhập kho mới";
/// Days ahead of expiry at which an item is flagged
pub const EXPIRY_WARNING_DAYS: i64 = 3;

/// Categories offered by the inventory form
pub const INVENTORY_CATEGORIES: &[&str] = &[
    "Thực phẩm tươi sống",
    "Lương thực",
    "Gia vị",
    "Rau củ",
    "Đồ uống",
];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum StockStatus {
    Ok,
    Low,
    Out,
}

impl StockStatus {
    /// Out at zero, low under the minimum, otherwise ok
    pub fn from_levels(stock: Decimal, min_stock: Decimal) -> Self {
        if stock <= Decimal::ZERO {
            StockStatus::Out
        } else if stock < min_stock {
            StockStatus::Low
        } else {
            StockStatus::Ok
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StockStatus::Ok => "ok",
            StockStatus::Low => "low",
            StockStatus::Out => "out",
        }
    }
}

impl FromStr for StockStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ok" => Ok(StockStatus::Ok),
            "low" => Ok(StockStatus::Low),
            "out" => Ok(StockStatus::Out),
            _ => Err(ParseEnumError::new("stock status", s)),
        }
    }
}

crate::text_enum!(StockStatus);

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum MovementKind {
    In,
    Out,
}

impl MovementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementKind::In => "in",
            MovementKind::Out => "out",
        }
    }

    pub fn default_reason(&self) -> &'static str {
        match self {
            MovementKind::In => DEFAULT_STOCK_IN_REASON,
            MovementKind::Out => DEFAULT_STOCK_OUT_REASON,
        }
    }
}

impl FromStr for MovementKind {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "in" => Ok(MovementKind::In),
            "out" => Ok(MovementKind::Out),
            _ => Err(ParseEnumError::new("movement kind", s)),
        }
    }
}

crate::text_enum!(MovementKind);

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StockError {
    #[error("Quantity must be positive")]
    NonPositiveQuantity,

    #[error("Quantity may have at most 3 decimal places")]
    TooPrecise,

    #[error("Insufficient stock: {available} available, {requested} requested")]
    Insufficient {
        available: Decimal,
        requested: Decimal,
    },
}

/// New stock level after a movement
pub fn apply_movement(
    stock: Decimal,
    kind: MovementKind,
    quantity: Decimal,
) -> Result<Decimal, StockError> {
    if quantity <= Decimal::ZERO {
        return Err(StockError::NonPositiveQuantity);
    }
    if validate_scale(quantity, QUANTITY_SCALE).is_err() {
        return Err(StockError::TooPrecise);
    }
    match kind {
        MovementKind::In => Ok(stock + quantity),
        MovementKind::Out if quantity > stock => Err(StockError::Insufficient {
            available: stock,
            requested: quantity,
        }),
        MovementKind::Out => Ok(stock - quantity),
    }
}

/// Expires today or within the warning window; already expired items are not "soon"
pub fn is_expiring_soon(expiry_date: Option<NaiveDate>, today: NaiveDate) -> bool {
    match expiry_date {
        Some(expiry) => {
            let days_left = (expiry - today).num_days();
            (0..=EXPIRY_WARNING_DAYS).contains(&days_left)
        }
        None => false,
    }
}

pub fn is_expired(expiry_date: Option<NaiveDate>, today: NaiveDate) -> bool {
    expiry_date.map(|d| d < today).unwrap_or(false)
}

/// Σ stock × unit price
pub fn stock_value<I>(levels: I) -> Decimal
where
    I: IntoIterator<Item = (Decimal, Decimal)>,
{
    levels.into_iter().map(|(stock, price)| stock * price).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_boundaries() {
        assert_eq!(StockStatus::from_levels(Decimal::ZERO, Decimal::from(5)), StockStatus::Out);
        assert_eq!(StockStatus::from_levels(Decimal::from(4), Decimal::from(5)), StockStatus::Low);
        assert_eq!(StockStatus::from_levels(Decimal::from(5), Decimal::from(5)), StockStatus::Ok);
    }

    #[test]
    fn stock_out_cannot_exceed_stock() {
        let err = apply_movement(Decimal::from(2), MovementKind::Out, Decimal::from(3)).unwrap_err();
        assert!(matches!(err, StockError::Insufficient { .. }));
    }

    #[test]
    fn movement_quantity_keeps_three_decimals() {
        let stock = Decimal::from(10);
        assert_eq!(
            apply_movement(stock, MovementKind::In, Decimal::new(1_255, 3)),
            Ok(Decimal::new(11_255, 3))
        );
        assert_eq!(
            apply_movement(stock, MovementKind::Out, Decimal::new(1, 4)),
            Err(StockError::TooPrecise)
        );
    }

    #[test]
    fn expiry_window_is_three_days() {
        let today = NaiveDate::from_ymd_opt(2026, 5, 10).unwrap();
        assert!(is_expiring_soon(NaiveDate::from_ymd_opt(2026, 5, 13), today));
        assert!(!is_expiring_soon(NaiveDate::from_ymd_opt(2026, 5, 14), today));
        assert!(!is_expiring_soon(NaiveDate::from_ymd_opt(2026, 5, 9), today));
    }
}
