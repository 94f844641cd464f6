//! Sales dashboard helpers

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::types::{round_money, ParseEnumError};

pub const DEFAULT_REVENUE_POINTS: i64 = 30;
pub const POPULAR_ITEMS_LIMIT: i64 = 5;
pub const SHIFT_TOP_ITEMS_LIMIT: i64 = 10;
pub const ORDER_CHART_DAYS: i64 = 7;

/// Revenue chart bucket
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum RevenuePeriod {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl RevenuePeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            RevenuePeriod::Daily => "daily",
            RevenuePeriod::Weekly => "weekly",
            RevenuePeriod::Monthly => "monthly",
        }
    }

    /// Unit for `date_trunc` and interval arithmetic in PostgreSQL
    pub fn trunc_unit(&self) -> &'static str {
        match self {
            RevenuePeriod::Daily => "day",
            RevenuePeriod::Weekly => "week",
            RevenuePeriod::Monthly => "month",
        }
    }
}

impl FromStr for RevenuePeriod {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(RevenuePeriod::Daily),
            "weekly" => Ok(RevenuePeriod::Weekly),
            "monthly" => Ok(RevenuePeriod::Monthly),
            _ => Err(ParseEnumError::new("period", s)),
        }
    }
}

crate::text_enum!(RevenuePeriod);

/// `part` as a percentage of `whole`, 2 dp; zero when nothing was sold
pub fn revenue_share(part: Decimal, whole: Decimal) -> Decimal {
    if whole.is_zero() {
        return Decimal::ZERO;
    }
    round_money(part * Decimal::from(100) / whole)
}

pub fn average_amount(total: Decimal, count: i64) -> Decimal {
    if count <= 0 {
        return Decimal::ZERO;
    }
    round_money(total / Decimal::from(count))
}

/// Round a float statistic to one decimal place
pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
