//! Dining table models

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::types::ParseEnumError;

pub const DEFAULT_TABLE_CAPACITY: i32 = 4;
pub const MAX_TABLE_CAPACITY: i32 = 50;

/// Seating state of a table
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", try_from = "String")]
pub enum TableStatus {
    #[default]
    Available,
    Occupied,
}

impl TableStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TableStatus::Available => "AVAILABLE",
            TableStatus::Occupied => "OCCUPIED",
        }
    }
}

impl FromStr for TableStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            // EMPTY was written by the cashier flow before the two vocabularies merged
            "AVAILABLE" | "EMPTY" => Ok(TableStatus::Available),
            "OCCUPIED" => Ok(TableStatus::Occupied),
            _ => Err(ParseEnumError::new("table status", s)),
        }
    }
}

crate::text_enum!(TableStatus);

/// Link encoded in the printed QR code of a table
pub fn ordering_url(base_url: &str, table_number: i32, token: Option<&str>) -> String {
    let base = base_url.trim_end_matches('/');
    match token {
        Some(token) if !token.is_empty() => {
            format!("{}/goimon?table={}&token={}", base, table_number, token)
        }
        _ => format!("{}/goimon?table={}", base, table_number),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_empty_status_deserializes() {
        let status: TableStatus = serde_json::from_str("\"EMPTY\"").unwrap();
        assert_eq!(status, TableStatus::Available);
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"AVAILABLE\"");
    }

    #[test]
    fn ordering_url_trims_slash() {
        assert_eq!(ordering_url("http://pos.vn/", 3, None), "http://pos.vn/goimon?table=3");
    }
}
