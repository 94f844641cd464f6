//! Menu models

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::types::ParseEnumError;

/// Whether a dish can currently be ordered
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", try_from = "String")]
pub enum MenuStatus {
    #[default]
    Available,
    Unavailable,
}

impl MenuStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MenuStatus::Available => "AVAILABLE",
            MenuStatus::Unavailable => "UNAVAILABLE",
        }
    }

    pub fn is_orderable(&self) -> bool {
        matches!(self, MenuStatus::Available)
    }
}

impl FromStr for MenuStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "AVAILABLE" => Ok(MenuStatus::Available),
            "UNAVAILABLE" => Ok(MenuStatus::Unavailable),
            _ => Err(ParseEnumError::new("menu status", s)),
        }
    }
}

crate::text_enum!(MenuStatus);

/// Case-insensitive search over a dish name and description
pub fn menu_matches_search(name: &str, description: Option<&str>, needle: &str) -> bool {
    let needle = needle.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    name.to_lowercase().contains(&needle)
        || description
            .map(|d| d.to_lowercase().contains(&needle))
            .unwrap_or(false)
}
