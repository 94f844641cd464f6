//! Bank accounts that receive transfer payments

use serde::{Deserialize, Serialize};

/// A bank the transfer form can pick from
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct SupportedBank {
    pub code: &'static str,
    pub name: &'static str,
}

pub const SUPPORTED_BANKS: &[SupportedBank] = &[
    SupportedBank { code: "VCB", name: "Vietcombank" },
    SupportedBank { code: "MB", name: "MB Bank" },
    SupportedBank { code: "CTG", name: "VietinBank" },
    SupportedBank { code: "BIDV", name: "BIDV" },
    SupportedBank { code: "TCB", name: "Techcombank" },
    SupportedBank { code: "ACB", name: "ACB" },
    SupportedBank { code: "STB", name: "Sacombank" },
    SupportedBank { code: "VPB", name: "VPBank" },
    SupportedBank { code: "AGR", name: "Agribank" },
    SupportedBank { code: "TPB", name: "TPBank" },
];

pub fn find_bank(code_or_name: &str) -> Option<&'static SupportedBank> {
    let needle = code_or_name.trim();
    SUPPORTED_BANKS
        .iter()
        .find(|b| b.code.eq_ignore_ascii_case(needle) || b.name.eq_ignore_ascii_case(needle))
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BankAccountStatus {
    Active,
    Locked,
}

impl BankAccountStatus {
    pub fn from_active(is_active: bool) -> Self {
        if is_active {
            BankAccountStatus::Active
        } else {
            BankAccountStatus::Locked
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BankAccountStatus::Active => "active",
            BankAccountStatus::Locked => "locked",
        }
    }
}

/// Strip spaces and dashes; the rest must be 6-20 digits
pub fn normalize_account_number(raw: &str) -> Result<String, &'static str> {
    let cleaned: String = raw.chars().filter(|c| *c != ' ' && *c != '-').collect();
    if cleaned.len() < 6 || cleaned.len() > 20 {
        return Err("Account number must be 6-20 digits");
    }
    if !cleaned.chars().all(|c| c.is_ascii_digit()) {
        return Err("Account number must contain digits only");
    }
    Ok(cleaned)
}

/// Letters (Vietnamese included) and spaces, at least 2 characters, upper-cased
pub fn normalize_account_holder(raw: &str) -> Result<String, &'static str> {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() < 2 {
        return Err("Account holder must be at least 2 characters");
    }
    if !collapsed.chars().all(|c| c.is_alphabetic() || c == ' ') {
        return Err("Account holder may contain letters and spaces only");
    }
    Ok(collapsed.to_uppercase())
}

/// Logo badge text: first three characters of the bank code or name
pub fn default_logo(bank: &str) -> String {
    bank.trim().chars().take(3).collect::<String>().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_number_strips_separators() {
        assert_eq!(normalize_account_number("0071-000 123456").unwrap(), "0071000123456");
        assert!(normalize_account_number("12345").is_err());
        assert!(normalize_account_number("12345a789").is_err());
    }

    #[test]
    fn holder_accepts_vietnamese_letters() {
        assert_eq!(normalize_account_holder("nguyễn  văn an").unwrap(), "NGUYỄN VĂN AN");
        assert!(normalize_account_holder("An 2").is_err());
    }
}
