//! Validation utilities for the restaurant POS
//!
//! Includes Vietnam-specific checks for phone numbers.

use rust_decimal::Decimal;

use crate::models::{MAX_TABLE_CAPACITY, MAX_LINE_QUANTITY};

// ============================================================================
// General Validations
// ============================================================================

/// Reject empty or whitespace-only text
pub fn validate_required(value: &str) -> Result<(), &'static str> {
    if value.trim().is_empty() {
        return Err("Field is required");
    }
    Ok(())
}

/// Login names: 3-50 characters of ASCII letters, digits, dot or underscore
pub fn validate_username(username: &str) -> Result<(), &'static str> {
    if username.len() < 3 || username.len() > 50 {
        return Err("Username must be 3-50 characters");
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
    {
        return Err("Username may contain letters, digits, dot and underscore only");
    }
    Ok(())
}

/// Validate password strength
pub fn validate_password(password: &str) -> Result<(), &'static str> {
    if password.chars().count() < 6 {
        return Err("Password must be at least 6 characters");
    }
    Ok(())
}

/// Decimal places stored for money columns
pub const MONEY_SCALE: u32 = 2;
/// Decimal places stored for stock quantities
pub const QUANTITY_SCALE: u32 = 3;

/// Reject values the database would have to round. Trailing zeros do not count.
pub fn validate_scale(value: Decimal, max_scale: u32) -> Result<(), &'static str> {
    if value.normalize().scale() > max_scale {
        return Err("Too many decimal places");
    }
    Ok(())
}

/// Menu and inventory prices
pub fn validate_price(price: Decimal) -> Result<(), &'static str> {
    if price <= Decimal::ZERO {
        return Err("Price must be greater than zero");
    }
    if validate_scale(price, MONEY_SCALE).is_err() {
        return Err("Price may have at most 2 decimal places");
    }
    Ok(())
}

pub fn validate_non_negative(value: Decimal) -> Result<(), &'static str> {
    if value < Decimal::ZERO {
        return Err("Value must not be negative");
    }
    Ok(())
}

pub fn validate_table_number(number: i32) -> Result<(), &'static str> {
    if number < 1 {
        return Err("Table number must be positive");
    }
    Ok(())
}

pub fn validate_table_capacity(capacity: i32) -> Result<(), &'static str> {
    if capacity < 1 || capacity > MAX_TABLE_CAPACITY {
        return Err("Capacity must be between 1 and 50");
    }
    Ok(())
}

/// Order line quantity 1-99
pub fn validate_quantity(quantity: i32) -> Result<(), &'static str> {
    if quantity < 1 || quantity > MAX_LINE_QUANTITY {
        return Err("Quantity must be between 1 and 99");
    }
    Ok(())
}

// ============================================================================
// Vietnam-Specific Validations
// ============================================================================

/// Validate Vietnamese phone number format
/// Accepts: 0901234567, 090 123 4567, +84901234567
pub fn validate_vn_phone(phone: &str) -> Result<(), &'static str> {
    let trimmed = phone.trim();
    let digits: String = trimmed.chars().filter(|c| c.is_ascii_digit()).collect();
    if trimmed
        .chars()
        .any(|c| !(c.is_ascii_digit() || c == ' ' || c == '.' || c == '-' || c == '+'))
    {
        return Err("Invalid Vietnamese phone number format");
    }

    // Domestic: 10 digits starting with 0
    if digits.len() == 10 && digits.starts_with('0') {
        return Ok(());
    }
    // International: +84 followed by 9 digits
    if digits.len() == 11 && digits.starts_with("84") && trimmed.starts_with('+') {
        return Ok(());
    }

    Err("Invalid Vietnamese phone number format")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_formats() {
        assert!(validate_vn_phone("0901234567").is_ok());
        assert!(validate_vn_phone("090 123 4567").is_ok());
        assert!(validate_vn_phone("+84901234567").is_ok());
        assert!(validate_vn_phone("901234567").is_err());
        assert!(validate_vn_phone("09012345ab").is_err());
    }

    #[test]
    fn sub_cent_prices_are_rejected() {
        assert!(validate_price(Decimal::new(25_000, 0)).is_ok());
        assert!(validate_price(Decimal::new(1_050, 2)).is_ok());
        assert!(validate_price(Decimal::new(15_000_000, 3)).is_ok());
        assert_eq!(
            validate_price(Decimal::new(1, 3)),
            Err("Price may have at most 2 decimal places")
        );
        assert!(validate_scale(Decimal::new(1_234, 3), QUANTITY_SCALE).is_ok());
        assert!(validate_scale(Decimal::new(1, 4), QUANTITY_SCALE).is_err());
    }

    #[test]
    fn username_rules() {
        assert!(validate_username("nhanvien01").is_ok());
        assert!(validate_username("ab").is_err());
        assert!(validate_username("nhân viên").is_err());
    }
}
