//! WebAssembly module for the restaurant POS pages
//!
//! Provides client-side computation for:
//! - Cart totals on the QR ordering page
//! - Kitchen ticket urgency between live updates
//! - Inventory stock status badges
//! - Bill breakdown and split payments at the cashier
//! - Staff order list filtering

use std::collections::HashMap;
use std::str::FromStr;

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    web_sys::console::debug_1(&JsValue::from_str("restaurant-pos-wasm ready"));
}

fn js_err(context: &str, e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&format!("{}: {}", context, e))
}

fn parse_decimal(value: &str, field: &str) -> Result<Decimal, JsValue> {
    Decimal::from_str(value.trim()).map_err(|e| js_err(field, e))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(|e| js_err("Serialization failed", e))
}

/// Cart total as a decimal string.
///
/// `cart_json` maps menu item ids to quantities, `prices_json` maps ids to
/// price strings. Items without a known price are skipped.
#[wasm_bindgen]
pub fn cart_total(cart_json: &str, prices_json: &str) -> Result<String, JsValue> {
    let cart: Cart = serde_json::from_str(cart_json).map_err(|e| js_err("Invalid cart JSON", e))?;
    let prices: HashMap<Uuid, Decimal> =
        serde_json::from_str(prices_json).map_err(|e| js_err("Invalid prices JSON", e))?;
    Ok(cart.total(|id| prices.get(&id).copied()).to_string())
}

/// Number of dishes in the cart badge
#[wasm_bindgen]
pub fn cart_item_count(cart_json: &str) -> Result<i32, JsValue> {
    let cart: Cart = serde_json::from_str(cart_json).map_err(|e| js_err("Invalid cart JSON", e))?;
    Ok(cart.item_count())
}

/// Urgency of a kitchen ticket created at `created_at_ms` (epoch millis), as JSON
#[wasm_bindgen]
pub fn ticket_urgency(created_at_ms: f64) -> Result<String, JsValue> {
    to_json(&timing_between(created_at_ms, js_sys::Date::now()))
}

fn timing_between(created_at_ms: f64, now_ms: f64) -> TicketTiming {
    match (millis_to_utc(created_at_ms), millis_to_utc(now_ms)) {
        (Some(created), Some(now)) => TicketTiming::at(created, now),
        _ => TicketTiming::from_elapsed(0),
    }
}

fn millis_to_utc(ms: f64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(ms as i64).single()
}

/// Stock badge for an inventory row: "ok", "low" or "out"
#[wasm_bindgen]
pub fn stock_status(stock: &str, min_stock: &str) -> Result<String, JsValue> {
    let stock = parse_decimal(stock, "stock")?;
    let min_stock = parse_decimal(min_stock, "min_stock")?;
    Ok(StockStatus::from_levels(stock, min_stock).to_string())
}

/// Subtotal, tax, service charge and total as JSON
#[wasm_bindgen]
pub fn payment_breakdown(
    subtotal: &str,
    tax_rate: &str,
    service_charge_rate: &str,
) -> Result<String, JsValue> {
    let rates = ChargeRates {
        tax_rate: parse_decimal(tax_rate, "tax_rate")?,
        service_charge_rate: parse_decimal(service_charge_rate, "service_charge_rate")?,
    };
    let subtotal = parse_decimal(subtotal, "subtotal")?;
    to_json(&PaymentBreakdown::compute(subtotal, &rates))
}

/// Even split of a bill, remainder on the last share, as JSON
#[wasm_bindgen]
pub fn split_payment(total: &str, split_count: u32) -> Result<String, JsValue> {
    let total = parse_decimal(total, "total")?;
    let split = split_bill(total, split_count).map_err(JsValue::from_str)?;
    to_json(&split)
}

/// The fields of an order the staff list filters on
#[derive(Debug, Deserialize)]
struct OrderRow {
    status: OrderStatus,
    table_number: i32,
    #[serde(default)]
    customer_name: Option<String>,
}

fn order_matches(row: &OrderRow, view: OrderView, status: Option<OrderStatus>, search: &str) -> bool {
    let status_ok = match status {
        Some(status) => row.status == status,
        None => view.includes(row.status),
    };
    if !status_ok {
        return false;
    }

    let needle = search.trim().to_lowercase();
    needle.is_empty()
        || row.table_number.to_string() == needle
        || row
            .customer_name
            .as_deref()
            .map(|name| name.to_lowercase().contains(&needle))
            .unwrap_or(false)
}

/// Filter the staff order list.
///
/// `view` is "active" or "all"; a non-empty `status` overrides it. `search`
/// matches the table number exactly or the customer name partially. The
/// input orders are returned unchanged, in their original order.
#[wasm_bindgen]
pub fn filter_orders(orders_json: &str, view: &str, status: &str, search: &str) -> Result<String, JsValue> {
    let orders: Vec<serde_json::Value> =
        serde_json::from_str(orders_json).map_err(|e| js_err("Invalid orders JSON", e))?;
    let view = match view.trim().to_ascii_lowercase().as_str() {
        "all" => OrderView::All,
        _ => OrderView::Active,
    };
    let status = match status.trim() {
        "" => None,
        s => Some(OrderStatus::from_str(s).map_err(|e| js_err("Invalid status", e))?),
    };

    let mut kept = Vec::with_capacity(orders.len());
    for order in orders {
        let row: OrderRow =
            serde_json::from_value(order.clone()).map_err(|e| js_err("Invalid order", e))?;
        if order_matches(&row, view, status, search) {
            kept.push(order);
        }
    }
    to_json(&kept)
}

/// Whether a move between two order statuses is allowed
#[wasm_bindgen]
pub fn can_change_order_status(from: &str, to: &str) -> bool {
    match (OrderStatus::from_str(from), OrderStatus::from_str(to)) {
        (Ok(from), Ok(to)) => from.can_transition_to(to),
        _ => false,
    }
}

/// Vietnamese phone check for the staff form
#[wasm_bindgen]
pub fn is_valid_phone(phone: &str) -> bool {
    validate_vn_phone(phone).is_ok()
}

/// Bank account number check for the bank account form
#[wasm_bindgen]
pub fn is_valid_account_number(account_number: &str) -> bool {
    normalize_account_number(account_number).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PHO: &str = "6f1c2f1e-9a3b-4d2a-8c55-0d7b1c3a9e01";
    const TEA: &str = "0b8e4c52-1d7f-4e3a-9b2c-5a6d7e8f9a10";

    #[test]
    fn test_cart_total_skips_unknown_items() {
        let cart = format!(r#"{{"{}": 2, "{}": 1}}"#, PHO, TEA);
        let prices = format!(r#"{{"{}": "45000"}}"#, PHO);
        assert_eq!(cart_total(&cart, &prices).unwrap(), "90000");
        assert_eq!(cart_item_count(&cart).unwrap(), 3);
    }

    #[test]
    fn test_timing_between_marks_old_tickets_urgent() {
        let created = 1_700_000_000_000.0;
        let timing = timing_between(created, created + 12.0 * 60_000.0);
        assert_eq!(timing.elapsed_minutes, 12);
        assert_eq!(timing.priority, Priority::Urgent);
        assert_eq!(timing.color, UrgencyColor::Orange);
    }

    #[test]
    fn test_stock_status_badges() {
        assert_eq!(stock_status("0", "5").unwrap(), "out");
        assert_eq!(stock_status("3", "5").unwrap(), "low");
        assert_eq!(stock_status("5", "5").unwrap(), "ok");
    }

    #[test]
    fn test_order_filter_active_view_hides_closed() {
        let row = |status, table_number, name: &str| OrderRow {
            status,
            table_number,
            customer_name: Some(name.to_string()),
        };
        let done = row(OrderStatus::Completed, 3, "Lan");
        let open = row(OrderStatus::Pending, 5, "Minh");

        assert!(!order_matches(&done, OrderView::Active, None, ""));
        assert!(order_matches(&done, OrderView::All, None, ""));
        assert!(order_matches(&done, OrderView::Active, Some(OrderStatus::Completed), ""));
        assert!(order_matches(&open, OrderView::Active, None, "minh"));
        assert!(order_matches(&open, OrderView::Active, None, "5"));
        assert!(!order_matches(&open, OrderView::Active, None, "55"));
    }

    #[test]
    fn test_status_moves() {
        assert!(can_change_order_status("PENDING", "CONFIRMED"));
        assert!(!can_change_order_status("READY", "CANCELLED"));
        assert!(!can_change_order_status("nonsense", "READY"));
    }
}
