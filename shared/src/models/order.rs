//! Order lifecycle, line totals and the customer cart

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

use crate::types::ParseEnumError;
use crate::validation::validate_quantity;

pub const MAX_LINE_QUANTITY: i32 = 99;

/// Order status as seen by staff, kitchen and cashier
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", try_from = "String")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Preparing,
    Ready,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Preparing,
        OrderStatus::Ready,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Confirmed => "CONFIRMED",
            OrderStatus::Preparing => "PREPARING",
            OrderStatus::Ready => "READY",
            OrderStatus::Completed => "COMPLETED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }

    /// Still on the floor: not yet paid out or cancelled
    pub fn is_active(&self) -> bool {
        !self.is_closed()
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    /// Cancellation is only possible before the food is ready
    pub fn is_cancellable(&self) -> bool {
        matches!(
            self,
            OrderStatus::Pending | OrderStatus::Confirmed | OrderStatus::Preparing
        )
    }

    /// Forward moves staff may make through the status endpoint.
    /// COMPLETED -> CANCELLED is reserved for refunds.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        match (self, next) {
            (Pending, Confirmed) | (Pending, Preparing) => true,
            (Confirmed, Preparing) | (Confirmed, Ready) => true,
            (Preparing, Ready) => true,
            (Ready, Completed) => true,
            (from, Cancelled) => from.is_cancellable(),
            _ => false,
        }
    }

    /// Statuses the cashier queue shows as waiting for payment
    pub fn awaits_payment(&self) -> bool {
        matches!(self, OrderStatus::Ready | OrderStatus::Confirmed)
    }
}

impl FromStr for OrderStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Ok(OrderStatus::Pending),
            "CONFIRMED" => Ok(OrderStatus::Confirmed),
            "PREPARING" => Ok(OrderStatus::Preparing),
            "READY" => Ok(OrderStatus::Ready),
            "COMPLETED" => Ok(OrderStatus::Completed),
            "CANCELLED" => Ok(OrderStatus::Cancelled),
            _ => Err(ParseEnumError::new("order status", s)),
        }
    }
}

crate::text_enum!(OrderStatus);

/// Why a payment cannot be taken for an order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentBlock {
    AlreadyPaid,
    Cancelled,
    /// The staff shortcut only settles orders the kitchen has finished
    NotReady,
}

/// Payments are accepted for any order that is not closed
pub fn check_payable(status: OrderStatus) -> Result<(), PaymentBlock> {
    match status {
        OrderStatus::Completed => Err(PaymentBlock::AlreadyPaid),
        OrderStatus::Cancelled => Err(PaymentBlock::Cancelled),
        _ => Ok(()),
    }
}

/// Mark-paid from the staff page: only READY orders
pub fn check_ready_payable(status: OrderStatus) -> Result<(), PaymentBlock> {
    check_payable(status)?;
    if status != OrderStatus::Ready {
        return Err(PaymentBlock::NotReady);
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", try_from = "String")]
pub enum PaymentStatus {
    #[default]
    Unpaid,
    Paid,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Unpaid => "UNPAID",
            PaymentStatus::Paid => "PAID",
            PaymentStatus::Refunded => "REFUNDED",
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "UNPAID" => Ok(PaymentStatus::Unpaid),
            "PAID" => Ok(PaymentStatus::Paid),
            "REFUNDED" => Ok(PaymentStatus::Refunded),
            _ => Err(ParseEnumError::new("payment status", s)),
        }
    }
}

crate::text_enum!(PaymentStatus);

/// Staff page list filter. `Active` is what the page calls "all":
/// everything except completed and cancelled orders.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderView {
    #[default]
    Active,
    All,
}

impl OrderView {
    pub fn includes(&self, status: OrderStatus) -> bool {
        match self {
            OrderView::Active => status.is_active(),
            OrderView::All => true,
        }
    }
}

/// A priced order line
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderLine {
    pub item_id: Uuid,
    pub quantity: i32,
    pub unit_price: Decimal,
}

impl OrderLine {
    pub fn subtotal(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Sum of line subtotals
pub fn order_total(lines: &[OrderLine]) -> Decimal {
    lines.iter().map(OrderLine::subtotal).sum()
}

/// Customer cart on the QR ordering page, keyed by menu item.
/// Every stored quantity is within 1..=99.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "BTreeMap<Uuid, i32>", into = "BTreeMap<Uuid, i32>")]
pub struct Cart {
    quantities: BTreeMap<Uuid, i32>,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("quantity {quantity} for item {item_id} must be between 1 and 99")]
pub struct CartQuantityError {
    pub item_id: Uuid,
    pub quantity: i32,
}

impl TryFrom<BTreeMap<Uuid, i32>> for Cart {
    type Error = CartQuantityError;

    fn try_from(quantities: BTreeMap<Uuid, i32>) -> Result<Self, Self::Error> {
        if let Some((&item_id, &quantity)) = quantities
            .iter()
            .find(|(_, qty)| validate_quantity(**qty).is_err())
        {
            return Err(CartQuantityError { item_id, quantity });
        }
        Ok(Self { quantities })
    }
}

impl From<Cart> for BTreeMap<Uuid, i32> {
    fn from(cart: Cart) -> Self {
        cart.quantities
    }
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, item_id: Uuid) {
        let qty = self.quantities.entry(item_id).or_insert(0);
        *qty = (*qty + 1).min(MAX_LINE_QUANTITY);
    }

    /// Decrement, dropping the line when it reaches zero
    pub fn remove(&mut self, item_id: Uuid) {
        if let Some(qty) = self.quantities.get_mut(&item_id) {
            *qty -= 1;
            if *qty <= 0 {
                self.quantities.remove(&item_id);
            }
        }
    }

    pub fn set_quantity(&mut self, item_id: Uuid, quantity: i32) {
        if quantity <= 0 {
            self.quantities.remove(&item_id);
        } else {
            self.quantities
                .insert(item_id, quantity.min(MAX_LINE_QUANTITY));
        }
    }

    pub fn quantity(&self, item_id: Uuid) -> i32 {
        self.quantities.get(&item_id).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.quantities.is_empty()
    }

    pub fn clear(&mut self) {
        self.quantities.clear();
    }

    /// Number of dishes, counting repeats
    pub fn item_count(&self) -> i32 {
        self.quantities
            .values()
            .fold(0i32, |count, qty| count.saturating_add(*qty))
    }

    /// Price the cart against the menu. Items missing from `price_of` are skipped.
    pub fn lines<F>(&self, price_of: F) -> Vec<OrderLine>
    where
        F: Fn(Uuid) -> Option<Decimal>,
    {
        self.quantities
            .iter()
            .filter_map(|(&item_id, &quantity)| {
                price_of(item_id).map(|unit_price| OrderLine {
                    item_id,
                    quantity,
                    unit_price,
                })
            })
            .collect()
    }

    pub fn total<F>(&self, price_of: F) -> Decimal
    where
        F: Fn(Uuid) -> Option<Decimal>,
    {
        order_total(&self.lines(price_of))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_only_before_ready() {
        assert!(OrderStatus::Preparing.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Ready.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Completed.can_transition_to(OrderStatus::Cancelled));
    }

    #[test]
    fn cart_remove_drops_line_at_zero() {
        let id = Uuid::new_v4();
        let mut cart = Cart::new();
        cart.add(id);
        cart.add(id);
        cart.remove(id);
        assert_eq!(cart.quantity(id), 1);
        cart.remove(id);
        assert!(cart.is_empty());
    }

    #[test]
    fn cart_json_rejects_out_of_range_quantities() {
        let id = Uuid::new_v4();
        let negative = format!(r#"{{"{}": -3}}"#, id);
        assert!(serde_json::from_str::<Cart>(&negative).is_err());
        let zero = format!(r#"{{"{}": 0}}"#, id);
        assert!(serde_json::from_str::<Cart>(&zero).is_err());

        let ok = format!(r#"{{"{}": 2}}"#, id);
        let cart: Cart = serde_json::from_str(&ok).unwrap();
        assert_eq!(cart.item_count(), 2);
    }

    #[test]
    fn only_ready_orders_can_be_marked_paid() {
        assert!(check_ready_payable(OrderStatus::Ready).is_ok());
        assert_eq!(check_ready_payable(OrderStatus::Pending), Err(PaymentBlock::NotReady));
        assert_eq!(check_ready_payable(OrderStatus::Preparing), Err(PaymentBlock::NotReady));
        assert_eq!(check_ready_payable(OrderStatus::Completed), Err(PaymentBlock::AlreadyPaid));
    }
}
