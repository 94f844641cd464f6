//! Live order events pushed to staff, kitchen and cashier screens

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{KitchenStatus, OrderStatus};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OrderEvent {
    OrderCreated {
        order_id: Uuid,
        table_number: i32,
        customer_name: Option<String>,
        total_amount: Decimal,
    },
    OrderStatusChanged {
        order_id: Uuid,
        table_number: i32,
        status: OrderStatus,
    },
    KitchenStatusChanged {
        ticket_id: Uuid,
        order_id: Uuid,
        status: KitchenStatus,
    },
    OrderPaid {
        order_id: Uuid,
        table_number: i32,
        amount: Decimal,
    },
    /// The subscriber missed events and should reload its lists
    Resync,
}

impl OrderEvent {
    pub fn order_id(&self) -> Option<Uuid> {
        match self {
            OrderEvent::OrderCreated { order_id, .. }
            | OrderEvent::OrderStatusChanged { order_id, .. }
            | OrderEvent::KitchenStatusChanged { order_id, .. }
            | OrderEvent::OrderPaid { order_id, .. } => Some(*order_id),
            OrderEvent::Resync => None,
        }
    }

    /// Kitchen screens only care about new orders and ticket moves
    pub fn concerns_kitchen(&self) -> bool {
        matches!(
            self,
            OrderEvent::OrderCreated { .. }
                | OrderEvent::KitchenStatusChanged { .. }
                | OrderEvent::Resync
        ) || matches!(
            self,
            OrderEvent::OrderStatusChanged {
                status: OrderStatus::Cancelled,
                ..
            }
        )
    }
}
