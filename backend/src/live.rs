//! Live order hub
//!
//! Fans order events out to every connected staff, kitchen and cashier
//! screen. Services publish after their transaction commits; the WebSocket
//! handler subscribes per connection.
//!
//! ```text
//! OrderService / KitchenService / CashierService
//!       │ OrderEvent
//!       ▼
//! OrderHub (broadcast::Sender<OrderEvent>)
//!       │
//!       ▼
//! /orders/live WebSocket (subscribe → filter → push)
//! ```

use shared::models::OrderEvent;
use tokio::sync::broadcast;

/// Enough to absorb a burst of orders while a slow screen catches up
const BROADCAST_CAPACITY: usize = 256;

#[derive(Clone)]
pub struct OrderHub {
    tx: broadcast::Sender<OrderEvent>,
}

impl OrderHub {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self { tx }
    }

    /// Send to current subscribers. With nobody listening the event is dropped.
    pub fn publish(&self, event: OrderEvent) {
        let receivers = self.tx.send(event).unwrap_or(0);
        tracing::debug!(receivers, "Order event published");
    }

    pub fn subscribe(&self) -> broadcast::Receiver<OrderEvent> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for OrderHub {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::OrderStatus;
    use uuid::Uuid;

    #[test]
    fn subscribers_receive_published_events() {
        tokio_test::block_on(async {
            let hub = OrderHub::new();
            let mut rx = hub.subscribe();
            let order_id = Uuid::new_v4();

            hub.publish(OrderEvent::OrderStatusChanged {
                order_id,
                table_number: 4,
                status: OrderStatus::Ready,
            });

            let event = rx.recv().await.unwrap();
            assert_eq!(event.order_id(), Some(order_id));
        });
    }

    #[test]
    fn publish_without_subscribers_is_silent() {
        let hub = OrderHub::new();
        hub.publish(OrderEvent::Resync);
        assert_eq!(hub.subscriber_count(), 0);
    }
}
