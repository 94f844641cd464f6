//! Kitchen tickets: status, urgency and display order

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;

use super::OrderStatus;
use crate::types::ParseEnumError;

/// Minutes after which a ticket becomes urgent
pub const URGENT_AFTER_MINUTES: i64 = 10;
/// Minutes after which a ticket turns red on the display
pub const CRITICAL_AFTER_MINUTES: i64 = 15;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", try_from = "String")]
pub enum KitchenStatus {
    Waiting,
    Preparing,
    Ready,
    Completed,
    Cancelled,
}

impl KitchenStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            KitchenStatus::Waiting => "WAITING",
            KitchenStatus::Preparing => "PREPARING",
            KitchenStatus::Ready => "READY",
            KitchenStatus::Completed => "COMPLETED",
            KitchenStatus::Cancelled => "CANCELLED",
        }
    }

    /// Shown on the display when no status filter is given
    pub fn is_on_display(&self) -> bool {
        matches!(
            self,
            KitchenStatus::Waiting | KitchenStatus::Preparing | KitchenStatus::Ready
        )
    }

    /// Moves the kitchen may make itself. CANCELLED only follows an order
    /// cancellation, never a kitchen action.
    pub fn can_transition_to(&self, next: KitchenStatus) -> bool {
        use KitchenStatus::*;
        matches!(
            (self, next),
            (Waiting, Preparing) | (Waiting, Ready) | (Preparing, Ready) | (Ready, Completed)
        )
    }

    /// Order status to write back when a ticket moves, given the order's
    /// current status. `None` leaves the order untouched.
    pub fn order_status_after(&self, current: OrderStatus) -> Option<OrderStatus> {
        match self {
            KitchenStatus::Preparing
                if matches!(current, OrderStatus::Pending | OrderStatus::Confirmed) =>
            {
                Some(OrderStatus::Preparing)
            }
            KitchenStatus::Ready if current.is_cancellable() => Some(OrderStatus::Ready),
            _ => None,
        }
    }
}

impl FromStr for KitchenStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "WAITING" => Ok(KitchenStatus::Waiting),
            "PREPARING" => Ok(KitchenStatus::Preparing),
            "READY" => Ok(KitchenStatus::Ready),
            "COMPLETED" => Ok(KitchenStatus::Completed),
            "CANCELLED" => Ok(KitchenStatus::Cancelled),
            _ => Err(ParseEnumError::new("kitchen status", s)),
        }
    }
}

crate::text_enum!(KitchenStatus);

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Normal,
    Urgent,
}

/// Card color on the kitchen display
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UrgencyColor {
    Normal,
    Orange,
    Red,
}

/// Whole minutes since the ticket was created, never negative
pub fn elapsed_minutes(created_at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - created_at).num_minutes().max(0)
}

pub fn priority_for(elapsed_minutes: i64) -> Priority {
    if elapsed_minutes >= URGENT_AFTER_MINUTES {
        Priority::Urgent
    } else {
        Priority::Normal
    }
}

pub fn urgency_color(elapsed_minutes: i64, priority: Priority) -> UrgencyColor {
    if elapsed_minutes >= CRITICAL_AFTER_MINUTES {
        UrgencyColor::Red
    } else if priority == Priority::Urgent || elapsed_minutes >= URGENT_AFTER_MINUTES {
        UrgencyColor::Orange
    } else {
        UrgencyColor::Normal
    }
}

/// Timing snapshot computed for each ticket on read
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TicketTiming {
    pub elapsed_minutes: i64,
    pub priority: Priority,
    pub color: UrgencyColor,
}

impl TicketTiming {
    pub fn at(created_at: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        Self::from_elapsed(elapsed_minutes(created_at, now))
    }

    pub fn from_elapsed(elapsed_minutes: i64) -> Self {
        let priority = priority_for(elapsed_minutes);
        Self {
            elapsed_minutes,
            priority,
            color: urgency_color(elapsed_minutes, priority),
        }
    }
}

/// Urgent tickets first, then the longest waiting
pub fn display_order(a: &TicketTiming, b: &TicketTiming) -> Ordering {
    b.priority
        .cmp(&a.priority)
        .then_with(|| b.elapsed_minutes.cmp(&a.elapsed_minutes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urgency_thresholds() {
        assert_eq!(TicketTiming::from_elapsed(9).color, UrgencyColor::Normal);
        assert_eq!(TicketTiming::from_elapsed(10).priority, Priority::Urgent);
        assert_eq!(TicketTiming::from_elapsed(10).color, UrgencyColor::Orange);
        assert_eq!(TicketTiming::from_elapsed(15).color, UrgencyColor::Red);
    }

    #[test]
    fn ready_ticket_moves_order_to_ready() {
        assert_eq!(
            KitchenStatus::Ready.order_status_after(OrderStatus::Preparing),
            Some(OrderStatus::Ready)
        );
        assert_eq!(
            KitchenStatus::Preparing.order_status_after(OrderStatus::Ready),
            None
        );
    }

    #[test]
    fn kitchen_cannot_cancel_tickets() {
        for from in [KitchenStatus::Waiting, KitchenStatus::Preparing, KitchenStatus::Ready] {
            assert!(!from.can_transition_to(KitchenStatus::Cancelled));
        }
    }

    #[test]
    fn status_deserializes_in_any_case() {
        let status: KitchenStatus = serde_json::from_str("\"waiting\"").unwrap();
        assert_eq!(status, KitchenStatus::Waiting);
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"WAITING\"");
        assert!(serde_json::from_str::<KitchenStatus>("\"served\"").is_err());
    }
}
