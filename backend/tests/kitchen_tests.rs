//! Kitchen display tests
//!
//! Property-based and unit tests for:
//! - Property 8: Ticket Urgency Thresholds
//! - Property 9: Display Ordering
//! - Property 10: Ticket and Order Status Write-Back

use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;
use shared::{
    display_order, elapsed_minutes, priority_for, urgency_color, KitchenStatus, OrderStatus,
    Priority, TicketTiming, UrgencyColor, CRITICAL_AFTER_MINUTES, URGENT_AFTER_MINUTES,
};

// ============================================================================
// Property Test Strategies
// ============================================================================

fn kitchen_status_strategy() -> impl Strategy<Value = KitchenStatus> {
    prop_oneof![
        Just(KitchenStatus::Waiting),
        Just(KitchenStatus::Preparing),
        Just(KitchenStatus::Ready),
        Just(KitchenStatus::Completed),
        Just(KitchenStatus::Cancelled),
    ]
}

fn order_status_strategy() -> impl Strategy<Value = OrderStatus> {
    prop::sample::select(OrderStatus::ALL.to_vec())
}

fn timing_strategy() -> impl Strategy<Value = TicketTiming> {
    (0i64..120).prop_map(TicketTiming::from_elapsed)
}

// ============================================================================
// Property-Based Tests
// ============================================================================

proptest! {
    /// Property 8: Ticket Urgency Thresholds
    #[test]
    fn test_priority_threshold(elapsed in 0i64..240) {
        let expected = if elapsed >= URGENT_AFTER_MINUTES { Priority::Urgent } else { Priority::Normal };
        prop_assert_eq!(priority_for(elapsed), expected);
    }

    /// Property 8: Ticket Urgency Thresholds
    /// Red from 15 minutes, orange from 10, otherwise normal.
    #[test]
    fn test_color_threshold(elapsed in 0i64..240) {
        let color = urgency_color(elapsed, priority_for(elapsed));
        let expected = if elapsed >= CRITICAL_AFTER_MINUTES {
            UrgencyColor::Red
        } else if elapsed >= URGENT_AFTER_MINUTES {
            UrgencyColor::Orange
        } else {
            UrgencyColor::Normal
        };
        prop_assert_eq!(color, expected);
    }

    /// Property 8: Ticket Urgency Thresholds
    /// Elapsed minutes never go negative, even with clock skew.
    #[test]
    fn test_elapsed_never_negative(offset_secs in -3_600i64..36_000) {
        let created = Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap();
        let now = created + Duration::seconds(offset_secs);
        let elapsed = elapsed_minutes(created, now);
        prop_assert!(elapsed >= 0);
        prop_assert_eq!(elapsed, (offset_secs / 60).max(0));
    }

    /// Property 9: Display Ordering
    /// After sorting, no urgent ticket follows a normal one and elapsed
    /// time is non-increasing within each priority.
    #[test]
    fn test_display_order_sorted(mut timings in prop::collection::vec(timing_strategy(), 0..30)) {
        timings.sort_by(display_order);
        for pair in timings.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            prop_assert!(a.priority >= b.priority);
            if a.priority == b.priority {
                prop_assert!(a.elapsed_minutes >= b.elapsed_minutes);
            }
        }
    }

    /// Property 10: Ticket and Order Status Write-Back
    /// A write-back never reopens or closes an order.
    #[test]
    fn test_write_back_keeps_order_open(
        ticket in kitchen_status_strategy(),
        order in order_status_strategy(),
    ) {
        if let Some(next) = ticket.order_status_after(order) {
            prop_assert!(order.is_cancellable());
            prop_assert!(next.is_active());
            prop_assert_ne!(next, order);
        }
    }

    /// Property 10: Ticket and Order Status Write-Back
    /// Closed tickets accept no further moves.
    #[test]
    fn test_closed_tickets_terminal(
        from in kitchen_status_strategy(),
        to in kitchen_status_strategy(),
    ) {
        if matches!(from, KitchenStatus::Completed | KitchenStatus::Cancelled) {
            prop_assert!(!from.can_transition_to(to));
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// WAITING → PREPARING → READY → COMPLETED
    #[test]
    fn test_ticket_path() {
        assert!(KitchenStatus::Waiting.can_transition_to(KitchenStatus::Preparing));
        assert!(KitchenStatus::Preparing.can_transition_to(KitchenStatus::Ready));
        assert!(KitchenStatus::Ready.can_transition_to(KitchenStatus::Completed));
        assert!(!KitchenStatus::Ready.can_transition_to(KitchenStatus::Waiting));
    }

    /// Only an order cancellation cancels a ticket
    #[test]
    fn test_kitchen_cannot_cancel() {
        for from in [KitchenStatus::Waiting, KitchenStatus::Preparing, KitchenStatus::Ready] {
            assert!(!from.can_transition_to(KitchenStatus::Cancelled));
        }
    }

    /// Status bodies from the display may be lowercase
    #[test]
    fn test_status_body_case() {
        let status: KitchenStatus = serde_json::from_str("\"preparing\"").unwrap();
        assert_eq!(status, KitchenStatus::Preparing);
    }

    /// Starting a ticket moves a new order to PREPARING
    #[test]
    fn test_start_writes_preparing() {
        assert_eq!(
            KitchenStatus::Preparing.order_status_after(OrderStatus::Pending),
            Some(OrderStatus::Preparing)
        );
        assert_eq!(
            KitchenStatus::Preparing.order_status_after(OrderStatus::Confirmed),
            Some(OrderStatus::Preparing)
        );
        assert_eq!(KitchenStatus::Preparing.order_status_after(OrderStatus::Preparing), None);
    }

    /// Completing a ticket marks the order READY for the cashier
    #[test]
    fn test_ready_writes_ready() {
        assert_eq!(
            KitchenStatus::Ready.order_status_after(OrderStatus::Preparing),
            Some(OrderStatus::Ready)
        );
        assert_eq!(KitchenStatus::Ready.order_status_after(OrderStatus::Cancelled), None);
    }

    /// Boundary minutes
    #[test]
    fn test_boundaries() {
        assert_eq!(TicketTiming::from_elapsed(9).priority, Priority::Normal);
        assert_eq!(TicketTiming::from_elapsed(10).color, UrgencyColor::Orange);
        assert_eq!(TicketTiming::from_elapsed(14).color, UrgencyColor::Orange);
        assert_eq!(TicketTiming::from_elapsed(15).color, UrgencyColor::Red);
    }

    /// Display shows only open tickets
    #[test]
    fn test_on_display() {
        assert!(KitchenStatus::Waiting.is_on_display());
        assert!(KitchenStatus::Ready.is_on_display());
        assert!(!KitchenStatus::Completed.is_on_display());
        assert!(!KitchenStatus::Cancelled.is_on_display());
    }

    /// Urgent first even when a normal ticket has a higher count
    #[test]
    fn test_urgent_sorts_first() {
        let mut tickets = vec![
            TicketTiming::from_elapsed(3),
            TicketTiming::from_elapsed(25),
            TicketTiming::from_elapsed(11),
            TicketTiming::from_elapsed(7),
        ];
        tickets.sort_by(display_order);
        let minutes: Vec<i64> = tickets.iter().map(|t| t.elapsed_minutes).collect();
        assert_eq!(minutes, vec![25, 11, 7, 3]);
    }
}
