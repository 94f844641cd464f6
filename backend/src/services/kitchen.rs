//! Kitchen display service
//!
//! One ticket per order. Urgency is derived from the ticket age on every
//! read, so the display never stores a stale priority.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::models::{
    display_order, round_one_decimal, KitchenStatus, OrderEvent, OrderStatus, TicketTiming,
};
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::live::OrderHub;
use crate::services::order::{items_by_order, OrderItem};

/// Kitchen service
#[derive(Clone)]
pub struct KitchenService {
    db: PgPool,
    hub: OrderHub,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TicketRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub table_number: i32,
    #[sqlx(try_from = "String")]
    pub status: KitchenStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub ready_at: Option<DateTime<Utc>>,
}

/// Ticket as shown on the kitchen display
#[derive(Debug, Clone, Serialize)]
pub struct KitchenTicket {
    #[serde(flatten)]
    pub ticket: TicketRow,
    #[serde(flatten)]
    pub timing: TicketTiming,
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Default, Deserialize)]
pub struct KitchenFilter {
    pub status: Option<KitchenStatus>,
}

#[derive(Debug, Serialize)]
pub struct KitchenStats {
    pub waiting: i64,
    pub preparing: i64,
    pub ready: i64,
    pub total_active: i64,
    pub avg_prep_time_minutes: f64,
}

#[derive(Debug, FromRow)]
struct LockedTicket {
    id: Uuid,
    order_id: Uuid,
    table_number: i32,
    #[sqlx(try_from = "String")]
    status: KitchenStatus,
    #[sqlx(try_from = "String")]
    order_status: OrderStatus,
}

const TICKET_SELECT: &str = r#"
    SELECT k.id, k.order_id, o.table_number, k.status, k.notes,
           k.created_at, k.updated_at, k.started_at, k.ready_at
    FROM kitchen_tickets k
    JOIN orders o ON o.id = k.order_id
"#;

impl KitchenService {
    /// Create a new KitchenService instance
    pub fn new(db: PgPool, hub: OrderHub) -> Self {
        Self { db, hub }
    }

    /// Tickets for the display, most urgent first
    pub async fn list(&self, filter: &KitchenFilter) -> AppResult<Vec<KitchenTicket>> {
        let rows = match filter.status {
            Some(status) => {
                sqlx::query_as::<_, TicketRow>(&format!("{} WHERE k.status = $1", TICKET_SELECT))
                    .bind(status.as_str())
                    .fetch_all(&self.db)
                    .await?
            }
            None => {
                sqlx::query_as::<_, TicketRow>(&format!(
                    "{} WHERE k.status NOT IN ('COMPLETED', 'CANCELLED')",
                    TICKET_SELECT
                ))
                .fetch_all(&self.db)
                .await?
            }
        };

        let mut tickets = self.decorate(rows).await?;
        tickets.sort_by(|a, b| display_order(&a.timing, &b.timing));
        Ok(tickets)
    }

    /// Get a ticket by ID
    pub async fn get(&self, id: Uuid) -> AppResult<KitchenTicket> {
        let row = sqlx::query_as::<_, TicketRow>(&format!("{} WHERE k.id = $1", TICKET_SELECT))
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(ticket_not_found)?;

        self.decorate(vec![row])
            .await?
            .pop()
            .ok_or_else(ticket_not_found)
    }

    /// Move a ticket and write the matching status back to its order
    pub async fn update_status(&self, id: Uuid, next: KitchenStatus) -> AppResult<KitchenTicket> {
        let mut tx = self.db.begin().await?;

        let ticket = sqlx::query_as::<_, LockedTicket>(
            r#"
            SELECT k.id, k.order_id, o.table_number, k.status, o.status AS order_status
            FROM kitchen_tickets k
            JOIN orders o ON o.id = k.order_id
            WHERE k.id = $1
            FOR UPDATE OF k, o
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(ticket_not_found)?;

        if !ticket.status.can_transition_to(next) {
            return Err(AppError::transition(ticket.status, next));
        }

        write_ticket_status(&mut *tx, ticket.id, next).await?;

        let order_status = next.order_status_after(ticket.order_status);
        if let Some(status) = order_status {
            sqlx::query("UPDATE orders SET status = $1, updated_at = NOW() WHERE id = $2")
                .bind(status.as_str())
                .bind(ticket.order_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        tracing::info!(
            ticket_id = %ticket.id,
            order_id = %ticket.order_id,
            table_number = ticket.table_number,
            from = %ticket.status,
            to = %next,
            "Kitchen ticket moved"
        );

        self.hub.publish(OrderEvent::KitchenStatusChanged {
            ticket_id: ticket.id,
            order_id: ticket.order_id,
            status: next,
        });
        if let Some(status) = order_status {
            self.hub.publish(OrderEvent::OrderStatusChanged {
                order_id: ticket.order_id,
                table_number: ticket.table_number,
                status,
            });
        }

        self.get(id).await
    }

    /// Counters for the kitchen header
    pub async fn stats(&self) -> AppResult<KitchenStats> {
        let (waiting, preparing, ready): (i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COUNT(*) FILTER (WHERE status = 'WAITING'),
                COUNT(*) FILTER (WHERE status = 'PREPARING'),
                COUNT(*) FILTER (WHERE status = 'READY')
            FROM kitchen_tickets
            "#,
        )
        .fetch_one(&self.db)
        .await?;

        let avg_minutes: Option<f64> = sqlx::query_scalar(
            r#"
            SELECT AVG(EXTRACT(EPOCH FROM (ready_at - COALESCE(started_at, created_at))) / 60)::float8
            FROM kitchen_tickets
            WHERE ready_at IS NOT NULL AND ready_at::date = CURRENT_DATE
            "#,
        )
        .fetch_one(&self.db)
        .await?;

        Ok(KitchenStats {
            waiting,
            preparing,
            ready,
            total_active: waiting + preparing + ready,
            avg_prep_time_minutes: round_one_decimal(avg_minutes.unwrap_or(0.0)),
        })
    }

    async fn decorate(&self, rows: Vec<TicketRow>) -> AppResult<Vec<KitchenTicket>> {
        let order_ids: Vec<Uuid> = rows.iter().map(|t| t.order_id).collect();
        let mut items = items_by_order(&self.db, &order_ids).await?;
        let now = Utc::now();

        Ok(rows
            .into_iter()
            .map(|ticket| KitchenTicket {
                timing: TicketTiming::at(ticket.created_at, now),
                items: items.remove(&ticket.order_id).unwrap_or_default(),
                ticket,
            })
            .collect())
    }
}

/// Bring an order's ticket in line with an order-side change.
///
/// Closing statuses apply to any open ticket; other moves follow the
/// kitchen machine and are skipped when it would not allow them.
pub async fn sync_ticket(conn: &mut PgConnection, order_id: Uuid, next: KitchenStatus) -> AppResult<()> {
    let current = sqlx::query_as::<_, (Uuid, String)>(
        "SELECT id, status FROM kitchen_tickets WHERE order_id = $1 FOR UPDATE",
    )
    .bind(order_id)
    .fetch_optional(&mut *conn)
    .await?;

    let Some((ticket_id, status)) = current else {
        return Ok(());
    };
    let status: KitchenStatus = status
        .parse()
        .map_err(|e| AppError::Internal(format!("Corrupt kitchen ticket {}: {}", ticket_id, e)))?;

    let closing = matches!(next, KitchenStatus::Completed | KitchenStatus::Cancelled);
    let allowed = if closing {
        status.is_on_display()
    } else {
        status.can_transition_to(next)
    };

    if allowed {
        write_ticket_status(conn, ticket_id, next).await?;
    }
    Ok(())
}

async fn write_ticket_status(conn: &mut PgConnection, ticket_id: Uuid, status: KitchenStatus) -> AppResult<()> {
    sqlx::query(
        r#"
        UPDATE kitchen_tickets
        SET status = $1,
            started_at = CASE WHEN $1 = 'PREPARING' THEN COALESCE(started_at, NOW()) ELSE started_at END,
            ready_at = CASE WHEN $1 = 'READY' THEN COALESCE(ready_at, NOW()) ELSE ready_at END,
            updated_at = NOW()
        WHERE id = $2
        "#,
    )
    .bind(status.as_str())
    .bind(ticket_id)
    .execute(conn)
    .await?;

    Ok(())
}

fn ticket_not_found() -> AppError {
    AppError::not_found("Kitchen ticket", "Không tìm thấy phiếu bếp")
}
