//! Order service
//!
//! Customer and staff orders, the order status machine and the side effects
//! of each move (table occupancy, kitchen ticket, live events).

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::models::{
    order_total, KitchenStatus, MenuStatus, OrderEvent, OrderLine, OrderStatus, OrderView,
    PaymentStatus, TableStatus,
};
use shared::validation::validate_quantity;
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::live::OrderHub;
use crate::services::kitchen::sync_ticket;
use crate::services::table::{release_if_idle, table_not_found};

/// Order service
#[derive(Clone)]
pub struct OrderService {
    db: PgPool,
    hub: OrderHub,
}

/// Order with its lines
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Order {
    pub id: Uuid,
    pub table_id: Option<Uuid>,
    pub table_number: i32,
    pub customer_name: Option<String>,
    pub employee_id: Option<Uuid>,
    pub employee_name: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: OrderStatus,
    #[sqlx(try_from = "String")]
    pub payment_status: PaymentStatus,
    pub total_amount: Decimal,
    pub notes: Option<String>,
    pub cancel_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[sqlx(skip)]
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct OrderItem {
    pub id: Uuid,
    #[serde(skip)]
    pub order_id: Uuid,
    pub menu_item_id: Option<Uuid>,
    #[sqlx(rename = "item_name")]
    pub name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub subtotal: Decimal,
}

/// Row locked while an order changes state
#[derive(Debug, Clone, FromRow)]
pub struct OrderHead {
    pub id: Uuid,
    pub table_id: Option<Uuid>,
    pub table_number: i32,
    #[sqlx(try_from = "String")]
    pub status: OrderStatus,
    pub total_amount: Decimal,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrderLineInput {
    pub item_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrderInput {
    pub table_number: i32,
    pub customer_name: Option<String>,
    pub items: Vec<OrderLineInput>,
    pub notes: Option<String>,
    /// Token printed in the table's QR code
    pub table_token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub table_id: Option<Uuid>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    #[serde(default)]
    pub view: OrderView,
}

/// Who is placing an order
#[derive(Debug, Clone, Copy)]
pub enum OrderSource {
    /// Guest scanning the table QR code
    Customer { require_token: bool },
    /// Staff member taking the order
    Staff { user_id: Uuid },
}

#[derive(Debug, FromRow)]
struct PricedItem {
    id: Uuid,
    name: String,
    price: Decimal,
    #[sqlx(try_from = "String")]
    status: MenuStatus,
}

#[derive(Debug, FromRow)]
struct TableRow {
    id: Uuid,
    number: i32,
    qr_token: Option<String>,
}

const ORDER_SELECT: &str = r#"
    SELECT o.id, o.table_id, o.table_number, o.customer_name, o.employee_id,
           e.full_name AS employee_name, o.status, o.payment_status, o.total_amount,
           o.notes, o.cancel_reason, o.created_at, o.updated_at
    FROM orders o
    LEFT JOIN employees e ON e.id = o.employee_id
"#;

impl OrderService {
    /// Create a new OrderService instance
    pub fn new(db: PgPool, hub: OrderHub) -> Self {
        Self { db, hub }
    }

    /// Place an order for a table
    ///
    /// Prices are taken from the menu, never from the request. The order,
    /// its lines, the table occupancy and the kitchen ticket are written in
    /// one transaction.
    pub async fn create(&self, input: CreateOrderInput, source: OrderSource) -> AppResult<Order> {
        if input.items.is_empty() {
            return Err(AppError::validation(
                "items",
                "Order must contain at least one item",
                "Vui lòng chọn ít nhất một món",
            ));
        }
        for line in &input.items {
            validate_quantity(line.quantity).map_err(|msg| {
                AppError::validation("quantity", msg, "Số lượng mỗi món phải từ 1 đến 99")
            })?;
        }

        let mut tx = self.db.begin().await?;

        let table = sqlx::query_as::<_, TableRow>(
            "SELECT id, number, qr_token FROM dining_tables WHERE number = $1 FOR UPDATE",
        )
        .bind(input.table_number)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| table_not_found(input.table_number))?;

        if let OrderSource::Customer { require_token: true } = source {
            let matches = matches!(
                (&table.qr_token, &input.table_token),
                (Some(expected), Some(given)) if expected == given
            );
            if !matches {
                tracing::warn!(table_number = table.number, "Order rejected: bad table token");
                return Err(AppError::Unauthorized {
                    message: "Invalid table QR code".to_string(),
                    message_vi: "Mã QR của bàn không hợp lệ, vui lòng quét lại".to_string(),
                });
            }
        }

        let employee_id = match source {
            OrderSource::Staff { user_id } => {
                sqlx::query_scalar::<_, Uuid>("SELECT id FROM employees WHERE user_id = $1")
                    .bind(user_id)
                    .fetch_optional(&mut *tx)
                    .await?
            }
            OrderSource::Customer { .. } => None,
        };

        let ids: Vec<Uuid> = input.items.iter().map(|l| l.item_id).collect();
        let menu: HashMap<Uuid, PricedItem> = sqlx::query_as::<_, PricedItem>(
            "SELECT id, name, price, status FROM menu_items WHERE id = ANY($1)",
        )
        .bind(&ids)
        .fetch_all(&mut *tx)
        .await?
        .into_iter()
        .map(|item| (item.id, item))
        .collect();

        let mut lines = Vec::with_capacity(input.items.len());
        for line in &input.items {
            let item = menu
                .get(&line.item_id)
                .ok_or_else(|| AppError::not_found("Menu item", "Không tìm thấy món ăn"))?;
            if !item.status.is_orderable() {
                return Err(AppError::bad_request(
                    format!("{} is not available", item.name),
                    format!("Món {} hiện đã hết", item.name),
                ));
            }
            lines.push(OrderLine {
                item_id: item.id,
                quantity: line.quantity,
                unit_price: item.price,
            });
        }
        let total = order_total(&lines);

        let customer_name = non_blank(input.customer_name);
        let notes = non_blank(input.notes);

        let order_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO orders (table_id, table_number, customer_name, employee_id,
                                status, payment_status, total_amount, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(table.id)
        .bind(table.number)
        .bind(&customer_name)
        .bind(employee_id)
        .bind(OrderStatus::Pending.as_str())
        .bind(PaymentStatus::Unpaid.as_str())
        .bind(total)
        .bind(&notes)
        .fetch_one(&mut *tx)
        .await?;

        for line in &lines {
            // Every line was looked up above
            let name = menu.get(&line.item_id).map(|m| m.name.as_str()).unwrap_or_default();
            sqlx::query(
                r#"
                INSERT INTO order_items (order_id, menu_item_id, item_name, quantity, unit_price, subtotal)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(order_id)
            .bind(line.item_id)
            .bind(name)
            .bind(line.quantity)
            .bind(line.unit_price)
            .bind(line.subtotal())
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query("UPDATE dining_tables SET status = $1, updated_at = NOW() WHERE id = $2")
            .bind(TableStatus::Occupied.as_str())
            .bind(table.id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("INSERT INTO kitchen_tickets (order_id, status, notes) VALUES ($1, $2, $3)")
            .bind(order_id)
            .bind(KitchenStatus::Waiting.as_str())
            .bind(&notes)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(
            order_id = %order_id,
            table_number = table.number,
            total = %total,
            lines = lines.len(),
            "Order created"
        );

        self.hub.publish(OrderEvent::OrderCreated {
            order_id,
            table_number: table.number,
            customer_name,
            total_amount: total,
        });

        self.get(order_id).await
    }

    /// List orders newest first. An explicit status filter overrides the view.
    pub async fn list(&self, filter: &OrderFilter) -> AppResult<Vec<Order>> {
        let active_only = filter.status.is_none() && filter.view == OrderView::Active;

        let mut orders = sqlx::query_as::<_, Order>(&format!(
            r#"{}
            WHERE ($1::text IS NULL OR o.status = $1)
              AND ($2::uuid IS NULL OR o.table_id = $2)
              AND ($3::date IS NULL OR o.created_at::date >= $3)
              AND ($4::date IS NULL OR o.created_at::date <= $4)
              AND (NOT $5 OR o.status NOT IN ('COMPLETED', 'CANCELLED'))
            ORDER BY o.created_at DESC
            "#,
            ORDER_SELECT
        ))
        .bind(filter.status.map(|s| s.as_str()))
        .bind(filter.table_id)
        .bind(filter.date_from)
        .bind(filter.date_to)
        .bind(active_only)
        .fetch_all(&self.db)
        .await?;

        self.attach_items(&mut orders).await?;
        Ok(orders)
    }

    /// Orders the cashier still has to settle, oldest first
    pub async fn list_awaiting_payment(&self) -> AppResult<Vec<Order>> {
        let mut orders = sqlx::query_as::<_, Order>(&format!(
            r#"{}
            WHERE o.status IN ('READY', 'CONFIRMED') AND o.payment_status = 'UNPAID'
            ORDER BY o.created_at ASC
            "#,
            ORDER_SELECT
        ))
        .fetch_all(&self.db)
        .await?;

        orders.retain(|o| o.status.awaits_payment());
        self.attach_items(&mut orders).await?;
        Ok(orders)
    }

    /// Get an order with its lines
    pub async fn get(&self, id: Uuid) -> AppResult<Order> {
        let order = sqlx::query_as::<_, Order>(&format!("{} WHERE o.id = $1", ORDER_SELECT))
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(order_not_found)?;

        let mut orders = vec![order];
        self.attach_items(&mut orders).await?;
        orders.pop().ok_or_else(order_not_found)
    }

    /// Move an order through the status machine
    pub async fn update_status(&self, id: Uuid, next: OrderStatus) -> AppResult<Order> {
        let mut tx = self.db.begin().await?;
        let order = lock_order(&mut *tx, id).await?;

        if !order.status.can_transition_to(next) {
            return Err(AppError::transition(order.status, next));
        }

        sqlx::query("UPDATE orders SET status = $1, updated_at = NOW() WHERE id = $2")
            .bind(next.as_str())
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let ticket_status = match next {
            OrderStatus::Preparing => Some(KitchenStatus::Preparing),
            OrderStatus::Ready => Some(KitchenStatus::Ready),
            OrderStatus::Completed => Some(KitchenStatus::Completed),
            OrderStatus::Cancelled => Some(KitchenStatus::Cancelled),
            OrderStatus::Pending | OrderStatus::Confirmed => None,
        };
        if let Some(status) = ticket_status {
            sync_ticket(&mut *tx, id, status).await?;
        }

        if next.is_closed() {
            release_if_idle(&mut *tx, order.table_id).await?;
        }

        tx.commit().await?;

        tracing::info!(
            order_id = %id,
            table_number = order.table_number,
            from = %order.status,
            to = %next,
            "Order status changed"
        );
        self.hub.publish(OrderEvent::OrderStatusChanged {
            order_id: id,
            table_number: order.table_number,
            status: next,
        });

        self.get(id).await
    }

    /// Cancel an order that the kitchen has not finished
    pub async fn cancel(&self, id: Uuid, reason: Option<String>) -> AppResult<Order> {
        let mut tx = self.db.begin().await?;
        let order = lock_order(&mut *tx, id).await?;

        if !order.status.is_cancellable() {
            return Err(AppError::bad_request(
                format!("Cannot cancel an order that is {}", order.status),
                "Không thể hủy đơn hàng ở trạng thái hiện tại",
            ));
        }

        sqlx::query(
            "UPDATE orders SET status = $1, cancel_reason = $2, updated_at = NOW() WHERE id = $3",
        )
        .bind(OrderStatus::Cancelled.as_str())
        .bind(non_blank(reason))
        .bind(id)
        .execute(&mut *tx)
        .await?;

        sync_ticket(&mut *tx, id, KitchenStatus::Cancelled).await?;
        release_if_idle(&mut *tx, order.table_id).await?;
        tx.commit().await?;

        tracing::info!(order_id = %id, table_number = order.table_number, "Order cancelled");
        self.hub.publish(OrderEvent::OrderStatusChanged {
            order_id: id,
            table_number: order.table_number,
            status: OrderStatus::Cancelled,
        });

        self.get(id).await
    }

    async fn attach_items(&self, orders: &mut [Order]) -> AppResult<()> {
        let ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
        let mut by_order = items_by_order(&self.db, &ids).await?;
        for order in orders.iter_mut() {
            order.items = by_order.remove(&order.id).unwrap_or_default();
        }
        Ok(())
    }
}

/// Lines of the given orders, grouped by order id
pub async fn items_by_order(db: &PgPool, order_ids: &[Uuid]) -> AppResult<HashMap<Uuid, Vec<OrderItem>>> {
    let mut by_order: HashMap<Uuid, Vec<OrderItem>> = HashMap::new();
    if order_ids.is_empty() {
        return Ok(by_order);
    }

    let items = sqlx::query_as::<_, OrderItem>(
        r#"
        SELECT id, order_id, menu_item_id, item_name, quantity, unit_price, subtotal
        FROM order_items
        WHERE order_id = ANY($1)
        ORDER BY created_at, item_name
        "#,
    )
    .bind(order_ids)
    .fetch_all(db)
    .await?;

    for item in items {
        by_order.entry(item.order_id).or_default().push(item);
    }
    Ok(by_order)
}

/// Lock an order row for the rest of the transaction
pub async fn lock_order(conn: &mut PgConnection, id: Uuid) -> AppResult<OrderHead> {
    sqlx::query_as::<_, OrderHead>(
        "SELECT id, table_id, table_number, status, total_amount FROM orders WHERE id = $1 FOR UPDATE",
    )
    .bind(id)
    .fetch_optional(conn)
    .await?
    .ok_or_else(order_not_found)
}

pub fn order_not_found() -> AppError {
    AppError::not_found("Order", "Không tìm thấy đơn hàng")
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
