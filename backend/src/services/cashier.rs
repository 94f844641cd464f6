//! Cashier service: bills, payments, refunds and shift figures

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::models::{
    average_amount, check_payable, check_ready_payable, split_bill, ChargeRates, KitchenStatus, OrderEvent,
    OrderStatus, PaymentBlock, PaymentBreakdown, PaymentMethod, PaymentStatus, SplitPayment,
    SHIFT_TOP_ITEMS_LIMIT,
};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::live::OrderHub;
use crate::services::kitchen::sync_ticket;
use crate::services::order::{lock_order, Order, OrderService};
use crate::services::table::release_if_idle;

/// Cashier service
#[derive(Clone)]
pub struct CashierService {
    db: PgPool,
    hub: OrderHub,
    rates: ChargeRates,
}

/// Order with the bill the cashier presents
#[derive(Debug, Serialize)]
pub struct OrderBill {
    #[serde(flatten)]
    pub order: Order,
    pub payment_breakdown: PaymentBreakdown,
}

#[derive(Debug, Deserialize)]
pub struct PaymentInput {
    pub order_id: Uuid,
    #[serde(default)]
    pub method: PaymentMethod,
    pub bank_account_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct PaymentReceipt {
    pub payment_id: Uuid,
    pub order_id: Uuid,
    pub method: PaymentMethod,
    pub amount_paid: Decimal,
    pub breakdown: PaymentBreakdown,
    pub order: Order,
}

#[derive(Debug, Deserialize)]
pub struct SplitInput {
    pub order_id: Uuid,
    pub split_count: u32,
}

#[derive(Debug, Serialize)]
pub struct SplitResult {
    pub order_id: Uuid,
    #[serde(flatten)]
    pub split: SplitPayment,
}

#[derive(Debug, Serialize, FromRow)]
pub struct Transaction {
    pub order_id: Uuid,
    pub table_number: i32,
    pub total_amount: Decimal,
    pub employee_name: Option<String>,
    pub method: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct TransactionSummary {
    pub count: i64,
    pub total_revenue: Decimal,
    pub average: Decimal,
}

#[derive(Debug, Serialize)]
pub struct TodayTransactions {
    pub transactions: Vec<Transaction>,
    pub summary: TransactionSummary,
}

#[derive(Debug, Default, Deserialize)]
pub struct ShiftQuery {
    pub shift_start: Option<DateTime<Utc>>,
    pub shift_end: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, FromRow)]
pub struct MethodTotal {
    pub method: String,
    pub count: i64,
    pub amount: Decimal,
}

#[derive(Debug, Serialize, FromRow)]
pub struct ItemSales {
    pub item_name: String,
    pub quantity_sold: i64,
    pub revenue: Decimal,
}

#[derive(Debug, Serialize, FromRow)]
pub struct HourlyTotal {
    pub hour: i32,
    pub transaction_count: i64,
    pub revenue: Decimal,
}

#[derive(Debug, Serialize)]
pub struct ShiftReport {
    pub shift_start: Option<DateTime<Utc>>,
    pub shift_end: Option<DateTime<Utc>>,
    pub totals: TransactionSummary,
    pub payment_breakdown: Vec<MethodTotal>,
    pub top_items: Vec<ItemSales>,
    pub hourly_breakdown: Vec<HourlyTotal>,
    pub cashier_name: String,
}

#[derive(Debug, Deserialize)]
pub struct RefundInput {
    pub reason: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RefundResult {
    pub order_id: Uuid,
    pub refund_amount: Decimal,
    pub reason: Option<String>,
}

/// Shift window; both ends default to today so far
const SHIFT_WINDOW: &str = r#"
    o.created_at >= COALESCE($1::timestamptz, CURRENT_DATE::timestamptz)
    AND o.created_at <= COALESCE($2::timestamptz, NOW())
"#;

impl CashierService {
    /// Create a new CashierService instance
    pub fn new(db: PgPool, hub: OrderHub, rates: ChargeRates) -> Self {
        Self { db, hub, rates }
    }

    fn orders(&self) -> OrderService {
        OrderService::new(self.db.clone(), self.hub.clone())
    }

    pub async fn pending(&self) -> AppResult<Vec<Order>> {
        self.orders().list_awaiting_payment().await
    }

    /// Order with tax and service charge applied
    pub async fn bill(&self, order_id: Uuid) -> AppResult<OrderBill> {
        let order = self.orders().get(order_id).await?;
        let payment_breakdown = PaymentBreakdown::compute(order.total_amount, &self.rates);
        Ok(OrderBill {
            order,
            payment_breakdown,
        })
    }

    /// Take payment, complete the order and free the table
    pub async fn pay(&self, input: PaymentInput, cashier_id: Uuid) -> AppResult<PaymentReceipt> {
        self.record_payment(input, cashier_id, check_payable).await
    }

    /// Cash settlement from the staff page, allowed once the order is READY
    pub async fn settle_ready(&self, order_id: Uuid, cashier_id: Uuid) -> AppResult<PaymentReceipt> {
        let input = PaymentInput {
            order_id,
            method: PaymentMethod::Cash,
            bank_account_id: None,
        };
        self.record_payment(input, cashier_id, check_ready_payable).await
    }

    async fn record_payment(
        &self,
        input: PaymentInput,
        cashier_id: Uuid,
        payable: fn(OrderStatus) -> Result<(), PaymentBlock>,
    ) -> AppResult<PaymentReceipt> {
        let mut tx = self.db.begin().await?;
        let order = lock_order(&mut *tx, input.order_id).await?;

        payable(order.status).map_err(payment_blocked)?;

        let bank_account_id = match input.method {
            PaymentMethod::BankTransfer => {
                let account_id = input.bank_account_id.ok_or_else(|| {
                    AppError::validation(
                        "bank_account_id",
                        "Bank transfer requires a bank account",
                        "Vui lòng chọn tài khoản ngân hàng nhận chuyển khoản",
                    )
                })?;
                let active = sqlx::query_scalar::<_, bool>(
                    "SELECT is_active FROM bank_accounts WHERE id = $1",
                )
                .bind(account_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| AppError::not_found("Bank account", "Không tìm thấy tài khoản ngân hàng"))?;

                if !active {
                    return Err(AppError::bad_request(
                        "Bank account is locked",
                        "Tài khoản ngân hàng đang bị khóa",
                    ));
                }
                Some(account_id)
            }
            PaymentMethod::Cash => None,
        };

        let breakdown = PaymentBreakdown::compute(order.total_amount, &self.rates);

        let payment_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO payments (order_id, method, bank_account_id, subtotal, tax,
                                  service_charge, total, cashier_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(order.id)
        .bind(input.method.as_str())
        .bind(bank_account_id)
        .bind(breakdown.subtotal)
        .bind(breakdown.tax)
        .bind(breakdown.service_charge)
        .bind(breakdown.total)
        .bind(cashier_id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE orders SET status = $1, payment_status = $2, updated_at = NOW() WHERE id = $3",
        )
        .bind(OrderStatus::Completed.as_str())
        .bind(PaymentStatus::Paid.as_str())
        .bind(order.id)
        .execute(&mut *tx)
        .await?;

        sync_ticket(&mut *tx, order.id, KitchenStatus::Completed).await?;
        release_if_idle(&mut *tx, order.table_id).await?;
        tx.commit().await?;

        tracing::info!(
            order_id = %order.id,
            table_number = order.table_number,
            method = %input.method,
            total = %breakdown.total,
            "Payment recorded"
        );

        self.hub.publish(OrderEvent::OrderPaid {
            order_id: order.id,
            table_number: order.table_number,
            amount: breakdown.total,
        });
        self.hub.publish(OrderEvent::OrderStatusChanged {
            order_id: order.id,
            table_number: order.table_number,
            status: OrderStatus::Completed,
        });

        Ok(PaymentReceipt {
            payment_id,
            order_id: order.id,
            method: input.method,
            amount_paid: breakdown.total,
            breakdown,
            order: self.orders().get(order.id).await?,
        })
    }

    /// Even split of the order total between guests
    pub async fn split(&self, input: SplitInput) -> AppResult<SplitResult> {
        let order = self.orders().get(input.order_id).await?;

        if order.status == OrderStatus::Completed {
            return Err(payment_blocked(PaymentBlock::AlreadyPaid));
        }

        let split = split_bill(order.total_amount, input.split_count).map_err(|msg| {
            AppError::validation("split_count", msg, "Số người chia phải từ 2 đến 50")
        })?;

        Ok(SplitResult {
            order_id: order.id,
            split,
        })
    }

    /// Orders completed today, newest first
    pub async fn transactions_today(&self) -> AppResult<TodayTransactions> {
        let transactions = sqlx::query_as::<_, Transaction>(
            r#"
            SELECT o.id AS order_id, o.table_number, o.total_amount,
                   e.full_name AS employee_name,
                   (SELECT p.method FROM payments p WHERE p.order_id = o.id
                    ORDER BY p.created_at DESC LIMIT 1) AS method,
                   o.created_at
            FROM orders o
            LEFT JOIN employees e ON e.id = o.employee_id
            WHERE o.status = 'COMPLETED' AND o.created_at::date = CURRENT_DATE
            ORDER BY o.created_at DESC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        let count = transactions.len() as i64;
        let total_revenue: Decimal = transactions.iter().map(|t| t.total_amount).sum();

        Ok(TodayTransactions {
            transactions,
            summary: TransactionSummary {
                count,
                total_revenue,
                average: average_amount(total_revenue, count),
            },
        })
    }

    /// Figures for a shift window, today when no window is given
    pub async fn shift_report(&self, query: &ShiftQuery, cashier_id: Uuid, username: &str) -> AppResult<ShiftReport> {
        let (count, revenue): (i64, Option<Decimal>) = sqlx::query_as(&format!(
            "SELECT COUNT(*), SUM(o.total_amount) FROM orders o WHERE o.status = 'COMPLETED' AND {}",
            SHIFT_WINDOW
        ))
        .bind(query.shift_start)
        .bind(query.shift_end)
        .fetch_one(&self.db)
        .await?;
        let revenue = revenue.unwrap_or_default();

        let payment_breakdown = sqlx::query_as::<_, MethodTotal>(&format!(
            r#"
            SELECT p.method, COUNT(*) AS count, COALESCE(SUM(p.total), 0) AS amount
            FROM payments p
            JOIN orders o ON o.id = p.order_id
            WHERE p.refunded_at IS NULL AND {}
            GROUP BY p.method
            ORDER BY p.method
            "#,
            SHIFT_WINDOW
        ))
        .bind(query.shift_start)
        .bind(query.shift_end)
        .fetch_all(&self.db)
        .await?;

        let top_items = sqlx::query_as::<_, ItemSales>(&format!(
            r#"
            SELECT oi.item_name, SUM(oi.quantity)::bigint AS quantity_sold,
                   COALESCE(SUM(oi.subtotal), 0) AS revenue
            FROM order_items oi
            JOIN orders o ON o.id = oi.order_id
            WHERE o.status = 'COMPLETED' AND {}
            GROUP BY oi.item_name
            ORDER BY quantity_sold DESC
            LIMIT $3
            "#,
            SHIFT_WINDOW
        ))
        .bind(query.shift_start)
        .bind(query.shift_end)
        .bind(SHIFT_TOP_ITEMS_LIMIT)
        .fetch_all(&self.db)
        .await?;

        let hourly_breakdown = sqlx::query_as::<_, HourlyTotal>(&format!(
            r#"
            SELECT EXTRACT(HOUR FROM o.created_at)::int AS hour,
                   COUNT(*) AS transaction_count,
                   COALESCE(SUM(o.total_amount), 0) AS revenue
            FROM orders o
            WHERE o.status = 'COMPLETED' AND {}
            GROUP BY 1
            ORDER BY 1
            "#,
            SHIFT_WINDOW
        ))
        .bind(query.shift_start)
        .bind(query.shift_end)
        .fetch_all(&self.db)
        .await?;

        let cashier_name = sqlx::query_scalar::<_, String>(
            "SELECT full_name FROM employees WHERE user_id = $1",
        )
        .bind(cashier_id)
        .fetch_optional(&self.db)
        .await?
        .unwrap_or_else(|| username.to_string());

        Ok(ShiftReport {
            shift_start: query.shift_start,
            shift_end: query.shift_end,
            totals: TransactionSummary {
                count,
                total_revenue: revenue,
                average: average_amount(revenue, count),
            },
            payment_breakdown,
            top_items,
            hourly_breakdown,
            cashier_name,
        })
    }

    /// Refund a completed order
    pub async fn refund(&self, order_id: Uuid, input: RefundInput) -> AppResult<RefundResult> {
        let reason = input
            .reason
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());

        let mut tx = self.db.begin().await?;
        let order = lock_order(&mut *tx, order_id).await?;

        if order.status != OrderStatus::Completed {
            return Err(AppError::bad_request(
                "Can only refund completed orders",
                "Chỉ có thể hoàn tiền đơn hàng đã hoàn thành",
            ));
        }

        sqlx::query(
            r#"
            UPDATE orders
            SET status = $1, payment_status = $2, cancel_reason = $3, updated_at = NOW()
            WHERE id = $4
            "#,
        )
        .bind(OrderStatus::Cancelled.as_str())
        .bind(PaymentStatus::Refunded.as_str())
        .bind(&reason)
        .bind(order.id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE payments SET refunded_at = NOW(), refund_reason = $1 WHERE order_id = $2 AND refunded_at IS NULL",
        )
        .bind(&reason)
        .bind(order.id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(order_id = %order.id, amount = %order.total_amount, "Order refunded");
        self.hub.publish(OrderEvent::OrderStatusChanged {
            order_id: order.id,
            table_number: order.table_number,
            status: OrderStatus::Cancelled,
        });

        Ok(RefundResult {
            order_id: order.id,
            refund_amount: order.total_amount,
            reason,
        })
    }
}

fn payment_blocked(block: PaymentBlock) -> AppError {
    match block {
        PaymentBlock::AlreadyPaid => {
            AppError::bad_request("Order already paid", "Đơn hàng đã được thanh toán")
        }
        PaymentBlock::Cancelled => AppError::bad_request(
            "Cannot pay for cancelled order",
            "Không thể thanh toán đơn hàng đã hủy",
        ),
        PaymentBlock::NotReady => AppError::bad_request(
            "Order is not ready for payment",
            "Đơn hàng chưa sẵn sàng để thanh toán",
        ),
    }
}
