//! Sales dashboard queries and report export

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::models::{
    average_amount, revenue_share, RevenuePeriod, DEFAULT_REVENUE_POINTS, ORDER_CHART_DAYS,
    POPULAR_ITEMS_LIMIT,
};
use shared::types::DateRange;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Longest revenue chart the API will build
const MAX_REVENUE_POINTS: i64 = 366;

/// Dashboard service
#[derive(Clone)]
pub struct DashboardService {
    db: PgPool,
}

/// Optional inclusive date bounds on order creation
#[derive(Debug, Default, Clone, Deserialize)]
pub struct DashboardQuery {
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub format: Option<String>,
}

impl DashboardQuery {
    pub fn wants_csv(&self) -> bool {
        self.format.as_deref().is_some_and(|f| f.eq_ignore_ascii_case("csv"))
    }

    fn check_range(&self) -> AppResult<()> {
        if let (Some(from), Some(to)) = (self.date_from, self.date_to) {
            DateRange::new(from, to).map_err(|msg| {
                AppError::validation("date_from", msg, "Ngày bắt đầu phải trước ngày kết thúc")
            })?;
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct RevenueQuery {
    pub period: Option<String>,
    pub limit: Option<i64>,
    pub format: Option<String>,
}

#[derive(Debug, Serialize, FromRow)]
pub struct PopularItem {
    pub menu_item_id: Option<Uuid>,
    pub item_name: String,
    pub image_url: Option<String>,
    pub order_count: i64,
    pub total_quantity: i64,
    pub revenue: Decimal,
}

#[derive(Debug, Default, Serialize, FromRow)]
pub struct StatusBreakdown {
    pub pending: i64,
    pub confirmed: i64,
    pub preparing: i64,
    pub ready: i64,
    pub completed: i64,
    pub cancelled: i64,
}

#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub total_revenue: Decimal,
    pub total_orders: i64,
    pub avg_order_value: Decimal,
    pub total_customers: i64,
    pub popular_items: Vec<PopularItem>,
    pub status_breakdown: StatusBreakdown,
}

#[derive(Debug, Serialize, FromRow)]
pub struct RevenuePoint {
    pub period_start: NaiveDate,
    pub order_count: i64,
    pub revenue: Decimal,
}

#[derive(Debug, Serialize)]
pub struct RevenueReport {
    pub period: RevenuePeriod,
    pub points: Vec<RevenuePoint>,
}

#[derive(Debug, Serialize, FromRow)]
pub struct OrderChartPoint {
    pub day: NaiveDate,
    pub total_orders: i64,
    pub completed: i64,
    pub cancelled: i64,
    pub revenue: Decimal,
}

#[derive(Debug, FromRow)]
struct CategoryRow {
    category_name: String,
    order_count: i64,
    items_sold: i64,
    revenue: Decimal,
}

#[derive(Debug, Serialize)]
pub struct CategoryStat {
    pub category_name: String,
    pub order_count: i64,
    pub items_sold: i64,
    pub revenue: Decimal,
    pub revenue_percentage: Decimal,
}

#[derive(Debug, Serialize)]
pub struct TodaySummary {
    pub today_revenue: Decimal,
    pub today_orders: i64,
    pub active_orders: i64,
    pub occupied_tables: i64,
    pub new_customers: i64,
}

#[derive(Debug, Serialize, FromRow)]
pub struct HourlyPerformance {
    pub hour: i32,
    pub order_count: i64,
    pub revenue: Decimal,
}

const DATE_FILTER: &str =
    "($1::date IS NULL OR o.created_at::date >= $1) AND ($2::date IS NULL OR o.created_at::date <= $2)";

impl DashboardService {
    /// Create a new DashboardService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Headline figures for a date range (all time when unbounded)
    pub async fn stats(&self, query: &DashboardQuery) -> AppResult<DashboardStats> {
        query.check_range()?;

        let (total_revenue, completed, total_orders, total_customers): (Decimal, i64, i64, i64) =
            sqlx::query_as(&format!(
                r#"
                SELECT
                    COALESCE(SUM(o.total_amount) FILTER (WHERE o.status = 'COMPLETED'), 0),
                    COUNT(*) FILTER (WHERE o.status = 'COMPLETED'),
                    COUNT(*) FILTER (WHERE o.status <> 'CANCELLED'),
                    COUNT(DISTINCT o.table_id) FILTER (WHERE o.status <> 'CANCELLED')
                FROM orders o
                WHERE {}
                "#,
                DATE_FILTER
            ))
            .bind(query.date_from)
            .bind(query.date_to)
            .fetch_one(&self.db)
            .await?;

        let popular_items = sqlx::query_as::<_, PopularItem>(&format!(
            r#"
            SELECT oi.menu_item_id, oi.item_name, m.image_url,
                   COUNT(oi.id) AS order_count,
                   SUM(oi.quantity)::bigint AS total_quantity,
                   SUM(oi.subtotal) AS revenue
            FROM order_items oi
            JOIN orders o ON o.id = oi.order_id
            LEFT JOIN menu_items m ON m.id = oi.menu_item_id
            WHERE o.status = 'COMPLETED' AND {}
            GROUP BY oi.menu_item_id, oi.item_name, m.image_url
            ORDER BY order_count DESC, revenue DESC
            LIMIT $3
            "#,
            DATE_FILTER
        ))
        .bind(query.date_from)
        .bind(query.date_to)
        .bind(POPULAR_ITEMS_LIMIT)
        .fetch_all(&self.db)
        .await?;

        let status_breakdown = sqlx::query_as::<_, StatusBreakdown>(&format!(
            r#"
            SELECT
                COUNT(*) FILTER (WHERE o.status = 'PENDING') AS pending,
                COUNT(*) FILTER (WHERE o.status = 'CONFIRMED') AS confirmed,
                COUNT(*) FILTER (WHERE o.status = 'PREPARING') AS preparing,
                COUNT(*) FILTER (WHERE o.status = 'READY') AS ready,
                COUNT(*) FILTER (WHERE o.status = 'COMPLETED') AS completed,
                COUNT(*) FILTER (WHERE o.status = 'CANCELLED') AS cancelled
            FROM orders o
            WHERE {}
            "#,
            DATE_FILTER
        ))
        .bind(query.date_from)
        .bind(query.date_to)
        .fetch_one(&self.db)
        .await?;

        Ok(DashboardStats {
            total_revenue,
            total_orders,
            avg_order_value: average_amount(total_revenue, completed),
            total_customers,
            popular_items,
            status_breakdown,
        })
    }

    /// Completed revenue bucketed by day, week or month, newest bucket first
    pub async fn revenue(&self, period: RevenuePeriod, limit: Option<i64>) -> AppResult<RevenueReport> {
        let limit = limit.unwrap_or(DEFAULT_REVENUE_POINTS).clamp(1, MAX_REVENUE_POINTS);
        let unit = period.trunc_unit();

        let points = sqlx::query_as::<_, RevenuePoint>(&format!(
            r#"
            SELECT date_trunc('{unit}', created_at)::date AS period_start,
                   COUNT(*) AS order_count,
                   COALESCE(SUM(total_amount), 0) AS revenue
            FROM orders
            WHERE status = 'COMPLETED'
              AND created_at >= CURRENT_DATE - ($1::int * INTERVAL '1 {unit}')
            GROUP BY period_start
            ORDER BY period_start DESC
            LIMIT $2
            "#
        ))
        .bind(limit as i32)
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        Ok(RevenueReport { period, points })
    }

    /// Daily order counts for the chart on the overview page
    pub async fn order_chart(&self) -> AppResult<Vec<OrderChartPoint>> {
        let points = sqlx::query_as::<_, OrderChartPoint>(
            r#"
            SELECT created_at::date AS day,
                   COUNT(*) AS total_orders,
                   COUNT(*) FILTER (WHERE status = 'COMPLETED') AS completed,
                   COUNT(*) FILTER (WHERE status = 'CANCELLED') AS cancelled,
                   COALESCE(SUM(total_amount), 0) AS revenue
            FROM orders
            WHERE created_at >= CURRENT_DATE - ($1::int * INTERVAL '1 day')
            GROUP BY day
            ORDER BY day ASC
            "#,
        )
        .bind(ORDER_CHART_DAYS as i32)
        .fetch_all(&self.db)
        .await?;

        Ok(points)
    }

    /// Revenue per menu category with its share of completed sales
    pub async fn category_stats(&self, query: &DashboardQuery) -> AppResult<Vec<CategoryStat>> {
        query.check_range()?;

        let rows = sqlx::query_as::<_, CategoryRow>(&format!(
            r#"
            SELECT COALESCE(c.name, 'Khác') AS category_name,
                   COUNT(DISTINCT oi.order_id) AS order_count,
                   SUM(oi.quantity)::bigint AS items_sold,
                   SUM(oi.subtotal) AS revenue
            FROM order_items oi
            JOIN orders o ON o.id = oi.order_id
            LEFT JOIN menu_items m ON m.id = oi.menu_item_id
            LEFT JOIN categories c ON c.id = m.category_id
            WHERE o.status = 'COMPLETED' AND {}
            GROUP BY COALESCE(c.name, 'Khác')
            ORDER BY revenue DESC
            "#,
            DATE_FILTER
        ))
        .bind(query.date_from)
        .bind(query.date_to)
        .fetch_all(&self.db)
        .await?;

        let whole: Decimal = sqlx::query_scalar(&format!(
            "SELECT COALESCE(SUM(o.total_amount), 0) FROM orders o WHERE o.status = 'COMPLETED' AND {}",
            DATE_FILTER
        ))
        .bind(query.date_from)
        .bind(query.date_to)
        .fetch_one(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| CategoryStat {
                revenue_percentage: revenue_share(row.revenue, whole),
                category_name: row.category_name,
                order_count: row.order_count,
                items_sold: row.items_sold,
                revenue: row.revenue,
            })
            .collect())
    }

    pub async fn today(&self) -> AppResult<TodaySummary> {
        let (today_revenue, today_orders, new_customers): (Decimal, i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COALESCE(SUM(total_amount) FILTER (WHERE status = 'COMPLETED'), 0),
                COUNT(*) FILTER (WHERE status <> 'CANCELLED'),
                COUNT(DISTINCT table_id)
            FROM orders
            WHERE created_at::date = CURRENT_DATE
            "#,
        )
        .fetch_one(&self.db)
        .await?;

        let active_orders: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM orders WHERE status IN ('PENDING', 'CONFIRMED', 'PREPARING', 'READY')",
        )
        .fetch_one(&self.db)
        .await?;

        let occupied_tables: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM dining_tables WHERE status = 'OCCUPIED'")
                .fetch_one(&self.db)
                .await?;

        Ok(TodaySummary {
            today_revenue,
            today_orders,
            active_orders,
            occupied_tables,
            new_customers,
        })
    }

    /// Completed orders per hour of the current day
    pub async fn hourly(&self) -> AppResult<Vec<HourlyPerformance>> {
        let hours = sqlx::query_as::<_, HourlyPerformance>(
            r#"
            SELECT EXTRACT(HOUR FROM created_at)::int AS hour,
                   COUNT(*) AS order_count,
                   COALESCE(SUM(total_amount), 0) AS revenue
            FROM orders
            WHERE created_at::date = CURRENT_DATE AND status = 'COMPLETED'
            GROUP BY hour
            ORDER BY hour ASC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(hours)
    }

    /// Export report rows as CSV
    pub fn export_to_csv<T: Serialize>(data: &[T]) -> AppResult<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        for record in data {
            wtr.serialize(record)
                .map_err(|e| AppError::Internal(format!("CSV serialization error: {}", e)))?;
        }
        let bytes = wtr
            .into_inner()
            .map_err(|e| AppError::Internal(format!("CSV writer error: {}", e)))?;
        String::from_utf8(bytes)
            .map_err(|e| AppError::Internal(format!("UTF-8 conversion error: {}", e)))
    }
}

/// Parse the `period` query value, defaulting to daily
pub fn parse_period(raw: Option<&str>) -> AppResult<RevenuePeriod> {
    match raw {
        None => Ok(RevenuePeriod::default()),
        Some(raw) => raw.parse().map_err(|_| {
            AppError::bad_request(
                "Invalid period. Use: daily, weekly, or monthly",
                "Chu kỳ không hợp lệ. Dùng: daily, weekly hoặc monthly",
            )
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_defaults_to_daily() {
        assert_eq!(parse_period(None).unwrap(), RevenuePeriod::Daily);
        assert_eq!(parse_period(Some("Monthly")).unwrap(), RevenuePeriod::Monthly);
    }

    #[test]
    fn unknown_period_is_rejected() {
        assert!(matches!(parse_period(Some("yearly")), Err(AppError::BadRequest { .. })));
    }

    #[test]
    fn csv_export_writes_header_row() {
        let rows = vec![HourlyPerformance {
            hour: 12,
            order_count: 3,
            revenue: Decimal::new(45000000, 2),
        }];
        let csv = DashboardService::export_to_csv(&rows).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("hour,order_count,revenue"));
        assert_eq!(lines.next(), Some("12,3,450000.00"));
    }

    #[test]
    fn inverted_date_range_is_invalid() {
        let query = DashboardQuery {
            date_from: NaiveDate::from_ymd_opt(2026, 5, 2),
            date_to: NaiveDate::from_ymd_opt(2026, 5, 1),
            format: None,
        };
        assert!(query.check_range().is_err());
        assert!(!query.wants_csv());
    }
}
