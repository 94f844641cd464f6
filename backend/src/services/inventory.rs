//! Inventory service for ingredient stock and stock movements

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::models::{
    apply_movement, is_expiring_soon, stock_value, MovementKind, StockError, StockStatus,
    DEFAULT_SUPPLIER, INITIAL_STOCK_REASON,
};
use shared::validation::{validate_non_negative, validate_scale, MONEY_SCALE, QUANTITY_SCALE};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;

/// History rows returned when no limit is given
const DEFAULT_HISTORY_LIMIT: i64 = 100;
const MAX_HISTORY_LIMIT: i64 = 500;

/// Inventory service for managing ingredient stock
#[derive(Clone)]
pub struct InventoryService {
    db: PgPool,
}

/// Stored inventory row
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct InventoryRecord {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub unit: String,
    pub stock: Decimal,
    pub min_stock: Decimal,
    pub price: Decimal,
    pub supplier: String,
    pub batch_number: Option<String>,
    pub production_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Inventory row with its derived stock status
#[derive(Debug, Clone, Serialize)]
pub struct InventoryItem {
    #[serde(flatten)]
    pub record: InventoryRecord,
    pub status: StockStatus,
    pub expiring_soon: bool,
}

impl InventoryItem {
    fn from_record(record: InventoryRecord, today: NaiveDate) -> Self {
        Self {
            status: StockStatus::from_levels(record.stock, record.min_stock),
            expiring_soon: is_expiring_soon(record.expiry_date, today),
            record,
        }
    }
}

/// Stock movement record
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct StockMovement {
    pub id: Uuid,
    pub item_id: Uuid,
    pub item_name: String,
    #[sqlx(try_from = "String")]
    pub kind: MovementKind,
    pub quantity: Decimal,
    pub reason: String,
    #[sqlx(rename = "performed_by")]
    pub user: String,
    pub batch_number: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize)]
pub struct InventoryFilter {
    pub search: Option<String>,
    pub category: Option<String>,
    pub status: Option<StockStatus>,
}

/// Input for creating an inventory item
#[derive(Debug, Deserialize, Validate)]
pub struct CreateInventoryInput {
    #[validate(length(min = 1, max = 150, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, max = 100, message = "Category is required"))]
    pub category: String,
    #[validate(length(min = 1, max = 20, message = "Unit is required"))]
    pub unit: String,
    #[serde(default)]
    pub stock: Decimal,
    #[serde(default)]
    pub min_stock: Decimal,
    #[serde(default)]
    pub price: Decimal,
    pub supplier: Option<String>,
    pub batch_number: Option<String>,
    pub production_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
    pub location: Option<String>,
}

/// Partial update; stock levels change only through movements
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateInventoryInput {
    #[validate(length(min = 1, max = 150))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub category: Option<String>,
    #[validate(length(min = 1, max = 20))]
    pub unit: Option<String>,
    pub min_stock: Option<Decimal>,
    pub price: Option<Decimal>,
    pub supplier: Option<String>,
    pub batch_number: Option<String>,
    pub production_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
    pub location: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StockMovementInput {
    pub quantity: Decimal,
    pub reason: Option<String>,
    pub batch_number: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    pub item_id: Option<Uuid>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct InventorySummary {
    pub total_items: usize,
    pub total_value: Decimal,
    pub low_stock: usize,
    pub out_of_stock: usize,
    pub expiring_soon: usize,
    pub by_category: Vec<CategoryCount>,
}

/// Result of a stock-in or stock-out
#[derive(Debug, Serialize)]
pub struct StockChange {
    pub item: InventoryItem,
    pub movement: StockMovement,
}

const ITEM_SELECT: &str = r#"
    SELECT id, name, category, unit, stock, min_stock, price, supplier, batch_number,
           production_date, expiry_date, location, created_at, updated_at
    FROM inventory_items
"#;

const MOVEMENT_COLUMNS: &str =
    "id, item_id, item_name, kind, quantity, reason, performed_by, batch_number, created_at";

impl InventoryService {
    /// Create a new InventoryService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List items; status is derived so it is filtered after loading
    pub async fn list(&self, filter: &InventoryFilter) -> AppResult<Vec<InventoryItem>> {
        let search = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", s));

        let records = sqlx::query_as::<_, InventoryRecord>(&format!(
            r#"{}
            WHERE ($1::text IS NULL OR name ILIKE $1 OR supplier ILIKE $1 OR batch_number ILIKE $1)
              AND ($2::text IS NULL OR category = $2)
            ORDER BY name
            "#,
            ITEM_SELECT
        ))
        .bind(search)
        .bind(filter.category.as_deref())
        .fetch_all(&self.db)
        .await?;

        let today = Utc::now().date_naive();
        Ok(records
            .into_iter()
            .map(|r| InventoryItem::from_record(r, today))
            .filter(|item| filter.status.map_or(true, |s| item.status == s))
            .collect())
    }

    /// Get an inventory item by ID
    pub async fn get(&self, id: Uuid) -> AppResult<InventoryItem> {
        let record = self.find(id).await?;
        Ok(InventoryItem::from_record(record, Utc::now().date_naive()))
    }

    /// Create an item; opening stock is logged as an incoming movement
    pub async fn create(&self, input: CreateInventoryInput, user: &AuthUser) -> AppResult<InventoryItem> {
        input.validate()?;
        check_amount("stock", input.stock, QUANTITY_SCALE)?;
        check_amount("min_stock", input.min_stock, QUANTITY_SCALE)?;
        check_amount("price", input.price, MONEY_SCALE)?;
        check_dates(input.production_date, input.expiry_date)?;

        let supplier = input
            .supplier
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_SUPPLIER.to_string());

        let mut tx = self.db.begin().await?;

        let record = sqlx::query_as::<_, InventoryRecord>(
            r#"
            INSERT INTO inventory_items (name, category, unit, stock, min_stock, price, supplier,
                                         batch_number, production_date, expiry_date, location)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING id, name, category, unit, stock, min_stock, price, supplier, batch_number,
                      production_date, expiry_date, location, created_at, updated_at
            "#,
        )
        .bind(input.name.trim())
        .bind(input.category.trim())
        .bind(input.unit.trim())
        .bind(input.stock)
        .bind(input.min_stock)
        .bind(input.price)
        .bind(&supplier)
        .bind(&input.batch_number)
        .bind(input.production_date)
        .bind(input.expiry_date)
        .bind(&input.location)
        .fetch_one(&mut *tx)
        .await?;

        if record.stock > Decimal::ZERO {
            insert_movement(
                &mut tx,
                &record,
                MovementKind::In,
                record.stock,
                INITIAL_STOCK_REASON,
                record.batch_number.as_deref(),
                user,
            )
            .await?;
        }

        tx.commit().await?;

        tracing::info!(item_id = %record.id, name = %record.name, stock = %record.stock, "Inventory item created");
        Ok(InventoryItem::from_record(record, Utc::now().date_naive()))
    }

    /// Update item details
    pub async fn update(&self, id: Uuid, input: UpdateInventoryInput) -> AppResult<InventoryItem> {
        input.validate()?;
        let existing = self.find(id).await?;

        let min_stock = input.min_stock.unwrap_or(existing.min_stock);
        let price = input.price.unwrap_or(existing.price);
        check_amount("min_stock", min_stock, QUANTITY_SCALE)?;
        check_amount("price", price, MONEY_SCALE)?;

        let production_date = input.production_date.or(existing.production_date);
        let expiry_date = input.expiry_date.or(existing.expiry_date);
        check_dates(production_date, expiry_date)?;

        let record = sqlx::query_as::<_, InventoryRecord>(
            r#"
            UPDATE inventory_items
            SET name = $1, category = $2, unit = $3, min_stock = $4, price = $5, supplier = $6,
                batch_number = $7, production_date = $8, expiry_date = $9, location = $10,
                updated_at = NOW()
            WHERE id = $11
            RETURNING id, name, category, unit, stock, min_stock, price, supplier, batch_number,
                      production_date, expiry_date, location, created_at, updated_at
            "#,
        )
        .bind(input.name.as_deref().map(str::trim).unwrap_or(&existing.name))
        .bind(input.category.as_deref().map(str::trim).unwrap_or(&existing.category))
        .bind(input.unit.as_deref().map(str::trim).unwrap_or(&existing.unit))
        .bind(min_stock)
        .bind(price)
        .bind(input.supplier.unwrap_or(existing.supplier))
        .bind(input.batch_number.or(existing.batch_number))
        .bind(production_date)
        .bind(expiry_date)
        .bind(input.location.or(existing.location))
        .bind(id)
        .fetch_one(&self.db)
        .await?;

        Ok(InventoryItem::from_record(record, Utc::now().date_naive()))
    }

    /// Delete an item and its movement history
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM inventory_items WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(item_not_found());
        }

        tracing::info!(item_id = %id, "Inventory item deleted");
        Ok(())
    }

    /// Add or remove stock; the level update and the log entry commit together
    pub async fn move_stock(
        &self,
        id: Uuid,
        kind: MovementKind,
        input: StockMovementInput,
        user: &AuthUser,
    ) -> AppResult<StockChange> {
        let mut tx = self.db.begin().await?;

        let existing = sqlx::query_as::<_, InventoryRecord>(&format!(
            "{} WHERE id = $1 FOR UPDATE",
            ITEM_SELECT
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(item_not_found)?;

        let new_stock = apply_movement(existing.stock, kind, input.quantity).map_err(|e| match e {
            StockError::NonPositiveQuantity => AppError::validation(
                "quantity",
                "Quantity must be positive",
                "Số lượng phải lớn hơn 0",
            ),
            StockError::TooPrecise => AppError::validation(
                "quantity",
                "Quantity may have at most 3 decimal places",
                "Số lượng chỉ được có tối đa 3 chữ số thập phân",
            ),
            StockError::Insufficient { available, .. } => AppError::InsufficientStock(format!(
                "{} ({} {} còn lại)",
                existing.name, available, existing.unit
            )),
        })?;

        let batch_number = match kind {
            MovementKind::In => input.batch_number.or_else(|| existing.batch_number.clone()),
            MovementKind::Out => existing.batch_number.clone(),
        };

        let record = sqlx::query_as::<_, InventoryRecord>(
            r#"
            UPDATE inventory_items
            SET stock = $1, batch_number = $2, updated_at = NOW()
            WHERE id = $3
            RETURNING id, name, category, unit, stock, min_stock, price, supplier, batch_number,
                      production_date, expiry_date, location, created_at, updated_at
            "#,
        )
        .bind(new_stock)
        .bind(&batch_number)
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        let reason = input
            .reason
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| kind.default_reason().to_string());

        let movement = insert_movement(
            &mut tx,
            &record,
            kind,
            input.quantity,
            &reason,
            batch_number.as_deref(),
            user,
        )
        .await?;

        tx.commit().await?;

        tracing::info!(
            item_id = %id,
            kind = %kind,
            quantity = %input.quantity,
            stock = %record.stock,
            "Stock moved"
        );

        Ok(StockChange {
            item: InventoryItem::from_record(record, Utc::now().date_naive()),
            movement,
        })
    }

    /// Movement log, newest first
    pub async fn history(&self, query: &HistoryQuery) -> AppResult<Vec<StockMovement>> {
        let limit = query
            .limit
            .unwrap_or(DEFAULT_HISTORY_LIMIT)
            .clamp(1, MAX_HISTORY_LIMIT);

        let movements = sqlx::query_as::<_, StockMovement>(&format!(
            r#"
            SELECT {}
            FROM stock_movements
            WHERE ($1::uuid IS NULL OR item_id = $1)
            ORDER BY created_at DESC
            LIMIT $2
            "#,
            MOVEMENT_COLUMNS
        ))
        .bind(query.item_id)
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        Ok(movements)
    }

    /// Stock value, alert counts and category breakdown
    pub async fn summary(&self) -> AppResult<InventorySummary> {
        let items = self.list(&InventoryFilter::default()).await?;

        let mut by_category: BTreeMap<String, usize> = BTreeMap::new();
        for item in &items {
            *by_category.entry(item.record.category.clone()).or_default() += 1;
        }

        Ok(InventorySummary {
            total_items: items.len(),
            total_value: stock_value(items.iter().map(|i| (i.record.stock, i.record.price))),
            low_stock: items.iter().filter(|i| i.status == StockStatus::Low).count(),
            out_of_stock: items.iter().filter(|i| i.status == StockStatus::Out).count(),
            expiring_soon: items.iter().filter(|i| i.expiring_soon).count(),
            by_category: by_category
                .into_iter()
                .map(|(category, count)| CategoryCount { category, count })
                .collect(),
        })
    }

    async fn find(&self, id: Uuid) -> AppResult<InventoryRecord> {
        sqlx::query_as::<_, InventoryRecord>(&format!("{} WHERE id = $1", ITEM_SELECT))
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(item_not_found)
    }
}

async fn insert_movement(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    item: &InventoryRecord,
    kind: MovementKind,
    quantity: Decimal,
    reason: &str,
    batch_number: Option<&str>,
    user: &AuthUser,
) -> AppResult<StockMovement> {
    let movement = sqlx::query_as::<_, StockMovement>(&format!(
        r#"
        INSERT INTO stock_movements (item_id, item_name, kind, quantity, reason, performed_by,
                                     user_id, batch_number)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING {}
        "#,
        MOVEMENT_COLUMNS
    ))
    .bind(item.id)
    .bind(&item.name)
    .bind(kind.as_str())
    .bind(quantity)
    .bind(reason)
    .bind(&user.username)
    .bind(user.user_id)
    .bind(batch_number)
    .fetch_one(&mut **tx)
    .await?;

    Ok(movement)
}

/// Non-negative and no finer than the column stores
fn check_amount(field: &str, value: Decimal, max_scale: u32) -> AppResult<()> {
    validate_non_negative(value).map_err(|msg| AppError::validation(field, msg, "Giá trị không được âm"))?;
    validate_scale(value, max_scale).map_err(|msg| {
        AppError::validation(
            field,
            msg,
            &format!("Giá trị chỉ được có tối đa {} chữ số thập phân", max_scale),
        )
    })
}

fn check_dates(production: Option<NaiveDate>, expiry: Option<NaiveDate>) -> AppResult<()> {
    if let (Some(production), Some(expiry)) = (production, expiry) {
        if expiry < production {
            return Err(AppError::validation(
                "expiry_date",
                "Expiry date must not be before production date",
                "Hạn sử dụng phải sau ngày sản xuất",
            ));
        }
    }
    Ok(())
}

fn item_not_found() -> AppError {
    AppError::not_found("Inventory item", "Không tìm thấy nguyên liệu")
}
