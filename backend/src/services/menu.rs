//! Menu service for dishes and categories

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::models::MenuStatus;
use shared::validation::validate_price;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};

/// Menu service
#[derive(Clone)]
pub struct MenuService {
    db: PgPool,
}

/// Menu category
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub sort_order: i32,
}

/// Menu item with its category name
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct MenuItem {
    pub id: Uuid,
    pub category_id: Uuid,
    pub category_name: String,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub image_url: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: MenuStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Filters for the staff menu list
#[derive(Debug, Default, Deserialize)]
pub struct MenuFilter {
    /// Category name
    pub category: Option<String>,
    pub status: Option<MenuStatus>,
    pub search: Option<String>,
}

/// Input for creating a menu item
#[derive(Debug, Deserialize, Validate)]
pub struct CreateMenuItemInput {
    pub category_id: Uuid,
    #[validate(length(min = 1, max = 150, message = "Name is required"))]
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    #[validate(url(message = "Image URL is not a valid URL"))]
    pub image_url: Option<String>,
    pub status: Option<MenuStatus>,
}

/// Partial update of a menu item
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateMenuItemInput {
    pub category_id: Option<Uuid>,
    #[validate(length(min = 1, max = 150, message = "Name must not be empty"))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    #[validate(url(message = "Image URL is not a valid URL"))]
    pub image_url: Option<String>,
    pub status: Option<MenuStatus>,
}

impl UpdateMenuItemInput {
    fn is_empty(&self) -> bool {
        self.category_id.is_none()
            && self.name.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.image_url.is_none()
            && self.status.is_none()
    }
}

const MENU_SELECT: &str = r#"
    SELECT m.id, m.category_id, c.name AS category_name, m.name, m.description,
           m.price, m.image_url, m.status, m.created_at, m.updated_at
    FROM menu_items m
    JOIN categories c ON c.id = m.category_id
"#;

impl MenuService {
    /// Create a new MenuService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List menu items for staff, ordered by name
    pub async fn list(&self, filter: &MenuFilter) -> AppResult<Vec<MenuItem>> {
        let search = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", s));

        let items = sqlx::query_as::<_, MenuItem>(&format!(
            r#"{}
            WHERE ($1::text IS NULL OR c.name = $1)
              AND ($2::text IS NULL OR m.status = $2)
              AND ($3::text IS NULL OR m.name ILIKE $3 OR m.description ILIKE $3)
            ORDER BY m.name
            "#,
            MENU_SELECT
        ))
        .bind(filter.category.as_deref())
        .bind(filter.status.map(|s| s.as_str()))
        .bind(search)
        .fetch_all(&self.db)
        .await?;

        Ok(items)
    }

    /// Items customers can order from the QR page
    pub async fn list_public(&self) -> AppResult<Vec<MenuItem>> {
        let items = sqlx::query_as::<_, MenuItem>(&format!(
            "{} WHERE m.status = $1 ORDER BY c.sort_order, m.name",
            MENU_SELECT
        ))
        .bind(MenuStatus::Available.as_str())
        .fetch_all(&self.db)
        .await?;

        Ok(items)
    }

    pub async fn list_categories(&self) -> AppResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT id, name, description, sort_order FROM categories ORDER BY sort_order, name",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(categories)
    }

    /// Get a menu item by ID
    pub async fn get(&self, id: Uuid) -> AppResult<MenuItem> {
        sqlx::query_as::<_, MenuItem>(&format!("{} WHERE m.id = $1", MENU_SELECT))
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::not_found("Menu item", "Không tìm thấy món ăn"))
    }

    /// Create a menu item
    pub async fn create(&self, input: CreateMenuItemInput) -> AppResult<MenuItem> {
        input.validate()?;
        check_price(input.price)?;
        self.ensure_category(input.category_id).await?;

        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO menu_items (category_id, name, description, price, image_url, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(input.category_id)
        .bind(input.name.trim())
        .bind(&input.description)
        .bind(input.price)
        .bind(&input.image_url)
        .bind(input.status.unwrap_or_default().as_str())
        .fetch_one(&self.db)
        .await?;

        tracing::info!(menu_item_id = %id, name = %input.name, "Menu item created");
        self.get(id).await
    }

    /// Update only the provided fields
    pub async fn update(&self, id: Uuid, input: UpdateMenuItemInput) -> AppResult<MenuItem> {
        if input.is_empty() {
            return Err(AppError::bad_request(
                "No fields to update",
                "Không có thông tin nào để cập nhật",
            ));
        }
        input.validate()?;

        let existing = self.get(id).await?;

        let category_id = input.category_id.unwrap_or(existing.category_id);
        if category_id != existing.category_id {
            self.ensure_category(category_id).await?;
        }
        let price = input.price.unwrap_or(existing.price);
        check_price(price)?;

        sqlx::query(
            r#"
            UPDATE menu_items
            SET category_id = $1, name = $2, description = $3, price = $4,
                image_url = $5, status = $6, updated_at = NOW()
            WHERE id = $7
            "#,
        )
        .bind(category_id)
        .bind(input.name.as_deref().map(str::trim).unwrap_or(&existing.name))
        .bind(input.description.or(existing.description))
        .bind(price)
        .bind(input.image_url.or(existing.image_url))
        .bind(input.status.unwrap_or(existing.status).as_str())
        .bind(id)
        .execute(&self.db)
        .await?;

        self.get(id).await
    }

    /// Toggle availability
    pub async fn set_status(&self, id: Uuid, status: MenuStatus) -> AppResult<MenuItem> {
        let result = sqlx::query("UPDATE menu_items SET status = $1, updated_at = NOW() WHERE id = $2")
            .bind(status.as_str())
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Menu item", "Không tìm thấy món ăn"));
        }

        tracing::info!(menu_item_id = %id, status = %status, "Menu item status changed");
        self.get(id).await
    }

    /// Delete a menu item. Past order lines keep their name snapshot.
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM menu_items WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Menu item", "Không tìm thấy món ăn"));
        }

        tracing::info!(menu_item_id = %id, "Menu item deleted");
        Ok(())
    }

    async fn ensure_category(&self, category_id: Uuid) -> AppResult<()> {
        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM categories WHERE id = $1)")
            .bind(category_id)
            .fetch_one(&self.db)
            .await?;

        if !exists {
            return Err(AppError::not_found("Category", "Không tìm thấy danh mục"));
        }
        Ok(())
    }
}

fn check_price(price: Decimal) -> AppResult<()> {
    validate_price(price).map_err(|msg| {
        let message_vi = if price <= Decimal::ZERO {
            "Giá phải lớn hơn 0"
        } else {
            "Giá chỉ được có tối đa 2 chữ số thập phân"
        };
        AppError::validation("price", msg, message_vi)
    })
}
