//! Dining table service
//!
//! Tables are addressed by their printed number. Each table carries a QR
//! token signed with the server secret; the customer page sends it back with
//! the order so a guessed table number alone cannot place orders.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use shared::models::{ordering_url, TableStatus, DEFAULT_TABLE_CAPACITY};
use shared::validation::{validate_table_capacity, validate_table_number};
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

type HmacSha256 = Hmac<Sha256>;

/// Signature bytes kept in the token
const TOKEN_BYTES: usize = 16;

/// Table service
#[derive(Clone)]
pub struct TableService {
    db: PgPool,
    secret: String,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct DiningTable {
    pub id: Uuid,
    pub number: i32,
    pub capacity: i32,
    #[sqlx(try_from = "String")]
    pub status: TableStatus,
    pub qr_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTableInput {
    pub number: i32,
    pub capacity: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateTableInput {
    pub capacity: Option<i32>,
    pub status: Option<TableStatus>,
    #[serde(default)]
    pub rotate_token: bool,
}

/// Link encoded in a table's QR code
#[derive(Debug, Serialize)]
pub struct TableQr {
    pub table_number: i32,
    pub url: String,
}

const TABLE_SELECT: &str =
    "SELECT id, number, capacity, status, qr_token, created_at, updated_at FROM dining_tables";

impl TableService {
    /// Create a new TableService instance
    pub fn new(db: PgPool, secret: impl Into<String>) -> Self {
        Self {
            db,
            secret: secret.into(),
        }
    }

    pub async fn list(&self) -> AppResult<Vec<DiningTable>> {
        let tables = sqlx::query_as::<_, DiningTable>(&format!("{} ORDER BY number", TABLE_SELECT))
            .fetch_all(&self.db)
            .await?;
        Ok(tables)
    }

    /// Get a table by its number
    pub async fn get(&self, number: i32) -> AppResult<DiningTable> {
        sqlx::query_as::<_, DiningTable>(&format!("{} WHERE number = $1", TABLE_SELECT))
            .bind(number)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| table_not_found(number))
    }

    /// Create a table with a fresh QR token
    pub async fn create(&self, input: CreateTableInput) -> AppResult<DiningTable> {
        validate_table_number(input.number)
            .map_err(|msg| AppError::validation("number", msg, "Số bàn phải lớn hơn 0"))?;
        let capacity = input.capacity.unwrap_or(DEFAULT_TABLE_CAPACITY);
        check_capacity(capacity)?;

        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM dining_tables WHERE number = $1)",
        )
        .bind(input.number)
        .fetch_one(&self.db)
        .await?;

        if exists {
            return Err(AppError::conflict(
                "Table",
                format!("Table {} already exists", input.number),
                format!("Bàn số {} đã tồn tại", input.number),
            ));
        }

        let token = self.sign(input.number)?;
        let table = sqlx::query_as::<_, DiningTable>(
            r#"
            INSERT INTO dining_tables (number, capacity, status, qr_token)
            VALUES ($1, $2, $3, $4)
            RETURNING id, number, capacity, status, qr_token, created_at, updated_at
            "#,
        )
        .bind(input.number)
        .bind(capacity)
        .bind(TableStatus::Available.as_str())
        .bind(&token)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(table_number = table.number, capacity, "Table created");
        Ok(table)
    }

    /// Update capacity or status, optionally issuing a new QR token
    pub async fn update(&self, number: i32, input: UpdateTableInput) -> AppResult<DiningTable> {
        if input.capacity.is_none() && input.status.is_none() && !input.rotate_token {
            return Err(AppError::bad_request(
                "No fields to update",
                "Không có thông tin nào để cập nhật",
            ));
        }

        let existing = self.get(number).await?;
        let capacity = input.capacity.unwrap_or(existing.capacity);
        check_capacity(capacity)?;

        let token = if input.rotate_token || existing.qr_token.is_none() {
            Some(self.sign(number)?)
        } else {
            existing.qr_token
        };

        let table = sqlx::query_as::<_, DiningTable>(
            r#"
            UPDATE dining_tables
            SET capacity = $1, status = $2, qr_token = $3, updated_at = NOW()
            WHERE number = $4
            RETURNING id, number, capacity, status, qr_token, created_at, updated_at
            "#,
        )
        .bind(capacity)
        .bind(input.status.unwrap_or(existing.status).as_str())
        .bind(token)
        .bind(number)
        .fetch_one(&self.db)
        .await?;

        if input.rotate_token {
            tracing::info!(table_number = number, "Table QR token rotated");
        }
        Ok(table)
    }

    /// Delete a table that has no guests
    pub async fn delete(&self, number: i32) -> AppResult<()> {
        let table = self.get(number).await?;

        if table.status == TableStatus::Occupied {
            return Err(AppError::bad_request(
                "Cannot delete an occupied table",
                "Không thể xóa bàn đang có khách",
            ));
        }

        sqlx::query("DELETE FROM dining_tables WHERE id = $1")
            .bind(table.id)
            .execute(&self.db)
            .await?;

        tracing::info!(table_number = number, "Table deleted");
        Ok(())
    }

    /// Ordering link for the table's QR code
    pub async fn qr(&self, number: i32, customer_app_url: &str) -> AppResult<TableQr> {
        let table = self.get(number).await?;
        Ok(TableQr {
            table_number: table.number,
            url: ordering_url(customer_app_url, table.number, table.qr_token.as_deref()),
        })
    }

    fn sign(&self, number: i32) -> AppResult<String> {
        sign_table_token(&self.secret, number, &Uuid::new_v4().simple().to_string())
    }
}

/// base64url HMAC-SHA256 of `table:{number}:{nonce}`, truncated
pub fn sign_table_token(secret: &str, number: i32, nonce: &str) -> AppResult<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| AppError::Internal(format!("Failed to create HMAC: {}", e)))?;
    mac.update(format!("table:{}:{}", number, nonce).as_bytes());
    let digest = mac.finalize().into_bytes();
    Ok(URL_SAFE_NO_PAD.encode(&digest[..TOKEN_BYTES]))
}

/// Mark the table free when none of its orders is still active
pub async fn release_if_idle(conn: &mut PgConnection, table_id: Option<Uuid>) -> AppResult<()> {
    let Some(table_id) = table_id else {
        return Ok(());
    };

    sqlx::query(
        r#"
        UPDATE dining_tables
        SET status = $1, updated_at = NOW()
        WHERE id = $2
          AND NOT EXISTS (
              SELECT 1 FROM orders
              WHERE table_id = $2
                AND status IN ('PENDING', 'CONFIRMED', 'PREPARING', 'READY')
          )
        "#,
    )
    .bind(TableStatus::Available.as_str())
    .bind(table_id)
    .execute(conn)
    .await?;

    Ok(())
}

pub fn table_not_found(number: i32) -> AppError {
    AppError::NotFound {
        resource: format!("Table {}", number),
        message_vi: format!("Không tìm thấy bàn số {}", number),
    }
}

fn check_capacity(capacity: i32) -> AppResult<()> {
    validate_table_capacity(capacity)
        .map_err(|msg| AppError::validation("capacity", msg, "Sức chứa phải từ 1 đến 50 người"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_depends_on_table_and_nonce() {
        let a = sign_table_token("secret", 1, "n1").unwrap();
        let b = sign_table_token("secret", 2, "n1").unwrap();
        let c = sign_table_token("secret", 1, "n2").unwrap();
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_eq!(a, sign_table_token("secret", 1, "n1").unwrap());
    }

    #[test]
    fn token_is_url_safe() {
        let token = sign_table_token("secret", 7, "nonce").unwrap();
        // 16 bytes without padding
        assert_eq!(token.len(), 22);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }
}
