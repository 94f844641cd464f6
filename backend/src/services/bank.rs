//! Bank account service for transfer payment destinations

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::models::{
    default_logo, find_bank, normalize_account_holder, normalize_account_number,
    BankAccountStatus,
};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};

/// Bank account service
#[derive(Clone)]
pub struct BankAccountService {
    db: PgPool,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct BankAccountRecord {
    pub id: Uuid,
    pub bank_name: String,
    pub bank_code: Option<String>,
    pub account_number: String,
    pub account_holder: String,
    pub branch: Option<String>,
    pub logo: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Bank account with its display status
#[derive(Debug, Clone, Serialize)]
pub struct BankAccount {
    #[serde(flatten)]
    pub record: BankAccountRecord,
    pub status: BankAccountStatus,
}

impl From<BankAccountRecord> for BankAccount {
    fn from(record: BankAccountRecord) -> Self {
        Self {
            status: BankAccountStatus::from_active(record.is_active),
            record,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct BankAccountFilter {
    pub search: Option<String>,
    pub bank_name: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateBankAccountInput {
    #[validate(length(min = 1, max = 100, message = "Bank name is required"))]
    pub bank_name: String,
    #[validate(length(max = 10))]
    pub bank_code: Option<String>,
    pub account_number: String,
    pub account_holder: String,
    #[validate(length(max = 100))]
    pub branch: Option<String>,
    #[validate(length(min = 1, max = 10))]
    pub logo: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateBankAccountInput {
    #[validate(length(min = 1, max = 100))]
    pub bank_name: Option<String>,
    #[validate(length(max = 10))]
    pub bank_code: Option<String>,
    pub account_number: Option<String>,
    pub account_holder: Option<String>,
    #[validate(length(max = 100))]
    pub branch: Option<String>,
    #[validate(length(min = 1, max = 10))]
    pub logo: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Serialize, FromRow)]
pub struct BankCount {
    pub bank_name: String,
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct BankAccountStats {
    pub total: i64,
    pub active: i64,
    pub locked: i64,
    pub by_bank: Vec<BankCount>,
}

const ACCOUNT_COLUMNS: &str = "id, bank_name, bank_code, account_number, account_holder, branch, logo, is_active, created_at, updated_at";

impl BankAccountService {
    /// Create a new BankAccountService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn list(&self, filter: &BankAccountFilter) -> AppResult<Vec<BankAccount>> {
        let search = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", s));

        let records = sqlx::query_as::<_, BankAccountRecord>(&format!(
            r#"
            SELECT {}
            FROM bank_accounts
            WHERE ($1::text IS NULL OR bank_name ILIKE $1 OR account_number ILIKE $1 OR account_holder ILIKE $1)
              AND ($2::text IS NULL OR bank_name = $2)
              AND ($3::bool IS NULL OR is_active = $3)
            ORDER BY created_at DESC
            "#,
            ACCOUNT_COLUMNS
        ))
        .bind(search)
        .bind(filter.bank_name.as_deref())
        .bind(filter.is_active)
        .fetch_all(&self.db)
        .await?;

        Ok(records.into_iter().map(BankAccount::from).collect())
    }

    /// Accounts the cashier may offer for transfers
    pub async fn list_active(&self) -> AppResult<Vec<BankAccount>> {
        self.list(&BankAccountFilter {
            is_active: Some(true),
            ..Default::default()
        })
        .await
    }

    pub async fn get(&self, id: Uuid) -> AppResult<BankAccount> {
        self.find(id).await.map(BankAccount::from)
    }

    pub async fn create(&self, input: CreateBankAccountInput) -> AppResult<BankAccount> {
        input.validate()?;
        let bank_name = input.bank_name.trim().to_string();
        let account_number = check_account_number(&input.account_number)?;
        let account_holder = check_account_holder(&input.account_holder)?;
        let bank_code = input
            .bank_code
            .map(|c| c.trim().to_uppercase())
            .filter(|c| !c.is_empty())
            .or_else(|| find_bank(&bank_name).map(|b| b.code.to_string()));
        let logo = input
            .logo
            .map(|l| l.trim().to_uppercase())
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| default_logo(bank_code.as_deref().unwrap_or(&bank_name)));

        self.ensure_unique(&bank_name, &account_number, None).await?;

        let record = sqlx::query_as::<_, BankAccountRecord>(&format!(
            r#"
            INSERT INTO bank_accounts (bank_name, bank_code, account_number, account_holder, branch, logo, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            ACCOUNT_COLUMNS
        ))
        .bind(&bank_name)
        .bind(&bank_code)
        .bind(&account_number)
        .bind(&account_holder)
        .bind(&input.branch)
        .bind(&logo)
        .bind(input.is_active.unwrap_or(true))
        .fetch_one(&self.db)
        .await?;

        tracing::info!(bank_account_id = %record.id, bank = %record.bank_name, "Bank account created");
        Ok(record.into())
    }

    pub async fn update(&self, id: Uuid, input: UpdateBankAccountInput) -> AppResult<BankAccount> {
        input.validate()?;
        let existing = self.find(id).await?;

        let bank_name = input
            .bank_name
            .map(|n| n.trim().to_string())
            .unwrap_or(existing.bank_name);
        let account_number = match input.account_number {
            Some(raw) => check_account_number(&raw)?,
            None => existing.account_number,
        };
        let account_holder = match input.account_holder {
            Some(raw) => check_account_holder(&raw)?,
            None => existing.account_holder,
        };

        self.ensure_unique(&bank_name, &account_number, Some(id)).await?;

        let record = sqlx::query_as::<_, BankAccountRecord>(&format!(
            r#"
            UPDATE bank_accounts
            SET bank_name = $1, bank_code = $2, account_number = $3, account_holder = $4,
                branch = $5, logo = $6, is_active = $7, updated_at = NOW()
            WHERE id = $8
            RETURNING {}
            "#,
            ACCOUNT_COLUMNS
        ))
        .bind(&bank_name)
        .bind(input.bank_code.map(|c| c.trim().to_uppercase()).or(existing.bank_code))
        .bind(&account_number)
        .bind(&account_holder)
        .bind(input.branch.or(existing.branch))
        .bind(input.logo.map(|l| l.trim().to_uppercase()).unwrap_or(existing.logo))
        .bind(input.is_active.unwrap_or(existing.is_active))
        .bind(id)
        .fetch_one(&self.db)
        .await?;

        Ok(record.into())
    }

    /// Flip between active and locked
    pub async fn toggle(&self, id: Uuid) -> AppResult<BankAccount> {
        let record = sqlx::query_as::<_, BankAccountRecord>(&format!(
            "UPDATE bank_accounts SET is_active = NOT is_active, updated_at = NOW() WHERE id = $1 RETURNING {}",
            ACCOUNT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(account_not_found)?;

        tracing::info!(bank_account_id = %id, is_active = record.is_active, "Bank account toggled");
        Ok(record.into())
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM bank_accounts WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(account_not_found());
        }

        tracing::info!(bank_account_id = %id, "Bank account deleted");
        Ok(())
    }

    pub async fn stats(&self) -> AppResult<BankAccountStats> {
        let (total, active): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), COUNT(*) FILTER (WHERE is_active) FROM bank_accounts",
        )
        .fetch_one(&self.db)
        .await?;

        let by_bank = sqlx::query_as::<_, BankCount>(
            "SELECT bank_name, COUNT(*) AS count FROM bank_accounts GROUP BY bank_name ORDER BY bank_name",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(BankAccountStats {
            total,
            active,
            locked: total - active,
            by_bank,
        })
    }

    async fn find(&self, id: Uuid) -> AppResult<BankAccountRecord> {
        sqlx::query_as::<_, BankAccountRecord>(&format!(
            "SELECT {} FROM bank_accounts WHERE id = $1",
            ACCOUNT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(account_not_found)
    }

    async fn ensure_unique(&self, bank_name: &str, account_number: &str, except: Option<Uuid>) -> AppResult<()> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM bank_accounts
                WHERE bank_name = $1 AND account_number = $2 AND ($3::uuid IS NULL OR id <> $3)
            )
            "#,
        )
        .bind(bank_name)
        .bind(account_number)
        .bind(except)
        .fetch_one(&self.db)
        .await?;

        if exists {
            return Err(AppError::conflict(
                "Bank account",
                "Bank account already exists",
                "Số tài khoản này đã tồn tại cho ngân hàng đã chọn",
            ));
        }
        Ok(())
    }
}

fn check_account_number(raw: &str) -> AppResult<String> {
    normalize_account_number(raw).map_err(|msg| {
        AppError::validation("account_number", msg, "Số tài khoản phải gồm 6-20 chữ số")
    })
}

fn check_account_holder(raw: &str) -> AppResult<String> {
    normalize_account_holder(raw).map_err(|msg| {
        AppError::validation(
            "account_holder",
            msg,
            "Tên chủ tài khoản chỉ gồm chữ cái và khoảng trắng, ít nhất 2 ký tự",
        )
    })
}

fn account_not_found() -> AppError {
    AppError::not_found("Bank account", "Không tìm thấy tài khoản ngân hàng")
}
