//! Employee service
//!
//! An employee is a user account plus its staff profile. Both rows are
//! created and removed together.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use shared::models::{role_for_position, Role};
use shared::validation::{validate_password, validate_username, validate_vn_phone};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::services::auth::hash_password;

/// Employee service
#[derive(Clone)]
pub struct EmployeeService {
    db: PgPool,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Employee {
    pub id: Uuid,
    pub user_id: Uuid,
    pub username: String,
    #[sqlx(try_from = "String")]
    pub role: Role,
    pub full_name: String,
    pub phone: Option<String>,
    pub position: Option<String>,
    pub hire_date: NaiveDate,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EmployeeFilter {
    pub search: Option<String>,
    pub role: Option<Role>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateEmployeeInput {
    pub username: String,
    pub password: String,
    pub role: Option<Role>,
    #[validate(length(min = 1, max = 100, message = "Full name is required"))]
    pub full_name: String,
    pub phone: Option<String>,
    #[validate(length(max = 50))]
    pub position: Option<String>,
    pub hire_date: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateEmployeeInput {
    #[validate(length(min = 1, max = 100, message = "Full name must not be empty"))]
    pub full_name: Option<String>,
    pub phone: Option<String>,
    #[validate(length(max = 50))]
    pub position: Option<String>,
    pub role: Option<Role>,
}

const EMPLOYEE_SELECT: &str = r#"
    SELECT e.id, e.user_id, u.username, u.role, e.full_name, e.phone, e.position,
           e.hire_date, u.is_active, e.created_at
    FROM employees e
    JOIN users u ON u.id = e.user_id
"#;

impl EmployeeService {
    /// Create a new EmployeeService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn list(&self, filter: &EmployeeFilter) -> AppResult<Vec<Employee>> {
        let search = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", s));

        let employees = sqlx::query_as::<_, Employee>(&format!(
            r#"{}
            WHERE ($1::text IS NULL OR e.full_name ILIKE $1 OR u.username ILIKE $1 OR e.phone ILIKE $1)
              AND ($2::text IS NULL OR u.role = $2)
            ORDER BY e.created_at DESC
            "#,
            EMPLOYEE_SELECT
        ))
        .bind(search)
        .bind(filter.role.map(|r| r.as_str()))
        .fetch_all(&self.db)
        .await?;

        Ok(employees)
    }

    pub async fn get(&self, id: Uuid) -> AppResult<Employee> {
        sqlx::query_as::<_, Employee>(&format!("{} WHERE e.id = $1", EMPLOYEE_SELECT))
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(employee_not_found)
    }

    /// Create the login account and staff profile together
    pub async fn create(&self, input: CreateEmployeeInput) -> AppResult<Employee> {
        input.validate()?;
        let username = input.username.trim().to_string();
        validate_username(&username).map_err(|msg| {
            AppError::validation("username", msg, "Tên đăng nhập phải từ 3 đến 50 ký tự, không dấu")
        })?;
        validate_password(&input.password).map_err(|msg| {
            AppError::validation("password", msg, "Mật khẩu phải có ít nhất 6 ký tự")
        })?;
        let phone = check_phone(input.phone)?;
        let position = input
            .position
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());

        let role = input
            .role
            .unwrap_or_else(|| role_for_position(position.as_deref().unwrap_or_default()));

        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)",
        )
        .bind(&username)
        .fetch_one(&self.db)
        .await?;

        if exists {
            return Err(AppError::conflict(
                "User",
                format!("Username {} is already taken", username),
                format!("Tên đăng nhập {} đã tồn tại", username),
            ));
        }

        let password_hash = hash_password(&input.password)?;
        let hire_date = input.hire_date.unwrap_or_else(|| Utc::now().date_naive());

        let mut tx = self.db.begin().await?;

        let user_id = sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO users (username, password_hash, role) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(&username)
        .bind(&password_hash)
        .bind(role.as_str())
        .fetch_one(&mut *tx)
        .await?;

        let employee_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO employees (user_id, full_name, phone, position, hire_date)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(input.full_name.trim())
        .bind(&phone)
        .bind(&position)
        .bind(hire_date)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(employee_id = %employee_id, username = %username, role = %role, "Employee created");
        self.get(employee_id).await
    }

    /// Update profile fields; a new position re-derives the role unless one is given
    pub async fn update(&self, id: Uuid, input: UpdateEmployeeInput) -> AppResult<Employee> {
        if input.full_name.is_none()
            && input.phone.is_none()
            && input.position.is_none()
            && input.role.is_none()
        {
            return Err(AppError::bad_request(
                "No fields to update",
                "Không có thông tin nào để cập nhật",
            ));
        }
        input.validate()?;

        let existing = self.get(id).await?;
        let phone = match input.phone {
            Some(phone) => check_phone(Some(phone))?,
            None => existing.phone,
        };
        let position_changed = input.position.is_some();
        let position = input.position.or(existing.position);
        let role = match (input.role, position_changed) {
            (Some(role), _) => role,
            (None, true) => role_for_position(position.as_deref().unwrap_or_default()),
            (None, false) => existing.role,
        };

        let mut tx = self.db.begin().await?;

        sqlx::query(
            r#"
            UPDATE employees
            SET full_name = $1, phone = $2, position = $3, updated_at = NOW()
            WHERE id = $4
            "#,
        )
        .bind(input.full_name.as_deref().map(str::trim).unwrap_or(&existing.full_name))
        .bind(&phone)
        .bind(&position)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if role != existing.role {
            sqlx::query("UPDATE users SET role = $1, updated_at = NOW() WHERE id = $2")
                .bind(role.as_str())
                .bind(existing.user_id)
                .execute(&mut *tx)
                .await?;
            tracing::info!(employee_id = %id, from = %existing.role, to = %role, "Employee role changed");
        }

        tx.commit().await?;
        self.get(id).await
    }

    /// Enable or disable the employee's login
    pub async fn set_active(&self, id: Uuid, is_active: bool, actor: Uuid) -> AppResult<Employee> {
        let existing = self.get(id).await?;
        if existing.user_id == actor && !is_active {
            return Err(AppError::bad_request(
                "Cannot deactivate your own account",
                "Không thể khóa tài khoản của chính mình",
            ));
        }

        sqlx::query("UPDATE users SET is_active = $1, updated_at = NOW() WHERE id = $2")
            .bind(is_active)
            .bind(existing.user_id)
            .execute(&self.db)
            .await?;

        tracing::info!(employee_id = %id, is_active, "Employee activation changed");
        self.get(id).await
    }

    /// Remove the employee and their login
    pub async fn delete(&self, id: Uuid, actor: Uuid) -> AppResult<()> {
        let existing = self.get(id).await?;
        if existing.user_id == actor {
            return Err(AppError::bad_request(
                "Cannot delete your own account",
                "Không thể xóa tài khoản của chính mình",
            ));
        }

        // employees row goes with the user (ON DELETE CASCADE)
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(existing.user_id)
            .execute(&self.db)
            .await?;

        tracing::info!(employee_id = %id, username = %existing.username, "Employee deleted");
        Ok(())
    }
}

fn check_phone(phone: Option<String>) -> AppResult<Option<String>> {
    match phone.map(|p| p.trim().to_string()).filter(|p| !p.is_empty()) {
        Some(phone) => {
            validate_vn_phone(&phone).map_err(|msg| {
                AppError::validation("phone", msg, "Số điện thoại không hợp lệ")
            })?;
            Ok(Some(phone))
        }
        None => Ok(None),
    }
}

fn employee_not_found() -> AppError {
    AppError::not_found("Employee", "Không tìm thấy nhân viên")
}
