//! Error handling for the restaurant POS
//!
//! Provides consistent error responses in Vietnamese and English

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication errors
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Account disabled")]
    AccountDisabled,

    #[error("Insufficient permissions")]
    InsufficientPermissions,

    #[error("Unauthorized: {message}")]
    Unauthorized {
        message: String,
        message_vi: String,
    },

    // Validation errors
    #[error("Validation error: {message}")]
    Validation {
        field: String,
        message: String,
        message_vi: String,
    },

    #[error("Bad request: {message}")]
    BadRequest {
        message: String,
        message_vi: String,
    },

    #[error("Conflict: {message}")]
    Conflict {
        resource: String,
        message: String,
        message_vi: String,
    },

    #[error("Resource not found: {resource}")]
    NotFound {
        resource: String,
        message_vi: String,
    },

    // Business logic errors
    #[error("Invalid state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Insufficient stock: {0}")]
    InsufficientStock(String),

    // Database errors
    #[error("Database error: {0}")]
    DatabaseError(sqlx::Error),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

impl AppError {
    pub fn validation(field: &str, message: &str, message_vi: &str) -> Self {
        AppError::Validation {
            field: field.to_string(),
            message: message.to_string(),
            message_vi: message_vi.to_string(),
        }
    }

    pub fn bad_request(message: impl Into<String>, message_vi: impl Into<String>) -> Self {
        AppError::BadRequest {
            message: message.into(),
            message_vi: message_vi.into(),
        }
    }

    pub fn not_found(resource: &str, message_vi: impl Into<String>) -> Self {
        AppError::NotFound {
            resource: resource.to_string(),
            message_vi: message_vi.into(),
        }
    }

    pub fn conflict(resource: &str, message: impl Into<String>, message_vi: impl Into<String>) -> Self {
        AppError::Conflict {
            resource: resource.to_string(),
            message: message.into(),
            message_vi: message_vi.into(),
        }
    }

    pub fn transition(from: impl ToString, to: impl ToString) -> Self {
        AppError::InvalidStateTransition {
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            if db.is_unique_violation() {
                return unique_violation(db.constraint());
            }
        }
        AppError::DatabaseError(err)
    }
}

/// A concurrent insert won the race past the existence check
fn unique_violation(constraint: Option<&str>) -> AppError {
    match constraint {
        Some("dining_tables_number_key") => {
            AppError::conflict("Table", "Table number already exists", "Số bàn đã tồn tại")
        }
        Some("users_username_key") => AppError::conflict(
            "username",
            "Username already exists",
            "Tên đăng nhập đã tồn tại",
        ),
        Some("categories_name_key") => AppError::conflict(
            "Category",
            "Category name already exists",
            "Tên danh mục đã tồn tại",
        ),
        Some("bank_accounts_bank_name_account_number_key") => AppError::conflict(
            "account_number",
            "Account number already exists for this bank",
            "Số tài khoản này đã tồn tại cho ngân hàng đã chọn",
        ),
        _ => AppError::conflict("record", "Record already exists", "Dữ liệu đã tồn tại"),
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let (field, message) = errors
            .field_errors()
            .into_iter()
            .next()
            .map(|(field, errs)| {
                let message = errs
                    .first()
                    .and_then(|e| e.message.as_ref().map(|m| m.to_string()))
                    .unwrap_or_else(|| format!("Invalid value for {}", field));
                (field.to_string(), message)
            })
            .unwrap_or_else(|| ("body".to_string(), "Invalid request body".to_string()));

        AppError::Validation {
            message_vi: format!("Dữ liệu không hợp lệ: {}", field),
            field,
            message,
        }
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message_en: String,
    pub message_vi: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ErrorResponse {
    pub fn new(code: &str, message_en: impl Into<String>, message_vi: impl Into<String>) -> Self {
        Self {
            success: false,
            error: ErrorDetail {
                code: code.to_string(),
                message_en: message_en.into(),
                message_vi: message_vi.into(),
                field: None,
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = match &self {
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                ErrorDetail {
                    code: "INVALID_CREDENTIALS".to_string(),
                    message_en: "Invalid username or password".to_string(),
                    message_vi: "Tên đăng nhập hoặc mật khẩu không đúng".to_string(),
                    field: None,
                },
            ),
            AppError::TokenExpired => (
                StatusCode::UNAUTHORIZED,
                ErrorDetail {
                    code: "TOKEN_EXPIRED".to_string(),
                    message_en: "Token has expired".to_string(),
                    message_vi: "Phiên đăng nhập đã hết hạn".to_string(),
                    field: None,
                },
            ),
            AppError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                ErrorDetail {
                    code: "INVALID_TOKEN".to_string(),
                    message_en: "Invalid token".to_string(),
                    message_vi: "Token không hợp lệ".to_string(),
                    field: None,
                },
            ),
            AppError::AccountDisabled => (
                StatusCode::FORBIDDEN,
                ErrorDetail {
                    code: "ACCOUNT_DISABLED".to_string(),
                    message_en: "Account has been disabled".to_string(),
                    message_vi: "Tài khoản đã bị vô hiệu hóa. Vui lòng liên hệ quản lý."
                        .to_string(),
                    field: None,
                },
            ),
            AppError::InsufficientPermissions => (
                StatusCode::FORBIDDEN,
                ErrorDetail {
                    code: "INSUFFICIENT_PERMISSIONS".to_string(),
                    message_en: "You do not have permission to perform this action".to_string(),
                    message_vi: "Bạn không có quyền thực hiện thao tác này".to_string(),
                    field: None,
                },
            ),
            AppError::Unauthorized { message, message_vi } => (
                StatusCode::UNAUTHORIZED,
                ErrorDetail {
                    code: "UNAUTHORIZED".to_string(),
                    message_en: message.clone(),
                    message_vi: message_vi.clone(),
                    field: None,
                },
            ),
            AppError::Validation { field, message, message_vi } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "VALIDATION_ERROR".to_string(),
                    message_en: message.clone(),
                    message_vi: message_vi.clone(),
                    field: Some(field.clone()),
                },
            ),
            AppError::BadRequest { message, message_vi } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "BAD_REQUEST".to_string(),
                    message_en: message.clone(),
                    message_vi: message_vi.clone(),
                    field: None,
                },
            ),
            AppError::Conflict { resource, message, message_vi } => (
                StatusCode::CONFLICT,
                ErrorDetail {
                    code: "CONFLICT".to_string(),
                    message_en: message.clone(),
                    message_vi: message_vi.clone(),
                    field: Some(resource.clone()),
                },
            ),
            AppError::NotFound { resource, message_vi } => (
                StatusCode::NOT_FOUND,
                ErrorDetail {
                    code: "NOT_FOUND".to_string(),
                    message_en: format!("{} not found", resource),
                    message_vi: message_vi.clone(),
                    field: None,
                },
            ),
            AppError::InvalidStateTransition { from, to } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "INVALID_STATE_TRANSITION".to_string(),
                    message_en: format!("Cannot change status from {} to {}", from, to),
                    message_vi: format!("Không thể chuyển trạng thái từ {} sang {}", from, to),
                    field: Some("status".to_string()),
                },
            ),
            AppError::InsufficientStock(item) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorDetail {
                    code: "INSUFFICIENT_STOCK".to_string(),
                    message_en: format!("Not enough stock for {}", item),
                    message_vi: format!("Không đủ hàng: {}", item),
                    field: Some("quantity".to_string()),
                },
            ),
            AppError::DatabaseError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "DATABASE_ERROR".to_string(),
                    message_en: "A database error occurred".to_string(),
                    message_vi: "Lỗi cơ sở dữ liệu".to_string(),
                    field: None,
                },
            ),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "INTERNAL_ERROR".to_string(),
                    message_en: msg.clone(),
                    message_vi: "Lỗi máy chủ nội bộ".to_string(),
                    field: None,
                },
            ),
            AppError::InternalError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "INTERNAL_ERROR".to_string(),
                    message_en: "An internal server error occurred".to_string(),
                    message_vi: "Lỗi máy chủ nội bộ".to_string(),
                    field: None,
                },
            ),
        };

        if status.is_server_error() {
            tracing::error!("Error: {:?}", self);
        } else {
            tracing::debug!(code = %error_detail.code, "Request rejected: {}", self);
        }

        (
            status,
            Json(ErrorResponse {
                success: false,
                error: error_detail,
            }),
        )
            .into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_violations_become_conflicts() {
        let err = unique_violation(Some("dining_tables_number_key"));
        assert!(matches!(&err, AppError::Conflict { resource, .. } if resource == "Table"));
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);

        let err = unique_violation(Some("bank_accounts_bank_name_account_number_key"));
        assert!(matches!(err, AppError::Conflict { resource, .. } if resource == "account_number"));

        assert!(matches!(unique_violation(None), AppError::Conflict { .. }));
    }

    #[test]
    fn other_database_errors_stay_internal() {
        let err = AppError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, AppError::DatabaseError(_)));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
