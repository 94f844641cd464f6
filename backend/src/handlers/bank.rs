//! HTTP handlers for bank account administration

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use shared::models::{SupportedBank, SUPPORTED_BANKS};
use shared::types::ApiResponse;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::bank::{
    BankAccount, BankAccountFilter, BankAccountService, BankAccountStats, CreateBankAccountInput,
    UpdateBankAccountInput,
};
use crate::AppState;

/// List bank accounts
pub async fn list_bank_accounts(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(filter): Query<BankAccountFilter>,
) -> AppResult<Json<ApiResponse<Vec<BankAccount>>>> {
    current_user.0.require_manager()?;
    let service = BankAccountService::new(state.db);
    let accounts = service.list(&filter).await?;
    Ok(Json(ApiResponse::list(accounts)))
}

/// Active accounts for transfer payments (cashier screen)
pub async fn list_active_bank_accounts(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<ApiResponse<Vec<BankAccount>>>> {
    current_user.0.require_cashier()?;
    let service = BankAccountService::new(state.db);
    let accounts = service.list_active().await?;
    Ok(Json(ApiResponse::list(accounts)))
}

pub async fn bank_account_stats(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<ApiResponse<BankAccountStats>>> {
    current_user.0.require_manager()?;
    let service = BankAccountService::new(state.db);
    let stats = service.stats().await?;
    Ok(Json(ApiResponse::ok(stats)))
}

/// Banks the restaurant can register accounts with
pub async fn supported_banks(
    _current_user: CurrentUser,
) -> Json<ApiResponse<Vec<SupportedBank>>> {
    Json(ApiResponse::list(SUPPORTED_BANKS.to_vec()))
}

pub async fn get_bank_account(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<BankAccount>>> {
    current_user.0.require_manager()?;
    let service = BankAccountService::new(state.db);
    let account = service.get(id).await?;
    Ok(Json(ApiResponse::ok(account)))
}

pub async fn create_bank_account(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateBankAccountInput>,
) -> AppResult<(StatusCode, Json<ApiResponse<BankAccount>>)> {
    current_user.0.require_manager()?;
    let service = BankAccountService::new(state.db);
    let account = service.create(input).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(account).with_message("Thêm tài khoản ngân hàng thành công")),
    ))
}

pub async fn update_bank_account(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateBankAccountInput>,
) -> AppResult<Json<ApiResponse<BankAccount>>> {
    current_user.0.require_manager()?;
    let service = BankAccountService::new(state.db);
    let account = service.update(id, input).await?;
    Ok(Json(ApiResponse::ok(account).with_message("Cập nhật tài khoản thành công")))
}

/// Lock or unlock an account
pub async fn toggle_bank_account(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<BankAccount>>> {
    current_user.0.require_manager()?;
    let service = BankAccountService::new(state.db);
    let account = service.toggle(id).await?;
    let message = if account.record.is_active {
        "Đã mở khóa tài khoản"
    } else {
        "Đã khóa tài khoản"
    };
    Ok(Json(ApiResponse::ok(account).with_message(message)))
}

pub async fn delete_bank_account(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    current_user.0.require_manager()?;
    let service = BankAccountService::new(state.db);
    service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
