//! HTTP handlers for dining table endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use shared::types::ApiResponse;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::table::{
    CreateTableInput, DiningTable, TableQr, TableService, UpdateTableInput,
};
use crate::AppState;

fn service(state: &AppState) -> TableService {
    TableService::new(state.db.clone(), state.config.jwt.secret.clone())
}

/// List all tables
pub async fn list_tables(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<ApiResponse<Vec<DiningTable>>>> {
    let tables = service(&state).list().await?;
    Ok(Json(ApiResponse::list(tables)))
}

/// Get a table by number
pub async fn get_table(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(number): Path<i32>,
) -> AppResult<Json<ApiResponse<DiningTable>>> {
    let table = service(&state).get(number).await?;
    Ok(Json(ApiResponse::ok(table)))
}

/// Create a table
pub async fn create_table(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateTableInput>,
) -> AppResult<(StatusCode, Json<ApiResponse<DiningTable>>)> {
    current_user.0.require_manager()?;
    let table = service(&state).create(input).await?;
    let message = format!("Đã thêm bàn số {}", table.number);
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(table).with_message(message))))
}

/// Update a table
pub async fn update_table(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(number): Path<i32>,
    Json(input): Json<UpdateTableInput>,
) -> AppResult<Json<ApiResponse<DiningTable>>> {
    current_user.0.require_manager()?;
    let table = service(&state).update(number, input).await?;
    Ok(Json(ApiResponse::ok(table)))
}

/// Delete a table
pub async fn delete_table(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(number): Path<i32>,
) -> AppResult<StatusCode> {
    current_user.0.require_manager()?;
    service(&state).delete(number).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// QR ordering link for a table
pub async fn get_table_qr(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(number): Path<i32>,
) -> AppResult<Json<ApiResponse<TableQr>>> {
    current_user.0.require_manager()?;
    let qr = service(&state)
        .qr(number, &state.config.ordering.customer_app_url)
        .await?;
    Ok(Json(ApiResponse::ok(qr)))
}
