//! HTTP handlers for inventory management endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use shared::models::MovementKind;
use shared::types::ApiResponse;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::inventory::{
    CreateInventoryInput, HistoryQuery, InventoryFilter, InventoryItem, InventoryService,
    InventorySummary, StockChange, StockMovement, StockMovementInput, UpdateInventoryInput,
};
use crate::AppState;

/// List inventory items
pub async fn list_items(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(filter): Query<InventoryFilter>,
) -> AppResult<Json<ApiResponse<Vec<InventoryItem>>>> {
    let service = InventoryService::new(state.db);
    let items = service.list(&filter).await?;
    Ok(Json(ApiResponse::list(items)))
}

/// Get an inventory item
pub async fn get_item(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<InventoryItem>>> {
    let service = InventoryService::new(state.db);
    let item = service.get(id).await?;
    Ok(Json(ApiResponse::ok(item)))
}

/// Create an inventory item
pub async fn create_item(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateInventoryInput>,
) -> AppResult<(StatusCode, Json<ApiResponse<InventoryItem>>)> {
    current_user.0.require_manager()?;
    let service = InventoryService::new(state.db);
    let item = service.create(input, &current_user.0).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(item).with_message("Thêm nguyên liệu thành công")),
    ))
}

/// Update an inventory item
pub async fn update_item(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateInventoryInput>,
) -> AppResult<Json<ApiResponse<InventoryItem>>> {
    current_user.0.require_manager()?;
    let service = InventoryService::new(state.db);
    let item = service.update(id, input).await?;
    Ok(Json(ApiResponse::ok(item)))
}

/// Delete an inventory item
pub async fn delete_item(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    current_user.0.require_manager()?;
    let service = InventoryService::new(state.db);
    service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Receive stock
pub async fn stock_in(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<StockMovementInput>,
) -> AppResult<Json<ApiResponse<StockChange>>> {
    current_user.0.require_manager()?;
    let service = InventoryService::new(state.db);
    let change = service
        .move_stock(id, MovementKind::In, input, &current_user.0)
        .await?;
    Ok(Json(ApiResponse::ok(change).with_message("Nhập kho thành công")))
}

/// Issue stock
pub async fn stock_out(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<StockMovementInput>,
) -> AppResult<Json<ApiResponse<StockChange>>> {
    current_user.0.require_manager()?;
    let service = InventoryService::new(state.db);
    let change = service
        .move_stock(id, MovementKind::Out, input, &current_user.0)
        .await?;
    Ok(Json(ApiResponse::ok(change).with_message("Xuất kho thành công")))
}

/// Stock movement history
pub async fn stock_history(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<HistoryQuery>,
) -> AppResult<Json<ApiResponse<Vec<StockMovement>>>> {
    let service = InventoryService::new(state.db);
    let history = service.history(&query).await?;
    Ok(Json(ApiResponse::list(history)))
}

/// Inventory totals and alerts
pub async fn inventory_summary(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<ApiResponse<InventorySummary>>> {
    let service = InventoryService::new(state.db);
    let summary = service.summary().await?;
    Ok(Json(ApiResponse::ok(summary)))
}
