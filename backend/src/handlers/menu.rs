//! HTTP handlers for menu endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use shared::models::MenuStatus;
use shared::types::ApiResponse;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::menu::{
    Category, CreateMenuItemInput, MenuFilter, MenuItem, MenuService, UpdateMenuItemInput,
};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct MenuStatusRequest {
    pub status: MenuStatus,
}

/// List menu items for staff screens
pub async fn list_menu(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(filter): Query<MenuFilter>,
) -> AppResult<Json<ApiResponse<Vec<MenuItem>>>> {
    let service = MenuService::new(state.db);
    let items = service.list(&filter).await?;
    Ok(Json(ApiResponse::list(items)))
}

/// Available dishes for the customer ordering page (public)
pub async fn list_public_menu(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<MenuItem>>>> {
    let service = MenuService::new(state.db);
    let items = service.list_public().await?;
    Ok(Json(ApiResponse::list(items)))
}

/// List categories (public)
pub async fn list_categories(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<Category>>>> {
    let service = MenuService::new(state.db);
    let categories = service.list_categories().await?;
    Ok(Json(ApiResponse::list(categories)))
}

/// Get a menu item
pub async fn get_menu_item(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<MenuItem>>> {
    let service = MenuService::new(state.db);
    let item = service.get(id).await?;
    Ok(Json(ApiResponse::ok(item)))
}

/// Create a menu item
pub async fn create_menu_item(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateMenuItemInput>,
) -> AppResult<(StatusCode, Json<ApiResponse<MenuItem>>)> {
    current_user.0.require_manager()?;
    let service = MenuService::new(state.db);
    let item = service.create(input).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(item).with_message("Thêm món thành công")),
    ))
}

/// Update a menu item
pub async fn update_menu_item(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateMenuItemInput>,
) -> AppResult<Json<ApiResponse<MenuItem>>> {
    current_user.0.require_manager()?;
    let service = MenuService::new(state.db);
    let item = service.update(id, input).await?;
    Ok(Json(ApiResponse::ok(item).with_message("Cập nhật món thành công")))
}

/// Mark a dish available or sold out
pub async fn set_menu_item_status(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(body): Json<MenuStatusRequest>,
) -> AppResult<Json<ApiResponse<MenuItem>>> {
    current_user.0.require_manager()?;
    let service = MenuService::new(state.db);
    let item = service.set_status(id, body.status).await?;
    Ok(Json(ApiResponse::ok(item)))
}

/// Delete a menu item
pub async fn delete_menu_item(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    current_user.0.require_manager()?;
    let service = MenuService::new(state.db);
    service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
