//! HTTP handlers for employee management

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use shared::types::ApiResponse;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::employee::{
    CreateEmployeeInput, Employee, EmployeeFilter, EmployeeService, UpdateEmployeeInput,
};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ActiveRequest {
    pub is_active: bool,
}

/// Positions offered by the staff form
pub async fn employee_positions(
    current_user: CurrentUser,
) -> AppResult<Json<ApiResponse<Vec<&'static str>>>> {
    current_user.0.require_manager()?;
    Ok(Json(ApiResponse::list(shared::models::POSITIONS.to_vec())))
}

/// List employees
pub async fn list_employees(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(filter): Query<EmployeeFilter>,
) -> AppResult<Json<ApiResponse<Vec<Employee>>>> {
    current_user.0.require_manager()?;
    let service = EmployeeService::new(state.db);
    let employees = service.list(&filter).await?;
    Ok(Json(ApiResponse::list(employees)))
}

/// Get an employee
pub async fn get_employee(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Employee>>> {
    current_user.0.require_manager()?;
    let service = EmployeeService::new(state.db);
    let employee = service.get(id).await?;
    Ok(Json(ApiResponse::ok(employee)))
}

/// Hire an employee
pub async fn create_employee(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateEmployeeInput>,
) -> AppResult<(StatusCode, Json<ApiResponse<Employee>>)> {
    current_user.0.require_manager()?;
    let service = EmployeeService::new(state.db);
    let employee = service.create(input).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(employee).with_message("Thêm nhân viên thành công")),
    ))
}

/// Update an employee
pub async fn update_employee(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateEmployeeInput>,
) -> AppResult<Json<ApiResponse<Employee>>> {
    current_user.0.require_manager()?;
    let service = EmployeeService::new(state.db);
    let employee = service.update(id, input).await?;
    Ok(Json(ApiResponse::ok(employee).with_message("Cập nhật nhân viên thành công")))
}

/// Lock or unlock an employee's login
pub async fn set_employee_active(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(body): Json<ActiveRequest>,
) -> AppResult<Json<ApiResponse<Employee>>> {
    current_user.0.require_manager()?;
    let service = EmployeeService::new(state.db);
    let employee = service
        .set_active(id, body.is_active, current_user.0.user_id)
        .await?;
    Ok(Json(ApiResponse::ok(employee)))
}

/// Delete an employee
pub async fn delete_employee(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    current_user.0.require_manager()?;
    let service = EmployeeService::new(state.db);
    service.delete(id, current_user.0.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
