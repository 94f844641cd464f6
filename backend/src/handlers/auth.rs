//! Authentication handlers

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use shared::types::ApiResponse;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::auth::{LoginResult, Profile};
use crate::services::AuthService;
use crate::AppState;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

#[derive(Deserialize)]
pub struct RouteQuery {
    pub path: String,
}

#[derive(Serialize)]
pub struct RouteAccess {
    pub path: String,
    pub allowed: bool,
}

/// Login endpoint handler
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> AppResult<Json<ApiResponse<LoginResult>>> {
    let auth_service = AuthService::new(state.db.clone(), &state.config);
    let result = auth_service.login(body.username.trim(), &body.password).await?;
    Ok(Json(ApiResponse::ok(result).with_message("Đăng nhập thành công")))
}

/// Current user's profile, re-read from the database
pub async fn me(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<ApiResponse<Profile>>> {
    let auth_service = AuthService::new(state.db.clone(), &state.config);
    let profile = auth_service.profile(current_user.0.user_id).await?;
    Ok(Json(ApiResponse::ok(profile)))
}

/// Tokens are stateless; the client drops its copy
pub async fn logout(current_user: CurrentUser) -> Json<ApiResponse<()>> {
    tracing::info!(user = %current_user.0.username, "User logged out");
    Json(ApiResponse::ok(()).with_message("Đăng xuất thành công"))
}

pub async fn change_password(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(body): Json<ChangePasswordRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    let auth_service = AuthService::new(state.db.clone(), &state.config);
    auth_service
        .change_password(current_user.0.user_id, &body.old_password, &body.new_password)
        .await?;
    Ok(Json(ApiResponse::ok(()).with_message("Đổi mật khẩu thành công")))
}

/// Whether the caller's role may open a page
pub async fn check_route(
    current_user: CurrentUser,
    Query(query): Query<RouteQuery>,
) -> Json<ApiResponse<RouteAccess>> {
    let allowed = current_user.0.role.can_access(&query.path);
    Json(ApiResponse::ok(RouteAccess {
        path: query.path,
        allowed,
    }))
}
