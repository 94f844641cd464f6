//! HTTP handlers for the kitchen display

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use shared::models::KitchenStatus;
use shared::types::ApiResponse;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::kitchen::{KitchenFilter, KitchenService, KitchenStats, KitchenTicket};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct KitchenStatusRequest {
    pub status: KitchenStatus,
}

fn service(state: &AppState) -> KitchenService {
    KitchenService::new(state.db.clone(), state.live.clone())
}

/// Tickets on the display, most urgent first
pub async fn list_tickets(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(filter): Query<KitchenFilter>,
) -> AppResult<Json<ApiResponse<Vec<KitchenTicket>>>> {
    current_user.0.require_kitchen()?;
    let tickets = service(&state).list(&filter).await?;
    Ok(Json(ApiResponse::list(tickets)))
}

pub async fn get_ticket(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<KitchenTicket>>> {
    current_user.0.require_kitchen()?;
    let ticket = service(&state).get(id).await?;
    Ok(Json(ApiResponse::ok(ticket)))
}

/// Move a ticket to a new status
pub async fn update_ticket_status(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(body): Json<KitchenStatusRequest>,
) -> AppResult<Json<ApiResponse<KitchenTicket>>> {
    current_user.0.require_kitchen()?;
    let ticket = service(&state).update_status(id, body.status).await?;
    Ok(Json(ApiResponse::ok(ticket)))
}

/// Start cooking
pub async fn start_ticket(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<KitchenTicket>>> {
    current_user.0.require_kitchen()?;
    let ticket = service(&state)
        .update_status(id, KitchenStatus::Preparing)
        .await?;
    Ok(Json(ApiResponse::ok(ticket).with_message("Bắt đầu chế biến")))
}

/// Food is ready to serve
pub async fn complete_ticket(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<KitchenTicket>>> {
    current_user.0.require_kitchen()?;
    let ticket = service(&state).update_status(id, KitchenStatus::Ready).await?;
    Ok(Json(ApiResponse::ok(ticket).with_message("Món đã sẵn sàng")))
}

/// Kitchen counters
pub async fn kitchen_stats(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<ApiResponse<KitchenStats>>> {
    current_user.0.require_kitchen()?;
    let stats = service(&state).stats().await?;
    Ok(Json(ApiResponse::ok(stats)))
}
