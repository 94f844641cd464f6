//! HTTP handlers for order endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use shared::models::OrderStatus;
use shared::types::ApiResponse;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::cashier::{CashierService, PaymentReceipt};
use crate::services::order::{CreateOrderInput, Order, OrderFilter, OrderService, OrderSource};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct OrderStatusRequest {
    pub status: OrderStatus,
}

#[derive(Debug, Default, Deserialize)]
pub struct CancelOrderRequest {
    pub reason: Option<String>,
}

fn service(state: &AppState) -> OrderService {
    OrderService::new(state.db.clone(), state.live.clone())
}

/// Place an order from the table QR page (public)
pub async fn create_public_order(
    State(state): State<AppState>,
    Json(input): Json<CreateOrderInput>,
) -> AppResult<(StatusCode, Json<ApiResponse<Order>>)> {
    let source = OrderSource::Customer {
        require_token: state.config.ordering.require_table_token,
    };
    let order = service(&state).create(input, source).await?;
    Ok((
        StatusCode::CREATED,
        Json(
            ApiResponse::ok(order)
                .with_message("Đặt món thành công! Nhân viên sẽ phục vụ trong giây lát."),
        ),
    ))
}

/// Place an order on behalf of a table
pub async fn create_order(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateOrderInput>,
) -> AppResult<(StatusCode, Json<ApiResponse<Order>>)> {
    let source = OrderSource::Staff {
        user_id: current_user.0.user_id,
    };
    let order = service(&state).create(input, source).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(order).with_message("Tạo đơn hàng thành công")),
    ))
}

/// List orders
pub async fn list_orders(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(filter): Query<OrderFilter>,
) -> AppResult<Json<ApiResponse<Vec<Order>>>> {
    let orders = service(&state).list(&filter).await?;
    Ok(Json(ApiResponse::list(orders)))
}

/// Get an order
pub async fn get_order(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let order = service(&state).get(id).await?;
    Ok(Json(ApiResponse::ok(order)))
}

/// Move an order to a new status
pub async fn update_order_status(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(body): Json<OrderStatusRequest>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let order = service(&state).update_status(id, body.status).await?;
    Ok(Json(ApiResponse::ok(order).with_message("Cập nhật trạng thái thành công")))
}

/// Cancel an order
pub async fn cancel_order(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(id): Path<Uuid>,
    body: Option<Json<CancelOrderRequest>>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let reason = body.and_then(|Json(b)| b.reason);
    let order = service(&state).cancel(id, reason).await?;
    Ok(Json(ApiResponse::ok(order).with_message("Đã hủy đơn hàng")))
}

/// Settle an order in cash from the staff page
pub async fn mark_order_paid(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<PaymentReceipt>>> {
    let cashier = CashierService::new(
        state.db.clone(),
        state.live.clone(),
        state.config.ordering.charge_rates(),
    );
    let receipt = cashier.settle_ready(id, current_user.0.user_id).await?;
    Ok(Json(ApiResponse::ok(receipt).with_message("Thanh toán thành công")))
}
