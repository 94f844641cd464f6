//! HTTP handlers for cashier endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use shared::types::ApiResponse;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::cashier::{
    CashierService, OrderBill, PaymentInput, PaymentReceipt, RefundInput, RefundResult,
    ShiftQuery, ShiftReport, SplitInput, SplitResult, TodayTransactions,
};
use crate::services::order::Order;
use crate::AppState;

fn service(state: &AppState) -> CashierService {
    CashierService::new(
        state.db.clone(),
        state.live.clone(),
        state.config.ordering.charge_rates(),
    )
}

/// Orders waiting for payment
pub async fn pending_orders(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<ApiResponse<Vec<Order>>>> {
    current_user.0.require_cashier()?;
    let orders = service(&state).pending().await?;
    Ok(Json(ApiResponse::list(orders)))
}

/// Order with its bill breakdown
pub async fn order_bill(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<OrderBill>>> {
    current_user.0.require_cashier()?;
    let bill = service(&state).bill(id).await?;
    Ok(Json(ApiResponse::ok(bill)))
}

/// Take payment for an order
pub async fn process_payment(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<PaymentInput>,
) -> AppResult<Json<ApiResponse<PaymentReceipt>>> {
    current_user.0.require_cashier()?;
    let receipt = service(&state).pay(input, current_user.0.user_id).await?;
    Ok(Json(ApiResponse::ok(receipt).with_message("Payment processed successfully")))
}

/// Split a bill evenly
pub async fn split_payment(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<SplitInput>,
) -> AppResult<Json<ApiResponse<SplitResult>>> {
    current_user.0.require_cashier()?;
    let split = service(&state).split(input).await?;
    Ok(Json(ApiResponse::ok(split)))
}

/// Today's completed orders
pub async fn today_transactions(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<ApiResponse<TodayTransactions>>> {
    current_user.0.require_cashier()?;
    let today = service(&state).transactions_today().await?;
    Ok(Json(ApiResponse::ok(today)))
}

/// Shift report for the current cashier
pub async fn shift_report(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<ShiftQuery>,
) -> AppResult<Json<ApiResponse<ShiftReport>>> {
    current_user.0.require_cashier()?;
    let report = service(&state)
        .shift_report(&query, current_user.0.user_id, &current_user.0.username)
        .await?;
    Ok(Json(ApiResponse::ok(report)))
}

/// Refund a completed order
pub async fn refund_order(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<RefundInput>,
) -> AppResult<Json<ApiResponse<RefundResult>>> {
    current_user.0.require_cashier()?;
    let refund = service(&state).refund(id, input).await?;
    Ok(Json(ApiResponse::ok(refund).with_message("Refund processed successfully")))
}
