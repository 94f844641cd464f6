//! Dashboard handlers for sales analytics and CSV export

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::types::ApiResponse;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::dashboard::{
    parse_period, DashboardQuery, DashboardService, DashboardStats, HourlyPerformance,
    OrderChartPoint, RevenueQuery, TodaySummary,
};
use crate::AppState;

fn csv_download<T: Serialize>(rows: &[T], filename: &str) -> AppResult<Response> {
    let csv = DashboardService::export_to_csv(rows)?;
    let disposition = format!("attachment; filename=\"{}\"", filename);
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv,
    )
        .into_response())
}

/// Headline sales figures
pub async fn dashboard_stats(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<DashboardQuery>,
) -> AppResult<Json<ApiResponse<DashboardStats>>> {
    current_user.0.require_manager()?;
    let service = DashboardService::new(state.db);
    let stats = service.stats(&query).await?;
    Ok(Json(ApiResponse::ok(stats)))
}

/// Revenue chart (JSON or CSV)
pub async fn revenue_report(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<RevenueQuery>,
) -> AppResult<Response> {
    current_user.0.require_manager()?;
    let period = parse_period(query.period.as_deref())?;
    let service = DashboardService::new(state.db);
    let report = service.revenue(period, query.limit).await?;

    if query.format.as_deref().is_some_and(|f| f.eq_ignore_ascii_case("csv")) {
        let filename = format!("revenue_{}.csv", report.period);
        return csv_download(&report.points, &filename);
    }
    Ok(Json(ApiResponse::ok(report)).into_response())
}

pub async fn order_chart(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<ApiResponse<Vec<OrderChartPoint>>>> {
    current_user.0.require_manager()?;
    let service = DashboardService::new(state.db);
    let points = service.order_chart().await?;
    Ok(Json(ApiResponse::list(points)))
}

/// Sales by category (JSON or CSV)
pub async fn category_stats(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<DashboardQuery>,
) -> AppResult<Response> {
    current_user.0.require_manager()?;
    let service = DashboardService::new(state.db);
    let stats = service.category_stats(&query).await?;

    if query.wants_csv() {
        return csv_download(&stats, "category_sales.csv");
    }
    Ok(Json(ApiResponse::list(stats)).into_response())
}

pub async fn today_summary(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<ApiResponse<TodaySummary>>> {
    current_user.0.require_manager()?;
    let service = DashboardService::new(state.db);
    let summary = service.today().await?;
    Ok(Json(ApiResponse::ok(summary)))
}

pub async fn hourly_performance(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<ApiResponse<Vec<HourlyPerformance>>>> {
    current_user.0.require_manager()?;
    let service = DashboardService::new(state.db);
    let hours = service.hourly().await?;
    Ok(Json(ApiResponse::list(hours)))
}
