//! Route definitions for the restaurant POS API

use axum::{
    middleware,
    routing::{get, patch, post, put},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .nest("/auth", auth_routes())
        .nest("/menu", menu_routes())
        .nest("/tables", table_routes())
        .nest("/orders", order_routes())
        .nest("/kitchen", kitchen_routes())
        .nest("/cashier", cashier_routes())
        .nest("/employees", employee_routes())
        .nest("/inventory", inventory_routes())
        .nest("/bank-accounts", bank_account_routes())
        .nest("/dashboard", dashboard_routes())
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new()
        // Public: login and the customer ordering page
        .route("/auth/login", post(handlers::login))
        .route("/menu/public", get(handlers::list_public_menu))
        .route("/menu/categories", get(handlers::list_categories))
        .route("/orders/public", post(handlers::create_public_order))
        // Authenticated through the query string
        .route("/orders/live", get(handlers::order_feed))
        .merge(protected)
}

/// Session routes (protected)
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(handlers::me))
        .route("/logout", post(handlers::logout))
        .route("/change-password", post(handlers::change_password))
        .route("/check-route", get(handlers::check_route))
}

fn menu_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_menu).post(handlers::create_menu_item))
        .route(
            "/:id",
            get(handlers::get_menu_item)
                .put(handlers::update_menu_item)
                .delete(handlers::delete_menu_item),
        )
        .route("/:id/status", patch(handlers::set_menu_item_status))
}

fn table_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_tables).post(handlers::create_table))
        .route(
            "/:number",
            get(handlers::get_table)
                .put(handlers::update_table)
                .delete(handlers::delete_table),
        )
        .route("/:number/qr", get(handlers::get_table_qr))
}

fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_orders).post(handlers::create_order))
        .route("/:id", get(handlers::get_order))
        .route("/:id/status", put(handlers::update_order_status))
        .route("/:id/cancel", put(handlers::cancel_order))
        .route("/:id/mark-paid", post(handlers::mark_order_paid))
}

fn kitchen_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_tickets))
        .route("/stats/summary", get(handlers::kitchen_stats))
        .route("/:id", get(handlers::get_ticket))
        .route("/:id/status", put(handlers::update_ticket_status))
        .route("/:id/start", post(handlers::start_ticket))
        .route("/:id/complete", post(handlers::complete_ticket))
}

fn cashier_routes() -> Router<AppState> {
    Router::new()
        .route("/pending", get(handlers::pending_orders))
        .route("/orders/:id", get(handlers::order_bill))
        .route("/payment", post(handlers::process_payment))
        .route("/payment/split", post(handlers::split_payment))
        .route("/transactions/today", get(handlers::today_transactions))
        .route("/shift/report", get(handlers::shift_report))
        .route("/refund/:id", post(handlers::refund_order))
}

fn employee_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_employees).post(handlers::create_employee))
        .route("/positions", get(handlers::employee_positions))
        .route(
            "/:id",
            get(handlers::get_employee)
                .put(handlers::update_employee)
                .delete(handlers::delete_employee),
        )
        .route("/:id/active", patch(handlers::set_employee_active))
}

fn inventory_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_items).post(handlers::create_item))
        .route("/history", get(handlers::stock_history))
        .route("/summary", get(handlers::inventory_summary))
        .route(
            "/:id",
            get(handlers::get_item)
                .put(handlers::update_item)
                .delete(handlers::delete_item),
        )
        .route("/:id/stock-in", post(handlers::stock_in))
        .route("/:id/stock-out", post(handlers::stock_out))
}

fn bank_account_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_bank_accounts).post(handlers::create_bank_account),
        )
        .route("/active", get(handlers::list_active_bank_accounts))
        .route("/stats", get(handlers::bank_account_stats))
        .route("/supported", get(handlers::supported_banks))
        .route(
            "/:id",
            get(handlers::get_bank_account)
                .put(handlers::update_bank_account)
                .delete(handlers::delete_bank_account),
        )
        .route("/:id/toggle", patch(handlers::toggle_bank_account))
}

fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/stats", get(handlers::dashboard_stats))
        .route("/revenue", get(handlers::revenue_report))
        .route("/orders/chart", get(handlers::order_chart))
        .route("/categories/stats", get(handlers::category_stats))
        .route("/today", get(handlers::today_summary))
        .route("/performance/hourly", get(handlers::hourly_performance))
}
