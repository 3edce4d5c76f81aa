use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::dashboard::{
        CoinsResponse, ConnectivityResponse, DashboardResponse, HistoryResponse,
    },
    services::{
        aggregation::{BalanceSummary, MathSummary},
        dashboard_service,
    },
    state::SharedState,
};

/// Read-only dashboard endpoints served from the last polled snapshot.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/dashboard", get(get_dashboard))
        .route("/dashboard/balance", get(get_balance))
        .route("/dashboard/coins", get(get_coins))
        .route("/dashboard/history", get(get_history))
        .route("/dashboard/math", get(get_math))
        .route("/dashboard/connectivity", get(get_connectivity))
}

#[utoipa::path(
    get,
    path = "/dashboard",
    tag = "dashboard",
    responses((status = 200, description = "Full dashboard view", body = DashboardResponse))
)]
/// Return every dashboard card in one payload.
pub async fn get_dashboard(State(state): State<SharedState>) -> Json<DashboardResponse> {
    Json(dashboard_service::get_dashboard(&state).await)
}

#[utoipa::path(
    get,
    path = "/dashboard/balance",
    tag = "dashboard",
    responses((status = 200, description = "Balance and savings goal progress", body = BalanceSummary))
)]
/// Return the balance and savings goal progress.
pub async fn get_balance(State(state): State<SharedState>) -> Json<BalanceSummary> {
    Json(dashboard_service::get_balance(&state).await)
}

#[utoipa::path(
    get,
    path = "/dashboard/coins",
    tag = "dashboard",
    responses((status = 200, description = "Coin counts per denomination", body = CoinsResponse))
)]
/// Return the coin breakdown.
pub async fn get_coins(State(state): State<SharedState>) -> Json<CoinsResponse> {
    Json(dashboard_service::get_coins(&state).await)
}

#[utoipa::path(
    get,
    path = "/dashboard/history",
    tag = "dashboard",
    responses((status = 200, description = "Normalized game history", body = HistoryResponse))
)]
/// Return the normalized game history.
pub async fn get_history(State(state): State<SharedState>) -> Json<HistoryResponse> {
    Json(dashboard_service::get_history(&state).await)
}

#[utoipa::path(
    get,
    path = "/dashboard/math",
    tag = "dashboard",
    responses((status = 200, description = "Math game statistics", body = MathSummary))
)]
/// Return math game sessions with accuracy and improvement trend.
pub async fn get_math(State(state): State<SharedState>) -> Json<MathSummary> {
    Json(dashboard_service::get_math(&state).await)
}

#[utoipa::path(
    get,
    path = "/dashboard/connectivity",
    tag = "dashboard",
    responses((status = 200, description = "Device connectivity", body = ConnectivityResponse))
)]
/// Return the current device connectivity.
pub async fn get_connectivity(State(state): State<SharedState>) -> Json<ConnectivityResponse> {
    Json(dashboard_service::get_connectivity(&state))
}
