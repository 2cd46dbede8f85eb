use std::sync::Arc;

use amanah_core::dashboard::{
    DashboardMetrics, DashboardOverview, ManifestEntry, DEFAULT_RECENT_LIMIT,
};
use amanah_core::pilgrims::StatusCount;
use amanah_core::transactions::{CashflowMonth, TransactionDetail};
use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};

use crate::{
    api::shared::{LimitQuery, MonthsQuery},
    auth::{CurrentUser, FINANCE_ROLES},
    error::ApiResult,
    main_lib::AppState,
};

async fn overview(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
) -> ApiResult<Json<DashboardOverview>> {
    current.require(FINANCE_ROLES)?;
    Ok(Json(state.dashboard_service.overview()?))
}

async fn metrics(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
) -> ApiResult<Json<DashboardMetrics>> {
    current.require(FINANCE_ROLES)?;
    Ok(Json(state.dashboard_service.metrics()?))
}

async fn cashflow(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Query(query): Query<MonthsQuery>,
) -> ApiResult<Json<Vec<CashflowMonth>>> {
    current.require(FINANCE_ROLES)?;
    Ok(Json(state.dashboard_service.cashflow(query.months())?))
}

async fn manifest(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
) -> ApiResult<Json<Vec<ManifestEntry>>> {
    current.require(FINANCE_ROLES)?;
    Ok(Json(state.dashboard_service.manifest()?))
}

async fn recent(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Query(query): Query<LimitQuery>,
) -> ApiResult<Json<Vec<TransactionDetail>>> {
    current.require(FINANCE_ROLES)?;
    let recent = state
        .dashboard_service
        .recent_transactions(query.or(DEFAULT_RECENT_LIMIT))?;
    Ok(Json(recent))
}

async fn payment_status(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
) -> ApiResult<Json<Vec<StatusCount>>> {
    current.require(FINANCE_ROLES)?;
    Ok(Json(state.dashboard_service.payment_status()?))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/dashboard/overview", get(overview))
        .route("/dashboard/metrics", get(metrics))
        .route("/dashboard/cashflow", get(cashflow))
        .route("/dashboard/manifest", get(manifest))
        .route("/dashboard/recent", get(recent))
        .route("/dashboard/payment-status", get(payment_status))
}
