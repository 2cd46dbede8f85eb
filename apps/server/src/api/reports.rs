use std::sync::Arc;

use amanah_core::reports::{
    BudgetActualFilter, BudgetActualReport, ProfitLossFilter, ProfitLossReport,
};
use amanah_core::transactions::TransactionTotals;
use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};

use crate::{
    api::shared::DateRangeQuery,
    auth::{CurrentUser, FINANCE_ROLES, OWNER_ONLY},
    error::ApiResult,
    main_lib::AppState,
};

async fn profit_loss(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Query(filter): Query<ProfitLossFilter>,
) -> ApiResult<Json<ProfitLossReport>> {
    current.require(OWNER_ONLY)?;
    Ok(Json(state.report_service.profit_loss(&filter)?))
}

async fn budget_actual(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Query(filter): Query<BudgetActualFilter>,
) -> ApiResult<Json<BudgetActualReport>> {
    current.require(OWNER_ONLY)?;
    Ok(Json(state.report_service.budget_actual(&filter)?))
}

async fn totals(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Query(range): Query<DateRangeQuery>,
) -> ApiResult<Json<TransactionTotals>> {
    current.require(FINANCE_ROLES)?;
    let totals = state
        .transaction_service
        .totals(range.start_date, range.end_date)?;
    Ok(Json(totals))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/reports/profit-loss", get(profit_loss))
        .route("/reports/budget-actual", get(budget_actual))
        .route("/reports/totals", get(totals))
}
