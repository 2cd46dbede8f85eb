use std::sync::Arc;

use amanah_core::dashboard::DEFAULT_RECENT_LIMIT;
use amanah_core::transactions::{
    CashflowMonth, NewExpense, NewIncome, PostedIncome, Transaction, TransactionDetail,
    TransactionFilter, TransactionTotals, TransactionUpdate,
};
use amanah_core::utils::Page;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

use crate::{
    api::shared::{DateRangeQuery, LimitQuery, MonthsQuery, PageQuery},
    auth::{CurrentUser, FINANCE_ROLES, OWNER_ONLY},
    error::ApiResult,
    main_lib::AppState,
};

async fn list_transactions(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Query(page): Query<PageQuery>,
    Query(filter): Query<TransactionFilter>,
) -> ApiResult<Json<Page<TransactionDetail>>> {
    current.require(FINANCE_ROLES)?;
    let transactions = state
        .transaction_service
        .list_transactions(&filter, page.request())?;
    Ok(Json(transactions))
}

async fn get_transaction(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
) -> ApiResult<Json<TransactionDetail>> {
    current.require(FINANCE_ROLES)?;
    Ok(Json(state.transaction_service.get_transaction(&id)?))
}

async fn transaction_totals(
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

async fn transaction_cashflow(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Query(query): Query<MonthsQuery>,
) -> ApiResult<Json<Vec<CashflowMonth>>> {
    current.require(FINANCE_ROLES)?;
    Ok(Json(state.transaction_service.cashflow(query.months())?))
}

async fn recent_transactions(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Query(query): Query<LimitQuery>,
) -> ApiResult<Json<Vec<TransactionDetail>>> {
    current.require(FINANCE_ROLES)?;
    let recent = state
        .transaction_service
        .recent(query.or(DEFAULT_RECENT_LIMIT))?;
    Ok(Json(recent))
}

async fn post_income(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Json(income): Json<NewIncome>,
) -> ApiResult<(StatusCode, Json<PostedIncome>)> {
    let actor = current.require(FINANCE_ROLES)?;
    let posted = state.transaction_service.post_income(actor, income).await?;
    Ok((StatusCode::CREATED, Json(posted)))
}

async fn post_expense(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Json(expense): Json<NewExpense>,
) -> ApiResult<(StatusCode, Json<Transaction>)> {
    let actor = current.require(FINANCE_ROLES)?;
    let posted = state.transaction_service.post_expense(actor, expense).await?;
    Ok((StatusCode::CREATED, Json(posted)))
}

async fn update_transaction(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Json(update): Json<TransactionUpdate>,
) -> ApiResult<Json<Transaction>> {
    let actor = current.require(FINANCE_ROLES)?;
    let updated = state
        .transaction_service
        .update_transaction(actor, &id, update)
        .await?;
    Ok(Json(updated))
}

async fn delete_transaction(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
) -> ApiResult<StatusCode> {
    let actor = current.require(OWNER_ONLY)?;
    state.transaction_service.delete_transaction(actor, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/transactions", get(list_transactions))
        .route("/transactions/income", post(post_income))
        .route("/transactions/expense", post(post_expense))
        .route("/transactions/totals", get(transaction_totals))
        .route("/transactions/cashflow", get(transaction_cashflow))
        .route("/transactions/recent", get(recent_transactions))
        .route(
            "/transactions/{id}",
            get(get_transaction)
                .put(update_transaction)
                .delete(delete_transaction),
        )
}
