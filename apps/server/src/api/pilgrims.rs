use std::sync::Arc;

use amanah_core::invoices::Invoice;
use amanah_core::pilgrims::{
    BulkPilgrimUpdate, NewPilgrim, Pilgrim, PilgrimCreated, PilgrimFilter, PilgrimStats,
    PilgrimUpdate,
};
use amanah_core::utils::Page;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};

use crate::{
    api::shared::PageQuery,
    auth::{CurrentUser, ADMIN_ROLES, FINANCE_ROLES, OWNER_ONLY},
    error::ApiResult,
    main_lib::AppState,
};

async fn list_pilgrims(
    State(state): State<Arc<AppState>>,
    Query(page): Query<PageQuery>,
    Query(filter): Query<PilgrimFilter>,
) -> ApiResult<Json<Page<Pilgrim>>> {
    let pilgrims = state.pilgrim_service.list_pilgrims(&filter, page.request())?;
    Ok(Json(pilgrims))
}

async fn get_pilgrim(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Pilgrim>> {
    Ok(Json(state.pilgrim_service.get_pilgrim(&id)?))
}

async fn pilgrim_stats(State(state): State<Arc<AppState>>) -> ApiResult<Json<PilgrimStats>> {
    Ok(Json(state.pilgrim_service.stats()?))
}

async fn outstanding_pilgrims(
    State(state): State<Arc<AppState>>,
    Query(page): Query<PageQuery>,
) -> ApiResult<Json<Page<Pilgrim>>> {
    Ok(Json(state.pilgrim_service.outstanding(page.request())?))
}

async fn pilgrim_invoices(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
) -> ApiResult<Json<Vec<Invoice>>> {
    current.require(FINANCE_ROLES)?;
    Ok(Json(state.invoice_service.list_pilgrim_invoices(&id)?))
}

async fn create_pilgrim(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Json(pilgrim): Json<NewPilgrim>,
) -> ApiResult<(StatusCode, Json<PilgrimCreated>)> {
    let actor = current.require(ADMIN_ROLES)?;
    let created = state.pilgrim_service.create_pilgrim(actor, pilgrim).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_pilgrim(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Json(update): Json<PilgrimUpdate>,
) -> ApiResult<Json<Pilgrim>> {
    let actor = current.require(ADMIN_ROLES)?;
    let updated = state
        .pilgrim_service
        .update_pilgrim(actor, &id, update)
        .await?;
    Ok(Json(updated))
}

async fn bulk_update_pilgrims(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Json(updates): Json<Vec<BulkPilgrimUpdate>>,
) -> ApiResult<Json<Vec<Pilgrim>>> {
    let actor = current.require(ADMIN_ROLES)?;
    let updated = state
        .pilgrim_service
        .bulk_update_pilgrims(actor, updates)
        .await?;
    Ok(Json(updated))
}

async fn delete_pilgrim(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
) -> ApiResult<StatusCode> {
    let actor = current.require(OWNER_ONLY)?;
    state.pilgrim_service.delete_pilgrim(actor, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn recalculate_pilgrim(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
) -> ApiResult<Json<Pilgrim>> {
    current.require(OWNER_ONLY)?;
    Ok(Json(state.ledger_service.recalculate_pilgrim(&id).await?))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/pilgrims", get(list_pilgrims).post(create_pilgrim))
        .route("/pilgrims/bulk", put(bulk_update_pilgrims))
        .route("/pilgrims/stats", get(pilgrim_stats))
        .route("/pilgrims/outstanding", get(outstanding_pilgrims))
        .route(
            "/pilgrims/{id}",
            get(get_pilgrim).put(update_pilgrim).delete(delete_pilgrim),
        )
        .route("/pilgrims/{id}/invoices", get(pilgrim_invoices))
        .route("/pilgrims/{id}/recalculate", post(recalculate_pilgrim))
}
