use std::sync::Arc;

use amanah_core::invoices::{Invoice, InvoiceFilter, InvoiceWithItems};
use amanah_core::utils::Page;
use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};

use crate::{
    api::shared::PageQuery,
    auth::{CurrentUser, FINANCE_ROLES},
    error::ApiResult,
    main_lib::AppState,
};

async fn list_invoices(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Query(page): Query<PageQuery>,
    Query(filter): Query<InvoiceFilter>,
) -> ApiResult<Json<Page<Invoice>>> {
    current.require(FINANCE_ROLES)?;
    Ok(Json(
        state.invoice_service.list_invoices(&filter, page.request())?,
    ))
}

async fn get_invoice(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
) -> ApiResult<Json<InvoiceWithItems>> {
    current.require(FINANCE_ROLES)?;
    Ok(Json(state.invoice_service.get_invoice(&id)?))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/invoices", get(list_invoices))
        .route("/invoices/{id}", get(get_invoice))
}
