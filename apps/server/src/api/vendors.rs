use std::sync::Arc;

use amanah_core::utils::Page;
use amanah_core::vendors::{
    DebtFilter, DebtPayment, NewVendor, NewVendorDebt, Vendor, VendorDebt, VendorDebtDetail,
    VendorDebtUpdate, VendorFilter, VendorUpdate,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::{
    api::shared::PageQuery,
    auth::{CurrentUser, FINANCE_ROLES},
    error::ApiResult,
    main_lib::AppState,
};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OutstandingDebts {
    total_outstanding: Decimal,
    debts: Vec<VendorDebtDetail>,
}

async fn list_vendors(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Query(page): Query<PageQuery>,
    Query(filter): Query<VendorFilter>,
) -> ApiResult<Json<Page<Vendor>>> {
    current.require(FINANCE_ROLES)?;
    Ok(Json(
        state.vendor_service.list_vendors(&filter, page.request())?,
    ))
}

async fn get_vendor(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
) -> ApiResult<Json<Vendor>> {
    current.require(FINANCE_ROLES)?;
    Ok(Json(state.vendor_service.get_vendor(&id)?))
}

async fn create_vendor(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Json(vendor): Json<NewVendor>,
) -> ApiResult<(StatusCode, Json<Vendor>)> {
    let actor = current.require(FINANCE_ROLES)?;
    let created = state.vendor_service.create_vendor(actor, vendor).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_vendor(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Json(update): Json<VendorUpdate>,
) -> ApiResult<Json<Vendor>> {
    let actor = current.require(FINANCE_ROLES)?;
    let updated = state
        .vendor_service
        .update_vendor(actor, &id, update)
        .await?;
    Ok(Json(updated))
}

async fn delete_vendor(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
) -> ApiResult<StatusCode> {
    let actor = current.require(FINANCE_ROLES)?;
    state.vendor_service.delete_vendor(actor, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_debts(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Query(page): Query<PageQuery>,
    Query(filter): Query<DebtFilter>,
) -> ApiResult<Json<Page<VendorDebtDetail>>> {
    current.require(FINANCE_ROLES)?;
    Ok(Json(state.vendor_service.list_debts(&filter, page.request())?))
}

async fn outstanding_debts(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
) -> ApiResult<Json<OutstandingDebts>> {
    current.require(FINANCE_ROLES)?;
    Ok(Json(OutstandingDebts {
        total_outstanding: state.vendor_service.total_outstanding()?,
        debts: state.vendor_service.outstanding_debts()?,
    }))
}

async fn get_debt(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
) -> ApiResult<Json<VendorDebtDetail>> {
    current.require(FINANCE_ROLES)?;
    Ok(Json(state.vendor_service.get_debt(&id)?))
}

async fn create_debt(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Json(debt): Json<NewVendorDebt>,
) -> ApiResult<(StatusCode, Json<VendorDebt>)> {
    let actor = current.require(FINANCE_ROLES)?;
    let created = state.vendor_service.create_debt(actor, debt).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_debt(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Json(update): Json<VendorDebtUpdate>,
) -> ApiResult<Json<VendorDebt>> {
    let actor = current.require(FINANCE_ROLES)?;
    let updated = state.vendor_service.update_debt(actor, &id, update).await?;
    Ok(Json(updated))
}

async fn pay_debt(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Json(payment): Json<DebtPayment>,
) -> ApiResult<Json<VendorDebt>> {
    let actor = current.require(FINANCE_ROLES)?;
    let paid = state
        .vendor_service
        .pay_debt(actor, &id, payment.amount)
        .await?;
    Ok(Json(paid))
}

async fn delete_debt(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
) -> ApiResult<StatusCode> {
    let actor = current.require(FINANCE_ROLES)?;
    state.vendor_service.delete_debt(actor, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/vendors", get(list_vendors).post(create_vendor))
        .route(
            "/vendors/{id}",
            get(get_vendor).put(update_vendor).delete(delete_vendor),
        )
        .route("/vendor-debts", get(list_debts).post(create_debt))
        .route("/vendor-debts/outstanding", get(outstanding_debts))
        .route(
            "/vendor-debts/{id}",
            get(get_debt).put(update_debt).delete(delete_debt),
        )
        .route("/vendor-debts/{id}/payments", post(pay_debt))
}
