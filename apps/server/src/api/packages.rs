use std::sync::Arc;

use amanah_core::packages::{NewPackage, Package, PackageFilter, PackageSummary, PackageUpdate};
use amanah_core::utils::Page;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use crate::{
    api::shared::PageQuery,
    auth::{CurrentUser, ADMIN_ROLES},
    error::ApiResult,
    main_lib::AppState,
};

async fn list_packages(
    State(state): State<Arc<AppState>>,
    Query(page): Query<PageQuery>,
    Query(filter): Query<PackageFilter>,
) -> ApiResult<Json<Page<Package>>> {
    let packages = state.package_service.list_packages(&filter, page.request())?;
    Ok(Json(packages))
}

async fn get_package(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Package>> {
    Ok(Json(state.package_service.get_package(&id)?))
}

async fn get_package_by_code(
    Path(code): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Package>> {
    Ok(Json(state.package_service.get_package_by_code(&code)?))
}

async fn get_package_summary(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<PackageSummary>> {
    Ok(Json(state.package_service.get_package_summary(&id)?))
}

async fn create_package(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Json(package): Json<NewPackage>,
) -> ApiResult<(StatusCode, Json<Package>)> {
    let actor = current.require(ADMIN_ROLES)?;
    let created = state.package_service.create_package(actor, package).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_package(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Json(update): Json<PackageUpdate>,
) -> ApiResult<Json<Package>> {
    let actor = current.require(ADMIN_ROLES)?;
    let updated = state
        .package_service
        .update_package(actor, &id, update)
        .await?;
    Ok(Json(updated))
}

async fn delete_package(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
) -> ApiResult<StatusCode> {
    let actor = current.require(ADMIN_ROLES)?;
    state.package_service.delete_package(actor, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/packages", get(list_packages).post(create_package))
        .route("/packages/code/{code}", get(get_package_by_code))
        .route(
            "/packages/{id}",
            get(get_package).put(update_package).delete(delete_package),
        )
        .route("/packages/{id}/summary", get(get_package_summary))
}
