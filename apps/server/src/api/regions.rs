use std::sync::Arc;

use amanah_core::regions::Region;
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use crate::{error::ApiResult, main_lib::AppState};

async fn provinces(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Region>>> {
    Ok(Json(state.region_service.provinces()?))
}

async fn regencies(
    Path(province_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<Region>>> {
    Ok(Json(state.region_service.regencies(&province_id)?))
}

async fn districts(
    Path(regency_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<Region>>> {
    Ok(Json(state.region_service.districts(&regency_id)?))
}

async fn villages(
    Path(district_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<Region>>> {
    Ok(Json(state.region_service.villages(&district_id)?))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/regions/provinces", get(provinces))
        .route("/regions/provinces/{id}/regencies", get(regencies))
        .route("/regions/regencies/{id}/districts", get(districts))
        .route("/regions/districts/{id}/villages", get(villages))
}
