use std::sync::Arc;

use amanah_core::company::{CompanySettings, CompanySettingsUpdate};
use axum::{extract::State, routing::get, Json, Router};

use crate::{
    auth::{CurrentUser, OWNER_ONLY},
    error::ApiResult,
    main_lib::AppState,
};

/// `null` until the owner saves the profile for the first time.
async fn get_company(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Option<CompanySettings>>> {
    Ok(Json(state.company_service.get_settings()?))
}

async fn update_company(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Json(update): Json<CompanySettingsUpdate>,
) -> ApiResult<Json<CompanySettings>> {
    let actor = current.require(OWNER_ONLY)?;
    let saved = state.company_service.upsert_settings(actor, update).await?;
    Ok(Json(saved))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/company", get(get_company).put(update_company))
}
