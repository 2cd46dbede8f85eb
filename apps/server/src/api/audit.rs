use std::sync::Arc;

use amanah_core::audit::{AuditFilter, AuditLog};
use amanah_core::utils::Page;
use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};

use crate::{
    api::shared::PageQuery,
    auth::{CurrentUser, OWNER_ONLY},
    error::ApiResult,
    main_lib::AppState,
};

async fn list_audit_logs(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Query(page): Query<PageQuery>,
    Query(filter): Query<AuditFilter>,
) -> ApiResult<Json<Page<AuditLog>>> {
    current.require(OWNER_ONLY)?;
    Ok(Json(state.audit_service.list(&filter, page.request())?))
}

async fn entity_history(
    Path((entity, id)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
) -> ApiResult<Json<Vec<AuditLog>>> {
    current.require(OWNER_ONLY)?;
    Ok(Json(state.audit_service.history(&entity, &id)?))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/audit-logs", get(list_audit_logs))
        .route("/audit-logs/{entity}/{id}", get(entity_history))
}
