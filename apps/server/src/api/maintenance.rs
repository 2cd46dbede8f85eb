use std::sync::Arc;

use amanah_core::ledger::RecalculationSummary;
use amanah_core::packages::StatusRunSummary;
use axum::{extract::State, routing::post, Json, Router};

use crate::{
    auth::{CurrentUser, OWNER_ONLY},
    error::ApiResult,
    events::{ServerEvent, LEDGER_RECALCULATED},
    main_lib::AppState,
};

async fn recalculate_payments(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
) -> ApiResult<Json<RecalculationSummary>> {
    current.require(OWNER_ONLY)?;
    let summary = state.ledger_service.recalculate_all().await?;
    tracing::info!(
        "Payment recalculation by {}: {} updated, {} failed",
        current.actor().email,
        summary.updated_count,
        summary.errors.len()
    );
    state.event_bus.publish(ServerEvent::new(LEDGER_RECALCULATED));
    Ok(Json(summary))
}

async fn run_package_status(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
) -> ApiResult<Json<StatusRunSummary>> {
    current.require(OWNER_ONLY)?;
    Ok(Json(state.scheduler.run_now().await?))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/maintenance/recalculate-payments",
            post(recalculate_payments),
        )
        .route("/maintenance/package-status/run", post(run_package_status))
}
