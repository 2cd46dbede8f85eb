use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Router};

use crate::main_lib::AppState;

async fn healthz() -> &'static str {
    "ok"
}

/// Ready once the database answers.
async fn readyz(State(state): State<Arc<AppState>>) -> (StatusCode, &'static str) {
    let pool = state.pool.clone();
    let ping = tokio::task::spawn_blocking(move || amanah_storage_sqlite::ping(&pool)).await;
    match ping {
        Ok(Ok(())) => (StatusCode::OK, "ok"),
        Ok(Err(e)) => {
            tracing::warn!("Readiness check failed: {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, "database unavailable")
        }
        Err(e) => {
            tracing::warn!("Readiness check panicked: {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, "database unavailable")
        }
    }
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
}
