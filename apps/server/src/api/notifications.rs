use std::sync::Arc;

use amanah_core::notifications::{Notification, NotificationFilter, NotificationList};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, put},
    Json, Router,
};
use serde::Serialize;

use crate::{api::shared::PageQuery, auth::CurrentUser, error::ApiResult, main_lib::AppState};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MarkedRead {
    updated_count: usize,
}

async fn list_notifications(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Query(page): Query<PageQuery>,
    Query(filter): Query<NotificationFilter>,
) -> ApiResult<Json<NotificationList>> {
    let list = state.notification_service.list_for_user(
        &current.actor().user_id,
        &filter,
        page.request(),
    )?;
    Ok(Json(list))
}

async fn mark_read(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
) -> ApiResult<Json<Notification>> {
    let notification = state
        .notification_service
        .mark_read(&current.actor().user_id, &id)
        .await?;
    Ok(Json(notification))
}

async fn mark_all_read(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
) -> ApiResult<Json<MarkedRead>> {
    let updated_count = state
        .notification_service
        .mark_all_read(&current.actor().user_id)
        .await?;
    Ok(Json(MarkedRead { updated_count }))
}

async fn delete_notification(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
) -> ApiResult<StatusCode> {
    state
        .notification_service
        .delete(&current.actor().user_id, &id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/notifications", get(list_notifications))
        .route("/notifications/read-all", put(mark_all_read))
        .route("/notifications/{id}/read", put(mark_read))
        .route("/notifications/{id}", delete(delete_notification))
}
