use std::{convert::Infallible, sync::Arc, time::Duration};

use axum::{
    extract::State,
    response::sse::{Event as SseEvent, KeepAlive, Sse},
    routing::get,
    Router,
};
use futures_core::Stream;
use tokio_stream::wrappers::{errors::BroadcastStreamRecvError, BroadcastStream};

use crate::{
    auth::CurrentUser,
    events::{ServerEvent, NOTIFICATION_NEW},
    main_lib::AppState,
};

/// Converts a bus event into an SSE frame. `None` drops the event.
pub(crate) fn to_sse(event: ServerEvent) -> Option<SseEvent> {
    let sse_event = SseEvent::default().event(event.name);
    match event.payload {
        Some(payload) => match sse_event.json_data(payload) {
            Ok(ev) => Some(ev),
            Err(err) => {
                tracing::error!("Failed to serialize SSE payload for {}: {}", event.name, err);
                None
            }
        },
        None => Some(sse_event.data("null")),
    }
}

pub(crate) fn keep_alive() -> KeepAlive {
    KeepAlive::new()
        .interval(Duration::from_secs(15))
        .text("keep-alive")
}

/// Notifications are only delivered to the user they are addressed to.
fn visible_to(event: &ServerEvent, user_id: &str) -> bool {
    if event.name != NOTIFICATION_NEW {
        return true;
    }
    event
        .payload
        .as_ref()
        .and_then(|p| p.get("userId"))
        .and_then(|v| v.as_str())
        .is_some_and(|owner| owner == user_id)
}

async fn stream_events(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
) -> Sse<impl Stream<Item = Result<SseEvent, Infallible>>> {
    let user_id = current.actor().user_id.clone();
    let receiver = BroadcastStream::new(state.event_bus.subscribe());
    let stream = tokio_stream::StreamExt::filter_map(receiver, move |event| match event {
        Ok(evt) if visible_to(&evt, &user_id) => to_sse(evt).map(Ok),
        Ok(_) => None,
        Err(BroadcastStreamRecvError::Lagged(skipped)) => {
            tracing::debug!("Event stream lagged, {} events skipped", skipped);
            None
        }
    });

    Sse::new(stream).keep_alive(keep_alive())
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/events/stream", get(stream_events))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::PACKAGE_STATUS_UPDATED;
    use serde_json::json;

    #[test]
    fn notifications_are_filtered_by_recipient() {
        let event = ServerEvent::with_payload(NOTIFICATION_NEW, json!({ "userId": "u1" }));
        assert!(visible_to(&event, "u1"));
        assert!(!visible_to(&event, "u2"));
    }

    #[test]
    fn other_events_reach_everyone() {
        let event = ServerEvent::with_payload(PACKAGE_STATUS_UPDATED, json!({ "closedCount": 1 }));
        assert!(visible_to(&event, "u2"));
        assert!(visible_to(&ServerEvent::new(PACKAGE_STATUS_UPDATED), "u2"));
    }
}
