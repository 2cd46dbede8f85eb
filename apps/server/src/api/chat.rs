use std::{convert::Infallible, sync::Arc};

use amanah_core::chat::{
    ChatMessage, ChatUser, ConversationSummary, ConversationView, NewMessage, OpenConversation,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::sse::{Event as SseEvent, Sse},
    routing::{get, post, put},
    Json, Router,
};
use futures_core::Stream;
use serde::Serialize;
use tokio_stream::wrappers::ReceiverStream;

use crate::{
    api::{
        events::{keep_alive, to_sse},
        shared::LimitQuery,
    },
    auth::CurrentUser,
    chat_registry::ConnectionGuard,
    error::ApiResult,
    events::{ServerEvent, CHAT_MESSAGE, CHAT_READ},
    main_lib::AppState,
};

const DEFAULT_MESSAGE_LIMIT: i64 = 50;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UnreadCount {
    unread_count: i64,
}

fn push(state: &AppState, user_id: &str, name: &'static str, message: &ChatMessage) {
    match serde_json::to_value(message) {
        Ok(payload) => {
            state
                .chat_connections
                .broadcast(user_id, ServerEvent::with_payload(name, payload));
        }
        Err(e) => tracing::warn!("Failed to serialize chat message {}: {}", message.id, e),
    }
}

async fn chat_events(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
) -> Sse<impl Stream<Item = Result<SseEvent, Infallible>>> {
    let user_id = current.actor().user_id.clone();
    let (connection_id, receiver) = state.chat_connections.add(&user_id);
    let guard = ConnectionGuard::new(state.chat_connections.clone(), user_id, connection_id);

    let stream = tokio_stream::StreamExt::filter_map(ReceiverStream::new(receiver), move |event| {
        // Dropped together with the stream when the client disconnects.
        let _connection = &guard;
        to_sse(event).map(Ok)
    });

    Sse::new(stream).keep_alive(keep_alive())
}

async fn list_conversations(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
) -> ApiResult<Json<Vec<ConversationSummary>>> {
    let conversations = state
        .chat_service
        .list_conversations(&current.actor().user_id)?;
    Ok(Json(conversations))
}

async fn open_conversation(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Json(body): Json<OpenConversation>,
) -> ApiResult<(StatusCode, Json<ConversationView>)> {
    let view = state
        .chat_service
        .open_conversation(&current.actor().user_id, &body.other_user_id)
        .await?;
    let status = if view.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(view)))
}

async fn conversation_messages(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Query(query): Query<LimitQuery>,
) -> ApiResult<Json<Vec<ChatMessage>>> {
    let messages = state
        .chat_service
        .messages(
            &current.actor().user_id,
            &id,
            query.or(DEFAULT_MESSAGE_LIMIT),
        )
        .await?;
    Ok(Json(messages))
}

async fn send_message(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Json(message): Json<NewMessage>,
) -> ApiResult<(StatusCode, Json<ChatMessage>)> {
    let sent = state
        .chat_service
        .send_message(&current.actor().user_id, message)
        .await?;
    push(&state, &sent.recipient_id, CHAT_MESSAGE, &sent.message);
    Ok((StatusCode::CREATED, Json(sent.message)))
}

async fn mark_message_read(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
) -> ApiResult<Json<ChatMessage>> {
    let message = state
        .chat_service
        .mark_read(&current.actor().user_id, &id)
        .await?;
    push(&state, &message.sender_id, CHAT_READ, &message);
    Ok(Json(message))
}

async fn unread_count(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
) -> ApiResult<Json<UnreadCount>> {
    let unread_count = state.chat_service.unread_count(&current.actor().user_id)?;
    Ok(Json(UnreadCount { unread_count }))
}

async fn chat_users(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
) -> ApiResult<Json<Vec<ChatUser>>> {
    Ok(Json(state.chat_service.chat_users(&current.actor().user_id)?))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/chat/events", get(chat_events))
        .route(
            "/chat/conversations",
            get(list_conversations).post(open_conversation),
        )
        .route("/chat/conversations/{id}/messages", get(conversation_messages))
        .route("/chat/messages", post(send_message))
        .route("/chat/messages/{id}/read", put(mark_message_read))
        .route("/chat/unread-count", get(unread_count))
        .route("/chat/users", get(chat_users))
}
