use amanah_core::notifications::{Notification, NotificationSink};
use serde_json::Value;
use tokio::sync::broadcast;

/// Event names sent to clients on the server event stream.
pub const NOTIFICATION_NEW: &str = "notification:new";
pub const PACKAGE_STATUS_UPDATED: &str = "package:status-updated";
pub const LEDGER_RECALCULATED: &str = "ledger:recalculated";
pub const CHAT_MESSAGE: &str = "chat:message";
pub const CHAT_READ: &str = "chat:read";

/// Serializable envelope that carries event names and optional payloads.
#[derive(Clone, Debug)]
pub struct ServerEvent {
    pub name: &'static str,
    pub payload: Option<Value>,
}

impl ServerEvent {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            payload: None,
        }
    }

    pub fn with_payload(name: &'static str, payload: Value) -> Self {
        Self {
            name,
            payload: Some(payload),
        }
    }
}

/// Lightweight broadcast bus that fans out events to any connected clients.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<ServerEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.sender.subscribe()
    }

    pub fn publish(&self, event: ServerEvent) {
        // No subscribers is not an error.
        let _ = self.sender.send(event);
    }
}

/// Forwards stored notifications to the event bus.
pub struct EventBusNotificationSink {
    bus: EventBus,
}

impl EventBusNotificationSink {
    pub fn new(bus: EventBus) -> Self {
        Self { bus }
    }
}

impl NotificationSink for EventBusNotificationSink {
    fn publish(&self, notification: &Notification) {
        match serde_json::to_value(notification) {
            Ok(payload) => self
                .bus
                .publish(ServerEvent::with_payload(NOTIFICATION_NEW, payload)),
            Err(e) => tracing::warn!("Failed to serialize notification {}: {}", notification.id, e),
        }
    }
}
