//! Live delivery of freshly stored notifications.

use std::sync::{Arc, Mutex};

use super::notifications_model::Notification;

/// Receives notifications after they are stored.
///
/// `publish()` must not block; the server forwards to its event bus.
/// Delivery is best-effort and never affects the stored rows.
pub trait NotificationSink: Send + Sync {
    fn publish(&self, notification: &Notification);
}

/// Sink that keeps everything it receives, for tests.
#[derive(Clone, Default)]
pub struct MockNotificationSink {
    published: Arc<Mutex<Vec<Notification>>>,
}

impl MockNotificationSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn published(&self) -> Vec<Notification> {
        self.published.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.published.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.published.lock().unwrap().is_empty()
    }
}

impl NotificationSink for MockNotificationSink {
    fn publish(&self, notification: &Notification) {
        self.published.lock().unwrap().push(notification.clone());
    }
}
