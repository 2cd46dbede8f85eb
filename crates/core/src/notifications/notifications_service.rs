use async_trait::async_trait;
use log::{debug, warn};
use std::sync::Arc;

use super::notifications_model::{
    NewBroadcast, NewNotification, Notification, NotificationFilter, NotificationList,
};
use super::notifications_traits::{NotificationRepositoryTrait, NotificationServiceTrait};
use super::sink::NotificationSink;
use crate::errors::{Error, Result};
use crate::users::UserRepositoryTrait;
use crate::utils::PageRequest;

pub struct NotificationService {
    repository: Arc<dyn NotificationRepositoryTrait>,
    user_repository: Arc<dyn UserRepositoryTrait>,
    sink: Arc<dyn NotificationSink>,
}

impl NotificationService {
    pub fn new(
        repository: Arc<dyn NotificationRepositoryTrait>,
        user_repository: Arc<dyn UserRepositoryTrait>,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            repository,
            user_repository,
            sink,
        }
    }

    /// Loads a notification and checks it belongs to `user_id`. Someone
    /// else's notification looks missing.
    fn owned(&self, user_id: &str, notification_id: &str) -> Result<Notification> {
        let notification = self.repository.get_by_id(notification_id)?;
        if notification.user_id != user_id {
            return Err(Error::not_found("Notification", notification_id));
        }
        Ok(notification)
    }
}

#[async_trait]
impl NotificationServiceTrait for NotificationService {
    fn list_for_user(
        &self,
        user_id: &str,
        filter: &NotificationFilter,
        page: PageRequest,
    ) -> Result<NotificationList> {
        let page = self.repository.list_for_user(user_id, filter, page)?;
        let unread_count = self.repository.unread_count(user_id)?;
        Ok(NotificationList { page, unread_count })
    }

    async fn create(&self, notification: NewNotification) -> Result<Notification> {
        notification.validate()?;
        let mut stored = self.repository.insert_many(vec![notification]).await?;
        let created = stored
            .pop()
            .ok_or_else(|| Error::Unexpected("notification insert returned no row".to_string()))?;
        self.sink.publish(&created);
        Ok(created)
    }

    async fn mark_read(&self, user_id: &str, notification_id: &str) -> Result<Notification> {
        self.owned(user_id, notification_id)?;
        self.repository.mark_read(notification_id.to_string()).await
    }

    async fn mark_all_read(&self, user_id: &str) -> Result<usize> {
        self.repository.mark_all_read(user_id.to_string()).await
    }

    async fn delete(&self, user_id: &str, notification_id: &str) -> Result<()> {
        self.owned(user_id, notification_id)?;
        self.repository.delete(notification_id.to_string()).await?;
        Ok(())
    }

    async fn broadcast(&self, broadcast: NewBroadcast) -> Result<Vec<Notification>> {
        let recipients = self.user_repository.list_active_ids()?;
        if recipients.is_empty() {
            debug!("Broadcast '{}' has no active recipients", broadcast.title);
            return Ok(Vec::new());
        }
        let rows = recipients
            .iter()
            .map(|user_id| broadcast.for_user(user_id))
            .collect();
        let stored = self.repository.insert_many(rows).await?;
        for notification in &stored {
            self.sink.publish(notification);
        }
        debug!(
            "Broadcast '{}' delivered to {} users",
            broadcast.title,
            stored.len()
        );
        Ok(stored)
    }
}

/// Broadcasts and logs failures instead of returning them. Used for the
/// side effects of operations that already succeeded.
pub async fn broadcast_best_effort(service: &dyn NotificationServiceTrait, broadcast: NewBroadcast) {
    let title = broadcast.title.clone();
    if let Err(e) = service.broadcast(broadcast).await {
        warn!("Failed to broadcast notification '{}': {}", title, e);
    }
}
