use async_trait::async_trait;

use super::notifications_model::{
    NewBroadcast, NewNotification, Notification, NotificationFilter, NotificationList,
};
use crate::errors::Result;
use crate::utils::{Page, PageRequest};

#[async_trait]
pub trait NotificationRepositoryTrait: Send + Sync {
    /// Newest first.
    fn list_for_user(
        &self,
        user_id: &str,
        filter: &NotificationFilter,
        page: PageRequest,
    ) -> Result<Page<Notification>>;

    fn unread_count(&self, user_id: &str) -> Result<i64>;

    fn get_by_id(&self, notification_id: &str) -> Result<Notification>;

    /// Inserts all rows in one store transaction.
    async fn insert_many(&self, notifications: Vec<NewNotification>) -> Result<Vec<Notification>>;

    async fn mark_read(&self, notification_id: String) -> Result<Notification>;

    /// Returns the number of rows changed.
    async fn mark_all_read(&self, user_id: String) -> Result<usize>;

    async fn delete(&self, notification_id: String) -> Result<usize>;
}

#[async_trait]
pub trait NotificationServiceTrait: Send + Sync {
    fn list_for_user(
        &self,
        user_id: &str,
        filter: &NotificationFilter,
        page: PageRequest,
    ) -> Result<NotificationList>;

    async fn create(&self, notification: NewNotification) -> Result<Notification>;

    /// Marks one of the user's notifications read.
    async fn mark_read(&self, user_id: &str, notification_id: &str) -> Result<Notification>;

    async fn mark_all_read(&self, user_id: &str) -> Result<usize>;

    async fn delete(&self, user_id: &str, notification_id: &str) -> Result<()>;

    /// Sends the same notification to every active user.
    async fn broadcast(&self, broadcast: NewBroadcast) -> Result<Vec<Notification>>;
}
