//! In-app notifications, per user and broadcast.

mod notifications_model;
mod notifications_service;
mod notifications_traits;
mod sink;


pub use notifications_model::{
    NewBroadcast, NewNotification, Notification, NotificationFilter, NotificationList,
    NotificationType,
};
pub use notifications_service::{broadcast_best_effort, NotificationService};
pub use notifications_traits::{NotificationRepositoryTrait, NotificationServiceTrait};
pub use sink::{MockNotificationSink, NotificationSink};
