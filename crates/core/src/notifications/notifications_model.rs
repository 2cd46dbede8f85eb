use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::errors::{Result, ValidationError};
use crate::utils::Page;

text_enum! {
    pub enum NotificationType {
        Info => "info",
        Success => "success",
        Warning => "warning",
        Error => "error",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub is_read: bool,
    pub link: Option<String>,
    pub created_at: NaiveDateTime,
}

/// Notification addressed to one user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewNotification {
    pub user_id: String,
    pub title: String,
    pub message: String,
    #[serde(rename = "type", default = "default_type")]
    pub notification_type: NotificationType,
    pub link: Option<String>,
}

fn default_type() -> NotificationType {
    NotificationType::Info
}

impl NewNotification {
    pub fn validate(&self) -> Result<()> {
        if self.user_id.trim().is_empty() {
            return Err(ValidationError::MissingField("userId".to_string()).into());
        }
        if self.title.trim().is_empty() {
            return Err(ValidationError::MissingField("title".to_string()).into());
        }
        Ok(())
    }
}

/// Notification sent to every active user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewBroadcast {
    pub title: String,
    pub message: String,
    #[serde(rename = "type", default = "default_type")]
    pub notification_type: NotificationType,
    pub link: Option<String>,
}

impl NewBroadcast {
    pub fn new(
        title: impl Into<String>,
        message: impl Into<String>,
        notification_type: NotificationType,
        link: Option<&str>,
    ) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            notification_type,
            link: link.map(str::to_string),
        }
    }

    pub fn for_user(&self, user_id: &str) -> NewNotification {
        NewNotification {
            user_id: user_id.to_string(),
            title: self.title.clone(),
            message: self.message.clone(),
            notification_type: self.notification_type,
            link: self.link.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationFilter {
    pub is_read: Option<bool>,
}

/// One page of a user's notifications plus their unread total.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NotificationList {
    #[serde(flatten)]
    pub page: Page<Notification>,
    pub unread_count: i64,
}
