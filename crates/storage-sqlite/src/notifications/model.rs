//! Database model for notifications.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::utils::parse_text;
use amanah_core::notifications::{Notification, NotificationType};

#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::notifications)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct NotificationDB {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub message: String,
    pub notification_type: String,
    pub is_read: bool,
    pub link: Option<String>,
    pub created_at: NaiveDateTime,
}

impl From<NotificationDB> for Notification {
    fn from(db: NotificationDB) -> Self {
        Self {
            notification_type: parse_text(
                &db.notification_type,
                NotificationType::Info,
                "notification type",
            ),
            id: db.id,
            user_id: db.user_id,
            title: db.title,
            message: db.message,
            is_read: db.is_read,
            link: db.link,
            created_at: db.created_at,
        }
    }
}
