use amanah_core::errors::Result;
use amanah_core::notifications::{
    NewNotification, Notification, NotificationFilter, NotificationRepositoryTrait,
};
use amanah_core::utils::time_utils::now_utc;
use amanah_core::utils::{Page, PageRequest};
use async_trait::async_trait;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::sqlite::Sqlite;
use diesel::SqliteConnection;
use std::sync::Arc;
use uuid::Uuid;

use super::model::NotificationDB;
use crate::db::{get_connection, WriteHandle};
use crate::errors::{not_found_as, StorageError};
use crate::schema::notifications;

pub struct NotificationRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl NotificationRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        NotificationRepository { pool, writer }
    }
}

fn for_user(user_id: &str, filter: &NotificationFilter) -> notifications::BoxedQuery<'static, Sqlite> {
    let mut query = notifications::table
        .filter(notifications::user_id.eq(user_id.to_string()))
        .into_boxed();
    if let Some(is_read) = filter.is_read {
        query = query.filter(notifications::is_read.eq(is_read));
    }
    query
}

#[async_trait]
impl NotificationRepositoryTrait for NotificationRepository {
    fn list_for_user(
        &self,
        user_id: &str,
        filter: &NotificationFilter,
        page: PageRequest,
    ) -> Result<Page<Notification>> {
        let mut conn = get_connection(&self.pool)?;
        let total = for_user(user_id, filter)
            .count()
            .get_result::<i64>(&mut conn)
            .map_err(StorageError::from)?;
        let rows = for_user(user_id, filter)
            .order(notifications::created_at.desc())
            .limit(page.limit())
            .offset(page.offset())
            .select(NotificationDB::as_select())
            .load::<NotificationDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(Page::new(
            rows.into_iter().map(Notification::from).collect(),
            page,
            total,
        ))
    }

    fn unread_count(&self, user_id: &str) -> Result<i64> {
        let mut conn = get_connection(&self.pool)?;
        Ok(notifications::table
            .filter(notifications::user_id.eq(user_id))
            .filter(notifications::is_read.eq(false))
            .count()
            .get_result::<i64>(&mut conn)
            .map_err(StorageError::from)?)
    }

    fn get_by_id(&self, notification_id: &str) -> Result<Notification> {
        let mut conn = get_connection(&self.pool)?;
        notifications::table
            .find(notification_id)
            .select(NotificationDB::as_select())
            .first::<NotificationDB>(&mut conn)
            .map(Notification::from)
            .map_err(not_found_as("Notification", notification_id))
    }

    async fn insert_many(&self, new_notifications: Vec<NewNotification>) -> Result<Vec<Notification>> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Vec<Notification>> {
                let now = now_utc();
                let rows: Vec<NotificationDB> = new_notifications
                    .into_iter()
                    .map(|n| NotificationDB {
                        id: Uuid::new_v4().to_string(),
                        user_id: n.user_id,
                        title: n.title,
                        message: n.message,
                        notification_type: n.notification_type.as_str().to_string(),
                        is_read: false,
                        link: n.link,
                        created_at: now,
                    })
                    .collect();
                if rows.is_empty() {
                    return Ok(Vec::new());
                }
                diesel::insert_into(notifications::table)
                    .values(&rows)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(rows.into_iter().map(Notification::from).collect())
            })
            .await
    }

    async fn mark_read(&self, notification_id: String) -> Result<Notification> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Notification> {
                let stored = diesel::update(notifications::table.find(&notification_id))
                    .set(notifications::is_read.eq(true))
                    .returning(NotificationDB::as_returning())
                    .get_result(conn)
                    .map_err(not_found_as("Notification", &notification_id))?;
                Ok(Notification::from(stored))
            })
            .await
    }

    async fn mark_all_read(&self, user_id: String) -> Result<usize> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                Ok(diesel::update(
                    notifications::table
                        .filter(notifications::user_id.eq(&user_id))
                        .filter(notifications::is_read.eq(false)),
                )
                .set(notifications::is_read.eq(true))
                .execute(conn)
                .map_err(StorageError::from)?)
            })
            .await
    }

    async fn delete(&self, notification_id: String) -> Result<usize> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                Ok(diesel::delete(notifications::table.find(&notification_id))
                    .execute(conn)
                    .map_err(StorageError::from)?)
            })
            .await
    }
}
