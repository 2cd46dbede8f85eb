use amanah_core::audit::{AuditFilter, AuditLog, AuditRepositoryTrait, NewAuditEntry};
use amanah_core::errors::Result;
use amanah_core::utils::time_utils::now_utc;
use amanah_core::utils::{Page, PageRequest};
use async_trait::async_trait;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::sqlite::Sqlite;
use diesel::SqliteConnection;
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

use super::model::AuditLogDB;
use crate::db::{get_connection, WriteHandle};
use crate::errors::StorageError;
use crate::schema::audit_logs;

pub struct AuditRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl AuditRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        AuditRepository { pool, writer }
    }
}

fn filtered(filter: &AuditFilter) -> audit_logs::BoxedQuery<'static, Sqlite> {
    let mut query = audit_logs::table.into_boxed();
    if let Some(user_id) = filter.user_id.clone() {
        query = query.filter(audit_logs::user_id.eq(user_id));
    }
    if let Some(action) = filter.action {
        query = query.filter(audit_logs::action.eq(action.as_str()));
    }
    if let Some(entity) = filter.entity.clone() {
        query = query.filter(audit_logs::entity.eq(entity));
    }
    if let Some(start) = filter.start_date {
        query = query.filter(audit_logs::created_at.ge(start));
    }
    if let Some(end) = filter.end_date {
        query = query.filter(audit_logs::created_at.le(end));
    }
    query
}

fn json_text(value: Option<&Value>) -> Result<Option<String>> {
    Ok(value
        .map(serde_json::to_string)
        .transpose()
        .map_err(StorageError::from)?)
}

#[async_trait]
impl AuditRepositoryTrait for AuditRepository {
    async fn insert(&self, entry: NewAuditEntry) -> Result<AuditLog> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<AuditLog> {
                let row = AuditLogDB {
                    id: Uuid::new_v4().to_string(),
                    old_values: json_text(entry.old_values.as_ref())?,
                    new_values: json_text(entry.new_values.as_ref())?,
                    user_id: entry.user_id,
                    user_email: entry.user_email,
                    user_name: entry.user_name,
                    action: entry.action.as_str().to_string(),
                    entity: entry.entity,
                    entity_id: entry.entity_id,
                    entity_name: entry.entity_name,
                    created_at: now_utc(),
                };
                let stored = diesel::insert_into(audit_logs::table)
                    .values(&row)
                    .returning(AuditLogDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(AuditLog::from(stored))
            })
            .await
    }

    fn list(&self, filter: &AuditFilter, page: PageRequest) -> Result<Page<AuditLog>> {
        let mut conn = get_connection(&self.pool)?;
        let total = filtered(filter)
            .count()
            .get_result::<i64>(&mut conn)
            .map_err(StorageError::from)?;
        let rows = filtered(filter)
            .order(audit_logs::created_at.desc())
            .limit(page.limit())
            .offset(page.offset())
            .select(AuditLogDB::as_select())
            .load::<AuditLogDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(Page::new(
            rows.into_iter().map(AuditLog::from).collect(),
            page,
            total,
        ))
    }

    fn list_for_entity(&self, entity: &str, entity_id: &str) -> Result<Vec<AuditLog>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = audit_logs::table
            .filter(audit_logs::entity.eq(entity))
            .filter(audit_logs::entity_id.eq(entity_id))
            .order(audit_logs::created_at.desc())
            .select(AuditLogDB::as_select())
            .load::<AuditLogDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(AuditLog::from).collect())
    }
}
