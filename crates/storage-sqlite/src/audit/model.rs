//! Database model for audit log entries. Old and new values are stored as
//! JSON text.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use log::warn;
use serde_json::Value;

use crate::utils::parse_text;
use amanah_core::audit::{AuditAction, AuditLog};

#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::audit_logs)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AuditLogDB {
    pub id: String,
    pub user_id: Option<String>,
    pub user_email: Option<String>,
    pub user_name: Option<String>,
    pub action: String,
    pub entity: String,
    pub entity_id: Option<String>,
    pub entity_name: Option<String>,
    pub old_values: Option<String>,
    pub new_values: Option<String>,
    pub created_at: NaiveDateTime,
}

fn parse_json(raw: Option<String>, id: &str) -> Option<Value> {
    raw.and_then(|text| match serde_json::from_str(&text) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Unreadable audit values on {}: {}", id, e);
            None
        }
    })
}

impl From<AuditLogDB> for AuditLog {
    fn from(db: AuditLogDB) -> Self {
        Self {
            action: parse_text(&db.action, AuditAction::Update, "audit action"),
            old_values: parse_json(db.old_values, &db.id),
            new_values: parse_json(db.new_values, &db.id),
            id: db.id,
            user_id: db.user_id,
            user_email: db.user_email,
            user_name: db.user_name,
            entity: db.entity,
            entity_id: db.entity_id,
            entity_name: db.entity_name,
            created_at: db.created_at,
        }
    }
}
