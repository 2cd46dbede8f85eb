use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::users::Actor;
use crate::utils::time_utils::deserialize_optional_datetime;

text_enum! {
    pub enum AuditAction {
        Create => "create",
        Update => "update",
        Delete => "delete",
        Login => "login",
        Payment => "payment",
        Recalculate => "recalculate",
    }
}

/// A recorded change. User fields are copied at write time so history
/// survives user edits.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AuditLog {
    pub id: String,
    pub user_id: Option<String>,
    pub user_email: Option<String>,
    pub user_name: Option<String>,
    pub action: AuditAction,
    pub entity: String,
    pub entity_id: Option<String>,
    pub entity_name: Option<String>,
    pub old_values: Option<Value>,
    pub new_values: Option<Value>,
    pub created_at: NaiveDateTime,
}

/// Audit entry about to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAuditEntry {
    pub user_id: Option<String>,
    pub user_email: Option<String>,
    pub user_name: Option<String>,
    pub action: AuditAction,
    pub entity: String,
    pub entity_id: Option<String>,
    pub entity_name: Option<String>,
    pub old_values: Option<Value>,
    pub new_values: Option<Value>,
}

impl NewAuditEntry {
    pub fn new(actor: &Actor, action: AuditAction, entity: &str) -> Self {
        Self {
            user_id: Some(actor.user_id.clone()),
            user_email: Some(actor.email.clone()),
            user_name: Some(actor.name.clone()),
            action,
            entity: entity.to_string(),
            entity_id: None,
            entity_name: None,
            old_values: None,
            new_values: None,
        }
    }

    pub fn entity_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    pub fn entity_name(mut self, name: impl Into<String>) -> Self {
        self.entity_name = Some(name.into());
        self
    }

    /// Snapshot before the change. Values that fail to serialize are skipped.
    pub fn old_values<T: Serialize>(mut self, value: &T) -> Self {
        self.old_values = serde_json::to_value(value).ok();
        self
    }

    pub fn new_values<T: Serialize>(mut self, value: &T) -> Self {
        self.new_values = serde_json::to_value(value).ok();
        self
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditFilter {
    pub user_id: Option<String>,
    pub action: Option<AuditAction>,
    pub entity: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_datetime")]
    pub start_date: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "deserialize_optional_datetime")]
    pub end_date: Option<NaiveDateTime>,
}
