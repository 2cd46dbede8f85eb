use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::errors::{Result, ValidationError};

/// The single company settings row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CompanySettings {
    pub id: String,
    pub name: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanySettingsUpdate {
    pub name: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl CompanySettingsUpdate {
    /// Merges into the existing row, or builds the first one. A name is
    /// required when nothing is stored yet.
    pub fn merge(
        self,
        existing: Option<&CompanySettings>,
        new_id: String,
        now: NaiveDateTime,
    ) -> Result<CompanySettings> {
        if self.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(ValidationError::MissingField("name".to_string()).into());
        }
        match existing {
            Some(current) => Ok(CompanySettings {
                id: current.id.clone(),
                name: self
                    .name
                    .map(|n| n.trim().to_string())
                    .unwrap_or_else(|| current.name.clone()),
                address: self.address.or_else(|| current.address.clone()),
                city: self.city.or_else(|| current.city.clone()),
                phone: self.phone.or_else(|| current.phone.clone()),
                email: self.email.or_else(|| current.email.clone()),
                created_at: current.created_at,
                updated_at: now,
            }),
            None => {
                let name = self
                    .name
                    .ok_or_else(|| ValidationError::MissingField("name".to_string()))?;
                Ok(CompanySettings {
                    id: new_id,
                    name: name.trim().to_string(),
                    address: self.address,
                    city: self.city,
                    phone: self.phone,
                    email: self.email,
                    created_at: now,
                    updated_at: now,
                })
            }
        }
    }
}
