use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use super::company_model::{CompanySettings, CompanySettingsUpdate};
use super::company_traits::{CompanyRepositoryTrait, CompanyServiceTrait};
use crate::audit::{AuditAction, AuditServiceTrait, NewAuditEntry};
use crate::errors::Result;
use crate::users::Actor;
use crate::utils::time_utils::now_utc;

const ENTITY: &str = "company_settings";

pub struct CompanyService {
    repository: Arc<dyn CompanyRepositoryTrait>,
    audit: Arc<dyn AuditServiceTrait>,
}

impl CompanyService {
    pub fn new(repository: Arc<dyn CompanyRepositoryTrait>, audit: Arc<dyn AuditServiceTrait>) -> Self {
        Self { repository, audit }
    }
}

#[async_trait]
impl CompanyServiceTrait for CompanyService {
    fn get_settings(&self) -> Result<Option<CompanySettings>> {
        self.repository.get()
    }

    async fn upsert_settings(
        &self,
        actor: &Actor,
        update: CompanySettingsUpdate,
    ) -> Result<CompanySettings> {
        let existing = self.repository.get()?;
        let next = update.merge(existing.as_ref(), Uuid::new_v4().to_string(), now_utc())?;
        let saved = self.repository.save(next).await?;

        let entry = match &existing {
            Some(previous) => NewAuditEntry::new(actor, AuditAction::Update, ENTITY)
                .old_values(previous),
            None => NewAuditEntry::new(actor, AuditAction::Create, ENTITY),
        };
        self.audit
            .log(
                entry
                    .entity_id(&saved.id)
                    .entity_name(&saved.name)
                    .new_values(&saved),
            )
            .await;
        Ok(saved)
    }
}
