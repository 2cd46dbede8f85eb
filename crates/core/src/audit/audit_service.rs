use async_trait::async_trait;
use log::warn;
use std::sync::Arc;

use super::audit_model::{AuditFilter, AuditLog, NewAuditEntry};
use super::audit_traits::{AuditRepositoryTrait, AuditServiceTrait};
use crate::errors::Result;
use crate::utils::{Page, PageRequest};

pub struct AuditService {
    repository: Arc<dyn AuditRepositoryTrait>,
}

impl AuditService {
    pub fn new(repository: Arc<dyn AuditRepositoryTrait>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl AuditServiceTrait for AuditService {
    async fn log(&self, entry: NewAuditEntry) {
        let action = entry.action;
        let entity = entry.entity.clone();
        if let Err(e) = self.repository.insert(entry).await {
            warn!("Failed to write audit log ({} {}): {}", action, entity, e);
        }
    }

    fn list(&self, filter: &AuditFilter, page: PageRequest) -> Result<Page<AuditLog>> {
        self.repository.list(filter, page)
    }

    fn history(&self, entity: &str, entity_id: &str) -> Result<Vec<AuditLog>> {
        self.repository.list_for_entity(entity, entity_id)
    }
}
