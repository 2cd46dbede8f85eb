use async_trait::async_trait;

use super::audit_model::{AuditFilter, AuditLog, NewAuditEntry};
use crate::errors::Result;
use crate::utils::{Page, PageRequest};

#[async_trait]
pub trait AuditRepositoryTrait: Send + Sync {
    async fn insert(&self, entry: NewAuditEntry) -> Result<AuditLog>;

    /// Newest first.
    fn list(&self, filter: &AuditFilter, page: PageRequest) -> Result<Page<AuditLog>>;

    /// Every entry about one entity, newest first.
    fn list_for_entity(&self, entity: &str, entity_id: &str) -> Result<Vec<AuditLog>>;
}

#[async_trait]
pub trait AuditServiceTrait: Send + Sync {
    /// Records an entry. Never fails the caller; write errors are logged.
    async fn log(&self, entry: NewAuditEntry);

    fn list(&self, filter: &AuditFilter, page: PageRequest) -> Result<Page<AuditLog>>;

    fn history(&self, entity: &str, entity_id: &str) -> Result<Vec<AuditLog>>;
}
