use async_trait::async_trait;

use super::company_model::{CompanySettings, CompanySettingsUpdate};
use crate::errors::Result;
use crate::users::Actor;

#[async_trait]
pub trait CompanyRepositoryTrait: Send + Sync {
    fn get(&self) -> Result<Option<CompanySettings>>;

    /// Inserts or replaces the single row.
    async fn save(&self, settings: CompanySettings) -> Result<CompanySettings>;
}

#[async_trait]
pub trait CompanyServiceTrait: Send + Sync {
    fn get_settings(&self) -> Result<Option<CompanySettings>>;

    async fn upsert_settings(
        &self,
        actor: &Actor,
        update: CompanySettingsUpdate,
    ) -> Result<CompanySettings>;
}
