use async_trait::async_trait;
use log::debug;
use std::sync::Arc;
use uuid::Uuid;

use super::packages_model::{
    NewPackage, Package, PackageFilter, PackageStatus, PackageSummary, PackageUpdate,
};
use super::packages_traits::{PackageRepositoryTrait, PackageServiceTrait};
use crate::audit::{AuditAction, AuditServiceTrait, NewAuditEntry};
use crate::errors::{Error, Result};
use crate::pilgrims::PilgrimRepositoryTrait;
use crate::transactions::{summarize_totals, TransactionFilter, TransactionRepositoryTrait};
use crate::users::Actor;
use crate::utils::time_utils::now_utc;
use crate::utils::{Page, PageRequest};

const ENTITY: &str = "package";

pub struct PackageService {
    repository: Arc<dyn PackageRepositoryTrait>,
    pilgrim_repository: Arc<dyn PilgrimRepositoryTrait>,
    transaction_repository: Arc<dyn TransactionRepositoryTrait>,
    audit: Arc<dyn AuditServiceTrait>,
}

impl PackageService {
    pub fn new(
        repository: Arc<dyn PackageRepositoryTrait>,
        pilgrim_repository: Arc<dyn PilgrimRepositoryTrait>,
        transaction_repository: Arc<dyn TransactionRepositoryTrait>,
        audit: Arc<dyn AuditServiceTrait>,
    ) -> Self {
        Self {
            repository,
            pilgrim_repository,
            transaction_repository,
            audit,
        }
    }

    fn ensure_code_free(&self, code: &str, own_id: Option<&str>) -> Result<()> {
        if let Some(existing) = self.repository.get_by_code(code.trim())? {
            if Some(existing.id.as_str()) != own_id {
                return Err(Error::ConstraintViolation(format!(
                    "Kode paket \"{}\" sudah digunakan oleh paket \"{}\"",
                    existing.code, existing.name
                )));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl PackageServiceTrait for PackageService {
    fn list_packages(&self, filter: &PackageFilter, page: PageRequest) -> Result<Page<Package>> {
        self.repository.list(filter, page)
    }

    fn get_package(&self, package_id: &str) -> Result<Package> {
        self.repository.get_by_id(package_id)
    }

    fn get_package_by_code(&self, code: &str) -> Result<Package> {
        self.repository
            .get_by_code(code)?
            .ok_or_else(|| Error::NotFound(format!("Package with code '{}'", code)))
    }

    fn get_package_summary(&self, package_id: &str) -> Result<PackageSummary> {
        let package = self.repository.get_by_id(package_id)?;
        let pilgrim_count = self.pilgrim_repository.count_by_package(package_id)?;
        let rows = self.transaction_repository.ledger_rows(&TransactionFilter {
            package_id: Some(package_id.to_string()),
            ..Default::default()
        })?;
        let totals = summarize_totals(&rows);

        Ok(PackageSummary {
            available_seats: package.available_seats(),
            occupancy_rate: package.occupancy_rate(),
            pilgrim_count,
            total_income: totals.income,
            total_expense: totals.expense,
            package,
        })
    }

    fn active_count(&self) -> Result<i64> {
        self.repository.count_by_status(PackageStatus::Open)
    }

    async fn create_package(&self, actor: &Actor, new_package: NewPackage) -> Result<Package> {
        new_package.validate()?;
        self.ensure_code_free(&new_package.code, None)?;

        let package = new_package.into_package(
            Uuid::new_v4().to_string(),
            Some(actor.user_id.clone()),
            now_utc(),
        );
        let created = self.repository.create(package).await?;
        debug!("Created package {} ({})", created.code, created.id);

        self.audit
            .log(
                NewAuditEntry::new(actor, AuditAction::Create, ENTITY)
                    .entity_id(&created.id)
                    .entity_name(&created.name)
                    .new_values(&created),
            )
            .await;
        Ok(created)
    }

    async fn update_package(
        &self,
        actor: &Actor,
        package_id: &str,
        update: PackageUpdate,
    ) -> Result<Package> {
        let existing = self.repository.get_by_id(package_id)?;
        if let Some(code) = &update.code {
            self.ensure_code_free(code, Some(package_id))?;
        }
        let next = update.apply_to(&existing, now_utc())?;
        let updated = self.repository.update(next).await?;

        self.audit
            .log(
                NewAuditEntry::new(actor, AuditAction::Update, ENTITY)
                    .entity_id(&updated.id)
                    .entity_name(&updated.name)
                    .old_values(&existing)
                    .new_values(&updated),
            )
            .await;
        Ok(updated)
    }

    async fn delete_package(&self, actor: &Actor, package_id: &str) -> Result<()> {
        let existing = self.repository.get_by_id(package_id)?;
        let assigned = self
            .pilgrim_repository
            .count_by_package(package_id)?
            .max(existing.booked_seats as i64);
        if assigned > 0 {
            return Err(Error::ConstraintViolation(format!(
                "Paket \"{}\" masih memiliki {} jamaah terdaftar",
                existing.name, assigned
            )));
        }

        self.repository.delete(package_id.to_string()).await?;

        self.audit
            .log(
                NewAuditEntry::new(actor, AuditAction::Delete, ENTITY)
                    .entity_id(&existing.id)
                    .entity_name(&existing.name)
                    .old_values(&existing),
            )
            .await;
        Ok(())
    }
}
