use async_trait::async_trait;
use log::debug;
use rust_decimal::Decimal;
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

use super::pilgrims_model::{
    BulkPilgrimUpdate, NewPilgrim, Pilgrim, PilgrimCreated, PilgrimCreation, PilgrimFilter,
    PilgrimStats, PilgrimUpdate, StatusCount,
};
use super::pilgrims_traits::{PilgrimRepositoryTrait, PilgrimServiceTrait};
use crate::audit::{AuditAction, AuditServiceTrait, NewAuditEntry};
use crate::errors::{Error, Result};
use crate::ledger::PaymentStatus;
use crate::notifications::{broadcast_best_effort, NotificationServiceTrait};
use crate::packages::{Package, PackageRepositoryTrait, SeatAlert};
use crate::transactions::{IncomeCategory, IncomePosting, NewIncome};
use crate::users::Actor;
use crate::utils::time_utils::now_utc;
use crate::utils::{Page, PageRequest};

const ENTITY: &str = "jamaah";

fn duplicate_nik(nik: &str, holder: &Pilgrim) -> Error {
    Error::ConstraintViolation(format!(
        "NIK \"{}\" sudah terdaftar atas nama \"{}\". Setiap jamaah harus memiliki NIK yang unik.",
        nik, holder.name
    ))
}

pub struct PilgrimService {
    repository: Arc<dyn PilgrimRepositoryTrait>,
    package_repository: Arc<dyn PackageRepositoryTrait>,
    audit: Arc<dyn AuditServiceTrait>,
    notifications: Arc<dyn NotificationServiceTrait>,
}

impl PilgrimService {
    pub fn new(
        repository: Arc<dyn PilgrimRepositoryTrait>,
        package_repository: Arc<dyn PackageRepositoryTrait>,
        audit: Arc<dyn AuditServiceTrait>,
        notifications: Arc<dyn NotificationServiceTrait>,
    ) -> Self {
        Self {
            repository,
            package_repository,
            audit,
            notifications,
        }
    }

    fn ensure_nik_free(&self, nik: Option<&str>, own_id: Option<&str>) -> Result<()> {
        if let Some(nik) = nik {
            if let Some(holder) = self.repository.find_by_nik(nik, own_id)? {
                return Err(duplicate_nik(nik, &holder));
            }
        }
        Ok(())
    }

    /// Checks the target package exists when an update assigns one.
    fn ensure_package_assignable(&self, update: &PilgrimUpdate) -> Result<()> {
        match update.package_id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => self.package_repository.get_by_id(id).map(|_| ()),
            _ => Ok(()),
        }
    }

    async fn announce_seats(&self, package: Option<&Package>) {
        let Some(package) = package else {
            return;
        };
        if let Some(alert) = SeatAlert::after_increment(package) {
            debug!("Seat alert for package {}: {:?}", package.code, alert);
            broadcast_best_effort(self.notifications.as_ref(), alert.to_broadcast(package)).await;
        }
    }

    fn initial_payment(
        &self,
        actor: &Actor,
        pilgrim: &Pilgrim,
        new_pilgrim: &NewPilgrim,
    ) -> Result<Option<IncomePosting>> {
        let amount = match new_pilgrim.initial_payment {
            Some(amount) if amount > Decimal::ZERO => amount,
            _ => return Ok(None),
        };
        let category = if amount >= pilgrim.total_amount {
            IncomeCategory::Pelunasan
        } else {
            IncomeCategory::Dp
        };
        let income = NewIncome {
            amount,
            discount: None,
            income_category: category,
            pilgrim_id: Some(pilgrim.id.clone()),
            package_id: pilgrim.package_id.clone(),
            payment_method: new_pilgrim.payment_method,
            reference_number: None,
            bank_name: None,
            description: Some(format!(
                "Pembayaran awal ({}) - {}",
                category.as_str().to_uppercase(),
                pilgrim.name
            )),
            notes: None,
            transaction_date: None,
            receipt_url: None,
        };
        income.validate()?;
        let now = pilgrim.created_at;
        let transaction =
            income.into_transaction(Uuid::new_v4().to_string(), Some(actor.user_id.clone()), now);
        Ok(Some(IncomePosting::new(transaction, now)))
    }
}

#[async_trait]
impl PilgrimServiceTrait for PilgrimService {
    fn list_pilgrims(&self, filter: &PilgrimFilter, page: PageRequest) -> Result<Page<Pilgrim>> {
        self.repository.list(filter, page)
    }

    fn get_pilgrim(&self, pilgrim_id: &str) -> Result<Pilgrim> {
        self.repository.get_by_id(pilgrim_id)
    }

    fn count_by_status(&self) -> Result<Vec<StatusCount>> {
        let pilgrims = self.repository.list_all()?;
        Ok(PaymentStatus::ALL
            .iter()
            .map(|status| StatusCount {
                status: *status,
                count: pilgrims
                    .iter()
                    .filter(|p| p.payment_status == *status)
                    .count() as i64,
            })
            .collect())
    }

    fn total_receivables(&self) -> Result<Decimal> {
        Ok(self
            .repository
            .list_all()?
            .iter()
            .filter(|p| !p.is_cancelled && p.payment_status != PaymentStatus::Lunas)
            .map(|p| p.remaining_amount)
            .sum())
    }

    fn outstanding(&self, page: PageRequest) -> Result<Page<Pilgrim>> {
        let mut owing: Vec<Pilgrim> = self
            .repository
            .list_all()?
            .into_iter()
            .filter(|p| !p.is_cancelled && p.remaining_amount > Decimal::ZERO)
            .collect();
        owing.sort_by(|a, b| b.remaining_amount.cmp(&a.remaining_amount));
        Ok(page.slice(owing))
    }

    fn active_count(&self) -> Result<i64> {
        Ok(self
            .repository
            .list_all()?
            .iter()
            .filter(|p| !p.is_cancelled)
            .count() as i64)
    }

    fn stats(&self) -> Result<PilgrimStats> {
        Ok(PilgrimStats {
            status_counts: self.count_by_status()?,
            total_receivables: self.total_receivables()?,
            active_count: self.active_count()?,
        })
    }

    async fn create_pilgrim(
        &self,
        actor: &Actor,
        new_pilgrim: NewPilgrim,
    ) -> Result<PilgrimCreated> {
        new_pilgrim.validate()?;
        self.ensure_nik_free(new_pilgrim.normalized_nik().as_deref(), None)?;

        let package = match new_pilgrim.normalized_package_id() {
            Some(id) => Some(self.package_repository.get_by_id(&id)?),
            None => None,
        };
        let total = new_pilgrim
            .total_amount
            .or_else(|| package.as_ref().map(|p| p.price_per_person))
            .unwrap_or(Decimal::ZERO);

        let pilgrim = new_pilgrim.clone().into_pilgrim(
            Uuid::new_v4().to_string(),
            total,
            Some(actor.user_id.clone()),
            now_utc(),
        );
        let initial_payment = self.initial_payment(actor, &pilgrim, &new_pilgrim)?;

        let created = self
            .repository
            .create(PilgrimCreation {
                pilgrim,
                initial_payment,
            })
            .await?;
        debug!(
            "Registered pilgrim {} ({}) with status {}",
            created.pilgrim.name, created.pilgrim.id, created.pilgrim.payment_status
        );

        self.audit
            .log(
                NewAuditEntry::new(actor, AuditAction::Create, ENTITY)
                    .entity_id(&created.pilgrim.id)
                    .entity_name(&created.pilgrim.name)
                    .new_values(&created.pilgrim),
            )
            .await;
        if let Some(posted) = &created.initial_payment {
            self.audit
                .log(
                    NewAuditEntry::new(actor, AuditAction::Payment, "transaction")
                        .entity_id(&posted.transaction.id)
                        .entity_name(format!("Pembayaran awal - {}", created.pilgrim.name))
                        .new_values(&posted.transaction),
                )
                .await;
        }

        self.announce_seats(created.package.as_ref()).await;
        Ok(created)
    }

    async fn update_pilgrim(
        &self,
        actor: &Actor,
        pilgrim_id: &str,
        update: PilgrimUpdate,
    ) -> Result<Pilgrim> {
        self.ensure_nik_free(update.normalized_nik().as_deref(), Some(pilgrim_id))?;
        self.ensure_package_assignable(&update)?;

        let change = self
            .repository
            .update(pilgrim_id.to_string(), update, now_utc())
            .await?;

        self.audit
            .log(
                NewAuditEntry::new(actor, AuditAction::Update, ENTITY)
                    .entity_id(&change.after.id)
                    .entity_name(&change.after.name)
                    .old_values(&change.before)
                    .new_values(&change.after),
            )
            .await;
        self.announce_seats(change.reserved_package.as_ref()).await;
        Ok(change.after)
    }

    async fn bulk_update_pilgrims(
        &self,
        actor: &Actor,
        updates: Vec<BulkPilgrimUpdate>,
    ) -> Result<Vec<Pilgrim>> {
        let mut seen_niks = HashSet::new();
        for item in &updates {
            let nik = item.data.normalized_nik();
            if let Some(nik) = nik.as_deref() {
                if !seen_niks.insert(nik.to_string()) {
                    return Err(Error::ConstraintViolation(format!(
                        "NIK \"{}\" muncul lebih dari sekali dalam pembaruan massal",
                        nik
                    )));
                }
            }
            self.ensure_nik_free(nik.as_deref(), Some(&item.id))?;
            self.ensure_package_assignable(&item.data)?;
        }

        let changes = self.repository.bulk_update(updates, now_utc()).await?;
        debug!("Bulk updated {} pilgrims", changes.len());

        let mut updated = Vec::with_capacity(changes.len());
        for change in changes {
            self.audit
                .log(
                    NewAuditEntry::new(actor, AuditAction::Update, ENTITY)
                        .entity_id(&change.after.id)
                        .entity_name(&change.after.name)
                        .old_values(&change.before)
                        .new_values(&change.after),
                )
                .await;
            self.announce_seats(change.reserved_package.as_ref()).await;
            updated.push(change.after);
        }
        Ok(updated)
    }

    async fn delete_pilgrim(&self, actor: &Actor, pilgrim_id: &str) -> Result<()> {
        let removed = self.repository.delete(pilgrim_id.to_string()).await?;
        self.audit
            .log(
                NewAuditEntry::new(actor, AuditAction::Delete, ENTITY)
                    .entity_id(&removed.id)
                    .entity_name(&removed.name)
                    .old_values(&removed),
            )
            .await;
        Ok(())
    }
}
