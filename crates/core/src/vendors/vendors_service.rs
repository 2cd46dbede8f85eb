use async_trait::async_trait;
use log::debug;
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

use super::vendors_model::{
    DebtFilter, DebtStatus, NewVendor, NewVendorDebt, Vendor, VendorDebt, VendorDebtDetail,
    VendorDebtUpdate, VendorFilter, VendorUpdate,
};
use super::vendors_traits::{VendorDebtRepositoryTrait, VendorRepositoryTrait, VendorServiceTrait};
use crate::audit::{AuditAction, AuditServiceTrait, NewAuditEntry};
use crate::constants::VENDOR_DEBT_NOTIFICATION_LINK;
use crate::deletion::VENDOR_DELETION;
use crate::errors::{Result, ValidationError};
use crate::notifications::{
    broadcast_best_effort, NewBroadcast, NotificationServiceTrait, NotificationType,
};
use crate::users::Actor;
use crate::utils::time_utils::now_utc;
use crate::utils::{format_rupiah, Page, PageRequest};

const VENDOR_ENTITY: &str = "vendor";
const DEBT_ENTITY: &str = "vendor_debt";

pub struct VendorService {
    vendors: Arc<dyn VendorRepositoryTrait>,
    debts: Arc<dyn VendorDebtRepositoryTrait>,
    audit: Arc<dyn AuditServiceTrait>,
    notifications: Arc<dyn NotificationServiceTrait>,
}

impl VendorService {
    pub fn new(
        vendors: Arc<dyn VendorRepositoryTrait>,
        debts: Arc<dyn VendorDebtRepositoryTrait>,
        audit: Arc<dyn AuditServiceTrait>,
        notifications: Arc<dyn NotificationServiceTrait>,
    ) -> Self {
        Self {
            vendors,
            debts,
            audit,
            notifications,
        }
    }

    fn vendor_name(&self, vendor_id: &str) -> String {
        self.vendors
            .get_by_id(vendor_id)
            .map(|v| v.name)
            .unwrap_or_else(|_| "vendor".to_string())
    }
}

#[async_trait]
impl VendorServiceTrait for VendorService {
    fn list_vendors(&self, filter: &VendorFilter, page: PageRequest) -> Result<Page<Vendor>> {
        self.vendors.list(filter, page)
    }

    fn get_vendor(&self, vendor_id: &str) -> Result<Vendor> {
        self.vendors.get_by_id(vendor_id)
    }

    async fn create_vendor(&self, actor: &Actor, new_vendor: NewVendor) -> Result<Vendor> {
        new_vendor.validate()?;
        let vendor = new_vendor.into_vendor(Uuid::new_v4().to_string(), now_utc());
        let created = self.vendors.create(vendor).await?;
        self.audit
            .log(
                NewAuditEntry::new(actor, AuditAction::Create, VENDOR_ENTITY)
                    .entity_id(&created.id)
                    .entity_name(&created.name)
                    .new_values(&created),
            )
            .await;
        Ok(created)
    }

    async fn update_vendor(
        &self,
        actor: &Actor,
        vendor_id: &str,
        update: VendorUpdate,
    ) -> Result<Vendor> {
        let existing = self.vendors.get_by_id(vendor_id)?;
        let next = update.apply_to(&existing, now_utc())?;
        let updated = self.vendors.update(next).await?;
        self.audit
            .log(
                NewAuditEntry::new(actor, AuditAction::Update, VENDOR_ENTITY)
                    .entity_id(&updated.id)
                    .entity_name(&updated.name)
                    .old_values(&existing)
                    .new_values(&updated),
            )
            .await;
        Ok(updated)
    }

    async fn delete_vendor(&self, actor: &Actor, vendor_id: &str) -> Result<()> {
        let existing = self.vendors.get_by_id(vendor_id)?;
        self.vendors
            .remove(vendor_id.to_string(), VENDOR_DELETION, now_utc())
            .await?;
        self.audit
            .log(
                NewAuditEntry::new(actor, AuditAction::Delete, VENDOR_ENTITY)
                    .entity_id(&existing.id)
                    .entity_name(&existing.name)
                    .old_values(&existing),
            )
            .await;
        Ok(())
    }

    fn list_debts(
        &self,
        filter: &DebtFilter,
        page: PageRequest,
    ) -> Result<Page<VendorDebtDetail>> {
        self.debts.list(filter, page)
    }

    fn get_debt(&self, debt_id: &str) -> Result<VendorDebtDetail> {
        self.debts.get_detail(debt_id)
    }

    fn outstanding_debts(&self) -> Result<Vec<VendorDebtDetail>> {
        self.debts.list_outstanding()
    }

    fn total_outstanding(&self) -> Result<Decimal> {
        Ok(self
            .debts
            .list_outstanding()?
            .iter()
            .filter(|d| d.debt.status != DebtStatus::Paid)
            .map(|d| d.debt.remaining_amount)
            .sum())
    }

    async fn create_debt(&self, actor: &Actor, new_debt: NewVendorDebt) -> Result<VendorDebt> {
        new_debt.validate()?;
        let vendor = self.vendors.get_by_id(new_debt.vendor_id.trim())?;
        let debt =
            new_debt.into_debt(Uuid::new_v4().to_string(), Some(actor.user_id.clone()), now_utc());
        let created = self.debts.create(debt).await?;
        debug!("Recorded debt {} to vendor {}", created.id, vendor.name);

        self.audit
            .log(
                NewAuditEntry::new(actor, AuditAction::Create, DEBT_ENTITY)
                    .entity_id(&created.id)
                    .entity_name(&created.description)
                    .new_values(&created),
            )
            .await;
        broadcast_best_effort(
            self.notifications.as_ref(),
            NewBroadcast::new(
                "Hutang Vendor Baru",
                format!(
                    "Hutang {} ke {} telah dicatat",
                    format_rupiah(created.total_amount),
                    vendor.name
                ),
                NotificationType::Warning,
                Some(VENDOR_DEBT_NOTIFICATION_LINK),
            ),
        )
        .await;
        Ok(created)
    }

    async fn update_debt(
        &self,
        actor: &Actor,
        debt_id: &str,
        update: VendorDebtUpdate,
    ) -> Result<VendorDebt> {
        let existing = self.debts.get_by_id(debt_id)?;
        let next = update.apply_to(&existing, now_utc())?;
        let updated = self.debts.update(next).await?;
        self.audit
            .log(
                NewAuditEntry::new(actor, AuditAction::Update, DEBT_ENTITY)
                    .entity_id(&updated.id)
                    .entity_name(&updated.description)
                    .old_values(&existing)
                    .new_values(&updated),
            )
            .await;
        Ok(updated)
    }

    async fn pay_debt(&self, actor: &Actor, debt_id: &str, amount: Decimal) -> Result<VendorDebt> {
        if amount <= Decimal::ZERO {
            return Err(
                ValidationError::invalid("payment amount must be greater than zero").into(),
            );
        }
        let (before, after) = self
            .debts
            .add_payment(debt_id.to_string(), amount, now_utc())
            .await?;

        self.audit
            .log(
                NewAuditEntry::new(actor, AuditAction::Payment, DEBT_ENTITY)
                    .entity_id(&after.id)
                    .entity_name(format!("Payment: {}", format_rupiah(amount)))
                    .old_values(&before)
                    .new_values(&after),
            )
            .await;

        let vendor_name = self.vendor_name(&after.vendor_id);
        let broadcast = if after.status == DebtStatus::Paid {
            NewBroadcast::new(
                "Hutang Vendor Lunas",
                format!("Hutang ke {} telah lunas", vendor_name),
                NotificationType::Success,
                Some(VENDOR_DEBT_NOTIFICATION_LINK),
            )
        } else {
            NewBroadcast::new(
                "Pembayaran Hutang Vendor",
                format!("Pembayaran {} ke {}", format_rupiah(amount), vendor_name),
                NotificationType::Info,
                Some(VENDOR_DEBT_NOTIFICATION_LINK),
            )
        };
        broadcast_best_effort(self.notifications.as_ref(), broadcast).await;
        Ok(after)
    }

    async fn delete_debt(&self, actor: &Actor, debt_id: &str) -> Result<()> {
        let existing = self.debts.get_by_id(debt_id)?;
        self.debts.delete(debt_id.to_string()).await?;
        self.audit
            .log(
                NewAuditEntry::new(actor, AuditAction::Delete, DEBT_ENTITY)
                    .entity_id(&existing.id)
                    .entity_name(&existing.description)
                    .old_values(&existing),
            )
            .await;
        Ok(())
    }
}
