use async_trait::async_trait;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;

use super::vendors_model::{
    DebtFilter, NewVendor, NewVendorDebt, Vendor, VendorDebt, VendorDebtDetail, VendorDebtUpdate,
    VendorFilter, VendorUpdate,
};
use crate::deletion::DeletionPolicy;
use crate::errors::Result;
use crate::users::Actor;
use crate::utils::{Page, PageRequest};

#[async_trait]
pub trait VendorRepositoryTrait: Send + Sync {
    /// Sorted by name.
    fn list(&self, filter: &VendorFilter, page: PageRequest) -> Result<Page<Vendor>>;

    fn get_by_id(&self, vendor_id: &str) -> Result<Vendor>;

    async fn create(&self, vendor: Vendor) -> Result<Vendor>;

    async fn update(&self, vendor: Vendor) -> Result<Vendor>;

    /// Removes the vendor as `policy` says: `SoftFlag` clears `is_active`
    /// and keeps the row, `Hard` deletes it.
    async fn remove(
        &self,
        vendor_id: String,
        policy: DeletionPolicy,
        now: NaiveDateTime,
    ) -> Result<()>;
}

#[async_trait]
pub trait VendorDebtRepositoryTrait: Send + Sync {
    /// Newest first.
    fn list(&self, filter: &DebtFilter, page: PageRequest) -> Result<Page<VendorDebtDetail>>;

    fn get_by_id(&self, debt_id: &str) -> Result<VendorDebt>;

    fn get_detail(&self, debt_id: &str) -> Result<VendorDebtDetail>;

    /// Debts not yet paid, earliest due date first.
    fn list_outstanding(&self) -> Result<Vec<VendorDebtDetail>>;

    async fn create(&self, debt: VendorDebt) -> Result<VendorDebt>;

    async fn update(&self, debt: VendorDebt) -> Result<VendorDebt>;

    /// Reads the current debt and records the payment in one store
    /// transaction. Returns the debt before and after.
    async fn add_payment(
        &self,
        debt_id: String,
        amount: Decimal,
        now: NaiveDateTime,
    ) -> Result<(VendorDebt, VendorDebt)>;

    async fn delete(&self, debt_id: String) -> Result<usize>;
}

#[async_trait]
pub trait VendorServiceTrait: Send + Sync {
    fn list_vendors(&self, filter: &VendorFilter, page: PageRequest) -> Result<Page<Vendor>>;

    fn get_vendor(&self, vendor_id: &str) -> Result<Vendor>;

    async fn create_vendor(&self, actor: &Actor, new_vendor: NewVendor) -> Result<Vendor>;

    async fn update_vendor(
        &self,
        actor: &Actor,
        vendor_id: &str,
        update: VendorUpdate,
    ) -> Result<Vendor>;

    async fn delete_vendor(&self, actor: &Actor, vendor_id: &str) -> Result<()>;

    fn list_debts(&self, filter: &DebtFilter, page: PageRequest)
        -> Result<Page<VendorDebtDetail>>;

    fn get_debt(&self, debt_id: &str) -> Result<VendorDebtDetail>;

    fn outstanding_debts(&self) -> Result<Vec<VendorDebtDetail>>;

    /// Sum still owed on debts that are not paid.
    fn total_outstanding(&self) -> Result<Decimal>;

    async fn create_debt(&self, actor: &Actor, new_debt: NewVendorDebt) -> Result<VendorDebt>;

    async fn update_debt(
        &self,
        actor: &Actor,
        debt_id: &str,
        update: VendorDebtUpdate,
    ) -> Result<VendorDebt>;

    async fn pay_debt(&self, actor: &Actor, debt_id: &str, amount: Decimal) -> Result<VendorDebt>;

    async fn delete_debt(&self, actor: &Actor, debt_id: &str) -> Result<()>;
}
