use async_trait::async_trait;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use std::sync::Mutex;

use crate::deletion::DeletionPolicy;
use crate::errors::{Error, Result};
use crate::utils::{Page, PageRequest};
use crate::vendors::{
    DebtFilter, DebtStatus, Vendor, VendorDebt, VendorDebtDetail, VendorDebtRepositoryTrait,
    VendorFilter, VendorRepositoryTrait,
};

#[derive(Default)]
pub struct MemoryVendors {
    vendors: Mutex<Vec<Vendor>>,
    debts: Mutex<Vec<VendorDebt>>,
}

impl MemoryVendors {
    pub fn debts(&self) -> Vec<VendorDebt> {
        self.debts.lock().unwrap().clone()
    }

    fn detail(&self, debt: VendorDebt) -> VendorDebtDetail {
        let vendor_name = self
            .vendors
            .lock()
            .unwrap()
            .iter()
            .find(|v| v.id == debt.vendor_id)
            .map(|v| v.name.clone());
        VendorDebtDetail {
            debt,
            vendor_name,
            package_name: None,
        }
    }
}

#[async_trait]
impl VendorRepositoryTrait for MemoryVendors {
    fn list(&self, filter: &VendorFilter, page: PageRequest) -> Result<Page<Vendor>> {
        let include_inactive = filter.include_inactive.unwrap_or(false);
        let rows: Vec<Vendor> = self
            .vendors
            .lock()
            .unwrap()
            .iter()
            .filter(|v| include_inactive || v.is_active)
            .cloned()
            .collect();
        Ok(page.slice(rows))
    }

    fn get_by_id(&self, vendor_id: &str) -> Result<Vendor> {
        self.vendors
            .lock()
            .unwrap()
            .iter()
            .find(|v| v.id == vendor_id)
            .cloned()
            .ok_or_else(|| Error::not_found("Vendor", vendor_id))
    }

    async fn create(&self, vendor: Vendor) -> Result<Vendor> {
        self.vendors.lock().unwrap().push(vendor.clone());
        Ok(vendor)
    }

    async fn update(&self, vendor: Vendor) -> Result<Vendor> {
        let mut vendors = self.vendors.lock().unwrap();
        let slot = vendors
            .iter_mut()
            .find(|v| v.id == vendor.id)
            .ok_or_else(|| Error::not_found("Vendor", &vendor.id))?;
        *slot = vendor.clone();
        Ok(vendor)
    }

    async fn remove(
        &self,
        vendor_id: String,
        policy: DeletionPolicy,
        now: NaiveDateTime,
    ) -> Result<()> {
        let mut vendors = self.vendors.lock().unwrap();
        match policy {
            DeletionPolicy::SoftFlag => {
                for vendor in vendors.iter_mut().filter(|v| v.id == vendor_id) {
                    vendor.is_active = false;
                    vendor.updated_at = now;
                }
            }
            DeletionPolicy::Hard => vendors.retain(|v| v.id != vendor_id),
        }
        Ok(())
    }
}

#[async_trait]
impl VendorDebtRepositoryTrait for MemoryVendors {
    fn list(&self, filter: &DebtFilter, page: PageRequest) -> Result<Page<VendorDebtDetail>> {
        let rows: Vec<VendorDebt> = self
            .debts
            .lock()
            .unwrap()
            .iter()
            .filter(|d| filter.status.is_none_or(|s| d.status == s))
            .cloned()
            .collect();
        Ok(page.slice(rows.into_iter().map(|d| self.detail(d)).collect()))
    }

    fn get_by_id(&self, debt_id: &str) -> Result<VendorDebt> {
        self.debts
            .lock()
            .unwrap()
            .iter()
            .find(|d| d.id == debt_id)
            .cloned()
            .ok_or_else(|| Error::not_found("Vendor debt", debt_id))
    }

    fn get_detail(&self, debt_id: &str) -> Result<VendorDebtDetail> {
        let debt = VendorDebtRepositoryTrait::get_by_id(self, debt_id)?;
        Ok(self.detail(debt))
    }

    fn list_outstanding(&self) -> Result<Vec<VendorDebtDetail>> {
        let rows: Vec<VendorDebt> = self
            .debts
            .lock()
            .unwrap()
            .iter()
            .filter(|d| d.status != DebtStatus::Paid)
            .cloned()
            .collect();
        Ok(rows.into_iter().map(|d| self.detail(d)).collect())
    }

    async fn create(&self, debt: VendorDebt) -> Result<VendorDebt> {
        self.debts.lock().unwrap().push(debt.clone());
        Ok(debt)
    }

    async fn update(&self, debt: VendorDebt) -> Result<VendorDebt> {
        let mut debts = self.debts.lock().unwrap();
        let slot = debts
            .iter_mut()
            .find(|d| d.id == debt.id)
            .ok_or_else(|| Error::not_found("Vendor debt", &debt.id))?;
        *slot = debt.clone();
        Ok(debt)
    }

    async fn add_payment(
        &self,
        debt_id: String,
        amount: Decimal,
        now: NaiveDateTime,
    ) -> Result<(VendorDebt, VendorDebt)> {
        let mut debts = self.debts.lock().unwrap();
        let slot = debts
            .iter_mut()
            .find(|d| d.id == debt_id)
            .ok_or_else(|| Error::not_found("Vendor debt", &debt_id))?;
        let before = slot.clone();
        *slot = before.with_payment(amount, now)?;
        Ok((before, slot.clone()))
    }

    async fn delete(&self, debt_id: String) -> Result<usize> {
        let mut debts = self.debts.lock().unwrap();
        let before = debts.len();
        debts.retain(|d| d.id != debt_id);
        Ok(before - debts.len())
    }
}
