use std::sync::Arc;

use super::dashboard_model::{DashboardMetrics, DashboardOverview, ManifestEntry};
use crate::errors::Result;
use crate::packages::{PackageFilter, PackageServiceTrait, PackageStatus};
use crate::pilgrims::{PilgrimServiceTrait, StatusCount};
use crate::transactions::{CashflowMonth, TransactionDetail, TransactionServiceTrait};
use crate::utils::PageRequest;
use crate::vendors::VendorServiceTrait;

pub const DEFAULT_CASHFLOW_MONTHS: u32 = 6;
pub const DEFAULT_RECENT_LIMIT: i64 = 10;
const MANIFEST_LIMIT: u32 = 10;

pub trait DashboardServiceTrait: Send + Sync {
    fn metrics(&self) -> Result<DashboardMetrics>;

    fn cashflow(&self, months: u32) -> Result<Vec<CashflowMonth>>;

    /// Open packages, at most ten.
    fn manifest(&self) -> Result<Vec<ManifestEntry>>;

    fn recent_transactions(&self, limit: i64) -> Result<Vec<TransactionDetail>>;

    fn payment_status(&self) -> Result<Vec<StatusCount>>;

    fn overview(&self) -> Result<DashboardOverview>;
}

pub struct DashboardService {
    transactions: Arc<dyn TransactionServiceTrait>,
    pilgrims: Arc<dyn PilgrimServiceTrait>,
    packages: Arc<dyn PackageServiceTrait>,
    vendors: Arc<dyn VendorServiceTrait>,
}

impl DashboardService {
    pub fn new(
        transactions: Arc<dyn TransactionServiceTrait>,
        pilgrims: Arc<dyn PilgrimServiceTrait>,
        packages: Arc<dyn PackageServiceTrait>,
        vendors: Arc<dyn VendorServiceTrait>,
    ) -> Self {
        Self {
            transactions,
            pilgrims,
            packages,
            vendors,
        }
    }
}

impl DashboardServiceTrait for DashboardService {
    fn metrics(&self) -> Result<DashboardMetrics> {
        let totals = self.transactions.totals(None, None)?;
        Ok(DashboardMetrics {
            cash_balance: totals.balance,
            total_income: totals.income,
            total_expense: totals.expense,
            receivables: self.pilgrims.total_receivables()?,
            vendor_payables: self.vendors.total_outstanding()?,
            active_pilgrims: self.pilgrims.active_count()?,
            active_packages: self.packages.active_count()?,
        })
    }

    fn cashflow(&self, months: u32) -> Result<Vec<CashflowMonth>> {
        self.transactions.cashflow(months)
    }

    fn manifest(&self) -> Result<Vec<ManifestEntry>> {
        let filter = PackageFilter {
            status: Some(PackageStatus::Open),
            ..Default::default()
        };
        let open = self
            .packages
            .list_packages(&filter, PageRequest::new(Some(1), Some(MANIFEST_LIMIT)))?;
        Ok(open.data.iter().map(ManifestEntry::from).collect())
    }

    fn recent_transactions(&self, limit: i64) -> Result<Vec<TransactionDetail>> {
        self.transactions.recent(limit)
    }

    fn payment_status(&self) -> Result<Vec<StatusCount>> {
        self.pilgrims.count_by_status()
    }

    fn overview(&self) -> Result<DashboardOverview> {
        Ok(DashboardOverview {
            metrics: self.metrics()?,
            cashflow: self.cashflow(DEFAULT_CASHFLOW_MONTHS)?,
            manifest: self.manifest()?,
            recent_transactions: self.recent_transactions(DEFAULT_RECENT_LIMIT)?,
            payment_status: self.payment_status()?,
        })
    }
}
