use rust_decimal::Decimal;
use serde::Serialize;

use crate::packages::Package;
use crate::pilgrims::StatusCount;
use crate::transactions::{CashflowMonth, TransactionDetail};

/// Headline figures shown at the top of the dashboard.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetrics {
    pub cash_balance: Decimal,
    pub total_income: Decimal,
    pub total_expense: Decimal,
    /// Still owed by pilgrims.
    pub receivables: Decimal,
    /// Still owed to vendors.
    pub vendor_payables: Decimal,
    pub active_pilgrims: i64,
    pub active_packages: i64,
}

/// Seat distribution of one open package.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    pub id: String,
    pub code: String,
    pub name: String,
    pub total_seats: i32,
    pub booked_seats: i32,
    pub available_seats: i32,
    pub occupancy_rate: f64,
}

impl From<&Package> for ManifestEntry {
    fn from(package: &Package) -> Self {
        Self {
            id: package.id.clone(),
            code: package.code.clone(),
            name: package.name.clone(),
            total_seats: package.total_seats,
            booked_seats: package.booked_seats,
            available_seats: package.available_seats(),
            occupancy_rate: package.occupancy_rate(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardOverview {
    pub metrics: DashboardMetrics,
    pub cashflow: Vec<CashflowMonth>,
    pub manifest: Vec<ManifestEntry>,
    pub recent_transactions: Vec<TransactionDetail>,
    pub payment_status: Vec<StatusCount>,
}
