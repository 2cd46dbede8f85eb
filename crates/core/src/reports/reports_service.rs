use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDateTime;

use super::reports_model::{
    budget_actual, profit_loss, BudgetActualFilter, BudgetActualReport, ProfitLossFilter,
    ProfitLossReport,
};
use crate::errors::Result;
use crate::packages::PackageRepositoryTrait;
use crate::pilgrims::PilgrimRepositoryTrait;
use crate::transactions::{
    summarize_totals, TransactionFilter, TransactionRepositoryTrait, TransactionTotals,
};

pub trait ReportServiceTrait: Send + Sync {
    fn profit_loss(&self, filter: &ProfitLossFilter) -> Result<ProfitLossReport>;

    fn budget_actual(&self, filter: &BudgetActualFilter) -> Result<BudgetActualReport>;

    fn totals(
        &self,
        start_date: Option<NaiveDateTime>,
        end_date: Option<NaiveDateTime>,
    ) -> Result<TransactionTotals>;
}

pub struct ReportService {
    packages: Arc<dyn PackageRepositoryTrait>,
    pilgrims: Arc<dyn PilgrimRepositoryTrait>,
    transactions: Arc<dyn TransactionRepositoryTrait>,
}

impl ReportService {
    pub fn new(
        packages: Arc<dyn PackageRepositoryTrait>,
        pilgrims: Arc<dyn PilgrimRepositoryTrait>,
        transactions: Arc<dyn TransactionRepositoryTrait>,
    ) -> Self {
        Self {
            packages,
            pilgrims,
            transactions,
        }
    }

    fn pilgrim_counts(&self) -> Result<HashMap<String, i64>> {
        let mut counts = HashMap::new();
        for pilgrim in self.pilgrims.list_all()? {
            if let Some(package_id) = pilgrim.package_id {
                *counts.entry(package_id).or_insert(0) += 1;
            }
        }
        Ok(counts)
    }
}

impl ReportServiceTrait for ReportService {
    fn profit_loss(&self, filter: &ProfitLossFilter) -> Result<ProfitLossReport> {
        let packages = self.packages.list_all()?;
        let rows = self.transactions.ledger_rows(&TransactionFilter {
            package_id: filter.package_id.clone(),
            start_date: filter.start_date,
            end_date: filter.end_date,
            ..Default::default()
        })?;
        Ok(profit_loss(
            &packages,
            &rows,
            &self.pilgrim_counts()?,
            filter.package_id.as_deref(),
        ))
    }

    fn budget_actual(&self, filter: &BudgetActualFilter) -> Result<BudgetActualReport> {
        let packages = self.packages.list_all()?;
        let rows = self.transactions.ledger_rows(&TransactionFilter {
            package_id: filter.package_id.clone(),
            ..Default::default()
        })?;
        Ok(budget_actual(&packages, &rows, filter))
    }

    fn totals(
        &self,
        start_date: Option<NaiveDateTime>,
        end_date: Option<NaiveDateTime>,
    ) -> Result<TransactionTotals> {
        let rows = self.transactions.ledger_rows(&TransactionFilter {
            start_date,
            end_date,
            ..Default::default()
        })?;
        Ok(summarize_totals(&rows))
    }
}
