//! Per-package profit/loss and budget-versus-actual reports.

mod reports_model;
mod reports_service;

pub use reports_model::{
    budget_actual, profit_loss, BudgetActualEntry, BudgetActualFilter, BudgetActualReport,
    BudgetActualSummary, ExpenseBreakdown, PackageProfitLoss, ProfitLossFilter, ProfitLossReport,
    ProfitLossSummary,
};
pub use reports_service::{ReportService, ReportServiceTrait};
