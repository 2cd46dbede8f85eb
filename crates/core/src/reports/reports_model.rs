use std::collections::HashMap;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::packages::{Package, PackageStatus, PackageType};
use crate::transactions::{ExpenseCategory, LedgerRow, TransactionType};
use crate::utils::percent_of;
use crate::utils::time_utils::deserialize_optional_datetime;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfitLossFilter {
    #[serde(default, deserialize_with = "deserialize_optional_datetime")]
    pub start_date: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "deserialize_optional_datetime")]
    pub end_date: Option<NaiveDateTime>,
    pub package_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PackageProfitLoss {
    pub package_id: String,
    pub package_code: String,
    pub package_name: String,
    pub package_type: PackageType,
    pub status: PackageStatus,
    pub departure_date: Option<NaiveDateTime>,
    pub total_seats: i32,
    pub booked_seats: i32,
    pub pilgrim_count: i64,
    pub price_per_person: Decimal,
    pub total_income: Decimal,
    pub total_expense: Decimal,
    pub profit: Decimal,
    /// Profit as a percentage of income.
    pub margin: Decimal,
    pub is_profit: bool,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProfitLossSummary {
    pub total_income: Decimal,
    pub total_expense: Decimal,
    pub total_profit: Decimal,
    pub profitable_packages: usize,
    pub loss_packages: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProfitLossReport {
    pub data: Vec<PackageProfitLoss>,
    pub summary: ProfitLossSummary,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetActualFilter {
    pub package_id: Option<String>,
    pub status: Option<PackageStatus>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseBreakdown {
    pub category: Option<ExpenseCategory>,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BudgetActualEntry {
    pub package_id: String,
    pub package_code: String,
    pub package_name: String,
    pub package_type: PackageType,
    pub status: PackageStatus,
    pub departure_date: Option<NaiveDateTime>,
    pub total_seats: i32,
    pub booked_seats: i32,
    pub estimated_cost: Decimal,
    pub actual_cost: Decimal,
    /// Estimated minus actual; negative when over budget.
    pub variance: Decimal,
    pub variance_percent: Decimal,
    pub is_under_budget: bool,
    pub expense_breakdown: Vec<ExpenseBreakdown>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BudgetActualSummary {
    pub total_estimated: Decimal,
    pub total_actual: Decimal,
    pub total_variance: Decimal,
    pub under_budget_count: usize,
    pub over_budget_count: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BudgetActualReport {
    pub data: Vec<BudgetActualEntry>,
    pub summary: BudgetActualSummary,
}

fn rows_for<'a>(rows: &'a [LedgerRow], package_id: &'a str) -> impl Iterator<Item = &'a LedgerRow> {
    rows.iter()
        .filter(move |r| r.package_id.as_deref() == Some(package_id))
}

fn sum_of<'a>(rows: impl Iterator<Item = &'a LedgerRow>, kind: TransactionType) -> Decimal {
    rows.filter(|r| r.transaction_type == kind)
        .map(|r| r.amount)
        .sum()
}

/// Builds the profit/loss report from package rows and the ledger rows
/// already limited to the requested date range. Most profitable first.
pub fn profit_loss(
    packages: &[Package],
    rows: &[LedgerRow],
    pilgrim_counts: &HashMap<String, i64>,
    package_id: Option<&str>,
) -> ProfitLossReport {
    let mut data: Vec<PackageProfitLoss> = packages
        .iter()
        .filter(|p| package_id.is_none_or(|id| p.id == id))
        .map(|package| {
            let total_income = sum_of(rows_for(rows, &package.id), TransactionType::Income);
            let total_expense = sum_of(rows_for(rows, &package.id), TransactionType::Expense);
            let profit = total_income - total_expense;
            PackageProfitLoss {
                package_id: package.id.clone(),
                package_code: package.code.clone(),
                package_name: package.name.clone(),
                package_type: package.package_type,
                status: package.status,
                departure_date: package.departure_date,
                total_seats: package.total_seats,
                booked_seats: package.booked_seats,
                pilgrim_count: pilgrim_counts.get(&package.id).copied().unwrap_or(0),
                price_per_person: package.price_per_person,
                total_income,
                total_expense,
                profit,
                margin: percent_of(profit, total_income),
                is_profit: profit >= Decimal::ZERO,
            }
        })
        .collect();
    data.sort_by(|a, b| b.profit.cmp(&a.profit));

    let mut summary = ProfitLossSummary::default();
    for entry in &data {
        summary.total_income += entry.total_income;
        summary.total_expense += entry.total_expense;
        summary.total_profit += entry.profit;
        if entry.is_profit {
            summary.profitable_packages += 1;
        } else {
            summary.loss_packages += 1;
        }
    }

    ProfitLossReport { data, summary }
}

/// Expense per category, largest first. Uncategorized expenses are grouped
/// under `None`.
fn breakdown<'a>(rows: impl Iterator<Item = &'a LedgerRow>) -> Vec<ExpenseBreakdown> {
    let mut totals: Vec<ExpenseBreakdown> = Vec::new();
    for row in rows.filter(|r| r.transaction_type == TransactionType::Expense) {
        match totals.iter_mut().find(|b| b.category == row.expense_category) {
            Some(existing) => existing.amount += row.amount,
            None => totals.push(ExpenseBreakdown {
                category: row.expense_category,
                amount: row.amount,
            }),
        }
    }
    totals.sort_by(|a, b| b.amount.cmp(&a.amount));
    totals
}

/// Compares each package's estimated cost with its recorded expenses.
/// Most over budget first.
pub fn budget_actual(
    packages: &[Package],
    rows: &[LedgerRow],
    filter: &BudgetActualFilter,
) -> BudgetActualReport {
    let mut data: Vec<BudgetActualEntry> = packages
        .iter()
        .filter(|p| filter.package_id.as_deref().is_none_or(|id| p.id == id))
        .filter(|p| filter.status.is_none_or(|s| p.status == s))
        .map(|package| {
            let estimated_cost = package.estimated_cost_or_zero();
            let actual_cost = sum_of(rows_for(rows, &package.id), TransactionType::Expense);
            let variance = estimated_cost - actual_cost;
            BudgetActualEntry {
                package_id: package.id.clone(),
                package_code: package.code.clone(),
                package_name: package.name.clone(),
                package_type: package.package_type,
                status: package.status,
                departure_date: package.departure_date,
                total_seats: package.total_seats,
                booked_seats: package.booked_seats,
                estimated_cost,
                actual_cost,
                variance,
                variance_percent: percent_of(variance, estimated_cost),
                is_under_budget: variance >= Decimal::ZERO,
                expense_breakdown: breakdown(rows_for(rows, &package.id)),
            }
        })
        .collect();
    data.sort_by(|a, b| a.variance.cmp(&b.variance));

    let mut summary = BudgetActualSummary::default();
    for entry in &data {
        summary.total_estimated += entry.estimated_cost;
        summary.total_actual += entry.actual_cost;
        summary.total_variance += entry.variance;
        if entry.is_under_budget {
            summary.under_budget_count += 1;
        } else {
            summary.over_budget_count += 1;
        }
    }

    BudgetActualReport { data, summary }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn at(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, day)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    fn package(id: &str, estimated: Option<Decimal>) -> Package {
        Package {
            id: id.to_string(),
            code: format!("PKG-{}", id),
            name: format!("Paket {}", id),
            package_type: PackageType::Umroh,
            description: None,
            price_per_person: dec!(30000000),
            total_seats: 40,
            booked_seats: 2,
            departure_date: None,
            return_date: None,
            status: PackageStatus::Open,
            estimated_cost: estimated,
            actual_cost: Decimal::ZERO,
            hotel_makkah: None,
            hotel_madinah: None,
            airline: None,
            created_at: at(1),
            updated_at: at(1),
            created_by_id: None,
        }
    }

    fn row(
        package_id: &str,
        kind: TransactionType,
        category: Option<ExpenseCategory>,
        amount: Decimal,
    ) -> LedgerRow {
        LedgerRow {
            transaction_type: kind,
            expense_category: category,
            amount,
            package_id: Some(package_id.to_string()),
            transaction_date: at(10),
        }
    }

    #[test]
    fn profit_loss_sorts_by_profit_and_counts_losses() {
        let packages = vec![package("a", None), package("b", None)];
        let rows = vec![
            row("a", TransactionType::Income, None, dec!(10000000)),
            row("a", TransactionType::Expense, Some(ExpenseCategory::Hotel), dec!(12000000)),
            row("b", TransactionType::Income, None, dec!(20000000)),
            row("b", TransactionType::Expense, Some(ExpenseCategory::Visa), dec!(5000000)),
        ];
        let counts = HashMap::from([("a".to_string(), 3)]);

        let report = profit_loss(&packages, &rows, &counts, None);

        assert_eq!(report.data[0].package_id, "b");
        assert_eq!(report.data[0].profit, dec!(15000000));
        assert_eq!(report.data[0].margin, dec!(75));
        assert_eq!(report.data[0].pilgrim_count, 0);
        assert_eq!(report.data[1].profit, dec!(-2000000));
        assert_eq!(report.data[1].margin, dec!(-20));
        assert!(!report.data[1].is_profit);
        assert_eq!(report.data[1].pilgrim_count, 3);
        assert_eq!(report.summary.total_profit, dec!(13000000));
        assert_eq!(report.summary.profitable_packages, 1);
        assert_eq!(report.summary.loss_packages, 1);

        let only_a = profit_loss(&packages, &rows, &counts, Some("a"));
        assert_eq!(only_a.data.len(), 1);
    }

    #[test]
    fn margin_is_zero_without_income() {
        let packages = vec![package("a", None)];
        let rows = vec![row("a", TransactionType::Expense, None, dec!(100))];
        let report = profit_loss(&packages, &rows, &HashMap::new(), None);
        assert_eq!(report.data[0].margin, Decimal::ZERO);
    }

    #[test]
    fn budget_actual_groups_expenses_by_category() {
        let packages = vec![
            package("a", Some(dec!(10000000))),
            package("b", Some(dec!(5000000))),
        ];
        let rows = vec![
            row("a", TransactionType::Expense, Some(ExpenseCategory::Hotel), dec!(3000000)),
            row("a", TransactionType::Expense, Some(ExpenseCategory::Hotel), dec!(1000000)),
            row("a", TransactionType::Expense, Some(ExpenseCategory::TiketPesawat), dec!(5000000)),
            row("a", TransactionType::Income, None, dec!(99000000)),
            row("b", TransactionType::Expense, None, dec!(6000000)),
        ];

        let report = budget_actual(&packages, &rows, &BudgetActualFilter::default());

        let over = &report.data[0];
        assert_eq!(over.package_id, "b");
        assert_eq!(over.variance, dec!(-1000000));
        assert_eq!(over.variance_percent, dec!(-20));
        assert!(!over.is_under_budget);

        let under = &report.data[1];
        assert_eq!(under.actual_cost, dec!(9000000));
        assert_eq!(under.variance_percent, dec!(10));
        assert_eq!(
            under.expense_breakdown,
            vec![
                ExpenseBreakdown {
                    category: Some(ExpenseCategory::TiketPesawat),
                    amount: dec!(5000000),
                },
                ExpenseBreakdown {
                    category: Some(ExpenseCategory::Hotel),
                    amount: dec!(4000000),
                },
            ]
        );

        assert_eq!(report.summary.total_estimated, dec!(15000000));
        assert_eq!(report.summary.total_actual, dec!(15000000));
        assert_eq!(report.summary.under_budget_count, 1);
        assert_eq!(report.summary.over_budget_count, 1);
    }

    #[test]
    fn budget_actual_filters_by_status() {
        let mut closed = package("c", Some(dec!(1)));
        closed.status = PackageStatus::Closed;
        let packages = vec![package("a", None), closed];
        let filter = BudgetActualFilter {
            status: Some(PackageStatus::Closed),
            ..Default::default()
        };
        let report = budget_actual(&packages, &[], &filter);
        assert_eq!(report.data.len(), 1);
        assert_eq!(report.data[0].package_id, "c");
    }
}
