//! Income and expense postings and the aggregates built from them.

mod transactions_model;
mod transactions_service;
mod transactions_traits;

#[cfg(test)]
mod transactions_service_tests;

pub use transactions_model::{
    cashflow_by_month, summarize_totals, CashflowMonth, ExpenseCategory, IncomeCategory,
    IncomePosting, LedgerRow, NewExpense, NewIncome, PaymentMethod, PostedIncome, Transaction,
    TransactionChange, TransactionDetail, TransactionFilter, TransactionTotals, TransactionType,
    TransactionUpdate,
};
pub use transactions_service::TransactionService;
pub use transactions_traits::{TransactionRepositoryTrait, TransactionServiceTrait};
