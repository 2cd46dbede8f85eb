//! Transaction repository and service traits.

use async_trait::async_trait;
use chrono::NaiveDateTime;

use super::transactions_model::{
    CashflowMonth, IncomePosting, LedgerRow, NewExpense, NewIncome, PostedIncome, Transaction,
    TransactionChange, TransactionDetail, TransactionFilter, TransactionTotals, TransactionUpdate,
};
use crate::errors::Result;
use crate::users::Actor;
use crate::utils::{Page, PageRequest};

/// Persistence of transactions.
///
/// Every write applies the transaction's effect on its pilgrim or package
/// in the same store transaction as the row itself.
#[async_trait]
pub trait TransactionRepositoryTrait: Send + Sync {
    /// Newest transaction date first.
    fn list(&self, filter: &TransactionFilter, page: PageRequest)
        -> Result<Page<TransactionDetail>>;

    fn get_by_id(&self, transaction_id: &str) -> Result<Transaction>;

    fn get_detail(&self, transaction_id: &str) -> Result<TransactionDetail>;

    /// Matching rows reduced to the columns aggregations use.
    fn ledger_rows(&self, filter: &TransactionFilter) -> Result<Vec<LedgerRow>>;

    fn recent(&self, limit: i64) -> Result<Vec<TransactionDetail>>;

    /// Stores an income, applies it to the linked pilgrim and writes its
    /// invoice. Fails with not-found when the linked pilgrim does not exist.
    async fn insert_income(&self, posting: IncomePosting) -> Result<PostedIncome>;

    /// Stores an expense and adds it to the linked package's actual cost.
    async fn insert_expense(&self, transaction: Transaction) -> Result<Transaction>;

    /// Reverses the old effect, applies the update and its new effect, and
    /// keeps a derived invoice in step.
    async fn update(
        &self,
        transaction_id: String,
        update: TransactionUpdate,
        now: NaiveDateTime,
    ) -> Result<TransactionChange>;

    /// Reverses the effect, cancels a derived invoice and removes the row.
    /// Returns the removed transaction.
    async fn delete(&self, transaction_id: String) -> Result<Transaction>;
}

#[async_trait]
pub trait TransactionServiceTrait: Send + Sync {
    fn list_transactions(
        &self,
        filter: &TransactionFilter,
        page: PageRequest,
    ) -> Result<Page<TransactionDetail>>;

    fn get_transaction(&self, transaction_id: &str) -> Result<TransactionDetail>;

    /// Income and expense totals, optionally limited to a date range.
    fn totals(
        &self,
        start_date: Option<NaiveDateTime>,
        end_date: Option<NaiveDateTime>,
    ) -> Result<TransactionTotals>;

    fn cashflow(&self, months: u32) -> Result<Vec<CashflowMonth>>;

    fn recent(&self, limit: i64) -> Result<Vec<TransactionDetail>>;

    async fn post_income(&self, actor: &Actor, income: NewIncome) -> Result<PostedIncome>;

    async fn post_expense(&self, actor: &Actor, expense: NewExpense) -> Result<Transaction>;

    async fn update_transaction(
        &self,
        actor: &Actor,
        transaction_id: &str,
        update: TransactionUpdate,
    ) -> Result<Transaction>;

    async fn delete_transaction(&self, actor: &Actor, transaction_id: &str) -> Result<()>;
}
