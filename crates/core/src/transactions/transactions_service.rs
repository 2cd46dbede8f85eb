use async_trait::async_trait;
use chrono::NaiveDateTime;
use log::debug;
use std::sync::Arc;
use uuid::Uuid;

use super::transactions_model::{
    cashflow_by_month, summarize_totals, CashflowMonth, IncomePosting, NewExpense, NewIncome,
    PostedIncome, Transaction, TransactionDetail, TransactionFilter, TransactionTotals,
    TransactionType, TransactionUpdate,
};
use super::transactions_traits::{TransactionRepositoryTrait, TransactionServiceTrait};
use crate::audit::{AuditAction, AuditServiceTrait, NewAuditEntry};
use crate::constants::TRANSACTION_NOTIFICATION_LINK;
use crate::errors::Result;
use crate::notifications::{broadcast_best_effort, NewBroadcast, NotificationServiceTrait, NotificationType};
use crate::users::Actor;
use crate::utils::time_utils::now_utc;
use crate::utils::{format_rupiah, Page, PageRequest};

const ENTITY: &str = "transaction";

/// Posts income and expenses and keeps their side effects in order.
pub struct TransactionService {
    repository: Arc<dyn TransactionRepositoryTrait>,
    audit: Arc<dyn AuditServiceTrait>,
    notifications: Arc<dyn NotificationServiceTrait>,
}

impl TransactionService {
    pub fn new(
        repository: Arc<dyn TransactionRepositoryTrait>,
        audit: Arc<dyn AuditServiceTrait>,
        notifications: Arc<dyn NotificationServiceTrait>,
    ) -> Self {
        Self {
            repository,
            audit,
            notifications,
        }
    }
}

fn entity_name(transaction: &Transaction) -> String {
    match transaction.transaction_type {
        TransactionType::Income => format!("Pemasukan: {}", format_rupiah(transaction.amount)),
        TransactionType::Expense => format!("Pengeluaran: {}", format_rupiah(transaction.amount)),
    }
}

#[async_trait]
impl TransactionServiceTrait for TransactionService {
    fn list_transactions(
        &self,
        filter: &TransactionFilter,
        page: PageRequest,
    ) -> Result<Page<TransactionDetail>> {
        self.repository.list(filter, page)
    }

    fn get_transaction(&self, transaction_id: &str) -> Result<TransactionDetail> {
        self.repository.get_detail(transaction_id)
    }

    fn totals(
        &self,
        start_date: Option<NaiveDateTime>,
        end_date: Option<NaiveDateTime>,
    ) -> Result<TransactionTotals> {
        let rows = self.repository.ledger_rows(&TransactionFilter {
            start_date,
            end_date,
            ..Default::default()
        })?;
        Ok(summarize_totals(&rows))
    }

    fn cashflow(&self, months: u32) -> Result<Vec<CashflowMonth>> {
        let now = now_utc();
        let rows = self.repository.ledger_rows(&TransactionFilter::default())?;
        Ok(cashflow_by_month(&rows, months, now))
    }

    fn recent(&self, limit: i64) -> Result<Vec<TransactionDetail>> {
        self.repository.recent(limit.max(1))
    }

    async fn post_income(&self, actor: &Actor, income: NewIncome) -> Result<PostedIncome> {
        income.validate()?;
        let now = now_utc();
        let transaction =
            income.into_transaction(Uuid::new_v4().to_string(), Some(actor.user_id.clone()), now);
        let posted = self
            .repository
            .insert_income(IncomePosting::new(transaction, now))
            .await?;
        debug!(
            "Posted income {} of {} (invoice: {:?})",
            posted.transaction.id,
            posted.transaction.amount,
            posted.invoice.as_ref().map(|i| i.invoice_number.as_str())
        );

        self.audit
            .log(
                NewAuditEntry::new(actor, AuditAction::Create, ENTITY)
                    .entity_id(&posted.transaction.id)
                    .entity_name(entity_name(&posted.transaction))
                    .new_values(&posted.transaction),
            )
            .await;

        let source = posted
            .pilgrim
            .as_ref()
            .map(|p| p.name.clone())
            .or_else(|| posted.transaction.description.clone())
            .unwrap_or_else(|| posted.transaction.category_label().to_string());
        broadcast_best_effort(
            self.notifications.as_ref(),
            NewBroadcast::new(
                "Pemasukan Baru",
                format!(
                    "Pemasukan {} dari {}",
                    format_rupiah(posted.transaction.amount),
                    source
                ),
                NotificationType::Success,
                Some(TRANSACTION_NOTIFICATION_LINK),
            ),
        )
        .await;

        Ok(posted)
    }

    async fn post_expense(&self, actor: &Actor, expense: NewExpense) -> Result<Transaction> {
        expense.validate()?;
        let transaction = expense.into_transaction(
            Uuid::new_v4().to_string(),
            Some(actor.user_id.clone()),
            now_utc(),
        );
        let stored = self.repository.insert_expense(transaction).await?;
        debug!("Posted expense {} of {}", stored.id, stored.amount);

        self.audit
            .log(
                NewAuditEntry::new(actor, AuditAction::Create, ENTITY)
                    .entity_id(&stored.id)
                    .entity_name(entity_name(&stored))
                    .new_values(&stored),
            )
            .await;

        broadcast_best_effort(
            self.notifications.as_ref(),
            NewBroadcast::new(
                "Pengeluaran Baru",
                format!(
                    "Pengeluaran {} untuk {}",
                    format_rupiah(stored.amount),
                    stored.category_label()
                ),
                NotificationType::Info,
                Some(TRANSACTION_NOTIFICATION_LINK),
            ),
        )
        .await;

        Ok(stored)
    }

    async fn update_transaction(
        &self,
        actor: &Actor,
        transaction_id: &str,
        update: TransactionUpdate,
    ) -> Result<Transaction> {
        let change = self
            .repository
            .update(transaction_id.to_string(), update, now_utc())
            .await?;

        self.audit
            .log(
                NewAuditEntry::new(actor, AuditAction::Update, ENTITY)
                    .entity_id(&change.after.id)
                    .entity_name(entity_name(&change.after))
                    .old_values(&change.before)
                    .new_values(&change.after),
            )
            .await;
        Ok(change.after)
    }

    async fn delete_transaction(&self, actor: &Actor, transaction_id: &str) -> Result<()> {
        let removed = self.repository.delete(transaction_id.to_string()).await?;

        self.audit
            .log(
                NewAuditEntry::new(actor, AuditAction::Delete, ENTITY)
                    .entity_id(&removed.id)
                    .entity_name(entity_name(&removed))
                    .old_values(&removed),
            )
            .await;

        broadcast_best_effort(
            self.notifications.as_ref(),
            NewBroadcast::new(
                "Transaksi Dihapus",
                format!(
                    "{} dihapus oleh {}",
                    entity_name(&removed),
                    actor.name
                ),
                NotificationType::Warning,
                Some(TRANSACTION_NOTIFICATION_LINK),
            ),
        )
        .await;
        Ok(())
    }
}
