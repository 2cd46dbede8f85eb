use amanah_core::errors::{Error, Result};
use amanah_core::invoices::{InvoiceDraft, InvoiceStatus};
use amanah_core::ledger::{IncomeLine, LedgerEffect};
use amanah_core::transactions::{
    IncomePosting, LedgerRow, PostedIncome, Transaction, TransactionChange, TransactionDetail,
    TransactionFilter, TransactionRepositoryTrait, TransactionType, TransactionUpdate,
};
use amanah_core::utils::{Page, PageRequest};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::sqlite::Sqlite;
use diesel::SqliteConnection;
use log::debug;
use std::collections::HashMap;
use std::sync::Arc;

use super::model::{LedgerRowDB, TransactionDB};
use crate::db::{get_connection, WriteHandle};
use crate::errors::{not_found_as, StorageError};
use crate::invoices::{insert_invoice, sync_income_invoice};
use crate::packages::add_package_cost;
use crate::pilgrims::{load_pilgrim, save_pilgrim};
use crate::schema::{invoices, packages, pilgrims, transactions, vendors};
use crate::utils::{chunk_for_sqlite, like_pattern, parse_decimal};

pub struct TransactionRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl TransactionRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        TransactionRepository { pool, writer }
    }
}

fn filtered(filter: &TransactionFilter) -> transactions::BoxedQuery<'static, Sqlite> {
    let mut query = transactions::table.into_boxed();
    if let Some(kind) = filter.transaction_type {
        query = query.filter(transactions::transaction_type.eq(kind.as_str()));
    }
    if let Some(category) = filter.category.clone().filter(|c| !c.is_empty()) {
        query = query.filter(
            transactions::income_category
                .eq(category.clone())
                .or(transactions::expense_category.eq(category)),
        );
    }
    if let Some(pilgrim_id) = filter.pilgrim_id.clone() {
        query = query.filter(transactions::pilgrim_id.eq(pilgrim_id));
    }
    if let Some(package_id) = filter.package_id.clone() {
        query = query.filter(transactions::package_id.eq(package_id));
    }
    if let Some(vendor_id) = filter.vendor_id.clone() {
        query = query.filter(transactions::vendor_id.eq(vendor_id));
    }
    if let Some(start) = filter.start_date {
        query = query.filter(transactions::transaction_date.ge(start));
    }
    if let Some(end) = filter.end_date {
        query = query.filter(transactions::transaction_date.le(end));
    }
    if let Some(search) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
        let pattern = like_pattern(search);
        query = query.filter(
            transactions::description
                .like(pattern.clone())
                .or(transactions::reference_number.like(pattern.clone()))
                .or(transactions::notes.like(pattern)),
        );
    }
    query
}

fn load_transaction(conn: &mut SqliteConnection, transaction_id: &str) -> Result<Transaction> {
    transactions::table
        .find(transaction_id)
        .select(TransactionDB::as_select())
        .first::<TransactionDB>(conn)
        .map(Transaction::from)
        .map_err(not_found_as("Transaction", transaction_id))
}

fn linked_ids(rows: &[Transaction], pick: impl Fn(&Transaction) -> Option<&String>) -> Vec<String> {
    let mut ids: Vec<String> = rows.iter().filter_map(|t| pick(t).cloned()).collect();
    ids.sort();
    ids.dedup();
    ids
}

/// Attaches pilgrim, package and vendor names to a batch of transactions.
fn with_names(conn: &mut SqliteConnection, rows: Vec<Transaction>) -> Result<Vec<TransactionDetail>> {
    let mut pilgrim_names: HashMap<String, String> = HashMap::new();
    for chunk in chunk_for_sqlite(&linked_ids(&rows, |t| t.pilgrim_id.as_ref())) {
        let found = pilgrims::table
            .filter(pilgrims::id.eq_any(chunk))
            .select((pilgrims::id, pilgrims::name))
            .load::<(String, String)>(conn)
            .map_err(StorageError::from)?;
        pilgrim_names.extend(found);
    }

    let mut package_names: HashMap<String, String> = HashMap::new();
    for chunk in chunk_for_sqlite(&linked_ids(&rows, |t| t.package_id.as_ref())) {
        let found = packages::table
            .filter(packages::id.eq_any(chunk))
            .select((packages::id, packages::name))
            .load::<(String, String)>(conn)
            .map_err(StorageError::from)?;
        package_names.extend(found);
    }

    let mut vendor_names: HashMap<String, String> = HashMap::new();
    for chunk in chunk_for_sqlite(&linked_ids(&rows, |t| t.vendor_id.as_ref())) {
        let found = vendors::table
            .filter(vendors::id.eq_any(chunk))
            .select((vendors::id, vendors::name))
            .load::<(String, String)>(conn)
            .map_err(StorageError::from)?;
        vendor_names.extend(found);
    }

    let lookup = |names: &HashMap<String, String>, id: &Option<String>| {
        id.as_ref().and_then(|id| names.get(id).cloned())
    };
    Ok(rows
        .into_iter()
        .map(|transaction| TransactionDetail {
            pilgrim_name: lookup(&pilgrim_names, &transaction.pilgrim_id),
            package_name: lookup(&package_names, &transaction.package_id),
            vendor_name: lookup(&vendor_names, &transaction.vendor_id),
            transaction,
        })
        .collect())
}

/// Applies a posting effect to the row it targets.
///
/// A payment for a missing pilgrim fails; a cost for a missing package is
/// skipped.
pub(crate) fn apply_effect(conn: &mut SqliteConnection, effect: &LedgerEffect) -> Result<()> {
    match effect {
        LedgerEffect::PilgrimPayment { pilgrim_id, delta } => {
            let mut pilgrim = load_pilgrim(conn, pilgrim_id)?;
            pilgrim.apply_payment_delta(delta);
            save_pilgrim(conn, pilgrim)?;
        }
        LedgerEffect::PackageCost { package_id, delta } => {
            add_package_cost(conn, package_id, *delta)?;
        }
    }
    Ok(())
}

/// Stores an income together with its effect and invoice.
pub(crate) fn post_income(
    conn: &mut SqliteConnection,
    posting: IncomePosting,
) -> Result<PostedIncome> {
    let IncomePosting {
        transaction,
        invoice,
    } = posting;
    if let Some(effect) = transaction.effect() {
        apply_effect(conn, &effect)?;
    }

    let row: TransactionDB = transaction.into();
    let stored = diesel::insert_into(transactions::table)
        .values(&row)
        .returning(TransactionDB::as_returning())
        .get_result(conn)
        .map_err(StorageError::from)?;
    let transaction = Transaction::from(stored);

    let invoice = invoice
        .map(|draft| insert_invoice(conn, draft))
        .transpose()?;
    let pilgrim = transaction
        .pilgrim_id
        .as_deref()
        .map(|id| load_pilgrim(conn, id))
        .transpose()?;
    debug!("Posted income {} ({})", transaction.id, transaction.amount);

    Ok(PostedIncome {
        transaction,
        pilgrim,
        invoice,
    })
}

/// Cash and credit of every income posted for a pilgrim.
pub(crate) fn income_lines(conn: &mut SqliteConnection, pilgrim_id: &str) -> Result<Vec<IncomeLine>> {
    let rows = transactions::table
        .filter(transactions::pilgrim_id.eq(pilgrim_id))
        .filter(transactions::transaction_type.eq(TransactionType::Income.as_str()))
        .select((transactions::amount, transactions::discount))
        .load::<(String, String)>(conn)
        .map_err(StorageError::from)?;
    Ok(rows
        .iter()
        .map(|(amount, discount)| IncomeLine {
            amount: parse_decimal(amount, "amount"),
            discount: parse_decimal(discount, "discount"),
        })
        .collect())
}

#[async_trait]
impl TransactionRepositoryTrait for TransactionRepository {
    fn list(
        &self,
        filter: &TransactionFilter,
        page: PageRequest,
    ) -> Result<Page<TransactionDetail>> {
        let mut conn = get_connection(&self.pool)?;
        let total = filtered(filter)
            .count()
            .get_result::<i64>(&mut conn)
            .map_err(StorageError::from)?;
        let rows = filtered(filter)
            .order((
                transactions::transaction_date.desc(),
                transactions::created_at.desc(),
            ))
            .limit(page.limit())
            .offset(page.offset())
            .select(TransactionDB::as_select())
            .load::<TransactionDB>(&mut conn)
            .map_err(StorageError::from)?;
        let details = with_names(
            &mut conn,
            rows.into_iter().map(Transaction::from).collect(),
        )?;
        Ok(Page::new(details, page, total))
    }

    fn get_by_id(&self, transaction_id: &str) -> Result<Transaction> {
        let mut conn = get_connection(&self.pool)?;
        load_transaction(&mut conn, transaction_id)
    }

    fn get_detail(&self, transaction_id: &str) -> Result<TransactionDetail> {
        let mut conn = get_connection(&self.pool)?;
        let transaction = load_transaction(&mut conn, transaction_id)?;
        let mut details = with_names(&mut conn, vec![transaction])?;
        details
            .pop()
            .ok_or_else(|| Error::not_found("Transaction", transaction_id))
    }

    fn ledger_rows(&self, filter: &TransactionFilter) -> Result<Vec<LedgerRow>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = filtered(filter)
            .select((
                transactions::transaction_type,
                transactions::expense_category,
                transactions::amount,
                transactions::package_id,
                transactions::transaction_date,
            ))
            .load::<LedgerRowDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(LedgerRow::from).collect())
    }

    fn recent(&self, limit: i64) -> Result<Vec<TransactionDetail>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = transactions::table
            .order((
                transactions::transaction_date.desc(),
                transactions::created_at.desc(),
            ))
            .limit(limit.max(0))
            .select(TransactionDB::as_select())
            .load::<TransactionDB>(&mut conn)
            .map_err(StorageError::from)?;
        with_names(&mut conn, rows.into_iter().map(Transaction::from).collect())
    }

    async fn insert_income(&self, posting: IncomePosting) -> Result<PostedIncome> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<PostedIncome> {
                post_income(conn, posting)
            })
            .await
    }

    async fn insert_expense(&self, transaction: Transaction) -> Result<Transaction> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Transaction> {
                if let Some(effect) = transaction.effect() {
                    apply_effect(conn, &effect)?;
                }
                let row: TransactionDB = transaction.into();
                let stored = diesel::insert_into(transactions::table)
                    .values(&row)
                    .returning(TransactionDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(Transaction::from(stored))
            })
            .await
    }

    async fn update(
        &self,
        transaction_id: String,
        update: TransactionUpdate,
        now: NaiveDateTime,
    ) -> Result<TransactionChange> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<TransactionChange> {
                let before = load_transaction(conn, &transaction_id)?;
                let next = before.apply_update(&update, now)?;
                if let Some(effect) = before.effect() {
                    apply_effect(conn, &effect.inverse())?;
                }
                if let Some(effect) = next.effect() {
                    apply_effect(conn, &effect)?;
                }

                sync_income_invoice(
                    conn,
                    &transaction_id,
                    InvoiceDraft::for_income(&next, now),
                    now,
                )?;

                let row: TransactionDB = next.into();
                let stored = diesel::update(transactions::table.find(&transaction_id))
                    .set(&row)
                    .returning(TransactionDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(TransactionChange {
                    before,
                    after: Transaction::from(stored),
                })
            })
            .await
    }

    async fn delete(&self, transaction_id: String) -> Result<Transaction> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Transaction> {
                let removed = load_transaction(conn, &transaction_id)?;
                if let Some(effect) = removed.effect() {
                    apply_effect(conn, &effect.inverse())?;
                }
                diesel::update(
                    invoices::table.filter(invoices::transaction_id.eq(&transaction_id)),
                )
                .set(invoices::status.eq(InvoiceStatus::Cancelled.as_str()))
                .execute(conn)
                .map_err(StorageError::from)?;
                diesel::delete(transactions::table.find(&transaction_id))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                debug!("Deleted transaction {}", transaction_id);
                Ok(removed)
            })
            .await
    }
}
