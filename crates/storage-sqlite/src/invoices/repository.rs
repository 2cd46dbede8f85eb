use amanah_core::errors::Result;
use amanah_core::invoices::{
    Invoice, InvoiceDraft, InvoiceFilter, InvoiceItem, InvoiceItemDraft, InvoiceRepositoryTrait,
    InvoiceStatus, InvoiceWithItems,
};
use amanah_core::utils::{Page, PageRequest};
use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::sqlite::Sqlite;
use diesel::SqliteConnection;
use log::debug;
use std::sync::Arc;
use uuid::Uuid;

use super::model::{InvoiceDB, InvoiceItemDB};
use crate::db::get_connection;
use crate::errors::{not_found_as, StorageError};
use crate::schema::{invoice_items, invoices};
use crate::utils::decimal_text;

pub struct InvoiceRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
}

impl InvoiceRepository {
    pub fn new(pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>) -> Self {
        InvoiceRepository { pool }
    }
}

fn filtered(filter: &InvoiceFilter) -> invoices::BoxedQuery<'static, Sqlite> {
    let mut query = invoices::table.into_boxed();
    if let Some(pilgrim_id) = filter.pilgrim_id.clone() {
        query = query.filter(invoices::pilgrim_id.eq(pilgrim_id));
    }
    if let Some(package_id) = filter.package_id.clone() {
        query = query.filter(invoices::package_id.eq(package_id));
    }
    if let Some(status) = filter.status {
        query = query.filter(invoices::status.eq(status.as_str()));
    }
    query
}

/// Writes an invoice and its items.
pub(crate) fn insert_invoice(conn: &mut SqliteConnection, draft: InvoiceDraft) -> Result<Invoice> {
    let invoice_id = Uuid::new_v4().to_string();
    let row = InvoiceDB {
        id: invoice_id.clone(),
        invoice_number: draft.invoice_number,
        pilgrim_id: draft.pilgrim_id,
        package_id: draft.package_id,
        transaction_id: Some(draft.transaction_id),
        subtotal: decimal_text(draft.subtotal),
        discount: decimal_text(draft.discount),
        total: decimal_text(draft.total),
        status: draft.status.as_str().to_string(),
        issue_date: draft.issue_date,
        due_date: None,
        paid_date: draft.paid_date,
        notes: draft.notes,
        created_at: draft.issue_date,
        updated_at: draft.issue_date,
        created_by_id: draft.created_by_id,
    };
    let stored = diesel::insert_into(invoices::table)
        .values(&row)
        .returning(InvoiceDB::as_returning())
        .get_result(conn)
        .map_err(StorageError::from)?;

    insert_items(conn, &invoice_id, draft.items)?;

    Ok(Invoice::from(stored))
}

fn insert_items(
    conn: &mut SqliteConnection,
    invoice_id: &str,
    items: Vec<InvoiceItemDraft>,
) -> Result<()> {
    let rows: Vec<InvoiceItemDB> = items
        .into_iter()
        .map(|item| InvoiceItemDB {
            id: Uuid::new_v4().to_string(),
            invoice_id: invoice_id.to_string(),
            description: item.description,
            quantity: item.quantity,
            unit_price: decimal_text(item.unit_price),
            amount: decimal_text(item.amount),
        })
        .collect();
    diesel::insert_into(invoice_items::table)
        .values(&rows)
        .execute(conn)
        .map_err(StorageError::from)?;
    Ok(())
}

/// Brings the invoice of an edited income in line with its draft.
///
/// An existing invoice follows the draft's links and amounts and keeps its
/// number. A missing one is written from the draft. Without a draft (the
/// income lost its pilgrim or package) the invoice is cancelled.
pub(crate) fn sync_income_invoice(
    conn: &mut SqliteConnection,
    transaction_id: &str,
    draft: Option<InvoiceDraft>,
    now: NaiveDateTime,
) -> Result<()> {
    let existing = invoices::table
        .filter(invoices::transaction_id.eq(transaction_id))
        .order(invoices::created_at.desc())
        .select(InvoiceDB::as_select())
        .first::<InvoiceDB>(conn)
        .optional()
        .map_err(StorageError::from)?;

    match (existing, draft) {
        (Some(invoice), Some(draft)) => {
            diesel::update(invoices::table.find(&invoice.id))
                .set((
                    invoices::pilgrim_id.eq(draft.pilgrim_id),
                    invoices::package_id.eq(draft.package_id),
                    invoices::subtotal.eq(decimal_text(draft.subtotal)),
                    invoices::discount.eq(decimal_text(draft.discount)),
                    invoices::total.eq(decimal_text(draft.total)),
                    invoices::status.eq(draft.status.as_str()),
                    invoices::paid_date.eq(invoice.paid_date.or(draft.paid_date)),
                    invoices::updated_at.eq(now),
                ))
                .execute(conn)
                .map_err(StorageError::from)?;
            diesel::delete(invoice_items::table.filter(invoice_items::invoice_id.eq(&invoice.id)))
                .execute(conn)
                .map_err(StorageError::from)?;
            insert_items(conn, &invoice.id, draft.items)?;
            debug!("Invoice {} follows transaction {}", invoice.invoice_number, transaction_id);
        }
        (None, Some(draft)) => {
            let invoice = insert_invoice(conn, draft)?;
            debug!("Invoice {} issued for transaction {}", invoice.invoice_number, transaction_id);
        }
        (Some(invoice), None) => {
            diesel::update(invoices::table.find(&invoice.id))
                .set((
                    invoices::status.eq(InvoiceStatus::Cancelled.as_str()),
                    invoices::updated_at.eq(now),
                ))
                .execute(conn)
                .map_err(StorageError::from)?;
            debug!("Invoice {} cancelled", invoice.invoice_number);
        }
        (None, None) => {}
    }
    Ok(())
}

impl InvoiceRepositoryTrait for InvoiceRepository {
    fn list(&self, filter: &InvoiceFilter, page: PageRequest) -> Result<Page<Invoice>> {
        let mut conn = get_connection(&self.pool)?;
        let total = filtered(filter)
            .count()
            .get_result::<i64>(&mut conn)
            .map_err(StorageError::from)?;
        let rows = filtered(filter)
            .order(invoices::created_at.desc())
            .limit(page.limit())
            .offset(page.offset())
            .select(InvoiceDB::as_select())
            .load::<InvoiceDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(Page::new(
            rows.into_iter().map(Invoice::from).collect(),
            page,
            total,
        ))
    }

    fn get_with_items(&self, invoice_id: &str) -> Result<InvoiceWithItems> {
        let mut conn = get_connection(&self.pool)?;
        let invoice = invoices::table
            .find(invoice_id)
            .select(InvoiceDB::as_select())
            .first::<InvoiceDB>(&mut conn)
            .map_err(not_found_as("Invoice", invoice_id))?;
        let items = invoice_items::table
            .filter(invoice_items::invoice_id.eq(invoice_id))
            .select(InvoiceItemDB::as_select())
            .load::<InvoiceItemDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(InvoiceWithItems {
            invoice: Invoice::from(invoice),
            items: items.into_iter().map(InvoiceItem::from).collect(),
        })
    }

    fn list_for_pilgrim(&self, pilgrim_id: &str) -> Result<Vec<Invoice>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = invoices::table
            .filter(invoices::pilgrim_id.eq(pilgrim_id))
            .order(invoices::issue_date.desc())
            .select(InvoiceDB::as_select())
            .load::<InvoiceDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(Invoice::from).collect())
    }
}
