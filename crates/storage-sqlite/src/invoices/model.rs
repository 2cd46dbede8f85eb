//! Database models for invoices and their line items.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::utils::{decimal_text, parse_decimal, parse_text};
use amanah_core::invoices::{Invoice, InvoiceItem, InvoiceStatus};

#[derive(Queryable, Identifiable, Insertable, AsChangeset, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::invoices)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct InvoiceDB {
    pub id: String,
    pub invoice_number: String,
    pub pilgrim_id: String,
    pub package_id: String,
    pub transaction_id: Option<String>,
    pub subtotal: String,
    pub discount: String,
    pub total: String,
    pub status: String,
    pub issue_date: NaiveDateTime,
    pub due_date: Option<NaiveDateTime>,
    pub paid_date: Option<NaiveDateTime>,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub created_by_id: Option<String>,
}

impl From<InvoiceDB> for Invoice {
    fn from(db: InvoiceDB) -> Self {
        Self {
            subtotal: parse_decimal(&db.subtotal, "subtotal"),
            discount: parse_decimal(&db.discount, "discount"),
            total: parse_decimal(&db.total, "total"),
            status: parse_text(&db.status, InvoiceStatus::Draft, "invoice status"),
            id: db.id,
            invoice_number: db.invoice_number,
            pilgrim_id: db.pilgrim_id,
            package_id: db.package_id,
            transaction_id: db.transaction_id,
            issue_date: db.issue_date,
            due_date: db.due_date,
            paid_date: db.paid_date,
            notes: db.notes,
            created_at: db.created_at,
            updated_at: db.updated_at,
            created_by_id: db.created_by_id,
        }
    }
}

impl From<Invoice> for InvoiceDB {
    fn from(domain: Invoice) -> Self {
        Self {
            subtotal: decimal_text(domain.subtotal),
            discount: decimal_text(domain.discount),
            total: decimal_text(domain.total),
            status: domain.status.as_str().to_string(),
            id: domain.id,
            invoice_number: domain.invoice_number,
            pilgrim_id: domain.pilgrim_id,
            package_id: domain.package_id,
            transaction_id: domain.transaction_id,
            issue_date: domain.issue_date,
            due_date: domain.due_date,
            paid_date: domain.paid_date,
            notes: domain.notes,
            created_at: domain.created_at,
            updated_at: domain.updated_at,
            created_by_id: domain.created_by_id,
        }
    }
}

#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::invoice_items)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct InvoiceItemDB {
    pub id: String,
    pub invoice_id: String,
    pub description: String,
    pub quantity: i32,
    pub unit_price: String,
    pub amount: String,
}

impl From<InvoiceItemDB> for InvoiceItem {
    fn from(db: InvoiceItemDB) -> Self {
        Self {
            unit_price: parse_decimal(&db.unit_price, "unit_price"),
            amount: parse_decimal(&db.amount, "amount"),
            id: db.id,
            invoice_id: db.invoice_id,
            description: db.description,
            quantity: db.quantity,
        }
    }
}
