//! Database model for transactions.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::utils::{decimal_text, parse_decimal, parse_optional_text, parse_text};
use amanah_core::transactions::{LedgerRow, Transaction, TransactionType};

#[derive(Queryable, Identifiable, Insertable, AsChangeset, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::transactions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_null = true)]
pub struct TransactionDB {
    pub id: String,
    pub transaction_type: String,
    pub income_category: Option<String>,
    pub expense_category: Option<String>,
    pub amount: String,
    pub discount: String,
    pub pilgrim_id: Option<String>,
    pub package_id: Option<String>,
    pub vendor_id: Option<String>,
    pub payment_method: Option<String>,
    pub reference_number: Option<String>,
    pub bank_name: Option<String>,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub transaction_date: NaiveDateTime,
    pub receipt_url: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub created_by_id: Option<String>,
}

impl From<TransactionDB> for Transaction {
    fn from(db: TransactionDB) -> Self {
        Self {
            transaction_type: parse_text(
                &db.transaction_type,
                TransactionType::Income,
                "transaction type",
            ),
            income_category: parse_optional_text(db.income_category.as_deref(), "income category"),
            expense_category: parse_optional_text(
                db.expense_category.as_deref(),
                "expense category",
            ),
            amount: parse_decimal(&db.amount, "amount"),
            discount: parse_decimal(&db.discount, "discount"),
            payment_method: parse_optional_text(db.payment_method.as_deref(), "payment method"),
            id: db.id,
            pilgrim_id: db.pilgrim_id,
            package_id: db.package_id,
            vendor_id: db.vendor_id,
            reference_number: db.reference_number,
            bank_name: db.bank_name,
            description: db.description,
            notes: db.notes,
            transaction_date: db.transaction_date,
            receipt_url: db.receipt_url,
            created_at: db.created_at,
            updated_at: db.updated_at,
            created_by_id: db.created_by_id,
        }
    }
}

impl From<Transaction> for TransactionDB {
    fn from(domain: Transaction) -> Self {
        Self {
            transaction_type: domain.transaction_type.as_str().to_string(),
            income_category: domain.income_category.map(|c| c.as_str().to_string()),
            expense_category: domain.expense_category.map(|c| c.as_str().to_string()),
            amount: decimal_text(domain.amount),
            discount: decimal_text(domain.discount),
            payment_method: domain.payment_method.map(|m| m.as_str().to_string()),
            id: domain.id,
            pilgrim_id: domain.pilgrim_id,
            package_id: domain.package_id,
            vendor_id: domain.vendor_id,
            reference_number: domain.reference_number,
            bank_name: domain.bank_name,
            description: domain.description,
            notes: domain.notes,
            transaction_date: domain.transaction_date,
            receipt_url: domain.receipt_url,
            created_at: domain.created_at,
            updated_at: domain.updated_at,
            created_by_id: domain.created_by_id,
        }
    }
}

/// Columns read by aggregations.
#[derive(Queryable, Debug)]
pub struct LedgerRowDB {
    pub transaction_type: String,
    pub expense_category: Option<String>,
    pub amount: String,
    pub package_id: Option<String>,
    pub transaction_date: NaiveDateTime,
}

impl From<LedgerRowDB> for LedgerRow {
    fn from(db: LedgerRowDB) -> Self {
        Self {
            transaction_type: parse_text(
                &db.transaction_type,
                TransactionType::Income,
                "transaction type",
            ),
            expense_category: parse_optional_text(
                db.expense_category.as_deref(),
                "expense category",
            ),
            amount: parse_decimal(&db.amount, "amount"),
            package_id: db.package_id,
            transaction_date: db.transaction_date,
        }
    }
}
