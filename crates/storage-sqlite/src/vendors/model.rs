//! Database models for vendors and vendor debts.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::utils::{decimal_text, parse_decimal, parse_text};
use amanah_core::vendors::{DebtStatus, Vendor, VendorDebt};

#[derive(Queryable, Identifiable, Insertable, AsChangeset, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::vendors)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_null = true)]
pub struct VendorDB {
    pub id: String,
    pub name: String,
    pub vendor_type: String,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub bank_account: Option<String>,
    pub bank_name: Option<String>,
    pub bank_account_holder: Option<String>,
    pub npwp: Option<String>,
    pub notes: Option<String>,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<VendorDB> for Vendor {
    fn from(db: VendorDB) -> Self {
        Self {
            id: db.id,
            name: db.name,
            vendor_type: db.vendor_type,
            contact_person: db.contact_person,
            phone: db.phone,
            email: db.email,
            address: db.address,
            bank_account: db.bank_account,
            bank_name: db.bank_name,
            bank_account_holder: db.bank_account_holder,
            npwp: db.npwp,
            notes: db.notes,
            is_active: db.is_active,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

impl From<Vendor> for VendorDB {
    fn from(domain: Vendor) -> Self {
        Self {
            id: domain.id,
            name: domain.name,
            vendor_type: domain.vendor_type,
            contact_person: domain.contact_person,
            phone: domain.phone,
            email: domain.email,
            address: domain.address,
            bank_account: domain.bank_account,
            bank_name: domain.bank_name,
            bank_account_holder: domain.bank_account_holder,
            npwp: domain.npwp,
            notes: domain.notes,
            is_active: domain.is_active,
            created_at: domain.created_at,
            updated_at: domain.updated_at,
        }
    }
}

#[derive(Queryable, Identifiable, Insertable, AsChangeset, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::vendor_debts)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_null = true)]
pub struct VendorDebtDB {
    pub id: String,
    pub vendor_id: String,
    pub package_id: Option<String>,
    pub description: String,
    pub total_amount: String,
    pub paid_amount: String,
    pub remaining_amount: String,
    pub due_date: Option<NaiveDateTime>,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub created_by_id: Option<String>,
}

impl From<VendorDebtDB> for VendorDebt {
    fn from(db: VendorDebtDB) -> Self {
        Self {
            total_amount: parse_decimal(&db.total_amount, "total_amount"),
            paid_amount: parse_decimal(&db.paid_amount, "paid_amount"),
            remaining_amount: parse_decimal(&db.remaining_amount, "remaining_amount"),
            status: parse_text(&db.status, DebtStatus::Unpaid, "debt status"),
            id: db.id,
            vendor_id: db.vendor_id,
            package_id: db.package_id,
            description: db.description,
            due_date: db.due_date,
            notes: db.notes,
            created_at: db.created_at,
            updated_at: db.updated_at,
            created_by_id: db.created_by_id,
        }
    }
}

impl From<VendorDebt> for VendorDebtDB {
    fn from(domain: VendorDebt) -> Self {
        Self {
            total_amount: decimal_text(domain.total_amount),
            paid_amount: decimal_text(domain.paid_amount),
            remaining_amount: decimal_text(domain.remaining_amount),
            status: domain.status.as_str().to_string(),
            id: domain.id,
            vendor_id: domain.vendor_id,
            package_id: domain.package_id,
            description: domain.description,
            due_date: domain.due_date,
            notes: domain.notes,
            created_at: domain.created_at,
            updated_at: domain.updated_at,
            created_by_id: domain.created_by_id,
        }
    }
}
