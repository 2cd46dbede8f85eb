//! Database models for pilgrims.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::utils::{decimal_text, parse_decimal, parse_optional_text, parse_text};
use amanah_core::ledger::PaymentStatus;
use amanah_core::pilgrims::Pilgrim;

#[derive(Queryable, Identifiable, Insertable, AsChangeset, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::pilgrims)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_null = true)]
pub struct PilgrimDB {
    pub id: String,
    pub name: String,
    pub nik: Option<String>,
    pub passport_number: Option<String>,
    pub passport_expiry: Option<NaiveDateTime>,
    pub gender: Option<String>,
    pub date_of_birth: Option<NaiveDateTime>,
    pub place_of_birth: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub province: Option<String>,
    pub regency: Option<String>,
    pub district: Option<String>,
    pub village: Option<String>,
    pub emergency_contact_name: Option<String>,
    pub emergency_contact_phone: Option<String>,
    pub package_id: Option<String>,
    pub seat_number: Option<i32>,
    pub total_amount: String,
    pub paid_amount: String,
    pub remaining_amount: String,
    pub payment_status: String,
    pub room_type: Option<String>,
    pub is_cancelled: bool,
    pub cancellation_reason: Option<String>,
    pub notes: Option<String>,
    pub photo_url: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub created_by_id: Option<String>,
}

impl From<PilgrimDB> for Pilgrim {
    fn from(db: PilgrimDB) -> Self {
        Self {
            gender: parse_optional_text(db.gender.as_deref(), "gender"),
            room_type: parse_optional_text(db.room_type.as_deref(), "room type"),
            total_amount: parse_decimal(&db.total_amount, "total_amount"),
            paid_amount: parse_decimal(&db.paid_amount, "paid_amount"),
            remaining_amount: parse_decimal(&db.remaining_amount, "remaining_amount"),
            payment_status: parse_text(
                &db.payment_status,
                PaymentStatus::Pending,
                "payment status",
            ),
            id: db.id,
            name: db.name,
            nik: db.nik,
            passport_number: db.passport_number,
            passport_expiry: db.passport_expiry,
            date_of_birth: db.date_of_birth,
            place_of_birth: db.place_of_birth,
            phone: db.phone,
            email: db.email,
            address: db.address,
            province: db.province,
            regency: db.regency,
            district: db.district,
            village: db.village,
            emergency_contact_name: db.emergency_contact_name,
            emergency_contact_phone: db.emergency_contact_phone,
            package_id: db.package_id,
            seat_number: db.seat_number,
            is_cancelled: db.is_cancelled,
            cancellation_reason: db.cancellation_reason,
            notes: db.notes,
            photo_url: db.photo_url,
            created_at: db.created_at,
            updated_at: db.updated_at,
            created_by_id: db.created_by_id,
        }
    }
}

impl From<Pilgrim> for PilgrimDB {
    fn from(domain: Pilgrim) -> Self {
        Self {
            gender: domain.gender.map(|g| g.as_str().to_string()),
            room_type: domain.room_type.map(|r| r.as_str().to_string()),
            total_amount: decimal_text(domain.total_amount),
            paid_amount: decimal_text(domain.paid_amount),
            remaining_amount: decimal_text(domain.remaining_amount),
            payment_status: domain.payment_status.as_str().to_string(),
            id: domain.id,
            name: domain.name,
            nik: domain.nik,
            passport_number: domain.passport_number,
            passport_expiry: domain.passport_expiry,
            date_of_birth: domain.date_of_birth,
            place_of_birth: domain.place_of_birth,
            phone: domain.phone,
            email: domain.email,
            address: domain.address,
            province: domain.province,
            regency: domain.regency,
            district: domain.district,
            village: domain.village,
            emergency_contact_name: domain.emergency_contact_name,
            emergency_contact_phone: domain.emergency_contact_phone,
            package_id: domain.package_id,
            seat_number: domain.seat_number,
            is_cancelled: domain.is_cancelled,
            cancellation_reason: domain.cancellation_reason,
            notes: domain.notes,
            photo_url: domain.photo_url,
            created_at: domain.created_at,
            updated_at: domain.updated_at,
            created_by_id: domain.created_by_id,
        }
    }
}
