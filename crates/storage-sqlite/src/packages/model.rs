//! Database models for packages.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::utils::{decimal_text, parse_decimal, parse_optional_decimal, parse_text};
use amanah_core::packages::{Package, PackageStatus, PackageType};

#[derive(Queryable, Identifiable, Insertable, AsChangeset, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::packages)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_null = true)]
pub struct PackageDB {
    pub id: String,
    pub code: String,
    pub name: String,
    pub package_type: String,
    pub description: Option<String>,
    pub price_per_person: String,
    pub total_seats: i32,
    pub booked_seats: i32,
    pub departure_date: Option<NaiveDateTime>,
    pub return_date: Option<NaiveDateTime>,
    pub status: String,
    pub estimated_cost: Option<String>,
    pub actual_cost: String,
    pub hotel_makkah: Option<String>,
    pub hotel_madinah: Option<String>,
    pub airline: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub created_by_id: Option<String>,
}

impl From<PackageDB> for Package {
    fn from(db: PackageDB) -> Self {
        Self {
            package_type: parse_text(&db.package_type, PackageType::Umroh, "package type"),
            price_per_person: parse_decimal(&db.price_per_person, "price_per_person"),
            status: parse_text(&db.status, PackageStatus::Open, "package status"),
            estimated_cost: parse_optional_decimal(db.estimated_cost.as_deref(), "estimated_cost"),
            actual_cost: parse_decimal(&db.actual_cost, "actual_cost"),
            id: db.id,
            code: db.code,
            name: db.name,
            description: db.description,
            total_seats: db.total_seats,
            booked_seats: db.booked_seats,
            departure_date: db.departure_date,
            return_date: db.return_date,
            hotel_makkah: db.hotel_makkah,
            hotel_madinah: db.hotel_madinah,
            airline: db.airline,
            created_at: db.created_at,
            updated_at: db.updated_at,
            created_by_id: db.created_by_id,
        }
    }
}

impl From<Package> for PackageDB {
    fn from(domain: Package) -> Self {
        Self {
            package_type: domain.package_type.as_str().to_string(),
            price_per_person: decimal_text(domain.price_per_person),
            status: domain.status.as_str().to_string(),
            estimated_cost: domain.estimated_cost.map(decimal_text),
            actual_cost: decimal_text(domain.actual_cost),
            id: domain.id,
            code: domain.code,
            name: domain.name,
            description: domain.description,
            total_seats: domain.total_seats,
            booked_seats: domain.booked_seats,
            departure_date: domain.departure_date,
            return_date: domain.return_date,
            hotel_makkah: domain.hotel_makkah,
            hotel_madinah: domain.hotel_madinah,
            airline: domain.airline,
            created_at: domain.created_at,
            updated_at: domain.updated_at,
            created_by_id: domain.created_by_id,
        }
    }
}
