//! Package domain models.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{Result, ValidationError};
use crate::utils::time_utils::deserialize_optional_datetime;

text_enum! {
    /// Kind of pilgrimage a package offers.
    pub enum PackageType {
        Umroh => "umroh",
        Haji => "haji",
    }
}

text_enum! {
    /// Lifecycle of a package: `open → closed → ongoing → completed`.
    pub enum PackageStatus {
        Open => "open",
        Closed => "closed",
        Ongoing => "ongoing",
        Completed => "completed",
    }
}

/// Domain model representing a package
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    pub id: String,
    pub code: String,
    pub name: String,
    #[serde(rename = "type")]
    pub package_type: PackageType,
    pub description: Option<String>,
    pub price_per_person: Decimal,
    pub total_seats: i32,
    pub booked_seats: i32,
    pub departure_date: Option<NaiveDateTime>,
    pub return_date: Option<NaiveDateTime>,
    pub status: PackageStatus,
    pub estimated_cost: Option<Decimal>,
    pub actual_cost: Decimal,
    pub hotel_makkah: Option<String>,
    pub hotel_madinah: Option<String>,
    pub airline: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub created_by_id: Option<String>,
}

impl Package {
    /// Seats still free. Negative when the package is overbooked.
    pub fn available_seats(&self) -> i32 {
        self.total_seats - self.booked_seats
    }

    /// Booked share of capacity in percent.
    pub fn occupancy_rate(&self) -> f64 {
        if self.total_seats <= 0 {
            return 0.0;
        }
        (self.booked_seats as f64 / self.total_seats as f64) * 100.0
    }

    pub fn estimated_cost_or_zero(&self) -> Decimal {
        self.estimated_cost.unwrap_or(Decimal::ZERO)
    }
}

/// Input model for creating a new package
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewPackage {
    pub code: String,
    pub name: String,
    #[serde(rename = "type", alias = "packageType")]
    pub package_type: PackageType,
    pub description: Option<String>,
    pub price_per_person: Decimal,
    pub total_seats: i32,
    #[serde(default, deserialize_with = "deserialize_optional_datetime")]
    pub departure_date: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "deserialize_optional_datetime")]
    pub return_date: Option<NaiveDateTime>,
    pub status: Option<PackageStatus>,
    pub estimated_cost: Option<Decimal>,
    pub hotel_makkah: Option<String>,
    pub hotel_madinah: Option<String>,
    pub airline: Option<String>,
}

impl NewPackage {
    pub fn validate(&self) -> Result<()> {
        if self.code.trim().is_empty() {
            return Err(ValidationError::MissingField("code".to_string()).into());
        }
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingField("name".to_string()).into());
        }
        if self.price_per_person < Decimal::ZERO {
            return Err(ValidationError::invalid("pricePerPerson must not be negative").into());
        }
        if self.total_seats <= 0 {
            return Err(ValidationError::invalid("totalSeats must be positive").into());
        }
        validate_schedule(self.departure_date, self.return_date)
    }

    pub fn into_package(
        self,
        id: String,
        created_by_id: Option<String>,
        now: NaiveDateTime,
    ) -> Package {
        Package {
            id,
            code: self.code.trim().to_string(),
            name: self.name.trim().to_string(),
            package_type: self.package_type,
            description: self.description,
            price_per_person: self.price_per_person,
            total_seats: self.total_seats,
            booked_seats: 0,
            departure_date: self.departure_date,
            return_date: self.return_date,
            status: self.status.unwrap_or(PackageStatus::Open),
            estimated_cost: self.estimated_cost,
            actual_cost: Decimal::ZERO,
            hotel_makkah: self.hotel_makkah,
            hotel_madinah: self.hotel_madinah,
            airline: self.airline,
            created_at: now,
            updated_at: now,
            created_by_id,
        }
    }
}

/// Partial update of a package. Counters and actual cost are not editable.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct PackageUpdate {
    pub code: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "type", alias = "packageType")]
    pub package_type: Option<PackageType>,
    pub description: Option<String>,
    pub price_per_person: Option<Decimal>,
    pub total_seats: Option<i32>,
    #[serde(default, deserialize_with = "deserialize_optional_datetime")]
    pub departure_date: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "deserialize_optional_datetime")]
    pub return_date: Option<NaiveDateTime>,
    pub status: Option<PackageStatus>,
    pub estimated_cost: Option<Decimal>,
    pub hotel_makkah: Option<String>,
    pub hotel_madinah: Option<String>,
    pub airline: Option<String>,
}

impl PackageUpdate {
    /// Returns the package with the update applied.
    pub fn apply_to(&self, package: &Package, now: NaiveDateTime) -> Result<Package> {
        let mut next = package.clone();
        if let Some(code) = &self.code {
            if code.trim().is_empty() {
                return Err(ValidationError::MissingField("code".to_string()).into());
            }
            next.code = code.trim().to_string();
        }
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(ValidationError::MissingField("name".to_string()).into());
            }
            next.name = name.trim().to_string();
        }
        if let Some(package_type) = self.package_type {
            next.package_type = package_type;
        }
        if self.description.is_some() {
            next.description = self.description.clone();
        }
        if let Some(price) = self.price_per_person {
            if price < Decimal::ZERO {
                return Err(ValidationError::invalid("pricePerPerson must not be negative").into());
            }
            next.price_per_person = price;
        }
        if let Some(seats) = self.total_seats {
            if seats <= 0 {
                return Err(ValidationError::invalid("totalSeats must be positive").into());
            }
            next.total_seats = seats;
        }
        if self.departure_date.is_some() {
            next.departure_date = self.departure_date;
        }
        if self.return_date.is_some() {
            next.return_date = self.return_date;
        }
        if let Some(status) = self.status {
            next.status = status;
        }
        if self.estimated_cost.is_some() {
            next.estimated_cost = self.estimated_cost;
        }
        if self.hotel_makkah.is_some() {
            next.hotel_makkah = self.hotel_makkah.clone();
        }
        if self.hotel_madinah.is_some() {
            next.hotel_madinah = self.hotel_madinah.clone();
        }
        if self.airline.is_some() {
            next.airline = self.airline.clone();
        }
        validate_schedule(next.departure_date, next.return_date)?;
        next.updated_at = now;
        Ok(next)
    }
}

fn validate_schedule(
    departure: Option<NaiveDateTime>,
    return_date: Option<NaiveDateTime>,
) -> Result<()> {
    if let (Some(departure), Some(return_date)) = (departure, return_date) {
        if return_date < departure {
            return Err(
                ValidationError::invalid("returnDate must not be before departureDate").into(),
            );
        }
    }
    Ok(())
}

/// Filters accepted by the package list.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageFilter {
    pub status: Option<PackageStatus>,
    #[serde(rename = "type")]
    pub package_type: Option<PackageType>,
    pub search: Option<String>,
}

/// Package with derived capacity and money figures.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PackageSummary {
    #[serde(flatten)]
    pub package: Package,
    pub available_seats: i32,
    pub occupancy_rate: f64,
    pub pilgrim_count: i64,
    pub total_income: Decimal,
    pub total_expense: Decimal,
}
