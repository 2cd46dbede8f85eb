//! Pilgrim domain models.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{Result, ValidationError};
use crate::ledger::{classify_status, LedgerSnapshot, PaymentDelta, PaymentStatus};
use crate::packages::Package;
use crate::transactions::{IncomePosting, PaymentMethod, PostedIncome};
use crate::utils::time_utils::deserialize_optional_datetime;

text_enum! {
    pub enum Gender {
        Male => "male",
        Female => "female",
    }
}

text_enum! {
    pub enum RoomType {
        Single => "single",
        Double => "double",
        Triple => "triple",
        Quad => "quad",
        Queen => "queen",
    }
}

/// Domain model representing a pilgrim and their balance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Pilgrim {
    pub id: String,
    pub name: String,
    pub nik: Option<String>,
    pub passport_number: Option<String>,
    pub passport_expiry: Option<NaiveDateTime>,
    pub gender: Option<Gender>,
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
    pub total_amount: Decimal,
    pub paid_amount: Decimal,
    pub remaining_amount: Decimal,
    pub payment_status: PaymentStatus,
    pub room_type: Option<RoomType>,
    pub is_cancelled: bool,
    pub cancellation_reason: Option<String>,
    pub notes: Option<String>,
    pub photo_url: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub created_by_id: Option<String>,
}

impl Pilgrim {
    /// Status implied by the current balance. Cancelled pilgrims stay
    /// `dibatalkan`.
    pub fn derive_status(&self) -> PaymentStatus {
        if self.is_cancelled {
            PaymentStatus::Dibatalkan
        } else {
            classify_status(self.paid_amount, self.remaining_amount, self.total_amount)
        }
    }

    pub fn apply_payment_delta(&mut self, delta: &PaymentDelta) {
        let (paid, remaining) = delta.apply(self.paid_amount, self.remaining_amount);
        self.paid_amount = paid;
        self.remaining_amount = remaining;
        self.payment_status = self.derive_status();
    }

    pub fn apply_snapshot(&mut self, snapshot: &LedgerSnapshot) {
        self.paid_amount = snapshot.paid_amount;
        self.remaining_amount = snapshot.remaining_amount;
        self.payment_status = if self.is_cancelled {
            PaymentStatus::Dibatalkan
        } else {
            snapshot.payment_status
        };
    }
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Input model for registering a pilgrim.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPilgrim {
    pub name: String,
    pub nik: Option<String>,
    pub passport_number: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_datetime")]
    pub passport_expiry: Option<NaiveDateTime>,
    pub gender: Option<Gender>,
    #[serde(default, deserialize_with = "deserialize_optional_datetime")]
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
    /// Defaults to the package price when omitted.
    pub total_amount: Option<Decimal>,
    /// Cash received at registration, posted as an income transaction.
    #[serde(alias = "paidAmount")]
    pub initial_payment: Option<Decimal>,
    pub payment_method: Option<PaymentMethod>,
    pub room_type: Option<RoomType>,
    pub notes: Option<String>,
    pub photo_url: Option<String>,
}

impl NewPilgrim {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingField("name".to_string()).into());
        }
        if self.total_amount.is_some_and(|t| t < Decimal::ZERO) {
            return Err(ValidationError::invalid("totalAmount must not be negative").into());
        }
        if self.initial_payment.is_some_and(|p| p < Decimal::ZERO) {
            return Err(ValidationError::invalid("initial payment must not be negative").into());
        }
        Ok(())
    }

    pub fn normalized_nik(&self) -> Option<String> {
        trimmed(self.nik.clone())
    }

    pub fn normalized_package_id(&self) -> Option<String> {
        trimmed(self.package_id.clone())
    }

    /// Builds the row with nothing paid yet; an initial payment is applied
    /// by posting it.
    pub fn into_pilgrim(
        self,
        id: String,
        total_amount: Decimal,
        created_by_id: Option<String>,
        now: NaiveDateTime,
    ) -> Pilgrim {
        let mut pilgrim = Pilgrim {
            id,
            name: self.name.trim().to_string(),
            nik: trimmed(self.nik),
            passport_number: trimmed(self.passport_number),
            passport_expiry: self.passport_expiry,
            gender: self.gender,
            date_of_birth: self.date_of_birth,
            place_of_birth: self.place_of_birth,
            phone: trimmed(self.phone),
            email: trimmed(self.email),
            address: self.address,
            province: self.province,
            regency: self.regency,
            district: self.district,
            village: self.village,
            emergency_contact_name: self.emergency_contact_name,
            emergency_contact_phone: self.emergency_contact_phone,
            package_id: trimmed(self.package_id),
            seat_number: self.seat_number,
            total_amount,
            paid_amount: Decimal::ZERO,
            remaining_amount: total_amount,
            payment_status: PaymentStatus::Pending,
            room_type: self.room_type,
            is_cancelled: false,
            cancellation_reason: None,
            notes: self.notes,
            photo_url: self.photo_url,
            created_at: now,
            updated_at: now,
            created_by_id,
        };
        pilgrim.payment_status = pilgrim.derive_status();
        pilgrim
    }
}

/// Partial update of a pilgrim.
///
/// Paid amount and payment status belong to the ledger and are not editable.
/// An empty `packageId` removes the package assignment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PilgrimUpdate {
    pub name: Option<String>,
    pub nik: Option<String>,
    pub passport_number: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_datetime")]
    pub passport_expiry: Option<NaiveDateTime>,
    pub gender: Option<Gender>,
    #[serde(default, deserialize_with = "deserialize_optional_datetime")]
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
    pub total_amount: Option<Decimal>,
    pub room_type: Option<RoomType>,
    pub is_cancelled: Option<bool>,
    pub cancellation_reason: Option<String>,
    pub notes: Option<String>,
    pub photo_url: Option<String>,
}

macro_rules! set_if_present {
    ($target:ident, $source:expr, $($field:ident),+ $(,)?) => {
        $(
            if $source.$field.is_some() {
                $target.$field = $source.$field.clone();
            }
        )+
    };
}

impl PilgrimUpdate {
    pub fn normalized_nik(&self) -> Option<String> {
        trimmed(self.nik.clone())
    }

    /// Returns the pilgrim with the update applied.
    ///
    /// A new total shifts the remaining amount by the same difference.
    pub fn apply_to(&self, pilgrim: &Pilgrim, now: NaiveDateTime) -> Result<Pilgrim> {
        let mut next = pilgrim.clone();

        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(ValidationError::MissingField("name".to_string()).into());
            }
            next.name = name.trim().to_string();
        }
        if self.nik.is_some() {
            next.nik = self.normalized_nik();
        }
        set_if_present!(
            next,
            self,
            passport_number,
            passport_expiry,
            gender,
            date_of_birth,
            place_of_birth,
            phone,
            email,
            address,
            province,
            regency,
            district,
            village,
            emergency_contact_name,
            emergency_contact_phone,
            seat_number,
            room_type,
            cancellation_reason,
            notes,
            photo_url,
        );
        if let Some(package_id) = &self.package_id {
            next.package_id = trimmed(Some(package_id.clone()));
        }
        if let Some(total) = self.total_amount {
            if total < Decimal::ZERO {
                return Err(ValidationError::invalid("totalAmount must not be negative").into());
            }
            next.remaining_amount += total - pilgrim.total_amount;
            next.total_amount = total;
        }
        if let Some(cancelled) = self.is_cancelled {
            next.is_cancelled = cancelled;
            if !cancelled {
                next.cancellation_reason = None;
            }
        }

        next.payment_status = next.derive_status();
        next.updated_at = now;
        Ok(next)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkPilgrimUpdate {
    pub id: String,
    pub data: PilgrimUpdate,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PilgrimFilter {
    pub package_id: Option<String>,
    pub payment_status: Option<PaymentStatus>,
    pub is_cancelled: Option<bool>,
    /// Matches name, NIK or phone.
    pub search: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCount {
    pub status: PaymentStatus,
    pub count: i64,
}

/// Headline figures of the pilgrim book.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PilgrimStats {
    pub status_counts: Vec<StatusCount>,
    pub total_receivables: Decimal,
    pub active_count: i64,
}

/// Everything written when a pilgrim is registered.
#[derive(Debug, Clone, PartialEq)]
pub struct PilgrimCreation {
    pub pilgrim: Pilgrim,
    pub initial_payment: Option<IncomePosting>,
}

/// Result of registering a pilgrim.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PilgrimCreated {
    /// The pilgrim after any initial payment.
    pub pilgrim: Pilgrim,
    /// The assigned package after its seat was reserved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package: Option<Package>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_payment: Option<PostedIncome>,
}

/// A pilgrim before and after an update.
#[derive(Debug, Clone, PartialEq)]
pub struct PilgrimChange {
    pub before: Pilgrim,
    pub after: Pilgrim,
    /// Package that gained a seat through the update.
    pub reserved_package: Option<Package>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 2, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
    }

    fn registered(total: Decimal) -> Pilgrim {
        NewPilgrim {
            name: "  Siti Aminah ".into(),
            nik: Some("3201010101010001".into()),
            package_id: Some("".into()),
            ..Default::default()
        }
        .into_pilgrim("p-1".into(), total, None, now())
    }

    #[test]
    fn new_pilgrim_starts_unpaid() {
        let pilgrim = registered(dec!(2000000));
        assert_eq!(pilgrim.name, "Siti Aminah");
        assert_eq!(pilgrim.package_id, None);
        assert_eq!(pilgrim.remaining_amount, dec!(2000000));
        assert_eq!(pilgrim.payment_status, PaymentStatus::Pending);

        let free = registered(dec!(0));
        assert_eq!(free.payment_status, PaymentStatus::Lunas);
    }

    #[test]
    fn payment_delta_reclassifies() {
        let mut pilgrim = registered(dec!(2000000));
        pilgrim.apply_payment_delta(&PaymentDelta::posting(dec!(900000), dec!(100000)));
        assert_eq!(pilgrim.paid_amount, dec!(900000));
        assert_eq!(pilgrim.remaining_amount, dec!(1000000));
        assert_eq!(pilgrim.payment_status, PaymentStatus::Cicilan);

        pilgrim.apply_payment_delta(&PaymentDelta::posting(dec!(900000), dec!(100000)).inverse());
        assert_eq!(pilgrim.paid_amount, dec!(0));
        assert_eq!(pilgrim.remaining_amount, dec!(2000000));
        assert_eq!(pilgrim.payment_status, PaymentStatus::Pending);
    }

    #[test]
    fn total_change_shifts_remaining() {
        let mut pilgrim = registered(dec!(2000000));
        pilgrim.apply_payment_delta(&PaymentDelta::posting(dec!(500000), dec!(0)));

        let update = PilgrimUpdate {
            total_amount: Some(dec!(2500000)),
            ..Default::default()
        };
        let next = update.apply_to(&pilgrim, now()).unwrap();
        assert_eq!(next.remaining_amount, dec!(2000000));
        assert_eq!(next.paid_amount, dec!(500000));
        assert_eq!(next.payment_status, PaymentStatus::Dp);
    }

    #[test]
    fn cancellation_overrides_status() {
        let pilgrim = registered(dec!(2000000));
        let cancelled = PilgrimUpdate {
            is_cancelled: Some(true),
            cancellation_reason: Some("sakit".into()),
            ..Default::default()
        }
        .apply_to(&pilgrim, now())
        .unwrap();
        assert_eq!(cancelled.payment_status, PaymentStatus::Dibatalkan);

        let restored = PilgrimUpdate {
            is_cancelled: Some(false),
            ..Default::default()
        }
        .apply_to(&cancelled, now())
        .unwrap();
        assert_eq!(restored.payment_status, PaymentStatus::Pending);
        assert_eq!(restored.cancellation_reason, None);
    }

    #[test]
    fn empty_package_id_unassigns() {
        let mut pilgrim = registered(dec!(1));
        pilgrim.package_id = Some("pkg".into());
        let next = PilgrimUpdate {
            package_id: Some(" ".into()),
            ..Default::default()
        }
        .apply_to(&pilgrim, now())
        .unwrap();
        assert_eq!(next.package_id, None);
    }
}
