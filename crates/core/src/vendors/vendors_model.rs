use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{Result, ValidationError};
use crate::utils::time_utils::deserialize_optional_datetime;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Vendor {
    pub id: String,
    pub name: String,
    /// Free-form kind, e.g. `airline`, `hotel`, `transport`.
    #[serde(rename = "type")]
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

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewVendor {
    pub name: String,
    #[serde(rename = "type", alias = "vendorType")]
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
}

impl NewVendor {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingField("name".to_string()).into());
        }
        if self.vendor_type.trim().is_empty() {
            return Err(ValidationError::MissingField("type".to_string()).into());
        }
        Ok(())
    }

    pub fn into_vendor(self, id: String, now: NaiveDateTime) -> Vendor {
        Vendor {
            id,
            name: self.name.trim().to_string(),
            vendor_type: self.vendor_type.trim().to_string(),
            contact_person: self.contact_person,
            phone: self.phone,
            email: self.email,
            address: self.address,
            bank_account: self.bank_account,
            bank_name: self.bank_name,
            bank_account_holder: self.bank_account_holder,
            npwp: self.npwp,
            notes: self.notes,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorUpdate {
    pub name: Option<String>,
    #[serde(rename = "type", alias = "vendorType")]
    pub vendor_type: Option<String>,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub bank_account: Option<String>,
    pub bank_name: Option<String>,
    pub bank_account_holder: Option<String>,
    pub npwp: Option<String>,
    pub notes: Option<String>,
    pub is_active: Option<bool>,
}

impl VendorUpdate {
    pub fn apply_to(&self, vendor: &Vendor, now: NaiveDateTime) -> Result<Vendor> {
        let mut next = vendor.clone();
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(ValidationError::MissingField("name".to_string()).into());
            }
            next.name = name.trim().to_string();
        }
        if let Some(kind) = &self.vendor_type {
            if kind.trim().is_empty() {
                return Err(ValidationError::MissingField("type".to_string()).into());
            }
            next.vendor_type = kind.trim().to_string();
        }
        let optional = [
            (&self.contact_person, &mut next.contact_person),
            (&self.phone, &mut next.phone),
            (&self.email, &mut next.email),
            (&self.address, &mut next.address),
            (&self.bank_account, &mut next.bank_account),
            (&self.bank_name, &mut next.bank_name),
            (&self.bank_account_holder, &mut next.bank_account_holder),
            (&self.npwp, &mut next.npwp),
            (&self.notes, &mut next.notes),
        ];
        for (source, target) in optional {
            if source.is_some() {
                *target = source.clone();
            }
        }
        if let Some(active) = self.is_active {
            next.is_active = active;
        }
        next.updated_at = now;
        Ok(next)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorFilter {
    pub search: Option<String>,
    #[serde(rename = "type")]
    pub vendor_type: Option<String>,
    /// Inactive vendors are hidden unless this is true.
    pub include_inactive: Option<bool>,
}

text_enum! {
    pub enum DebtStatus {
        Unpaid => "unpaid",
        Partial => "partial",
        Paid => "paid",
    }
}

/// Status of a payable from what has been paid against its total.
pub fn classify_debt(paid: Decimal, total: Decimal) -> DebtStatus {
    if paid >= total {
        DebtStatus::Paid
    } else if paid > Decimal::ZERO {
        DebtStatus::Partial
    } else {
        DebtStatus::Unpaid
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VendorDebt {
    pub id: String,
    pub vendor_id: String,
    pub package_id: Option<String>,
    pub description: String,
    pub total_amount: Decimal,
    pub paid_amount: Decimal,
    pub remaining_amount: Decimal,
    pub due_date: Option<NaiveDateTime>,
    pub status: DebtStatus,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub created_by_id: Option<String>,
}

impl VendorDebt {
    /// Recomputes remaining and status from total and paid.
    pub fn rebalance(&mut self) {
        self.remaining_amount = (self.total_amount - self.paid_amount).max(Decimal::ZERO);
        self.status = classify_debt(self.paid_amount, self.total_amount);
    }

    /// The debt after paying `amount` towards it.
    pub fn with_payment(&self, amount: Decimal, now: NaiveDateTime) -> Result<Self> {
        if amount <= Decimal::ZERO {
            return Err(ValidationError::invalid("payment amount must be greater than zero").into());
        }
        let mut next = self.clone();
        next.paid_amount += amount;
        next.rebalance();
        next.updated_at = now;
        Ok(next)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewVendorDebt {
    pub vendor_id: String,
    pub package_id: Option<String>,
    pub description: String,
    pub total_amount: Decimal,
    pub paid_amount: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_optional_datetime")]
    pub due_date: Option<NaiveDateTime>,
    pub notes: Option<String>,
}

impl NewVendorDebt {
    pub fn validate(&self) -> Result<()> {
        if self.vendor_id.trim().is_empty() {
            return Err(ValidationError::MissingField("vendorId".to_string()).into());
        }
        if self.description.trim().is_empty() {
            return Err(ValidationError::MissingField("description".to_string()).into());
        }
        if self.total_amount <= Decimal::ZERO {
            return Err(ValidationError::invalid("totalAmount must be greater than zero").into());
        }
        if self.paid_amount.is_some_and(|p| p < Decimal::ZERO) {
            return Err(ValidationError::invalid("paidAmount must not be negative").into());
        }
        Ok(())
    }

    pub fn into_debt(
        self,
        id: String,
        created_by_id: Option<String>,
        now: NaiveDateTime,
    ) -> VendorDebt {
        let mut debt = VendorDebt {
            id,
            vendor_id: self.vendor_id.trim().to_string(),
            package_id: self.package_id.filter(|p| !p.trim().is_empty()),
            description: self.description.trim().to_string(),
            total_amount: self.total_amount,
            paid_amount: self.paid_amount.unwrap_or_default(),
            remaining_amount: Decimal::ZERO,
            due_date: self.due_date,
            status: DebtStatus::Unpaid,
            notes: self.notes,
            created_at: now,
            updated_at: now,
            created_by_id,
        };
        debt.rebalance();
        debt
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorDebtUpdate {
    pub description: Option<String>,
    pub package_id: Option<String>,
    pub total_amount: Option<Decimal>,
    pub paid_amount: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_optional_datetime")]
    pub due_date: Option<NaiveDateTime>,
    pub notes: Option<String>,
}

impl VendorDebtUpdate {
    pub fn apply_to(&self, debt: &VendorDebt, now: NaiveDateTime) -> Result<VendorDebt> {
        let mut next = debt.clone();
        if let Some(description) = &self.description {
            if description.trim().is_empty() {
                return Err(ValidationError::MissingField("description".to_string()).into());
            }
            next.description = description.trim().to_string();
        }
        if let Some(package_id) = &self.package_id {
            next.package_id = Some(package_id.trim().to_string()).filter(|p| !p.is_empty());
        }
        if let Some(total) = self.total_amount {
            if total <= Decimal::ZERO {
                return Err(
                    ValidationError::invalid("totalAmount must be greater than zero").into(),
                );
            }
            next.total_amount = total;
        }
        if let Some(paid) = self.paid_amount {
            if paid < Decimal::ZERO {
                return Err(ValidationError::invalid("paidAmount must not be negative").into());
            }
            next.paid_amount = paid;
        }
        if self.due_date.is_some() {
            next.due_date = self.due_date;
        }
        if self.notes.is_some() {
            next.notes = self.notes.clone();
        }
        next.rebalance();
        next.updated_at = now;
        Ok(next)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebtPayment {
    pub amount: Decimal,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebtFilter {
    pub vendor_id: Option<String>,
    pub status: Option<DebtStatus>,
}

/// Debt with the names of its vendor and package.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VendorDebtDetail {
    #[serde(flatten)]
    pub debt: VendorDebt,
    pub vendor_name: Option<String>,
    pub package_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 4, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn debt(total: Decimal, paid: Option<Decimal>) -> VendorDebt {
        NewVendorDebt {
            vendor_id: "vendor-1".into(),
            package_id: Some("".into()),
            description: "Hotel Makkah".into(),
            total_amount: total,
            paid_amount: paid,
            due_date: None,
            notes: None,
        }
        .into_debt("debt-1".into(), None, now())
    }

    #[test]
    fn debt_status_from_payments() {
        assert_eq!(classify_debt(dec!(0), dec!(100)), DebtStatus::Unpaid);
        assert_eq!(classify_debt(dec!(1), dec!(100)), DebtStatus::Partial);
        assert_eq!(classify_debt(dec!(100), dec!(100)), DebtStatus::Paid);
        assert_eq!(classify_debt(dec!(150), dec!(100)), DebtStatus::Paid);

        let created = debt(dec!(10000000), Some(dec!(2500000)));
        assert_eq!(created.package_id, None);
        assert_eq!(created.status, DebtStatus::Partial);
        assert_eq!(created.remaining_amount, dec!(7500000));
    }

    #[test]
    fn payments_floor_remaining_at_zero() {
        let open = debt(dec!(10000000), None);
        assert_eq!(open.status, DebtStatus::Unpaid);

        let partial = open.with_payment(dec!(4000000), now()).unwrap();
        assert_eq!(partial.status, DebtStatus::Partial);
        assert_eq!(partial.remaining_amount, dec!(6000000));

        let overpaid = partial.with_payment(dec!(7000000), now()).unwrap();
        assert_eq!(overpaid.status, DebtStatus::Paid);
        assert_eq!(overpaid.paid_amount, dec!(11000000));
        assert_eq!(overpaid.remaining_amount, dec!(0));

        assert!(open.with_payment(dec!(0), now()).is_err());
    }

    #[test]
    fn update_rebalances() {
        let open = debt(dec!(1000), Some(dec!(500)));
        let raised = VendorDebtUpdate {
            total_amount: Some(dec!(2000)),
            ..Default::default()
        }
        .apply_to(&open, now())
        .unwrap();
        assert_eq!(raised.remaining_amount, dec!(1500));
        assert_eq!(raised.status, DebtStatus::Partial);
    }
}
