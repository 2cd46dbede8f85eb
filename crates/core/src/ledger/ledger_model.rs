//! Ledger domain models and the pure balance rules.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::CICILAN_THRESHOLD_RATIO;

text_enum! {
    /// Payment progress of a pilgrim.
    #[derive(Default)]
    pub enum PaymentStatus {
        #[default]
        Pending => "pending",
        Dp => "dp",
        Cicilan => "cicilan",
        Lunas => "lunas",
        Dibatalkan => "dibatalkan",
    }
}

/// Classifies a balance into a payment status.
///
/// Rules are evaluated in order and the first match wins:
/// nothing left to pay (or paid in full) is `lunas`, a payment below 30% of the
/// total is `dp`, anything from 30% upwards is `cicilan`, otherwise `pending`.
pub fn classify_status(paid: Decimal, remaining: Decimal, total: Decimal) -> PaymentStatus {
    if remaining <= Decimal::ZERO || paid >= total {
        return PaymentStatus::Lunas;
    }
    let threshold = total * CICILAN_THRESHOLD_RATIO;
    if paid > Decimal::ZERO && paid < threshold {
        PaymentStatus::Dp
    } else if paid >= threshold {
        PaymentStatus::Cicilan
    } else {
        PaymentStatus::Pending
    }
}

/// Cash and credit of one income transaction as seen by the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IncomeLine {
    /// Cash actually received.
    pub amount: Decimal,
    /// Credit granted on top of the cash.
    pub discount: Decimal,
}

/// Authoritative balance of a pilgrim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerSnapshot {
    pub paid_amount: Decimal,
    pub remaining_amount: Decimal,
    pub payment_status: PaymentStatus,
}

/// Recomputes a balance from the complete income history of a pilgrim.
pub fn reconcile(total: Decimal, incomes: &[IncomeLine]) -> LedgerSnapshot {
    let cash: Decimal = incomes.iter().map(|line| line.amount).sum();
    let credit: Decimal = incomes.iter().map(|line| line.discount).sum();
    let remaining = (total - cash - credit).max(Decimal::ZERO);
    LedgerSnapshot {
        paid_amount: cash,
        remaining_amount: remaining,
        payment_status: classify_status(cash, remaining, total),
    }
}

/// Signed change to a pilgrim balance caused by posting or reversing income.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PaymentDelta {
    pub paid: Decimal,
    pub remaining: Decimal,
}

impl PaymentDelta {
    /// Effect of receiving `net` cash with `discount` credit.
    ///
    /// Paid grows by the cash, remaining shrinks by cash plus credit.
    pub fn posting(net: Decimal, discount: Decimal) -> Self {
        Self {
            paid: net,
            remaining: -(net + discount),
        }
    }

    pub fn inverse(&self) -> Self {
        Self {
            paid: -self.paid,
            remaining: -self.remaining,
        }
    }

    /// Applies the delta to a balance. Paid never drops below zero.
    pub fn apply(&self, paid: Decimal, remaining: Decimal) -> (Decimal, Decimal) {
        (
            (paid + self.paid).max(Decimal::ZERO),
            remaining + self.remaining,
        )
    }
}

/// Monetary side effect of a transaction on another row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerEffect {
    /// Income received from a pilgrim.
    PilgrimPayment {
        pilgrim_id: String,
        delta: PaymentDelta,
    },
    /// Expense charged to a package; applied to its actual cost.
    PackageCost { package_id: String, delta: Decimal },
}

impl LedgerEffect {
    pub fn inverse(&self) -> Self {
        match self {
            LedgerEffect::PilgrimPayment { pilgrim_id, delta } => LedgerEffect::PilgrimPayment {
                pilgrim_id: pilgrim_id.clone(),
                delta: delta.inverse(),
            },
            LedgerEffect::PackageCost { package_id, delta } => LedgerEffect::PackageCost {
                package_id: package_id.clone(),
                delta: -*delta,
            },
        }
    }
}

/// Outcome of a batch reconciliation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecalculationSummary {
    pub updated_count: usize,
    pub errors: Vec<String>,
}
