//! Transaction domain models and pure aggregation.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::errors::{Result, ValidationError};
use crate::invoices::{Invoice, InvoiceDraft};
use crate::ledger::{LedgerEffect, PaymentDelta};
use crate::pilgrims::Pilgrim;
use crate::utils::time_utils::{deserialize_optional_datetime, month_key, start_of_month_offset};

text_enum! {
    pub enum TransactionType {
        Income => "income",
        Expense => "expense",
    }
}

text_enum! {
    pub enum IncomeCategory {
        Dp => "dp",
        Cicilan => "cicilan",
        Pelunasan => "pelunasan",
        Lainnya => "lainnya",
    }
}

text_enum! {
    pub enum ExpenseCategory {
        TiketPesawat => "tiket_pesawat",
        Hotel => "hotel",
        HotelTransit => "hotel_transit",
        Transport => "transport",
        VisaHandling => "visa_handling",
        Visa => "visa",
        Handling => "handling",
        Muthawif => "muthawif",
        Konsumsi => "konsumsi",
        Manasik => "manasik",
        TourLeader => "tour_leader",
        OperasionalKantor => "operasional_kantor",
        AtkKantor => "atk_kantor",
        KeperluanKantorLainnya => "keperluan_kantor_lainnya",
        Ujroh => "ujroh",
        Lainnya => "lainnya",
    }
}

text_enum! {
    pub enum PaymentMethod {
        BankBca => "bank_bca",
        BankMandiri => "bank_mandiri",
        BankBni => "bank_bni",
        BankBri => "bank_bri",
        BankSyariah => "bank_syariah",
        Cash => "cash",
        Transfer => "transfer",
    }
}

/// A posted income or expense.
///
/// For income, `amount` is the cash received and `discount` the credit given
/// on top of it; the gross amount billed is their sum.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub income_category: Option<IncomeCategory>,
    pub expense_category: Option<ExpenseCategory>,
    pub amount: Decimal,
    pub discount: Decimal,
    pub pilgrim_id: Option<String>,
    pub package_id: Option<String>,
    pub vendor_id: Option<String>,
    pub payment_method: Option<PaymentMethod>,
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

impl Transaction {
    pub fn gross_amount(&self) -> Decimal {
        self.amount + self.discount
    }

    /// What this transaction does to the row it is linked to.
    pub fn effect(&self) -> Option<LedgerEffect> {
        match self.transaction_type {
            TransactionType::Income => {
                self.pilgrim_id
                    .as_ref()
                    .map(|pilgrim_id| LedgerEffect::PilgrimPayment {
                        pilgrim_id: pilgrim_id.clone(),
                        delta: PaymentDelta::posting(self.amount, self.discount),
                    })
            }
            TransactionType::Expense => {
                self.package_id
                    .as_ref()
                    .map(|package_id| LedgerEffect::PackageCost {
                        package_id: package_id.clone(),
                        delta: self.amount,
                    })
            }
        }
    }

    pub fn category_label(&self) -> &'static str {
        match (self.income_category, self.expense_category) {
            (Some(c), _) => c.as_str(),
            (None, Some(c)) => c.as_str(),
            (None, None) => "lainnya",
        }
    }

    /// Returns the transaction with the update applied. The type never changes.
    pub fn apply_update(&self, update: &TransactionUpdate, now: NaiveDateTime) -> Result<Self> {
        let mut next = self.clone();

        match self.transaction_type {
            TransactionType::Income => {
                if update.expense_category.is_some() {
                    return Err(ValidationError::invalid(
                        "expenseCategory cannot be set on an income transaction",
                    )
                    .into());
                }
                if update.amount.is_some() || update.discount.is_some() {
                    let gross = update.amount.unwrap_or_else(|| self.gross_amount());
                    let discount = update.discount.unwrap_or(self.discount);
                    validate_income_amounts(gross, discount)?;
                    next.amount = gross - discount;
                    next.discount = discount;
                }
                if let Some(category) = update.income_category {
                    next.income_category = Some(category);
                }
            }
            TransactionType::Expense => {
                if update.income_category.is_some() {
                    return Err(ValidationError::invalid(
                        "incomeCategory cannot be set on an expense transaction",
                    )
                    .into());
                }
                if update.discount.is_some_and(|d| !d.is_zero()) {
                    return Err(
                        ValidationError::invalid("discount only applies to income").into(),
                    );
                }
                if let Some(amount) = update.amount {
                    validate_positive(amount)?;
                    next.amount = amount;
                }
                if let Some(category) = update.expense_category {
                    next.expense_category = Some(category);
                }
            }
        }

        if let Some(pilgrim_id) = &update.pilgrim_id {
            next.pilgrim_id = non_empty(pilgrim_id);
        }
        if let Some(package_id) = &update.package_id {
            next.package_id = non_empty(package_id);
        }
        if let Some(vendor_id) = &update.vendor_id {
            next.vendor_id = non_empty(vendor_id);
        }
        if update.payment_method.is_some() {
            next.payment_method = update.payment_method;
        }
        if update.reference_number.is_some() {
            next.reference_number = update.reference_number.clone();
        }
        if update.bank_name.is_some() {
            next.bank_name = update.bank_name.clone();
        }
        if update.description.is_some() {
            next.description = update.description.clone();
        }
        if update.notes.is_some() {
            next.notes = update.notes.clone();
        }
        if let Some(date) = update.transaction_date {
            next.transaction_date = date;
        }
        if update.receipt_url.is_some() {
            next.receipt_url = update.receipt_url.clone();
        }
        next.updated_at = now;
        Ok(next)
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn validate_positive(amount: Decimal) -> Result<()> {
    if amount <= Decimal::ZERO {
        return Err(ValidationError::invalid("amount must be greater than zero").into());
    }
    Ok(())
}

fn validate_income_amounts(gross: Decimal, discount: Decimal) -> Result<()> {
    validate_positive(gross)?;
    if discount < Decimal::ZERO {
        return Err(ValidationError::invalid("discount must not be negative").into());
    }
    if discount > gross {
        return Err(ValidationError::invalid("discount must not exceed amount").into());
    }
    Ok(())
}

/// Income as entered: `amount` is the gross amount billed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewIncome {
    pub amount: Decimal,
    pub discount: Option<Decimal>,
    #[serde(alias = "category")]
    pub income_category: IncomeCategory,
    pub pilgrim_id: Option<String>,
    pub package_id: Option<String>,
    pub payment_method: Option<PaymentMethod>,
    pub reference_number: Option<String>,
    pub bank_name: Option<String>,
    pub description: Option<String>,
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_datetime")]
    pub transaction_date: Option<NaiveDateTime>,
    pub receipt_url: Option<String>,
}

impl NewIncome {
    pub fn validate(&self) -> Result<()> {
        validate_income_amounts(self.amount, self.discount.unwrap_or_default())
    }

    /// Stored form: cash received as amount, discount kept apart.
    pub fn into_transaction(
        self,
        id: String,
        created_by_id: Option<String>,
        now: NaiveDateTime,
    ) -> Transaction {
        let discount = self.discount.unwrap_or_default();
        Transaction {
            id,
            transaction_type: TransactionType::Income,
            income_category: Some(self.income_category),
            expense_category: None,
            amount: self.amount - discount,
            discount,
            pilgrim_id: self.pilgrim_id.as_deref().and_then(non_empty),
            package_id: self.package_id.as_deref().and_then(non_empty),
            vendor_id: None,
            payment_method: self.payment_method,
            reference_number: self.reference_number,
            bank_name: self.bank_name,
            description: self.description,
            notes: self.notes,
            transaction_date: self.transaction_date.unwrap_or(now),
            receipt_url: self.receipt_url,
            created_at: now,
            updated_at: now,
            created_by_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewExpense {
    pub amount: Decimal,
    #[serde(alias = "category")]
    pub expense_category: ExpenseCategory,
    pub package_id: Option<String>,
    pub vendor_id: Option<String>,
    pub payment_method: Option<PaymentMethod>,
    pub reference_number: Option<String>,
    pub bank_name: Option<String>,
    pub description: Option<String>,
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_datetime")]
    pub transaction_date: Option<NaiveDateTime>,
    pub receipt_url: Option<String>,
}

impl NewExpense {
    pub fn validate(&self) -> Result<()> {
        validate_positive(self.amount)
    }

    pub fn into_transaction(
        self,
        id: String,
        created_by_id: Option<String>,
        now: NaiveDateTime,
    ) -> Transaction {
        Transaction {
            id,
            transaction_type: TransactionType::Expense,
            income_category: None,
            expense_category: Some(self.expense_category),
            amount: self.amount,
            discount: Decimal::ZERO,
            pilgrim_id: None,
            package_id: self.package_id.as_deref().and_then(non_empty),
            vendor_id: self.vendor_id.as_deref().and_then(non_empty),
            payment_method: self.payment_method,
            reference_number: self.reference_number,
            bank_name: self.bank_name,
            description: self.description,
            notes: self.notes,
            transaction_date: self.transaction_date.unwrap_or(now),
            receipt_url: self.receipt_url,
            created_at: now,
            updated_at: now,
            created_by_id,
        }
    }
}

/// An income ready to store, with the invoice it produces if any.
#[derive(Debug, Clone, PartialEq)]
pub struct IncomePosting {
    pub transaction: Transaction,
    pub invoice: Option<InvoiceDraft>,
}

impl IncomePosting {
    pub fn new(transaction: Transaction, now: NaiveDateTime) -> Self {
        let invoice = InvoiceDraft::for_income(&transaction, now);
        Self {
            transaction,
            invoice,
        }
    }
}

/// Result of storing an income.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PostedIncome {
    pub transaction: Transaction,
    /// The linked pilgrim after the payment was applied.
    pub pilgrim: Option<Pilgrim>,
    pub invoice: Option<Invoice>,
}

/// Partial update of a transaction. For income, `amount` is gross.
/// Empty link ids clear the link.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionUpdate {
    pub amount: Option<Decimal>,
    pub discount: Option<Decimal>,
    pub income_category: Option<IncomeCategory>,
    pub expense_category: Option<ExpenseCategory>,
    pub pilgrim_id: Option<String>,
    pub package_id: Option<String>,
    pub vendor_id: Option<String>,
    pub payment_method: Option<PaymentMethod>,
    pub reference_number: Option<String>,
    pub bank_name: Option<String>,
    pub description: Option<String>,
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_datetime")]
    pub transaction_date: Option<NaiveDateTime>,
    pub receipt_url: Option<String>,
}

/// A transaction before and after an update.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionChange {
    pub before: Transaction,
    pub after: Transaction,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionFilter {
    #[serde(rename = "type")]
    pub transaction_type: Option<TransactionType>,
    /// Income or expense category text.
    pub category: Option<String>,
    pub pilgrim_id: Option<String>,
    pub package_id: Option<String>,
    pub vendor_id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_datetime")]
    pub start_date: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "deserialize_optional_datetime")]
    pub end_date: Option<NaiveDateTime>,
    pub search: Option<String>,
}

/// Transaction with the names of the rows it links to.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDetail {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub pilgrim_name: Option<String>,
    pub package_name: Option<String>,
    pub vendor_name: Option<String>,
}

/// The columns aggregations need.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerRow {
    pub transaction_type: TransactionType,
    pub expense_category: Option<ExpenseCategory>,
    pub amount: Decimal,
    pub package_id: Option<String>,
    pub transaction_date: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionTotals {
    pub income: Decimal,
    pub expense: Decimal,
    pub balance: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashflowMonth {
    /// `YYYY-MM`.
    pub month: String,
    pub income: Decimal,
    pub expense: Decimal,
    pub balance: Decimal,
}

pub fn summarize_totals(rows: &[LedgerRow]) -> TransactionTotals {
    let mut totals = TransactionTotals::default();
    for row in rows {
        match row.transaction_type {
            TransactionType::Income => totals.income += row.amount,
            TransactionType::Expense => totals.expense += row.amount,
        }
    }
    totals.balance = totals.income - totals.expense;
    totals
}

/// Income and expense per calendar month for the last `months` months,
/// oldest first. Months without transactions are present with zeros.
pub fn cashflow_by_month(rows: &[LedgerRow], months: u32, now: NaiveDateTime) -> Vec<CashflowMonth> {
    let months = months.max(1);
    let since = start_of_month_offset(now, months - 1);

    let mut buckets: BTreeMap<String, (Decimal, Decimal)> = BTreeMap::new();
    for offset in (0..months).rev() {
        buckets.insert(
            month_key(start_of_month_offset(now, offset)),
            (Decimal::ZERO, Decimal::ZERO),
        );
    }

    for row in rows.iter().filter(|r| r.transaction_date >= since) {
        if let Some(bucket) = buckets.get_mut(&month_key(row.transaction_date)) {
            match row.transaction_type {
                TransactionType::Income => bucket.0 += row.amount,
                TransactionType::Expense => bucket.1 += row.amount,
            }
        }
    }

    buckets
        .into_iter()
        .map(|(month, (income, expense))| CashflowMonth {
            month,
            income,
            expense,
            balance: income - expense,
        })
        .collect()
}
