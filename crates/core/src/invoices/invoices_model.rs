use chrono::{Datelike, NaiveDateTime};
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::transactions::{Transaction, TransactionType};

const INVOICE_SUFFIX_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const INVOICE_SUFFIX_LEN: usize = 5;

text_enum! {
    pub enum InvoiceStatus {
        Draft => "draft",
        Sent => "sent",
        Paid => "paid",
        Cancelled => "cancelled",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: String,
    pub invoice_number: String,
    pub pilgrim_id: String,
    pub package_id: String,
    pub transaction_id: Option<String>,
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
    pub status: InvoiceStatus,
    pub issue_date: NaiveDateTime,
    pub due_date: Option<NaiveDateTime>,
    pub paid_date: Option<NaiveDateTime>,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub created_by_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceItem {
    pub id: String,
    pub invoice_id: String,
    pub description: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceWithItems {
    #[serde(flatten)]
    pub invoice: Invoice,
    pub items: Vec<InvoiceItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceItemDraft {
    pub description: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub amount: Decimal,
}

/// Invoice to be stored together with the income it documents.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceDraft {
    pub invoice_number: String,
    pub pilgrim_id: String,
    pub package_id: String,
    pub transaction_id: String,
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
    pub status: InvoiceStatus,
    pub issue_date: NaiveDateTime,
    pub paid_date: Option<NaiveDateTime>,
    pub notes: Option<String>,
    pub created_by_id: Option<String>,
    pub items: Vec<InvoiceItemDraft>,
}

impl InvoiceDraft {
    /// Paid invoice for an income that names both a pilgrim and a package.
    ///
    /// The subtotal is the gross amount, the total is the cash received.
    pub fn for_income(transaction: &Transaction, now: NaiveDateTime) -> Option<Self> {
        if transaction.transaction_type != TransactionType::Income {
            return None;
        }
        let pilgrim_id = transaction.pilgrim_id.clone()?;
        let package_id = transaction.package_id.clone()?;
        let gross = transaction.gross_amount();
        let description = transaction.description.clone().unwrap_or_else(|| {
            match transaction.income_category {
                Some(category) => format!("Pembayaran {}", category),
                None => "Pembayaran".to_string(),
            }
        });

        Some(Self {
            invoice_number: generate_invoice_number(now),
            pilgrim_id,
            package_id,
            transaction_id: transaction.id.clone(),
            subtotal: gross,
            discount: transaction.discount,
            total: transaction.amount,
            status: InvoiceStatus::Paid,
            issue_date: now,
            paid_date: Some(now),
            notes: transaction.notes.clone(),
            created_by_id: transaction.created_by_id.clone(),
            items: vec![InvoiceItemDraft {
                description,
                quantity: 1,
                unit_price: gross,
                amount: gross,
            }],
        })
    }
}

/// `INV-{YYYY}{MM}-{5 uppercase alphanumerics}`.
pub fn generate_invoice_number(now: NaiveDateTime) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..INVOICE_SUFFIX_LEN)
        .map(|_| {
            let idx = rng.gen_range(0..INVOICE_SUFFIX_CHARSET.len());
            INVOICE_SUFFIX_CHARSET[idx] as char
        })
        .collect();
    format!("INV-{}{:02}-{}", now.year(), now.month(), suffix)
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceFilter {
    pub pilgrim_id: Option<String>,
    pub package_id: Option<String>,
    pub status: Option<InvoiceStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transactions::IncomeCategory;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    }

    fn income(pilgrim: Option<&str>, package: Option<&str>) -> Transaction {
        Transaction {
            id: "tx-1".into(),
            transaction_type: TransactionType::Income,
            income_category: Some(IncomeCategory::Cicilan),
            expense_category: None,
            amount: dec!(900000),
            discount: dec!(100000),
            pilgrim_id: pilgrim.map(String::from),
            package_id: package.map(String::from),
            vendor_id: None,
            payment_method: None,
            reference_number: None,
            bank_name: None,
            description: None,
            notes: None,
            transaction_date: at(2026, 3, 1),
            receipt_url: None,
            created_at: at(2026, 3, 1),
            updated_at: at(2026, 3, 1),
            created_by_id: Some("user-1".into()),
        }
    }

    #[test]
    fn invoice_number_format() {
        let number = generate_invoice_number(at(2026, 3, 14));
        assert!(number.starts_with("INV-202603-"), "{}", number);
        let suffix = &number["INV-202603-".len()..];
        assert_eq!(suffix.len(), 5);
        assert!(suffix
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }

    #[test]
    fn draft_needs_pilgrim_and_package() {
        let now = at(2026, 3, 1);
        assert!(InvoiceDraft::for_income(&income(Some("p"), None), now).is_none());
        assert!(InvoiceDraft::for_income(&income(None, Some("k")), now).is_none());

        let draft = InvoiceDraft::for_income(&income(Some("p"), Some("k")), now).unwrap();
        assert_eq!(draft.subtotal, dec!(1000000));
        assert_eq!(draft.discount, dec!(100000));
        assert_eq!(draft.total, dec!(900000));
        assert_eq!(draft.status, InvoiceStatus::Paid);
        assert_eq!(draft.paid_date, Some(now));
        assert_eq!(draft.items.len(), 1);
        assert_eq!(draft.items[0].quantity, 1);
        assert_eq!(draft.items[0].unit_price, dec!(1000000));
        assert_eq!(draft.items[0].description, "Pembayaran cicilan");
    }
}
