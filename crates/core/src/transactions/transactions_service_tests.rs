use super::*;
use crate::audit::AuditAction;
use crate::invoices::InvoiceStatus;
use crate::ledger::PaymentStatus;
use crate::pilgrims::{NewPilgrim, PilgrimCreation, PilgrimRepositoryTrait};
use crate::test_fixtures::{
    actor, at, package, MemoryStore, RecordingAudit, RecordingNotifications,
};
use crate::users::Role;
use crate::utils::PageRequest;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;

struct Setup {
    store: Arc<MemoryStore>,
    audit: Arc<RecordingAudit>,
    notifications: Arc<RecordingNotifications>,
    service: TransactionService,
}

async fn setup_with(notifications: RecordingNotifications) -> Setup {
    let store = Arc::new(MemoryStore::with_packages(vec![package(
        "pkg",
        dec!(2000000),
        10,
        0,
    )]));
    let pilgrim = NewPilgrim {
        name: "Hasan Basri".to_string(),
        package_id: Some("pkg".to_string()),
        ..Default::default()
    }
    .into_pilgrim("p1".to_string(), dec!(2000000), None, at(2025, 1, 5));
    PilgrimRepositoryTrait::create(
        store.as_ref(),
        PilgrimCreation {
            pilgrim,
            initial_payment: None,
        },
    )
    .await
    .unwrap();

    let audit = Arc::new(RecordingAudit::default());
    let notifications = Arc::new(notifications);
    let service = TransactionService::new(store.clone(), audit.clone(), notifications.clone());
    Setup {
        store,
        audit,
        notifications,
        service,
    }
}

async fn setup() -> Setup {
    setup_with(RecordingNotifications::default()).await
}

fn income(amount: Decimal, discount: Option<Decimal>) -> NewIncome {
    NewIncome {
        amount,
        discount,
        income_category: IncomeCategory::Cicilan,
        pilgrim_id: Some("p1".to_string()),
        package_id: Some("pkg".to_string()),
        payment_method: Some(PaymentMethod::Transfer),
        reference_number: None,
        bank_name: None,
        description: None,
        notes: None,
        transaction_date: None,
        receipt_url: None,
    }
}

fn expense(amount: Decimal) -> NewExpense {
    NewExpense {
        amount,
        expense_category: ExpenseCategory::Hotel,
        package_id: Some("pkg".to_string()),
        vendor_id: None,
        payment_method: None,
        reference_number: None,
        bank_name: None,
        description: None,
        notes: None,
        transaction_date: None,
        receipt_url: None,
    }
}

#[tokio::test]
async fn income_with_discount_updates_pilgrim_and_issues_invoice() {
    let s = setup().await;

    let posted = s
        .service
        .post_income(&actor(Role::Finance), income(dec!(1000000), Some(dec!(100000))))
        .await
        .unwrap();

    assert_eq!(posted.transaction.amount, dec!(900000));
    assert_eq!(posted.transaction.discount, dec!(100000));
    let pilgrim = posted.pilgrim.unwrap();
    assert_eq!(pilgrim.paid_amount, dec!(900000));
    assert_eq!(pilgrim.remaining_amount, dec!(1000000));
    assert_eq!(pilgrim.payment_status, PaymentStatus::Cicilan);

    let invoice = posted.invoice.unwrap();
    assert_eq!(invoice.status, InvoiceStatus::Paid);
    assert_eq!(invoice.subtotal, dec!(1000000));
    assert_eq!(invoice.total, dec!(900000));
    assert!(invoice.invoice_number.starts_with("INV-"));

    assert_eq!(s.notifications.titles(), vec!["Pemasukan Baru".to_string()]);
    let broadcast = &s.notifications.broadcasts()[0];
    assert_eq!(broadcast.message, "Pemasukan Rp 900.000 dari Hasan Basri");
    assert_eq!(broadcast.link.as_deref(), Some("/keuangan"));
    assert_eq!(
        s.audit.entries()[0].entity_name.as_deref(),
        Some("Pemasukan: Rp 900.000")
    );
}

#[tokio::test]
async fn deleting_income_restores_the_balance() {
    let s = setup().await;
    let posted = s
        .service
        .post_income(&actor(Role::Finance), income(dec!(1000000), Some(dec!(100000))))
        .await
        .unwrap();

    s.service
        .delete_transaction(&actor(Role::Owner), &posted.transaction.id)
        .await
        .unwrap();

    let pilgrim = s.store.pilgrim("p1");
    assert_eq!(pilgrim.paid_amount, Decimal::ZERO);
    assert_eq!(pilgrim.remaining_amount, dec!(2000000));
    assert_eq!(pilgrim.payment_status, PaymentStatus::Pending);
    assert_eq!(s.store.invoices()[0].status, InvoiceStatus::Cancelled);
    assert!(s.store.transactions().is_empty());
    assert_eq!(
        s.notifications.titles().last().map(String::as_str),
        Some("Transaksi Dihapus")
    );
    assert_eq!(
        s.audit.actions().last().cloned(),
        Some((AuditAction::Delete, "transaction".to_string()))
    );
}

#[tokio::test]
async fn income_for_unknown_pilgrim_is_not_found() {
    let s = setup().await;
    let mut input = income(dec!(100), None);
    input.pilgrim_id = Some("ghost".to_string());

    let err = s
        .service
        .post_income(&actor(Role::Finance), input)
        .await
        .unwrap_err();

    assert!(err.is_not_found());
    assert!(s.store.transactions().is_empty());
    assert!(s.notifications.broadcasts().is_empty());
}

#[tokio::test]
async fn invalid_amounts_are_rejected() {
    let s = setup().await;
    let finance = actor(Role::Finance);

    assert!(s
        .service
        .post_income(&finance, income(dec!(0), None))
        .await
        .is_err());
    assert!(s
        .service
        .post_income(&finance, income(dec!(100), Some(dec!(101))))
        .await
        .is_err());
    assert!(s
        .service
        .post_expense(&finance, expense(dec!(-5)))
        .await
        .is_err());
}

#[tokio::test]
async fn expense_accumulates_and_reverses_package_cost() {
    let s = setup().await;
    let finance = actor(Role::Finance);

    let first = s
        .service
        .post_expense(&finance, expense(dec!(3000000)))
        .await
        .unwrap();
    s.service
        .post_expense(&finance, expense(dec!(500000)))
        .await
        .unwrap();
    assert_eq!(s.store.package("pkg").actual_cost, dec!(3500000));

    s.service
        .update_transaction(
            &finance,
            &first.id,
            TransactionUpdate {
                amount: Some(dec!(2000000)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(s.store.package("pkg").actual_cost, dec!(2500000));

    s.service
        .delete_transaction(&actor(Role::Owner), &first.id)
        .await
        .unwrap();
    assert_eq!(s.store.package("pkg").actual_cost, dec!(500000));
    assert_eq!(
        s.notifications.broadcasts()[0].message,
        "Pengeluaran Rp 3.000.000 untuk hotel"
    );
}

#[tokio::test]
async fn updating_income_reapplies_the_effect() {
    let s = setup().await;
    let posted = s
        .service
        .post_income(&actor(Role::Finance), income(dec!(500000), None))
        .await
        .unwrap();
    assert_eq!(s.store.pilgrim("p1").payment_status, PaymentStatus::Dp);

    let updated = s
        .service
        .update_transaction(
            &actor(Role::Finance),
            &posted.transaction.id,
            TransactionUpdate {
                amount: Some(dec!(2000000)),
                discount: Some(dec!(200000)),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.amount, dec!(1800000));
    let pilgrim = s.store.pilgrim("p1");
    assert_eq!(pilgrim.paid_amount, dec!(1800000));
    assert_eq!(pilgrim.remaining_amount, Decimal::ZERO);
    assert_eq!(pilgrim.payment_status, PaymentStatus::Lunas);
    assert_eq!(s.store.invoices()[0].total, dec!(1800000));
}

#[tokio::test]
async fn changing_type_specific_category_is_rejected() {
    let s = setup().await;
    let posted = s
        .service
        .post_income(&actor(Role::Finance), income(dec!(500000), None))
        .await
        .unwrap();

    let err = s
        .service
        .update_transaction(
            &actor(Role::Finance),
            &posted.transaction.id,
            TransactionUpdate {
                expense_category: Some(ExpenseCategory::Visa),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, crate::errors::Error::Validation(_)));
    assert_eq!(s.store.pilgrim("p1").paid_amount, dec!(500000));
}

#[tokio::test]
async fn notification_failures_do_not_fail_postings() {
    let s = setup_with(RecordingNotifications::failing()).await;

    let posted = s
        .service
        .post_income(&actor(Role::Finance), income(dec!(250000), None))
        .await
        .unwrap();

    assert_eq!(posted.pilgrim.unwrap().paid_amount, dec!(250000));
    assert_eq!(s.audit.entries().len(), 1);
}

#[tokio::test]
async fn totals_and_listing() {
    let s = setup().await;
    let finance = actor(Role::Finance);
    s.service
        .post_income(&finance, income(dec!(1000000), None))
        .await
        .unwrap();
    s.service
        .post_expense(&finance, expense(dec!(400000)))
        .await
        .unwrap();

    let totals = s.service.totals(None, None).unwrap();
    assert_eq!(totals.income, dec!(1000000));
    assert_eq!(totals.expense, dec!(400000));
    assert_eq!(totals.balance, dec!(600000));

    let incomes = s
        .service
        .list_transactions(
            &TransactionFilter {
                transaction_type: Some(TransactionType::Income),
                ..Default::default()
            },
            PageRequest::default(),
        )
        .unwrap();
    assert_eq!(incomes.data.len(), 1);
    assert_eq!(incomes.data[0].pilgrim_name.as_deref(), Some("Hasan Basri"));

    let cashflow = s.service.cashflow(3).unwrap();
    assert_eq!(cashflow.len(), 3);
    assert_eq!(cashflow[2].balance, dec!(600000));
    assert_eq!(s.service.recent(5).unwrap().len(), 2);
}
