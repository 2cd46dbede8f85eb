use super::*;
use crate::audit::AuditAction;
use crate::errors::Error;
use crate::test_fixtures::{actor, at, MemoryVendors, RecordingAudit, RecordingNotifications};
use crate::users::Role;
use crate::utils::PageRequest;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;

struct Setup {
    store: Arc<MemoryVendors>,
    audit: Arc<RecordingAudit>,
    notifications: Arc<RecordingNotifications>,
    service: VendorService,
}

fn setup() -> Setup {
    let store = Arc::new(MemoryVendors::default());
    let audit = Arc::new(RecordingAudit::default());
    let notifications = Arc::new(RecordingNotifications::default());
    let service = VendorService::new(
        store.clone(),
        store.clone(),
        audit.clone(),
        notifications.clone(),
    );
    Setup {
        store,
        audit,
        notifications,
        service,
    }
}

fn new_vendor(name: &str) -> NewVendor {
    NewVendor {
        name: name.to_string(),
        vendor_type: "hotel".to_string(),
        contact_person: None,
        phone: None,
        email: None,
        address: None,
        bank_account: None,
        bank_name: None,
        bank_account_holder: None,
        npwp: None,
        notes: None,
    }
}

fn new_debt(vendor_id: &str, total: Decimal, paid: Option<Decimal>) -> NewVendorDebt {
    NewVendorDebt {
        vendor_id: vendor_id.to_string(),
        package_id: None,
        description: "Hotel Makkah 3 malam".to_string(),
        total_amount: total,
        paid_amount: paid,
        due_date: Some(at(2025, 4, 1)),
        notes: None,
    }
}

#[test]
fn debt_status_follows_paid_share() {
    assert_eq!(classify_debt(dec!(0), dec!(100)), DebtStatus::Unpaid);
    assert_eq!(classify_debt(dec!(1), dec!(100)), DebtStatus::Partial);
    assert_eq!(classify_debt(dec!(100), dec!(100)), DebtStatus::Paid);
    assert_eq!(classify_debt(dec!(150), dec!(100)), DebtStatus::Paid);
}

#[tokio::test]
async fn deleting_a_vendor_only_deactivates_it() {
    let s = setup();
    let owner = actor(Role::Owner);
    let vendor = s
        .service
        .create_vendor(&owner, new_vendor("Hilton Makkah"))
        .await
        .unwrap();

    s.service.delete_vendor(&owner, &vendor.id).await.unwrap();

    assert!(!s.service.get_vendor(&vendor.id).unwrap().is_active);
    let active = s
        .service
        .list_vendors(&VendorFilter::default(), PageRequest::default())
        .unwrap();
    assert!(active.data.is_empty());
    assert_eq!(
        s.audit.actions(),
        vec![
            (AuditAction::Create, "vendor".to_string()),
            (AuditAction::Delete, "vendor".to_string()),
        ]
    );
}

#[tokio::test]
async fn new_debt_is_classified_and_announced() {
    let s = setup();
    let finance = actor(Role::Finance);
    let vendor = s
        .service
        .create_vendor(&finance, new_vendor("Saudia"))
        .await
        .unwrap();

    let debt = s
        .service
        .create_debt(&finance, new_debt(&vendor.id, dec!(10000000), Some(dec!(4000000))))
        .await
        .unwrap();

    assert_eq!(debt.status, DebtStatus::Partial);
    assert_eq!(debt.remaining_amount, dec!(6000000));
    let broadcast = &s.notifications.broadcasts()[0];
    assert_eq!(broadcast.title, "Hutang Vendor Baru");
    assert_eq!(broadcast.link.as_deref(), Some("/keuangan/hutang"));
    assert_eq!(broadcast.message, "Hutang Rp 10.000.000 ke Saudia telah dicatat");
}

#[tokio::test]
async fn debt_for_unknown_vendor_is_not_found() {
    let s = setup();
    let err = s
        .service
        .create_debt(&actor(Role::Finance), new_debt("ghost", dec!(1), None))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn payments_move_debt_to_paid() {
    let s = setup();
    let finance = actor(Role::Finance);
    let vendor = s
        .service
        .create_vendor(&finance, new_vendor("Muassasah"))
        .await
        .unwrap();
    let debt = s
        .service
        .create_debt(&finance, new_debt(&vendor.id, dec!(5000000), None))
        .await
        .unwrap();
    assert_eq!(debt.status, DebtStatus::Unpaid);
    assert_eq!(s.service.total_outstanding().unwrap(), dec!(5000000));

    let partial = s
        .service
        .pay_debt(&finance, &debt.id, dec!(2000000))
        .await
        .unwrap();
    assert_eq!(partial.status, DebtStatus::Partial);
    assert_eq!(partial.remaining_amount, dec!(3000000));

    let paid = s
        .service
        .pay_debt(&finance, &debt.id, dec!(4000000))
        .await
        .unwrap();
    assert_eq!(paid.status, DebtStatus::Paid);
    assert_eq!(paid.remaining_amount, Decimal::ZERO);
    assert_eq!(s.service.total_outstanding().unwrap(), Decimal::ZERO);

    assert_eq!(
        s.notifications.titles(),
        vec![
            "Hutang Vendor Baru".to_string(),
            "Pembayaran Hutang Vendor".to_string(),
            "Hutang Vendor Lunas".to_string(),
        ]
    );
    assert_eq!(
        s.audit.actions().last().cloned(),
        Some((AuditAction::Payment, "vendor_debt".to_string()))
    );
}

#[tokio::test]
async fn non_positive_payment_is_rejected() {
    let s = setup();
    let err = s
        .service
        .pay_debt(&actor(Role::Finance), "any", dec!(0))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
}

#[tokio::test]
async fn update_recomputes_remaining_and_status() {
    let s = setup();
    let finance = actor(Role::Finance);
    let vendor = s
        .service
        .create_vendor(&finance, new_vendor("Bus Rawahil"))
        .await
        .unwrap();
    let debt = s
        .service
        .create_debt(&finance, new_debt(&vendor.id, dec!(3000000), Some(dec!(1000000))))
        .await
        .unwrap();

    let updated = s
        .service
        .update_debt(
            &finance,
            &debt.id,
            VendorDebtUpdate {
                total_amount: Some(dec!(1000000)),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.remaining_amount, Decimal::ZERO);
    assert_eq!(updated.status, DebtStatus::Paid);

    s.service.delete_debt(&finance, &debt.id).await.unwrap();
    assert!(s.service.get_debt(&debt.id).unwrap_err().is_not_found());
    assert!(s.store.debts().is_empty());
}
