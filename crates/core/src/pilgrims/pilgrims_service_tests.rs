use super::*;
use crate::audit::AuditAction;
use crate::errors::Error;
use crate::ledger::PaymentStatus;
use crate::test_fixtures::{actor, package, MemoryStore, RecordingAudit, RecordingNotifications};
use crate::transactions::{IncomeCategory, TransactionType};
use crate::users::Role;
use crate::utils::PageRequest;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;

struct Setup {
    store: Arc<MemoryStore>,
    audit: Arc<RecordingAudit>,
    notifications: Arc<RecordingNotifications>,
    service: PilgrimService,
}

fn setup() -> Setup {
    let store = Arc::new(MemoryStore::with_packages(vec![
        package("a", dec!(2000000), 10, 0),
        package("b", dec!(35000000), 40, 0),
    ]));
    let audit = Arc::new(RecordingAudit::default());
    let notifications = Arc::new(RecordingNotifications::default());
    let service = PilgrimService::new(
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

fn registration(name: &str, nik: Option<&str>, package_id: Option<&str>) -> NewPilgrim {
    NewPilgrim {
        name: name.to_string(),
        nik: nik.map(str::to_string),
        package_id: package_id.map(str::to_string),
        ..Default::default()
    }
}

#[tokio::test]
async fn total_defaults_to_package_price_and_reserves_a_seat() {
    let s = setup();

    let created = s
        .service
        .create_pilgrim(&actor(Role::Admin), registration("Aisyah", None, Some("a")))
        .await
        .unwrap();

    assert_eq!(created.pilgrim.total_amount, dec!(2000000));
    assert_eq!(created.pilgrim.remaining_amount, dec!(2000000));
    assert_eq!(created.pilgrim.payment_status, PaymentStatus::Pending);
    assert_eq!(created.package.unwrap().booked_seats, 1);
    assert_eq!(s.store.package("a").booked_seats, 1);
    assert_eq!(
        s.audit.actions(),
        vec![(AuditAction::Create, "jamaah".to_string())]
    );
}

#[tokio::test]
async fn duplicate_nik_is_refused_with_holder_name() {
    let s = setup();
    let admin = actor(Role::Admin);
    s.service
        .create_pilgrim(&admin, registration("Fatimah", Some("3201010101010001"), None))
        .await
        .unwrap();

    let err = s
        .service
        .create_pilgrim(&admin, registration("Zainab", Some(" 3201010101010001 "), None))
        .await
        .unwrap_err();

    match err {
        Error::ConstraintViolation(message) => assert_eq!(
            message,
            "NIK \"3201010101010001\" sudah terdaftar atas nama \"Fatimah\". Setiap jamaah harus memiliki NIK yang unik."
        ),
        other => panic!("expected conflict, got {:?}", other),
    }
}

#[tokio::test]
async fn updating_own_nik_is_not_a_conflict() {
    let s = setup();
    let admin = actor(Role::Admin);
    let created = s
        .service
        .create_pilgrim(&admin, registration("Fatimah", Some("111"), None))
        .await
        .unwrap();

    let updated = s
        .service
        .update_pilgrim(
            &admin,
            &created.pilgrim.id,
            PilgrimUpdate {
                nik: Some("111".to_string()),
                phone: Some("0812".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.phone.as_deref(), Some("0812"));
}

#[tokio::test]
async fn initial_payment_posts_income_in_the_same_write() {
    let s = setup();
    let mut input = registration("Umar", None, Some("a"));
    input.initial_payment = Some(dec!(500000));

    let created = s
        .service
        .create_pilgrim(&actor(Role::Admin), input)
        .await
        .unwrap();

    assert_eq!(created.pilgrim.paid_amount, dec!(500000));
    assert_eq!(created.pilgrim.remaining_amount, dec!(1500000));
    assert_eq!(created.pilgrim.payment_status, PaymentStatus::Dp);
    let posted = created.initial_payment.unwrap();
    assert_eq!(posted.transaction.transaction_type, TransactionType::Income);
    assert_eq!(posted.transaction.income_category, Some(IncomeCategory::Dp));
    assert_eq!(
        posted.transaction.description.as_deref(),
        Some("Pembayaran awal (DP) - Umar")
    );
    assert!(posted.invoice.is_some());
    assert_eq!(s.audit.actions()[1].0, AuditAction::Payment);
}

#[tokio::test]
async fn full_initial_payment_is_pelunasan() {
    let s = setup();
    let mut input = registration("Ali", None, Some("a"));
    input.initial_payment = Some(dec!(2000000));

    let created = s
        .service
        .create_pilgrim(&actor(Role::Admin), input)
        .await
        .unwrap();

    assert_eq!(created.pilgrim.payment_status, PaymentStatus::Lunas);
    assert_eq!(
        created.initial_payment.unwrap().transaction.income_category,
        Some(IncomeCategory::Pelunasan)
    );
}

#[tokio::test]
async fn filling_a_package_warns_then_announces_full_once() {
    let s = setup();
    let admin = actor(Role::Admin);

    for i in 0..10 {
        s.service
            .create_pilgrim(&admin, registration(&format!("Jamaah {}", i), None, Some("a")))
            .await
            .unwrap();
    }

    let package = s.store.package("a");
    assert_eq!(package.booked_seats, 10);
    assert_eq!(package.available_seats(), 0);

    let titles = s.notifications.titles();
    assert_eq!(titles.iter().filter(|t| *t == "Paket Penuh").count(), 1);
    assert_eq!(titles.last().map(String::as_str), Some("Paket Penuh"));
    assert_eq!(
        titles.iter().filter(|t| *t == "Seat Paket Menipis").count(),
        5
    );
    let full = s.notifications.broadcasts().pop().unwrap();
    assert_eq!(full.link.as_deref(), Some("/seat"));
}

#[tokio::test]
async fn reassignment_moves_one_seat() {
    let s = setup();
    let admin = actor(Role::Admin);
    let mut mover = None;
    for i in 0..5 {
        let created = s
            .service
            .create_pilgrim(&admin, registration(&format!("A{}", i), None, Some("a")))
            .await
            .unwrap();
        mover.get_or_insert(created.pilgrim.id);
    }
    for i in 0..2 {
        s.service
            .create_pilgrim(&admin, registration(&format!("B{}", i), None, Some("b")))
            .await
            .unwrap();
    }

    s.service
        .update_pilgrim(
            &admin,
            &mover.unwrap(),
            PilgrimUpdate {
                package_id: Some("b".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(s.store.package("a").booked_seats, 4);
    assert_eq!(s.store.package("b").booked_seats, 3);
}

#[tokio::test]
async fn reassignment_to_missing_package_is_not_found() {
    let s = setup();
    let created = s
        .service
        .create_pilgrim(&actor(Role::Admin), registration("Ali", None, Some("a")))
        .await
        .unwrap();

    let err = s
        .service
        .update_pilgrim(
            &actor(Role::Admin),
            &created.pilgrim.id,
            PilgrimUpdate {
                package_id: Some("nowhere".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(s.store.package("a").booked_seats, 1);
}

#[tokio::test]
async fn total_change_shifts_remaining() {
    let s = setup();
    let mut input = registration("Ali", None, Some("a"));
    input.initial_payment = Some(dec!(500000));
    let created = s
        .service
        .create_pilgrim(&actor(Role::Admin), input)
        .await
        .unwrap();

    let updated = s
        .service
        .update_pilgrim(
            &actor(Role::Admin),
            &created.pilgrim.id,
            PilgrimUpdate {
                total_amount: Some(dec!(1500000)),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.remaining_amount, dec!(1000000));
    assert_eq!(updated.paid_amount, dec!(500000));
    assert_eq!(updated.payment_status, PaymentStatus::Cicilan);
}

#[tokio::test]
async fn delete_releases_the_seat() {
    let s = setup();
    let created = s
        .service
        .create_pilgrim(&actor(Role::Admin), registration("Ali", None, Some("a")))
        .await
        .unwrap();

    s.service
        .delete_pilgrim(&actor(Role::Owner), &created.pilgrim.id)
        .await
        .unwrap();

    assert_eq!(s.store.package("a").booked_seats, 0);
    assert!(s
        .service
        .get_pilgrim(&created.pilgrim.id)
        .unwrap_err()
        .is_not_found());
}

#[tokio::test]
async fn bulk_update_is_all_or_nothing() {
    let s = setup();
    let admin = actor(Role::Admin);
    let first = s
        .service
        .create_pilgrim(&admin, registration("Satu", None, Some("a")))
        .await
        .unwrap()
        .pilgrim;
    let second = s
        .service
        .create_pilgrim(&admin, registration("Dua", None, Some("a")))
        .await
        .unwrap()
        .pilgrim;

    let err = s
        .service
        .bulk_update_pilgrims(
            &admin,
            vec![
                BulkPilgrimUpdate {
                    id: first.id.clone(),
                    data: PilgrimUpdate {
                        notes: Some("lunas minggu depan".to_string()),
                        ..Default::default()
                    },
                },
                BulkPilgrimUpdate {
                    id: second.id.clone(),
                    data: PilgrimUpdate {
                        name: Some(" ".to_string()),
                        ..Default::default()
                    },
                },
            ],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert_eq!(s.store.pilgrim(&first.id).notes, None);

    let err = s
        .service
        .bulk_update_pilgrims(
            &admin,
            vec![
                BulkPilgrimUpdate {
                    id: first.id.clone(),
                    data: PilgrimUpdate {
                        nik: Some("777".to_string()),
                        ..Default::default()
                    },
                },
                BulkPilgrimUpdate {
                    id: second.id.clone(),
                    data: PilgrimUpdate {
                        nik: Some("777".to_string()),
                        ..Default::default()
                    },
                },
            ],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ConstraintViolation(_)));

    let updated = s
        .service
        .bulk_update_pilgrims(
            &admin,
            vec![BulkPilgrimUpdate {
                id: second.id.clone(),
                data: PilgrimUpdate {
                    room_type: Some(RoomType::Quad),
                    ..Default::default()
                },
            }],
        )
        .await
        .unwrap();
    assert_eq!(updated[0].room_type, Some(RoomType::Quad));
}

#[tokio::test]
async fn stats_ignore_cancelled_and_paid_up_pilgrims() {
    let s = setup();
    let admin = actor(Role::Admin);
    let mut paid = registration("Lunas", None, Some("a"));
    paid.initial_payment = Some(dec!(2000000));
    s.service.create_pilgrim(&admin, paid).await.unwrap();
    let mut partial = registration("Cicil", None, Some("a"));
    partial.initial_payment = Some(dec!(800000));
    s.service.create_pilgrim(&admin, partial).await.unwrap();
    let cancelled = s
        .service
        .create_pilgrim(&admin, registration("Batal", None, Some("a")))
        .await
        .unwrap()
        .pilgrim;
    s.service
        .update_pilgrim(
            &admin,
            &cancelled.id,
            PilgrimUpdate {
                is_cancelled: Some(true),
                cancellation_reason: Some("sakit".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let stats = s.service.stats().unwrap();
    assert_eq!(stats.total_receivables, dec!(1200000));
    assert_eq!(stats.active_count, 2);
    let count_of = |status: PaymentStatus| {
        stats
            .status_counts
            .iter()
            .find(|c| c.status == status)
            .map(|c| c.count)
            .unwrap_or(0)
    };
    assert_eq!(count_of(PaymentStatus::Lunas), 1);
    assert_eq!(count_of(PaymentStatus::Cicilan), 1);
    assert_eq!(count_of(PaymentStatus::Dibatalkan), 1);

    let owing = s.service.outstanding(PageRequest::default()).unwrap();
    assert_eq!(owing.data.len(), 1);
    assert_eq!(owing.data[0].remaining_amount, dec!(1200000));
    assert!(owing.data.iter().all(|p| p.remaining_amount > Decimal::ZERO));
}
