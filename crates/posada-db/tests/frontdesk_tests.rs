//! Integration tests for the front-desk commands: check-in with
//! carry-forward and split tender, extras, payments, check-out and
//! cancellation. Every test runs against an isolated in-memory database.

use chrono::Utc;
use posada_core::{
    CoreError, FolioStatus, HotelConfig, PaymentMethod, Room, RoomCategory, RoomStatus, User,
    UserRole,
};
use posada_db::{
    CheckInRequest, CheckOutRequest, Database, DbConfig, DbError, ServiceError, TenderLine,
};

const RATE_MILLI: i64 = 35_500;

/// Fresh database with config, an admin, room 12 ($40/night) and an open
/// shift.
async fn setup() -> (Database, User) {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();

    db.config()
        .save(&HotelConfig {
            exchange_rate_milli: RATE_MILLI,
            hotel_name: "Test Posada".to_string(),
            address: None,
            phone: None,
            email: None,
            tax_id: None,
            updated_at: Utc::now(),
        })
        .await
        .unwrap();

    let admin = db
        .users()
        .create("admin", "admin123", "Administrator", UserRole::Admin)
        .await
        .unwrap();

    for number in [12, 13] {
        db.rooms()
            .insert(&Room {
                number,
                category: RoomCategory::Double,
                description: None,
                price_cents: 4000,
                capacity: 4,
                status: RoomStatus::Free,
                last_cleaned_at: None,
                notes: None,
            })
            .await
            .unwrap();
    }

    db.till()
        .open_shift(&admin.id, RATE_MILLI, 10_000, 0, None)
        .await
        .unwrap();

    (db, admin)
}

fn cash(amount_cents: i64) -> TenderLine {
    TenderLine {
        method: PaymentMethod::CashUsd,
        amount_cents,
        reference: None,
    }
}

fn check_in_request(guest_id: &str, user_id: &str, nights: i64, lines: Vec<TenderLine>) -> CheckInRequest {
    CheckInRequest {
        guest_id: guest_id.to_string(),
        room_number: 12,
        nights,
        payment_lines: lines,
        notes: None,
        user_id: user_id.to_string(),
    }
}

#[tokio::test]
async fn test_check_in_exact_payment() {
    let (db, admin) = setup().await;
    let guest = db.guests().register("V-100", "Ana", "Reyes").await.unwrap();

    let receipt = db
        .front_desk()
        .check_in(check_in_request(&guest.id, &admin.id, 2, vec![cash(8000)]))
        .await
        .unwrap();

    assert_eq!(receipt.stay_total_cents, 8000);
    assert_eq!(receipt.paid_cents, 8000);
    assert_eq!(receipt.change_cents, 0);

    let folio = db.folios().require(&receipt.folio_id).await.unwrap();
    assert!(folio.is_active());
    assert_eq!(folio.paid_total_cents, 8000);
    assert_eq!(folio.balance_due().cents(), 0);

    let room = db.rooms().get(12).await.unwrap().unwrap();
    assert_eq!(room.status, RoomStatus::Occupied);

    // One room charge plus one payment
    let entries = db.ledger().list_by_folio(&receipt.folio_id).await.unwrap();
    assert_eq!(entries.len(), 2);

    let guest = db.guests().get_by_id(&guest.id).await.unwrap().unwrap();
    assert!(guest.last_visit_at.is_some());
    assert_eq!(guest.balance_cents, 0);
}

#[tokio::test]
async fn test_check_in_split_tender_freezes_rate() {
    let (db, admin) = setup().await;
    let guest = db.guests().register("V-101", "Luis", "Mora").await.unwrap();

    let lines = vec![
        cash(5000),
        TenderLine {
            method: PaymentMethod::Zelle,
            amount_cents: 3000,
            reference: Some("Z-9001".to_string()),
        },
    ];
    let receipt = db
        .front_desk()
        .check_in(check_in_request(&guest.id, &admin.id, 2, lines))
        .await
        .unwrap();

    let entries = db.ledger().list_by_folio(&receipt.folio_id).await.unwrap();
    let payments: Vec<_> = entries
        .iter()
        .filter(|e| e.kind == posada_core::EntryKind::Payment)
        .collect();
    assert_eq!(payments.len(), 2);
    for entry in payments {
        assert_eq!(entry.rate_milli, RATE_MILLI);
        // $1.00 at 35.500 freezes as Bs 35.50
        assert_eq!(entry.secondary_cents, entry.amount_cents * RATE_MILLI / 1000);
    }
}

#[tokio::test]
async fn test_check_in_insufficient_payment_writes_nothing() {
    let (db, admin) = setup().await;
    let guest = db.guests().register("V-102", "Rosa", "Diaz").await.unwrap();
    let before = db.ledger().count().await.unwrap();

    let err = db
        .front_desk()
        .check_in(check_in_request(&guest.id, &admin.id, 2, vec![cash(7500)]))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Core(CoreError::InsufficientPayment { .. })
    ));

    let room = db.rooms().get(12).await.unwrap().unwrap();
    assert_eq!(room.status, RoomStatus::Free);
    assert_eq!(db.folios().count_active().await.unwrap(), 0);
    assert_eq!(db.ledger().count().await.unwrap(), before);
}

#[tokio::test]
async fn test_check_in_requires_open_shift() {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    db.config()
        .save(&HotelConfig {
            exchange_rate_milli: RATE_MILLI,
            hotel_name: "Test Posada".to_string(),
            address: None,
            phone: None,
            email: None,
            tax_id: None,
            updated_at: Utc::now(),
        })
        .await
        .unwrap();
    let admin = db
        .users()
        .create("admin", "admin123", "Administrator", UserRole::Admin)
        .await
        .unwrap();
    db.rooms()
        .insert(&Room {
            number: 12,
            category: RoomCategory::Double,
            description: None,
            price_cents: 4000,
            capacity: 4,
            status: RoomStatus::Free,
            last_cleaned_at: None,
            notes: None,
        })
        .await
        .unwrap();
    let guest = db.guests().register("V-103", "Juan", "Silva").await.unwrap();

    let err = db
        .front_desk()
        .check_in(check_in_request(&guest.id, &admin.id, 1, vec![cash(4000)]))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Core(CoreError::NoOpenShift)));
}

#[tokio::test]
async fn test_occupied_room_rejects_second_check_in() {
    let (db, admin) = setup().await;
    let first = db.guests().register("V-104", "Eva", "Gil").await.unwrap();
    let second = db.guests().register("V-105", "Leo", "Paz").await.unwrap();

    db.front_desk()
        .check_in(check_in_request(&first.id, &admin.id, 1, vec![cash(4000)]))
        .await
        .unwrap();

    let err = db
        .front_desk()
        .check_in(check_in_request(&second.id, &admin.id, 1, vec![cash(4000)]))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Core(CoreError::RoomNotAvailable {
            room: 12,
            status: RoomStatus::Occupied,
        })
    ));
}

#[tokio::test]
async fn test_check_in_collects_prior_debt() {
    let (db, admin) = setup().await;
    let guest = db.guests().register("V-106", "Mia", "Vera").await.unwrap();
    db.front_desk()
        .adjust_balance(&guest.id, -1500, "Unpaid minibar from last stay", &admin.id)
        .await
        .unwrap();

    // $80 room + $15 old debt
    let receipt = db
        .front_desk()
        .check_in(check_in_request(&guest.id, &admin.id, 2, vec![cash(9500)]))
        .await
        .unwrap();

    assert_eq!(receipt.stay_total_cents, 9500);
    assert_eq!(receipt.debt_collected_cents, 1500);

    let guest = db.guests().get_by_id(&guest.id).await.unwrap().unwrap();
    assert_eq!(guest.balance_cents, 0);
}

#[tokio::test]
async fn test_check_in_applies_credit_as_discount() {
    let (db, admin) = setup().await;
    let guest = db.guests().register("V-107", "Sol", "Rios").await.unwrap();
    db.front_desk()
        .adjust_balance(&guest.id, 3000, "Overpayment from last stay", &admin.id)
        .await
        .unwrap();

    // $80 room − $30 credit = $50 due
    let receipt = db
        .front_desk()
        .check_in(check_in_request(&guest.id, &admin.id, 2, vec![cash(5000)]))
        .await
        .unwrap();

    assert_eq!(receipt.stay_total_cents, 5000);
    assert_eq!(receipt.credit_applied_cents, 3000);

    let guest = db.guests().get_by_id(&guest.id).await.unwrap().unwrap();
    assert_eq!(guest.balance_cents, 0);
}

#[tokio::test]
async fn test_check_in_change_becomes_guest_credit() {
    let (db, admin) = setup().await;
    let guest = db.guests().register("V-108", "Rey", "Luna").await.unwrap();

    // $100 bill for an $80 stay
    let receipt = db
        .front_desk()
        .check_in(check_in_request(&guest.id, &admin.id, 2, vec![cash(10_000)]))
        .await
        .unwrap();

    assert_eq!(receipt.change_cents, 2000);
    // Payments recorded = stay total + change: every cent accounted once
    assert_eq!(receipt.paid_cents, 10_000);
    assert_eq!(receipt.stay_total_cents, 8000);

    let guest = db.guests().get_by_id(&guest.id).await.unwrap().unwrap();
    assert_eq!(guest.balance_cents, 2000);

    let folio = db.folios().require(&receipt.folio_id).await.unwrap();
    assert_eq!(folio.paid_total_cents, 8000);
}

#[tokio::test]
async fn test_electronic_payment_requires_reference() {
    let (db, admin) = setup().await;
    let guest = db.guests().register("V-109", "Tom", "Ruiz").await.unwrap();

    let line = TenderLine {
        method: PaymentMethod::Zelle,
        amount_cents: 8000,
        reference: None,
    };
    let err = db
        .front_desk()
        .check_in(check_in_request(&guest.id, &admin.id, 2, vec![line]))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Core(CoreError::Validation(_))));
}

#[tokio::test]
async fn test_add_extra_then_pay_then_check_out() {
    let (db, admin) = setup().await;
    let guest = db.guests().register("V-110", "Ines", "Soto").await.unwrap();
    let receipt = db
        .front_desk()
        .check_in(check_in_request(&guest.id, &admin.id, 2, vec![cash(8000)]))
        .await
        .unwrap();

    // 3 × $5 laundry
    db.front_desk()
        .add_extra(&receipt.folio_id, "Laundry", 500, 3, &admin.id)
        .await
        .unwrap();

    let folio = db.folios().require(&receipt.folio_id).await.unwrap();
    assert_eq!(folio.extras_total_cents, 1500);
    assert_eq!(folio.balance_due().cents(), 1500);

    let paid = db
        .front_desk()
        .record_payment(&receipt.folio_id, cash(1000), &admin.id)
        .await
        .unwrap();
    assert_eq!(paid.balance_due_cents, 500);

    // Remaining $5 collected at the desk
    let out = db
        .front_desk()
        .check_out(CheckOutRequest {
            folio_id: receipt.folio_id.clone(),
            payment_lines: vec![cash(500)],
            user_id: admin.id.clone(),
        })
        .await
        .unwrap();
    assert_eq!(out.collected_cents, 500);
    assert_eq!(out.overpaid_swept_cents, 0);

    let folio = db.folios().require(&receipt.folio_id).await.unwrap();
    assert_eq!(folio.status, FolioStatus::Closed);
    assert_eq!(folio.balance_due().cents(), 0);

    let room = db.rooms().get(12).await.unwrap().unwrap();
    assert_eq!(room.status, RoomStatus::Cleaning);

    // Housekeeping releases the room and the cleaning timestamp lands
    let room = db.rooms().set_status(12, RoomStatus::Free).await.unwrap();
    assert_eq!(room.status, RoomStatus::Free);
    assert!(room.last_cleaned_at.is_some());
}

#[tokio::test]
async fn test_check_out_with_outstanding_balance_refused() {
    let (db, admin) = setup().await;
    let guest = db.guests().register("V-111", "Oda", "Mena").await.unwrap();
    let receipt = db
        .front_desk()
        .check_in(check_in_request(&guest.id, &admin.id, 2, vec![cash(8000)]))
        .await
        .unwrap();
    db.front_desk()
        .add_extra(&receipt.folio_id, "Minibar", 2000, 1, &admin.id)
        .await
        .unwrap();

    let err = db
        .front_desk()
        .check_out(CheckOutRequest {
            folio_id: receipt.folio_id.clone(),
            payment_lines: vec![],
            user_id: admin.id.clone(),
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Core(CoreError::InsufficientPayment { .. })
    ));

    // Nothing changed
    let folio = db.folios().require(&receipt.folio_id).await.unwrap();
    assert!(folio.is_active());
    let room = db.rooms().get(12).await.unwrap().unwrap();
    assert_eq!(room.status, RoomStatus::Occupied);
}

#[tokio::test]
async fn test_check_out_overpayment_swept_to_credit() {
    let (db, admin) = setup().await;
    let guest = db.guests().register("V-112", "Ada", "Brito").await.unwrap();
    let receipt = db
        .front_desk()
        .check_in(check_in_request(&guest.id, &admin.id, 2, vec![cash(8000)]))
        .await
        .unwrap();

    // Guest pays $20 more during the stay than they end up owing
    db.front_desk()
        .record_payment(&receipt.folio_id, cash(2000), &admin.id)
        .await
        .unwrap();

    let out = db
        .front_desk()
        .check_out(CheckOutRequest {
            folio_id: receipt.folio_id.clone(),
            payment_lines: vec![],
            user_id: admin.id.clone(),
        })
        .await
        .unwrap();
    assert_eq!(out.overpaid_swept_cents, 2000);

    let guest = db.guests().get_by_id(&guest.id).await.unwrap().unwrap();
    assert_eq!(guest.balance_cents, 2000);

    // Books show zero outstanding, not a negative balance
    let folio = db.folios().require(&receipt.folio_id).await.unwrap();
    assert_eq!(folio.balance_due().cents(), 0);
}

#[tokio::test]
async fn test_discount_bounded_by_stay_total() {
    let (db, admin) = setup().await;
    let guest = db.guests().register("V-113", "Ivo", "Nunez").await.unwrap();
    let receipt = db
        .front_desk()
        .check_in(check_in_request(&guest.id, &admin.id, 2, vec![cash(8000)]))
        .await
        .unwrap();

    let err = db
        .front_desk()
        .apply_discount(&receipt.folio_id, 8001, "Too generous", &admin.id)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Core(CoreError::DiscountExceedsTotal { .. })
    ));

    db.front_desk()
        .apply_discount(&receipt.folio_id, 1000, "Returning guest", &admin.id)
        .await
        .unwrap();
    let folio = db.folios().require(&receipt.folio_id).await.unwrap();
    assert_eq!(folio.discounts_total_cents, 1000);
}

#[tokio::test]
async fn test_cancel_folio_releases_room_through_cleaning() {
    let (db, admin) = setup().await;
    let guest = db.guests().register("V-114", "Ugo", "Lara").await.unwrap();
    let receipt = db
        .front_desk()
        .check_in(check_in_request(&guest.id, &admin.id, 1, vec![cash(4000)]))
        .await
        .unwrap();
    let entries_before = db.ledger().count().await.unwrap();

    db.front_desk()
        .cancel_folio(&receipt.folio_id, &admin.id)
        .await
        .unwrap();

    let folio = db.folios().require(&receipt.folio_id).await.unwrap();
    assert_eq!(folio.status, FolioStatus::Cancelled);
    assert!(db
        .front_desk()
        .add_extra(&receipt.folio_id, "Late", 100, 1, &admin.id)
        .await
        .is_err());

    // The room was entered: it cleans before selling again
    let room = db.rooms().get(12).await.unwrap().unwrap();
    assert_eq!(room.status, RoomStatus::Cleaning);

    // History untouched: cancellation never rewrites the ledger
    assert_eq!(db.ledger().count().await.unwrap(), entries_before);
}

#[tokio::test]
async fn test_register_guest_validates_and_rejects_duplicates() {
    let (db, _) = setup().await;

    let err = db
        .front_desk()
        .register_guest("has space", "Ana", "Reyes", None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Core(CoreError::Validation(_))));

    let guest = db
        .front_desk()
        .register_guest("V-300", "Ana", "Reyes", Some("+58 412 5550192"), Some("ana@example.com"))
        .await
        .unwrap();
    assert_eq!(guest.phone.as_deref(), Some("+58 412 5550192"));
    assert_eq!(guest.balance_cents, 0);

    // Same document again: the unique index says no
    let err = db
        .front_desk()
        .register_guest("V-300", "Ana", "Reyes", None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Db(_)));
}

#[tokio::test]
async fn test_folio_history_join() {
    let (db, admin) = setup().await;
    let guest = db.guests().register("V-115", "Nia", "Campo").await.unwrap();
    let receipt = db
        .front_desk()
        .check_in(check_in_request(&guest.id, &admin.id, 1, vec![cash(4000)]))
        .await
        .unwrap();

    let active = db.folios().list_active().await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].folio.id, receipt.folio_id);
    assert_eq!(active[0].guest_name, "Nia Campo");
    assert_eq!(active[0].room_category, RoomCategory::Double);

    let by_guest = db.folios().list_by_guest(&guest.id).await.unwrap();
    assert_eq!(by_guest.len(), 1);
}

#[tokio::test]
async fn test_room_insert_rejects_negative_price() {
    let (db, _) = setup().await;

    let err = db
        .rooms()
        .insert(&Room {
            number: 40,
            category: RoomCategory::Single,
            description: None,
            price_cents: -2500,
            capacity: 2,
            status: RoomStatus::Free,
            last_cleaned_at: None,
            notes: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::InvalidInput(_)));
    assert!(db.rooms().get(40).await.unwrap().is_none());
}

#[tokio::test]
async fn test_record_payment_rejects_non_positive_amount() {
    let (db, admin) = setup().await;
    let guest = db.guests().register("V-116", "Eva", "Soto").await.unwrap();
    let receipt = db
        .front_desk()
        .check_in(check_in_request(&guest.id, &admin.id, 2, vec![cash(8000)]))
        .await
        .unwrap();

    for amount in [0, -500] {
        let err = db
            .front_desk()
            .record_payment(&receipt.folio_id, cash(amount), &admin.id)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Core(CoreError::Validation(_))));
    }

    // The folio's books are untouched
    let folio = db.folios().require(&receipt.folio_id).await.unwrap();
    assert_eq!(folio.paid_total_cents, 8000);
}
