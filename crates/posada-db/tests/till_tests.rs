//! Integration tests for the till: shift lifecycle, ledger-derived
//! totals, cash variance and role checks.

use chrono::Utc;
use posada_core::{
    CoreError, HotelConfig, PaymentMethod, Room, RoomCategory, RoomStatus, ShiftStatus, User,
    UserRole,
};
use posada_db::{CheckInRequest, Database, DbConfig, ServiceError, TenderLine};

const RATE_MILLI: i64 = 35_500;

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

    (db, admin)
}

/// Check a guest in paying with the given lines; returns the folio id.
async fn check_in_with(db: &Database, admin: &User, document: &str, lines: Vec<TenderLine>) -> String {
    let guest = db.guests().register(document, "Test", "Guest").await.unwrap();
    db.front_desk()
        .check_in(CheckInRequest {
            guest_id: guest.id,
            room_number: 12,
            nights: 2,
            payment_lines: lines,
            notes: None,
            user_id: admin.id.clone(),
        })
        .await
        .unwrap()
        .folio_id
}

fn cash_usd(amount_cents: i64) -> TenderLine {
    TenderLine {
        method: PaymentMethod::CashUsd,
        amount_cents,
        reference: None,
    }
}

#[tokio::test]
async fn test_open_shift_posts_rate_and_blocks_second() {
    let (db, admin) = setup().await;

    let shift = db
        .till()
        .open_shift(&admin.id, 36_000, 10_000, 500_000, None)
        .await
        .unwrap();
    assert!(shift.is_open());
    assert_eq!(shift.opening_rate_milli, 36_000);

    // Opening the till posts the day's rate
    let config = db.config().require().await.unwrap();
    assert_eq!(config.exchange_rate_milli, 36_000);

    let err = db
        .till()
        .open_shift(&admin.id, 36_000, 0, 0, None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Core(CoreError::ShiftAlreadyOpen { .. })
    ));
}

#[tokio::test]
async fn test_open_shift_rejects_bad_rate() {
    let (db, admin) = setup().await;
    let err = db
        .till()
        .open_shift(&admin.id, 0, 0, 0, None)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Core(CoreError::Validation(_))));
}

#[tokio::test]
async fn test_receptionist_cannot_close_shift() {
    let (db, admin) = setup().await;
    db.till()
        .open_shift(&admin.id, RATE_MILLI, 0, 0, None)
        .await
        .unwrap();

    let recep = db
        .users()
        .create("maria", "secret1", "Maria Lopez", UserRole::Receptionist)
        .await
        .unwrap();

    let err = db
        .till()
        .close_shift(&recep.id, 0, 0, RATE_MILLI, None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Core(CoreError::NotPermitted { .. })
    ));

    // Shift remains open
    assert!(db.till().current_shift().await.unwrap().is_some());
}

#[tokio::test]
async fn test_close_without_open_shift_errors() {
    let (db, admin) = setup().await;
    let err = db
        .till()
        .close_shift(&admin.id, 0, 0, RATE_MILLI, None)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Core(CoreError::NoOpenShift)));
}

#[tokio::test]
async fn test_close_shift_balanced_drawer() {
    let (db, admin) = setup().await;
    db.till()
        .open_shift(&admin.id, RATE_MILLI, 10_000, 0, None)
        .await
        .unwrap();

    // $80 in cash lands in the drawer
    check_in_with(&db, &admin, "V-200", vec![cash_usd(8000)]).await;

    let report = db
        .till()
        .close_shift(&admin.id, 18_000, 0, 36_000, None)
        .await
        .unwrap();

    assert_eq!(report.shift.status, ShiftStatus::Closed);
    assert_eq!(report.shift.payments_total_cents, 8000);
    assert_eq!(report.shift.sales_total_cents, 8000);
    assert_eq!(report.shift.cash_usd_payments_cents, 8000);
    let variance = report.variance.unwrap();
    assert!(variance.is_balanced());

    // Closing posts the new rate
    let config = db.config().require().await.unwrap();
    assert_eq!(config.exchange_rate_milli, 36_000);
}

#[tokio::test]
async fn test_variance_is_reported_but_never_blocks() {
    let (db, admin) = setup().await;
    db.till()
        .open_shift(&admin.id, RATE_MILLI, 10_000, 0, None)
        .await
        .unwrap();
    check_in_with(&db, &admin, "V-201", vec![cash_usd(8000)]).await;

    // Drawer is $2 short; the close still goes through
    let report = db
        .till()
        .close_shift(&admin.id, 17_800, 0, RATE_MILLI, Some("short $2".to_string()))
        .await
        .unwrap();

    assert_eq!(report.shift.status, ShiftStatus::Closed);
    let variance = report.variance.unwrap();
    assert_eq!(variance.usd.cents(), -200);
    assert_eq!(variance.bs.cents(), 0);
    assert!(!variance.is_balanced());
}

#[tokio::test]
async fn test_bs_drawer_reconciles_against_frozen_secondary() {
    let (db, admin) = setup().await;
    db.till()
        .open_shift(&admin.id, RATE_MILLI, 0, 100_000, None)
        .await
        .unwrap();

    // $80 paid in bolivars: the drawer grows by the frozen Bs amount,
    // $80 × 35.500 = Bs 2,840.00
    check_in_with(
        &db,
        &admin,
        "V-202",
        vec![TenderLine {
            method: PaymentMethod::CashBs,
            amount_cents: 8000,
            reference: None,
        }],
    )
    .await;

    let report = db
        .till()
        .close_shift(&admin.id, 0, 100_000 + 284_000, RATE_MILLI, None)
        .await
        .unwrap();
    assert_eq!(report.shift.cash_bs_payments_cents, 284_000);
    assert!(report.variance.unwrap().is_balanced());
}

#[tokio::test]
async fn test_recompute_totals_is_idempotent() {
    let (db, admin) = setup().await;
    let shift = db
        .till()
        .open_shift(&admin.id, RATE_MILLI, 0, 0, None)
        .await
        .unwrap();
    check_in_with(&db, &admin, "V-203", vec![cash_usd(8000)]).await;

    let first = db.till().recompute_totals(&shift.id).await.unwrap();
    let second = db.till().recompute_totals(&shift.id).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(first.payments_cents, 8000);

    let stored = db.shifts().require(&shift.id).await.unwrap();
    assert_eq!(stored.payments_total_cents, 8000);
}

#[tokio::test]
async fn test_shift_report_breaks_down_by_method() {
    let (db, admin) = setup().await;
    let shift = db
        .till()
        .open_shift(&admin.id, RATE_MILLI, 0, 0, None)
        .await
        .unwrap();

    check_in_with(
        &db,
        &admin,
        "V-204",
        vec![
            cash_usd(5000),
            TenderLine {
                method: PaymentMethod::Zelle,
                amount_cents: 3000,
                reference: Some("Z-77".to_string()),
            },
        ],
    )
    .await;

    let report = db.till().shift_report(&shift.id).await.unwrap();
    // Open shift: totals computed fresh, no recount yet
    assert!(report.variance.is_none());
    assert_eq!(report.shift.payments_total_cents, 8000);

    let cash = &report.methods[&PaymentMethod::CashUsd];
    assert_eq!(cash.payments_cents, 5000);
    let zelle = &report.methods[&PaymentMethod::Zelle];
    assert_eq!(zelle.payments_cents, 3000);
    // The room charge rides the internal adjustment method
    let adj = &report.methods[&PaymentMethod::Adjustment];
    assert_eq!(adj.charges_cents, 8000);
}

#[tokio::test]
async fn test_closed_shift_cannot_take_entries() {
    let (db, admin) = setup().await;
    let shift = db
        .till()
        .open_shift(&admin.id, RATE_MILLI, 0, 0, None)
        .await
        .unwrap();
    db.till()
        .close_shift(&admin.id, 0, 0, RATE_MILLI, None)
        .await
        .unwrap();

    let err = db.till().recompute_totals(&shift.id).await.unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Core(CoreError::ShiftNotOpen { .. })
    ));

    // And the front desk refuses money with no open till
    let guest = db.guests().register("V-205", "Sam", "Cruz").await.unwrap();
    let err = db
        .front_desk()
        .check_in(CheckInRequest {
            guest_id: guest.id,
            room_number: 12,
            nights: 1,
            payment_lines: vec![cash_usd(4000)],
            notes: None,
            user_id: admin.id.clone(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Core(CoreError::NoOpenShift)));
}
