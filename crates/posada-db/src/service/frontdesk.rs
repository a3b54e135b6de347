//! # Front Desk Service
//!
//! The commands a receptionist runs: check-in, extras, discounts,
//! payments, check-out, cancellation. Each command validates against the
//! pure domain logic first, then writes every affected row in one SQL
//! transaction.
//!
//! ## Check-In Money Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Guest owes $15 from a past stay, takes room 12 ($40 × 2 nights),       │
//! │  hands over a $100 bill.                                                │
//! │                                                                         │
//! │  Folio::open        room_total  $80.00                                  │
//! │                     extras      $15.00   (old debt folded in)           │
//! │                     stay_total  $95.00                                  │
//! │                                                                         │
//! │  Allocation         tendered   $100.00 → sufficient, change $5.00       │
//! │                                                                         │
//! │  One transaction:                                                       │
//! │    folio row                 paid_total = stay_total = $95.00           │
//! │    room 12                   free → occupied                            │
//! │    ledger  Charge  +$80.00   room nights                                │
//! │    ledger  Payment +$100.00  cash USD                                   │
//! │    ledger  Adjust  +$15.00   guest balance −$15 → $0 (debt collected)   │
//! │    ledger  Adjust   +$5.00   guest balance $0 → +$5 (change as credit)  │
//! │                                                                         │
//! │  Payments recorded ($100) = stay total ($95) + change ($5):             │
//! │  every cent tendered is accounted for exactly once.                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::folio::FolioRepository;
use crate::repository::guest::GuestRepository;
use crate::repository::room::RoomRepository;
use crate::repository::shift::ShiftRepository;
use crate::service::{ServiceError, ServiceResult};
use posada_core::validation::{
    validate_amount_cents, validate_document, validate_email, validate_guest_name, validate_phone,
    validate_quantity,
};
use posada_core::{
    CoreError, EntryKind, ExchangeRate, ExtraCharge, Folio, FolioStatus, Guest, LedgerEntry,
    Money, PaymentAllocation, PaymentMethod, Room, RoomStatus, ValidationError, MAX_STAY_NIGHTS,
};

// =============================================================================
// Request / Response Types
// =============================================================================

/// One tender line as entered on a payment form.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TenderLine {
    pub method: PaymentMethod,
    /// Home-currency cents.
    pub amount_cents: i64,
    /// Bank/transfer reference for electronic methods.
    pub reference: Option<String>,
}

/// Everything a check-in needs.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CheckInRequest {
    pub guest_id: String,
    pub room_number: i64,
    pub nights: i64,
    pub payment_lines: Vec<TenderLine>,
    pub notes: Option<String>,
    /// Receptionist performing the check-in.
    pub user_id: String,
}

/// What the check-in did with the money.
#[derive(Debug, Clone, serde::Serialize)]
pub struct CheckInReceipt {
    pub folio_id: String,
    pub stay_total_cents: i64,
    /// Total tendered across all lines.
    pub paid_cents: i64,
    /// Tendered beyond the stay total, swept to the guest as credit.
    pub change_cents: i64,
    /// Old debt collected along with the stay.
    pub debt_collected_cents: i64,
    /// Old credit consumed as a discount.
    pub credit_applied_cents: i64,
}

/// Everything a check-out needs. `payment_lines` may be empty when the
/// folio is already paid up.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CheckOutRequest {
    pub folio_id: String,
    pub payment_lines: Vec<TenderLine>,
    pub user_id: String,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct CheckOutReceipt {
    pub folio_id: String,
    /// Collected at the desk during this check-out.
    pub collected_cents: i64,
    /// Overpayment swept to the guest as credit.
    pub overpaid_swept_cents: i64,
}

/// Result of recording a single payment against a folio.
#[derive(Debug, Clone, serde::Serialize)]
pub struct PaymentReceipt {
    pub entry_id: String,
    /// What the folio still owes after this payment.
    pub balance_due_cents: i64,
}

// =============================================================================
// Front Desk Service
// =============================================================================

/// Multi-table front-desk commands.
#[derive(Debug, Clone)]
pub struct FrontDesk {
    pool: SqlitePool,
}

impl FrontDesk {
    /// Creates a new FrontDesk service.
    pub fn new(pool: SqlitePool) -> Self {
        FrontDesk { pool }
    }

    fn folios(&self) -> FolioRepository {
        FolioRepository::new(self.pool.clone())
    }

    fn guests(&self) -> GuestRepository {
        GuestRepository::new(self.pool.clone())
    }

    fn rooms(&self) -> RoomRepository {
        RoomRepository::new(self.pool.clone())
    }

    fn shifts(&self) -> ShiftRepository {
        ShiftRepository::new(self.pool.clone())
    }

    /// The posted exchange rate, validated.
    async fn current_rate(&self) -> ServiceResult<ExchangeRate> {
        let config = crate::repository::config::ConfigRepository::new(self.pool.clone())
            .require()
            .await?;
        let rate = config.exchange_rate().map_err(CoreError::from)?;
        Ok(rate)
    }

    // =========================================================================
    // Guest Registry
    // =========================================================================

    /// Registers a new guest after validating the form fields.
    ///
    /// The UNIQUE index on `document` is the last line of defense; a
    /// duplicate surfaces as `DbError::UniqueViolation`.
    pub async fn register_guest(
        &self,
        document: &str,
        first_name: &str,
        last_name: &str,
        phone: Option<&str>,
        email: Option<&str>,
    ) -> ServiceResult<Guest> {
        validate_document(document).map_err(CoreError::from)?;
        validate_guest_name(first_name).map_err(CoreError::from)?;
        validate_guest_name(last_name).map_err(CoreError::from)?;
        validate_phone(phone.unwrap_or_default()).map_err(CoreError::from)?;
        validate_email(email.unwrap_or_default()).map_err(CoreError::from)?;

        let mut guest = self
            .guests()
            .register(document, first_name, last_name)
            .await?;

        if phone.is_some() || email.is_some() {
            guest.phone = phone.map(|p| p.trim().to_string()).filter(|p| !p.is_empty());
            guest.email = email.map(|e| e.trim().to_string()).filter(|e| !e.is_empty());
            self.guests().update_profile(&guest).await?;
        }

        Ok(guest)
    }

    // =========================================================================
    // Check-In
    // =========================================================================

    /// Checks a guest into a room.
    ///
    /// The guest's prior balance folds into the folio (debt as an extra,
    /// credit as a capped discount), the payment lines must cover the
    /// resulting stay total, and change is swept to the guest as credit.
    /// An insufficient or invalid payment returns before anything is
    /// written.
    pub async fn check_in(&self, req: CheckInRequest) -> ServiceResult<CheckInReceipt> {
        if !(1..=MAX_STAY_NIGHTS).contains(&req.nights) {
            return Err(CoreError::Validation(ValidationError::OutOfRange {
                field: "nights".to_string(),
                min: 1,
                max: MAX_STAY_NIGHTS,
            })
            .into());
        }

        let rate = self.current_rate().await?;
        let shift = self
            .shifts()
            .get_open()
            .await?
            .ok_or(CoreError::NoOpenShift)?;

        let guest = self
            .guests()
            .get_by_id(&req.guest_id)
            .await?
            .ok_or_else(|| DbError::not_found("Guest", &req.guest_id))?;

        let room = self
            .rooms()
            .get(req.room_number)
            .await?
            .ok_or_else(|| DbError::not_found("Room", req.room_number.to_string()))?;

        if !room.is_available() {
            return Err(CoreError::RoomNotAvailable {
                room: room.number,
                status: room.status,
            }
            .into());
        }

        let now = Utc::now();
        let (mut folio, carry) = Folio::open(
            Uuid::new_v4().to_string(),
            guest.id.clone(),
            guest.balance(),
            room.number,
            room.price(),
            req.nights,
            now,
            now + chrono::Duration::days(req.nights),
            req.user_id.clone(),
        );
        folio.notes = req.notes.clone();

        // Split-tender math, all validation up front
        let mut alloc = PaymentAllocation::new(folio.stay_total());
        for line in &req.payment_lines {
            alloc
                .add_line(
                    line.method,
                    Money::from_cents(line.amount_cents),
                    rate,
                    line.reference.clone(),
                )
                .map_err(CoreError::from)?;
        }

        if !alloc.is_sufficient() {
            return Err(CoreError::InsufficientPayment {
                required_cents: alloc.required_total().cents(),
                paid_cents: alloc.total_paid().cents(),
            }
            .into());
        }

        let change = alloc.change();
        // The folio's books show the stay paid in full; change leaves the
        // folio and lands on the guest record below.
        folio.paid_total_cents = folio.stay_total().cents();

        debug!(
            folio_id = %folio.id,
            room = room.number,
            stay_total = folio.stay_total().cents(),
            tendered = alloc.total_paid().cents(),
            "Committing check-in"
        );

        let mut tx = self.pool.begin().await.map_err(DbError::from)?;

        insert_folio(&mut tx, &folio).await?;
        set_room_status(&mut tx, &room, RoomStatus::Occupied).await?;

        // Room nights accrued
        insert_entry(
            &mut tx,
            &new_entry(
                Some(&folio.id),
                Some(&guest.id),
                Money::from_cents(folio.room_total_cents),
                rate,
                PaymentMethod::Adjustment,
                None,
                EntryKind::Charge,
                format!("Room {}, {} night(s)", room.number, req.nights),
                &req.user_id,
                Some(&shift.id),
            ),
        )
        .await?;

        // Money received
        for line in alloc.accepted_lines() {
            insert_entry(
                &mut tx,
                &new_entry(
                    Some(&folio.id),
                    Some(&guest.id),
                    line.amount,
                    rate,
                    line.method,
                    line.reference.as_deref(),
                    EntryKind::Payment,
                    format!("Check-in payment, room {}", room.number),
                    &req.user_id,
                    Some(&shift.id),
                ),
            )
            .await?;
        }

        // Balance carry-forward and change, each as a signed adjustment
        if carry.debt_collected.is_positive() {
            adjust_guest_balance(
                &mut tx,
                &guest.id,
                Some(&folio.id),
                carry.debt_collected,
                rate,
                "Prior balance collected at check-in",
                &req.user_id,
                Some(&shift.id),
            )
            .await?;
        }
        if carry.credit_applied.is_positive() {
            adjust_guest_balance(
                &mut tx,
                &guest.id,
                Some(&folio.id),
                Money::zero() - carry.credit_applied,
                rate,
                "Credit applied at check-in",
                &req.user_id,
                Some(&shift.id),
            )
            .await?;
        }
        if change.is_positive() {
            adjust_guest_balance(
                &mut tx,
                &guest.id,
                Some(&folio.id),
                change,
                rate,
                "Change kept as credit",
                &req.user_id,
                Some(&shift.id),
            )
            .await?;
        }

        sqlx::query("UPDATE guests SET last_visit_at = ?2 WHERE id = ?1")
            .bind(&guest.id)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(DbError::from)?;

        tx.commit().await.map_err(DbError::from)?;

        info!(
            folio_id = %folio.id,
            guest = %guest.full_name(),
            room = room.number,
            nights = req.nights,
            "Check-in complete"
        );

        Ok(CheckInReceipt {
            folio_id: folio.id,
            stay_total_cents: folio.paid_total_cents,
            paid_cents: alloc.total_paid().cents(),
            change_cents: change.cents(),
            debt_collected_cents: carry.debt_collected.cents(),
            credit_applied_cents: carry.credit_applied.cents(),
        })
    }

    // =========================================================================
    // Extras and Discounts
    // =========================================================================

    /// Adds an extra charge (laundry, minibar, late checkout) to an
    /// active folio.
    ///
    /// Corrections are negative-amount lines; quantity is always positive.
    pub async fn add_extra(
        &self,
        folio_id: &str,
        description: &str,
        unit_amount_cents: i64,
        quantity: i64,
        user_id: &str,
    ) -> ServiceResult<ExtraCharge> {
        if description.trim().is_empty() {
            return Err(CoreError::Validation(ValidationError::Required {
                field: "description".to_string(),
            })
            .into());
        }
        validate_quantity(quantity).map_err(CoreError::from)?;

        let rate = self.current_rate().await?;
        let shift = self.shifts().get_open().await?;
        let mut folio = self.folios().require(folio_id).await?;

        let charge = ExtraCharge {
            id: Uuid::new_v4().to_string(),
            folio_id: folio.id.clone(),
            description: description.trim().to_string(),
            unit_amount_cents,
            quantity,
            recorded_at: Utc::now(),
            user_id: user_id.to_string(),
        };
        let line_total = charge.line_total();
        folio.add_extra(line_total).map_err(ServiceError::Core)?;

        let mut tx = self.pool.begin().await.map_err(DbError::from)?;

        sqlx::query(
            r#"
            INSERT INTO extra_charges (
                id, folio_id, description, unit_amount_cents, quantity,
                recorded_at, user_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&charge.id)
        .bind(&charge.folio_id)
        .bind(&charge.description)
        .bind(charge.unit_amount_cents)
        .bind(charge.quantity)
        .bind(charge.recorded_at)
        .bind(&charge.user_id)
        .execute(&mut *tx)
        .await
        .map_err(DbError::from)?;

        update_folio_money(&mut tx, &folio).await?;

        insert_entry(
            &mut tx,
            &new_entry(
                Some(&folio.id),
                Some(&folio.guest_id),
                line_total,
                rate,
                PaymentMethod::Adjustment,
                None,
                EntryKind::Charge,
                charge.description.clone(),
                user_id,
                shift.as_ref().map(|s| s.id.as_str()),
            ),
        )
        .await?;

        tx.commit().await.map_err(DbError::from)?;

        info!(folio_id = %folio.id, amount = line_total.cents(), "Extra charge added");
        Ok(charge)
    }

    /// Grants a discount on an active folio, bounded by the stay total.
    pub async fn apply_discount(
        &self,
        folio_id: &str,
        amount_cents: i64,
        concept: &str,
        user_id: &str,
    ) -> ServiceResult<()> {
        validate_amount_cents(amount_cents).map_err(CoreError::from)?;

        let rate = self.current_rate().await?;
        let shift = self.shifts().get_open().await?;
        let mut folio = self.folios().require(folio_id).await?;
        folio
            .apply_discount(Money::from_cents(amount_cents))
            .map_err(ServiceError::Core)?;

        let mut tx = self.pool.begin().await.map_err(DbError::from)?;
        update_folio_money(&mut tx, &folio).await?;

        // Audit trail only: no guest_id, so no balance is implied
        insert_entry(
            &mut tx,
            &new_entry(
                Some(&folio.id),
                None,
                Money::from_cents(-amount_cents),
                rate,
                PaymentMethod::Adjustment,
                None,
                EntryKind::Adjustment,
                format!("Discount: {}", concept.trim()),
                user_id,
                shift.as_ref().map(|s| s.id.as_str()),
            ),
        )
        .await?;

        tx.commit().await.map_err(DbError::from)?;

        info!(folio_id = %folio.id, amount = amount_cents, "Discount applied");
        Ok(())
    }

    // =========================================================================
    // Payments
    // =========================================================================

    /// Records a single payment against an active folio.
    pub async fn record_payment(
        &self,
        folio_id: &str,
        line: TenderLine,
        user_id: &str,
    ) -> ServiceResult<PaymentReceipt> {
        validate_amount_cents(line.amount_cents).map_err(CoreError::from)?;

        let rate = self.current_rate().await?;
        let shift = self
            .shifts()
            .get_open()
            .await?
            .ok_or(CoreError::NoOpenShift)?;
        let mut folio = self.folios().require(folio_id).await?;

        // Reuse the allocation's line validation (sign, reference)
        let mut alloc = PaymentAllocation::new(Money::zero());
        alloc
            .add_line(
                line.method,
                Money::from_cents(line.amount_cents),
                rate,
                line.reference.clone(),
            )
            .map_err(CoreError::from)?;

        let amount = Money::from_cents(line.amount_cents);
        folio.apply_payment(amount).map_err(ServiceError::Core)?;

        let entry = new_entry(
            Some(&folio.id),
            Some(&folio.guest_id),
            amount,
            rate,
            line.method,
            line.reference.as_deref(),
            EntryKind::Payment,
            format!("Payment, room {}", folio.room_number),
            user_id,
            Some(&shift.id),
        );

        let mut tx = self.pool.begin().await.map_err(DbError::from)?;
        insert_entry(&mut tx, &entry).await?;
        update_folio_money(&mut tx, &folio).await?;
        tx.commit().await.map_err(DbError::from)?;

        info!(folio_id = %folio.id, amount = amount.cents(), method = ?line.method, "Payment recorded");

        Ok(PaymentReceipt {
            entry_id: entry.id,
            balance_due_cents: folio.balance_due().cents(),
        })
    }

    /// Corrects a guest's standing balance with a signed adjustment.
    ///
    /// Positive delta = credit granted, negative = credit consumed or
    /// debt recorded. The ledger entry and the balance change commit
    /// together.
    pub async fn adjust_balance(
        &self,
        guest_id: &str,
        delta_cents: i64,
        concept: &str,
        user_id: &str,
    ) -> ServiceResult<String> {
        if delta_cents == 0 {
            return Err(CoreError::Validation(ValidationError::MustBePositive {
                field: "adjustment amount".to_string(),
            })
            .into());
        }

        let rate = self.current_rate().await?;
        let shift = self.shifts().get_open().await?;
        let guest = self
            .guests()
            .get_by_id(guest_id)
            .await?
            .ok_or_else(|| DbError::not_found("Guest", guest_id))?;

        let mut tx = self.pool.begin().await.map_err(DbError::from)?;
        let entry_id = adjust_guest_balance(
            &mut tx,
            &guest.id,
            None,
            Money::from_cents(delta_cents),
            rate,
            concept,
            user_id,
            shift.as_ref().map(|s| s.id.as_str()),
        )
        .await?;
        tx.commit().await.map_err(DbError::from)?;

        info!(guest_id = %guest.id, delta = delta_cents, "Guest balance adjusted");
        Ok(entry_id)
    }

    // =========================================================================
    // Check-Out and Cancellation
    // =========================================================================

    /// Settles a folio and releases the room to housekeeping.
    ///
    /// Any outstanding balance must be covered by the payment lines;
    /// overpayment (including credit built up during the stay) is swept
    /// to the guest record. The room goes Occupied → Cleaning.
    pub async fn check_out(&self, req: CheckOutRequest) -> ServiceResult<CheckOutReceipt> {
        let rate = self.current_rate().await?;
        let shift = self.shifts().get_open().await?;
        let mut folio = self.folios().require(&req.folio_id).await?;

        let guest = self
            .guests()
            .get_by_id(&folio.guest_id)
            .await?
            .ok_or_else(|| DbError::not_found("Guest", &folio.guest_id))?;
        let room = self
            .rooms()
            .get(folio.room_number)
            .await?
            .ok_or_else(|| DbError::not_found("Room", folio.room_number.to_string()))?;

        let due = folio.balance_due();
        let mut alloc = PaymentAllocation::new(due.clamp_non_negative());
        for line in &req.payment_lines {
            alloc
                .add_line(
                    line.method,
                    Money::from_cents(line.amount_cents),
                    rate,
                    line.reference.clone(),
                )
                .map_err(CoreError::from)?;
        }

        if due.is_positive() && !alloc.is_sufficient() {
            return Err(CoreError::InsufficientPayment {
                required_cents: due.cents(),
                paid_cents: alloc.total_paid().cents(),
            }
            .into());
        }

        // Collecting money requires an open till
        let shift_id = match (&shift, alloc.total_paid().is_positive()) {
            (Some(s), _) => Some(s.id.clone()),
            (None, false) => None,
            (None, true) => return Err(CoreError::NoOpenShift.into()),
        };

        let collected = alloc.total_paid();
        if collected.is_positive() {
            folio.apply_payment(collected).map_err(ServiceError::Core)?;
        }
        let settlement = folio
            .settle(Utc::now(), req.user_id.clone())
            .map_err(ServiceError::Core)?;

        let mut tx = self.pool.begin().await.map_err(DbError::from)?;

        for line in alloc.accepted_lines() {
            insert_entry(
                &mut tx,
                &new_entry(
                    Some(&folio.id),
                    Some(&guest.id),
                    line.amount,
                    rate,
                    line.method,
                    line.reference.as_deref(),
                    EntryKind::Payment,
                    format!("Check-out payment, room {}", room.number),
                    &req.user_id,
                    shift_id.as_deref(),
                ),
            )
            .await?;
        }

        if settlement.overpaid.is_positive() {
            adjust_guest_balance(
                &mut tx,
                &guest.id,
                Some(&folio.id),
                settlement.overpaid,
                rate,
                "Overpayment kept as credit at check-out",
                &req.user_id,
                shift_id.as_deref(),
            )
            .await?;
        }

        close_folio_row(&mut tx, &folio).await?;
        set_room_status(&mut tx, &room, RoomStatus::Cleaning).await?;

        sqlx::query("UPDATE guests SET last_visit_at = ?2 WHERE id = ?1")
            .bind(&guest.id)
            .bind(Utc::now())
            .execute(&mut *tx)
            .await
            .map_err(DbError::from)?;

        tx.commit().await.map_err(DbError::from)?;

        info!(
            folio_id = %folio.id,
            room = room.number,
            collected = collected.cents(),
            swept = settlement.overpaid.cents(),
            "Check-out complete"
        );

        Ok(CheckOutReceipt {
            folio_id: folio.id,
            collected_cents: collected.cents(),
            overpaid_swept_cents: settlement.overpaid.cents(),
        })
    }

    /// Voids an active folio without settlement.
    ///
    /// Money already in the ledger stays there; the room was entered, so
    /// it goes through the normal cleaning cycle before selling again.
    pub async fn cancel_folio(&self, folio_id: &str, user_id: &str) -> ServiceResult<()> {
        let mut folio = self.folios().require(folio_id).await?;
        let room = self
            .rooms()
            .get(folio.room_number)
            .await?
            .ok_or_else(|| DbError::not_found("Room", folio.room_number.to_string()))?;

        folio.cancel().map_err(ServiceError::Core)?;

        let mut tx = self.pool.begin().await.map_err(DbError::from)?;

        let result = sqlx::query(
            "UPDATE folios SET status = ?2, closed_by = ?3 WHERE id = ?1 AND status = 'active'",
        )
        .bind(&folio.id)
        .bind(FolioStatus::Cancelled)
        .bind(user_id)
        .execute(&mut *tx)
        .await
        .map_err(DbError::from)?;

        if result.rows_affected() == 0 {
            return Err(DbError::TransactionFailed(format!(
                "Folio {} changed concurrently",
                folio.id
            ))
            .into());
        }

        set_room_status(&mut tx, &room, RoomStatus::Cleaning).await?;
        tx.commit().await.map_err(DbError::from)?;

        info!(folio_id = %folio.id, room = room.number, "Folio cancelled");
        Ok(())
    }
}

// =============================================================================
// Transaction Helpers
// =============================================================================
// Same SQL the repositories use, but bound to the command's transaction.

#[allow(clippy::too_many_arguments)]
fn new_entry(
    folio_id: Option<&str>,
    guest_id: Option<&str>,
    amount: Money,
    rate: ExchangeRate,
    method: PaymentMethod,
    reference: Option<&str>,
    kind: EntryKind,
    concept: String,
    user_id: &str,
    shift_id: Option<&str>,
) -> LedgerEntry {
    LedgerEntry {
        id: Uuid::new_v4().to_string(),
        folio_id: folio_id.map(str::to_string),
        guest_id: guest_id.map(str::to_string),
        amount_cents: amount.cents(),
        rate_milli: rate.milli(),
        secondary_cents: rate.to_secondary(amount).cents(),
        method,
        reference: reference.map(str::to_string),
        kind,
        concept,
        recorded_at: Utc::now(),
        user_id: user_id.to_string(),
        shift_id: shift_id.map(str::to_string),
    }
}

async fn insert_entry(conn: &mut SqliteConnection, entry: &LedgerEntry) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO ledger_entries (
            id, folio_id, guest_id, amount_cents, rate_milli, secondary_cents,
            method, reference, kind, concept, recorded_at, user_id, shift_id
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
        "#,
    )
    .bind(&entry.id)
    .bind(&entry.folio_id)
    .bind(&entry.guest_id)
    .bind(entry.amount_cents)
    .bind(entry.rate_milli)
    .bind(entry.secondary_cents)
    .bind(entry.method)
    .bind(&entry.reference)
    .bind(entry.kind)
    .bind(&entry.concept)
    .bind(entry.recorded_at)
    .bind(&entry.user_id)
    .bind(&entry.shift_id)
    .execute(conn)
    .await?;

    Ok(())
}

async fn insert_folio(conn: &mut SqliteConnection, folio: &Folio) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO folios (
            id, guest_id, room_number, check_in_at, expected_checkout_at,
            actual_checkout_at, status, room_total_cents, extras_total_cents,
            discounts_total_cents, paid_total_cents, notes, opened_by, closed_by
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
        "#,
    )
    .bind(&folio.id)
    .bind(&folio.guest_id)
    .bind(folio.room_number)
    .bind(folio.check_in_at)
    .bind(folio.expected_checkout_at)
    .bind(folio.actual_checkout_at)
    .bind(folio.status)
    .bind(folio.room_total_cents)
    .bind(folio.extras_total_cents)
    .bind(folio.discounts_total_cents)
    .bind(folio.paid_total_cents)
    .bind(&folio.notes)
    .bind(&folio.opened_by)
    .bind(&folio.closed_by)
    .execute(conn)
    .await?;

    Ok(())
}

/// Writes the folio's money columns, guarded on the folio still being
/// active so a concurrent close loses cleanly.
async fn update_folio_money(conn: &mut SqliteConnection, folio: &Folio) -> DbResult<()> {
    let result = sqlx::query(
        r#"
        UPDATE folios SET
            extras_total_cents = ?2, discounts_total_cents = ?3,
            paid_total_cents = ?4
        WHERE id = ?1 AND status = 'active'
        "#,
    )
    .bind(&folio.id)
    .bind(folio.extras_total_cents)
    .bind(folio.discounts_total_cents)
    .bind(folio.paid_total_cents)
    .execute(conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::TransactionFailed(format!(
            "Folio {} changed concurrently",
            folio.id
        )));
    }

    Ok(())
}

/// Writes a settled folio's closing columns.
async fn close_folio_row(conn: &mut SqliteConnection, folio: &Folio) -> DbResult<()> {
    let result = sqlx::query(
        r#"
        UPDATE folios SET
            status = ?2, actual_checkout_at = ?3, paid_total_cents = ?4,
            closed_by = ?5
        WHERE id = ?1 AND status = 'active'
        "#,
    )
    .bind(&folio.id)
    .bind(folio.status)
    .bind(folio.actual_checkout_at)
    .bind(folio.paid_total_cents)
    .bind(&folio.closed_by)
    .execute(conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::TransactionFailed(format!(
            "Folio {} changed concurrently",
            folio.id
        )));
    }

    Ok(())
}

/// Moves a room through the status machine inside a transaction.
async fn set_room_status(conn: &mut SqliteConnection, room: &Room, to: RoomStatus) -> DbResult<()> {
    if !room.status.can_transition_to(to) {
        let err = CoreError::InvalidRoomTransition {
            room: room.number,
            from: room.status,
            to,
        };
        return Err(DbError::QueryFailed(err.to_string()));
    }

    let result =
        sqlx::query("UPDATE rooms SET status = ?2 WHERE number = ?1 AND status = ?3")
            .bind(room.number)
            .bind(to)
            .bind(room.status)
            .execute(conn)
            .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::TransactionFailed(format!(
            "Room {} status changed concurrently",
            room.number
        )));
    }

    Ok(())
}

/// Records a signed balance adjustment: one ledger entry plus the matching
/// delta on the guest row, in the caller's transaction. Returns the entry id.
#[allow(clippy::too_many_arguments)]
async fn adjust_guest_balance(
    conn: &mut SqliteConnection,
    guest_id: &str,
    folio_id: Option<&str>,
    delta: Money,
    rate: ExchangeRate,
    concept: &str,
    user_id: &str,
    shift_id: Option<&str>,
) -> DbResult<String> {
    let entry = new_entry(
        folio_id,
        Some(guest_id),
        delta,
        rate,
        PaymentMethod::Adjustment,
        None,
        EntryKind::Adjustment,
        concept.to_string(),
        user_id,
        shift_id,
    );
    insert_entry(&mut *conn, &entry).await?;

    sqlx::query("UPDATE guests SET balance_cents = balance_cents + ?2 WHERE id = ?1")
        .bind(guest_id)
        .bind(delta.cents())
        .execute(conn)
        .await?;

    Ok(entry.id)
}
