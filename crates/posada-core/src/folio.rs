//! # Folio Engine
//!
//! A folio is the bill for one stay: room nights plus extras minus
//! discounts, against payments received. It is the unit of account between
//! check-in and check-out.
//!
//! ## Folio Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   check-in                       check-out                              │
//! │      │                              │                                   │
//! │      ▼                              ▼                                   │
//! │  ┌────────┐  add_extra         ┌────────┐                               │
//! │  │ Active │  apply_discount ──►│ Closed │  (terminal)                   │
//! │  │        │  apply_payment     └────────┘                               │
//! │  └───┬────┘                                                             │
//! │      │ cancel                                                           │
//! │      ▼                                                                  │
//! │  ┌───────────┐                                                          │
//! │  │ Cancelled │  (terminal)                                              │
//! │  └───────────┘                                                          │
//! │                                                                         │
//! │  Totals are STORED; stay_total and balance_due are always DERIVED.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Carry-Forward at Check-In
//! A returning guest's balance folds into the new folio:
//! - debt (negative balance) becomes an extra charge, so it must be paid
//!   before the key is handed over
//! - credit (positive balance) becomes a discount, capped at the room total;
//!   any remainder stays on the guest record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;

// =============================================================================
// Folio Status
// =============================================================================

/// The status of a folio. Closed and Cancelled are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum FolioStatus {
    /// Guest is in house; charges and payments accrue.
    Active,
    /// Settled at check-out.
    Closed,
    /// Voided before settlement.
    Cancelled,
}

impl fmt::Display for FolioStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FolioStatus::Active => "active",
            FolioStatus::Closed => "closed",
            FolioStatus::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

// =============================================================================
// Folio
// =============================================================================

/// The bill for one stay.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Folio {
    /// Unique identifier (UUID v4).
    pub id: String,

    pub guest_id: String,

    /// Door number of the occupied room.
    pub room_number: i64,

    pub check_in_at: DateTime<Utc>,

    /// When the guest said they would leave.
    pub expected_checkout_at: DateTime<Utc>,

    /// When the guest actually left (set at settlement).
    pub actual_checkout_at: Option<DateTime<Utc>>,

    pub status: FolioStatus,

    /// Accrued room charges (nights × nightly price), home cents.
    pub room_total_cents: i64,

    /// Accrued extras, including carried-forward guest debt.
    pub extras_total_cents: i64,

    /// Discounts granted, including carried-forward guest credit.
    pub discounts_total_cents: i64,

    /// Payments received against this folio.
    pub paid_total_cents: i64,

    pub notes: Option<String>,

    /// Staff user who performed the check-in.
    pub opened_by: String,

    /// Staff user who performed the check-out.
    pub closed_by: Option<String>,
}

/// What the check-in carry-forward did to the guest's balance.
///
/// Returned so the service layer can record the matching adjustment
/// entries and update the guest record in the same transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CarryForward {
    /// Debt folded into extras (non-negative).
    pub debt_collected: Money,
    /// Credit consumed as a discount (non-negative).
    pub credit_applied: Money,
}

/// Result of settling a folio at check-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settlement {
    /// Amount paid beyond the stay total, swept to the guest as credit.
    /// Zero when the books balanced exactly.
    pub overpaid: Money,
}

impl Folio {
    /// Opens a folio for a stay, folding the guest's prior balance in.
    ///
    /// `nights` must already be normalized (`nights_between` handles the
    /// same-day minimum); `guest_balance` is the guest's balance at
    /// check-in time.
    #[allow(clippy::too_many_arguments)]
    pub fn open(
        id: String,
        guest_id: String,
        guest_balance: Money,
        room_number: i64,
        nightly_price: Money,
        nights: i64,
        check_in_at: DateTime<Utc>,
        expected_checkout_at: DateTime<Utc>,
        opened_by: String,
    ) -> (Folio, CarryForward) {
        let room_total = nightly_price.multiply_quantity(nights);

        let mut extras = Money::zero();
        let mut discounts = Money::zero();
        let mut carry = CarryForward {
            debt_collected: Money::zero(),
            credit_applied: Money::zero(),
        };

        if guest_balance.is_negative() {
            // Old debt must be settled along with the stay
            carry.debt_collected = guest_balance.abs();
            extras += carry.debt_collected;
        } else if guest_balance.is_positive() {
            // Credit pays down the room, capped so the total never goes negative
            let applied = guest_balance.min(room_total);
            carry.credit_applied = applied;
            discounts += applied;
        }

        let folio = Folio {
            id,
            guest_id,
            room_number,
            check_in_at,
            expected_checkout_at,
            actual_checkout_at: None,
            status: FolioStatus::Active,
            room_total_cents: room_total.cents(),
            extras_total_cents: extras.cents(),
            discounts_total_cents: discounts.cents(),
            paid_total_cents: 0,
            notes: None,
            opened_by,
            closed_by: None,
        };

        (folio, carry)
    }

    // =========================================================================
    // Derived Amounts (never stored)
    // =========================================================================

    /// room + extras − discounts.
    #[inline]
    pub fn stay_total(&self) -> Money {
        Money::from_cents(self.room_total_cents + self.extras_total_cents - self.discounts_total_cents)
    }

    /// stay_total − paid. Positive = guest owes; negative = guest overpaid.
    #[inline]
    pub fn balance_due(&self) -> Money {
        self.stay_total() - Money::from_cents(self.paid_total_cents)
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.status == FolioStatus::Active
    }

    /// Whole nights since check-in, minimum 1.
    ///
    /// A settled folio measures to the actual checkout, so the figure
    /// stops growing once the guest has left. A same-day stay is still
    /// billed as one night.
    pub fn nights_stayed(&self, now: DateTime<Utc>) -> i64 {
        nights_between(self.check_in_at, self.actual_checkout_at.unwrap_or(now))
    }

    /// Nights between now and the expected checkout; zero once past due.
    pub fn nights_remaining(&self, now: DateTime<Utc>) -> i64 {
        (self.expected_checkout_at - now).num_days().max(0)
    }

    // =========================================================================
    // Mutations (Active only)
    // =========================================================================

    /// Accrues an extra charge.
    pub fn add_extra(&mut self, amount: Money) -> CoreResult<()> {
        self.ensure_active()?;
        self.extras_total_cents += amount.cents();
        Ok(())
    }

    /// Grants a discount, bounded by the current stay total so the bill
    /// never goes negative.
    pub fn apply_discount(&mut self, amount: Money) -> CoreResult<()> {
        self.ensure_active()?;
        if amount > self.stay_total() {
            return Err(CoreError::DiscountExceedsTotal {
                discount_cents: amount.cents(),
                stay_total_cents: self.stay_total().cents(),
            });
        }
        self.discounts_total_cents += amount.cents();
        Ok(())
    }

    /// Records a payment against the folio.
    ///
    /// Callers go through the ledger; this only moves the stored total.
    pub fn apply_payment(&mut self, amount: Money) -> CoreResult<()> {
        self.ensure_active()?;
        self.paid_total_cents += amount.cents();
        Ok(())
    }

    /// Settles the folio at check-out.
    ///
    /// Requires the balance due to be non-positive (the service collects
    /// any outstanding amount first). Overpayment is removed from the
    /// folio's books and reported so it can be swept to the guest as
    /// credit; a settled folio always shows zero outstanding.
    pub fn settle(&mut self, now: DateTime<Utc>, closed_by: String) -> CoreResult<Settlement> {
        self.ensure_active()?;

        let due = self.balance_due();
        if due.is_positive() {
            return Err(CoreError::InsufficientPayment {
                required_cents: self.stay_total().cents(),
                paid_cents: self.paid_total_cents,
            });
        }

        let overpaid = due.abs();
        self.paid_total_cents = self.stay_total().cents();
        self.actual_checkout_at = Some(now);
        self.status = FolioStatus::Closed;
        self.closed_by = Some(closed_by);

        Ok(Settlement { overpaid })
    }

    /// Voids the folio. Money already recorded stays in the ledger; the
    /// service layer decides what compensating entries to make.
    pub fn cancel(&mut self) -> CoreResult<()> {
        self.ensure_active()?;
        self.status = FolioStatus::Cancelled;
        Ok(())
    }

    fn ensure_active(&self) -> CoreResult<()> {
        if self.is_active() {
            Ok(())
        } else {
            Err(CoreError::FolioNotActive {
                folio_id: self.id.clone(),
                status: self.status.to_string(),
            })
        }
    }
}

/// Whole nights between two instants, minimum 1.
///
/// The front desk bills by the night: arriving and leaving the same
/// afternoon is one night, not zero.
pub fn nights_between(from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    (to - from).num_days().max(1)
}

// =============================================================================
// Extra Charge
// =============================================================================

/// One extra charge line on a folio (laundry, minibar, late checkout).
/// Append-only: corrections are negative-amount lines.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ExtraCharge {
    /// Unique identifier (UUID v4).
    pub id: String,

    pub folio_id: String,

    pub description: String,

    /// Unit amount in home cents.
    pub unit_amount_cents: i64,

    pub quantity: i64,

    pub recorded_at: DateTime<Utc>,

    /// Staff user who recorded the charge.
    pub user_id: String,
}

impl ExtraCharge {
    /// unit × quantity.
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.unit_amount_cents).multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
