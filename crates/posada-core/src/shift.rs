//! # Cashier Shift (Till) Types
//!
//! A shift brackets everything one cashier is accountable for: it opens
//! with a counted till, accumulates ledger entries, and closes with a
//! recount. The closing count is compared against what the ledger says
//! should be in the drawer.
//!
//! ## Shift Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  open_shift(rate, counted cash)                                         │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │  ┌──────┐   every ledger entry tagged with shift_id   ┌────────┐        │
//! │  │ Open │ ────────────────────────────────────────────│ Closed │        │
//! │  └──────┘   close_shift(recount, closing rate)        └────────┘        │
//! │                                                                         │
//! │  Totals are always RECOMPUTED from the ledger, never trusted            │
//! │  incrementally. Variance is surfaced, logged, and explained by a        │
//! │  human; it never blocks closure.                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ledger::{EntryKind, LedgerEntry, PaymentMethod};
use crate::money::Money;

// =============================================================================
// Shift Status
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum ShiftStatus {
    Open,
    Closed,
}

// =============================================================================
// Shift
// =============================================================================

/// One cashier shift. At most one shift is Open system-wide.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Shift {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Cashier who opened the shift.
    pub user_id: String,

    pub opened_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,

    /// Exchange rate posted at opening, milli-units.
    pub opening_rate_milli: i64,
    /// Exchange rate posted at closing, milli-units.
    pub closing_rate_milli: Option<i64>,

    /// Drawer count at opening, USD cents.
    pub opening_cash_usd_cents: i64,
    /// Drawer count at opening, Bs cents.
    pub opening_cash_bs_cents: i64,

    /// Drawer recount at closing.
    pub closing_cash_usd_cents: Option<i64>,
    pub closing_cash_bs_cents: Option<i64>,

    /// Charge entries recorded under this shift, home cents.
    pub sales_total_cents: i64,
    /// Payment entries recorded under this shift, home cents.
    pub payments_total_cents: i64,
    /// Cash-USD payment entries, home cents.
    pub cash_usd_payments_cents: i64,
    /// Cash-Bs payment entries, frozen secondary cents.
    pub cash_bs_payments_cents: i64,

    pub status: ShiftStatus,

    pub notes: Option<String>,
}

impl Shift {
    #[inline]
    pub fn is_open(&self) -> bool {
        self.status == ShiftStatus::Open
    }

    /// Copies recomputed ledger totals onto the shift record.
    pub fn apply_totals(&mut self, totals: &ShiftTotals) {
        self.sales_total_cents = totals.sales_cents;
        self.payments_total_cents = totals.payments_cents;
        self.cash_usd_payments_cents = totals.cash_usd_cents;
        self.cash_bs_payments_cents = totals.cash_bs_cents;
    }

    /// What the USD drawer should hold: opening count plus cash-USD
    /// payments taken during the shift.
    #[inline]
    pub fn expected_cash_usd(&self) -> Money {
        Money::from_cents(self.opening_cash_usd_cents + self.cash_usd_payments_cents)
    }

    /// What the Bs drawer should hold.
    #[inline]
    pub fn expected_cash_bs(&self) -> Money {
        Money::from_cents(self.opening_cash_bs_cents + self.cash_bs_payments_cents)
    }

    /// Per-currency variance of a closing count against expectations.
    ///
    /// Positive = more in the drawer than the books say (overage),
    /// negative = shortage. Computed on whatever totals the shift
    /// currently carries; callers recompute totals from the ledger first.
    pub fn variance(&self, counted_usd: Money, counted_bs: Money) -> CashVariance {
        CashVariance {
            usd: counted_usd - self.expected_cash_usd(),
            bs: counted_bs - self.expected_cash_bs(),
        }
    }
}

// =============================================================================
// Shift Totals
// =============================================================================

/// Totals recomputed from the ledger entries of one shift.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftTotals {
    /// Charge entries, home cents.
    pub sales_cents: i64,
    /// Payment entries, home cents.
    pub payments_cents: i64,
    /// Cash-USD payment entries, home cents.
    pub cash_usd_cents: i64,
    /// Cash-Bs payment entries, frozen secondary cents.
    pub cash_bs_cents: i64,
    pub entry_count: i64,
}

impl ShiftTotals {
    /// Full re-scan reduction over a shift's entries.
    ///
    /// Running it twice over the same entries gives the same totals, which
    /// is what makes recomputation safe to call at any time.
    pub fn from_entries(entries: &[LedgerEntry]) -> Self {
        let mut totals = ShiftTotals::default();

        for entry in entries {
            totals.entry_count += 1;
            match entry.kind {
                EntryKind::Payment => {
                    totals.payments_cents += entry.amount_cents;
                    match entry.method {
                        PaymentMethod::CashUsd => totals.cash_usd_cents += entry.amount_cents,
                        // The Bs drawer holds bolivars: count the frozen
                        // secondary amount, not the home equivalent
                        PaymentMethod::CashBs => totals.cash_bs_cents += entry.secondary_cents,
                        PaymentMethod::MobilePayment
                        | PaymentMethod::WireTransfer
                        | PaymentMethod::Card
                        | PaymentMethod::Zelle
                        | PaymentMethod::Binance
                        | PaymentMethod::Adjustment => {}
                    }
                }
                EntryKind::Charge => totals.sales_cents += entry.amount_cents,
                EntryKind::Adjustment | EntryKind::Refund => {}
            }
        }

        totals
    }
}

// =============================================================================
// Cash Variance
// =============================================================================

/// Per-currency difference between the counted drawer and the books.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashVariance {
    /// USD overage (positive) or shortage (negative).
    pub usd: Money,
    /// Bs overage or shortage.
    pub bs: Money,
}

impl CashVariance {
    /// True when both drawers match the books exactly.
    pub fn is_balanced(&self) -> bool {
        self.usd.is_zero() && self.bs.is_zero()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn payment(method: PaymentMethod, cents: i64, secondary: i64) -> LedgerEntry {
        LedgerEntry {
            id: uuid::Uuid::new_v4().to_string(),
            folio_id: None,
            guest_id: None,
            amount_cents: cents,
            rate_milli: 35_500,
            secondary_cents: secondary,
            method,
            reference: None,
            kind: EntryKind::Payment,
            concept: "test".to_string(),
            recorded_at: Utc::now(),
            user_id: "u-1".to_string(),
            shift_id: Some("s-1".to_string()),
        }
    }

    fn charge(cents: i64) -> LedgerEntry {
        let mut e = payment(PaymentMethod::Adjustment, cents, 0);
        e.kind = EntryKind::Charge;
        e
    }

    fn open_shift() -> Shift {
        Shift {
            id: "s-1".to_string(),
            user_id: "u-1".to_string(),
            opened_at: Utc::now(),
            closed_at: None,
            opening_rate_milli: 35_500,
            closing_rate_milli: None,
            opening_cash_usd_cents: 10_000,
            opening_cash_bs_cents: 500_000,
            closing_cash_usd_cents: None,
            closing_cash_bs_cents: None,
            sales_total_cents: 0,
            payments_total_cents: 0,
            cash_usd_payments_cents: 0,
            cash_bs_payments_cents: 0,
            status: ShiftStatus::Open,
            notes: None,
        }
    }

    #[test]
    fn test_totals_from_entries() {
        let entries = vec![
            payment(PaymentMethod::CashUsd, 5000, 177_500),
            payment(PaymentMethod::CashBs, 2500, 88_750),
            payment(PaymentMethod::Zelle, 8000, 284_000),
            charge(15_500),
        ];

        let totals = ShiftTotals::from_entries(&entries);
        assert_eq!(totals.payments_cents, 15_500);
        assert_eq!(totals.sales_cents, 15_500);
        assert_eq!(totals.cash_usd_cents, 5000);
        // Bs drawer tracks the frozen secondary amount
        assert_eq!(totals.cash_bs_cents, 88_750);
        assert_eq!(totals.entry_count, 4);
    }

    #[test]
    fn test_totals_recompute_is_idempotent() {
        let entries = vec![
            payment(PaymentMethod::CashUsd, 3000, 106_500),
            charge(3000),
        ];
        let first = ShiftTotals::from_entries(&entries);
        let second = ShiftTotals::from_entries(&entries);
        assert_eq!(first, second);
    }

    #[test]
    fn test_expected_cash_and_variance() {
        let mut shift = open_shift();
        let entries = vec![
            payment(PaymentMethod::CashUsd, 5000, 177_500),
            payment(PaymentMethod::CashBs, 2500, 88_750),
        ];
        shift.apply_totals(&ShiftTotals::from_entries(&entries));

        assert_eq!(shift.expected_cash_usd().cents(), 15_000);
        assert_eq!(shift.expected_cash_bs().cents(), 588_750);

        // Drawer counts match exactly
        let v = shift.variance(Money::from_cents(15_000), Money::from_cents(588_750));
        assert!(v.is_balanced());

        // $2 short in USD, Bs 10 over
        let v = shift.variance(Money::from_cents(14_800), Money::from_cents(589_750));
        assert_eq!(v.usd.cents(), -200);
        assert_eq!(v.bs.cents(), 1000);
        assert!(!v.is_balanced());
    }

    #[test]
    fn test_adjustments_do_not_move_cash_expectations() {
        let mut shift = open_shift();
        let mut adj = payment(PaymentMethod::Adjustment, 4000, 142_000);
        adj.kind = EntryKind::Adjustment;
        shift.apply_totals(&ShiftTotals::from_entries(&[adj]));

        assert_eq!(shift.expected_cash_usd().cents(), 10_000);
        assert_eq!(shift.expected_cash_bs().cents(), 500_000);
        assert_eq!(shift.payments_total_cents, 0);
    }
}
