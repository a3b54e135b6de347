//! # Transaction Ledger Types
//!
//! The ledger is the append-only record of every movement of money through
//! the front desk. Entries are immutable after creation: a mistake is
//! corrected by recording a compensating Adjustment or Refund entry, never
//! by editing history.
//!
//! ## Entry Anatomy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          LedgerEntry                                    │
//! │                                                                         │
//! │  amount_cents        home currency (USD), signed                        │
//! │  rate_milli          exchange rate frozen at entry time                 │
//! │  secondary_cents     Bs amount derived through rate_milli, frozen       │
//! │  method              how the money moved (cash, Zelle, ...)             │
//! │  kind                Payment / Charge / Adjustment / Refund             │
//! │  folio_id, guest_id  what the entry is against (either, both, neither)  │
//! │  shift_id            till accountability                                │
//! │                                                                         │
//! │  A later rate change NEVER rewrites recorded entries.                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::money::Money;

// =============================================================================
// Payment Method
// =============================================================================

/// How money moved.
///
/// The set is closed and matched exhaustively wherever a method branches,
/// so adding a method is a compile-time checklist of every place that
/// needs to handle it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical US dollars.
    CashUsd,
    /// Physical bolivars.
    CashBs,
    /// Pago Móvil (domestic instant transfer).
    MobilePayment,
    /// Bank wire transfer.
    WireTransfer,
    /// Card on an external terminal.
    Card,
    Zelle,
    Binance,
    /// Internal bookkeeping method for balance adjustments.
    Adjustment,
}

impl PaymentMethod {
    /// Electronic methods are reconciled against bank statements by
    /// reference number, so one is mandatory.
    pub fn requires_reference(&self) -> bool {
        use PaymentMethod::*;
        match self {
            MobilePayment | WireTransfer | Zelle | Binance => true,
            CashUsd | CashBs | Card | Adjustment => false,
        }
    }

    /// Cash methods are what the till count reconciles against.
    pub fn is_cash(&self) -> bool {
        use PaymentMethod::*;
        match self {
            CashUsd | CashBs => true,
            MobilePayment | WireTransfer | Card | Zelle | Binance | Adjustment => false,
        }
    }
}

// =============================================================================
// Entry Kind
// =============================================================================

/// What an entry represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// Money received from a guest.
    Payment,
    /// Amount accrued against a folio (room nights, extras).
    Charge,
    /// Guest balance correction (credit sweep, debt settlement).
    Adjustment,
    /// Money returned to a guest.
    Refund,
}

// =============================================================================
// Ledger Entry
// =============================================================================

/// One immutable row in the transaction ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct LedgerEntry {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Folio this entry is against, if any.
    pub folio_id: Option<String>,

    /// Guest this entry is against, if any.
    pub guest_id: Option<String>,

    /// Signed amount in home-currency cents.
    pub amount_cents: i64,

    /// Exchange rate in effect when the entry was recorded, milli-units.
    pub rate_milli: i64,

    /// Secondary-currency amount derived through `rate_milli`, frozen.
    pub secondary_cents: i64,

    pub method: PaymentMethod,

    /// Bank/transfer reference for electronic methods.
    pub reference: Option<String>,

    pub kind: EntryKind,

    /// Human-readable description ("Room 12, 2 nights", "Laundry", ...).
    pub concept: String,

    pub recorded_at: DateTime<Utc>,

    /// Staff user who recorded the entry.
    pub user_id: String,

    /// Shift the entry was recorded under, if the till was open.
    pub shift_id: Option<String>,
}

impl LedgerEntry {
    /// Returns the home-currency amount as Money.
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }

    /// Returns the frozen secondary-currency amount as Money.
    #[inline]
    pub fn secondary_amount(&self) -> Money {
        Money::from_cents(self.secondary_cents)
    }
}

// =============================================================================
// Per-Method Summary
// =============================================================================

/// Aggregated totals for one payment method over a set of entries.
///
/// Used by the shift report: "how much came in by Zelle tonight?"
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MethodSummary {
    /// Payment entries, home cents.
    pub payments_cents: i64,
    /// Charge entries, home cents.
    pub charges_cents: i64,
    /// All entries combined, home cents.
    pub total_cents: i64,
    /// All entries combined, secondary cents (frozen per entry).
    pub total_secondary_cents: i64,
    pub entry_count: i64,
}

/// Reduces a slice of entries to per-method summaries.
///
/// Payment entries land in the payments bucket; everything else (charges,
/// adjustments, refunds) lands in the charges bucket so the combined total
/// always equals the sum of all entries.
///
/// BTreeMap keeps report ordering stable across runs.
pub fn summarize_by_method(entries: &[LedgerEntry]) -> BTreeMap<PaymentMethod, MethodSummary> {
    let mut map: BTreeMap<PaymentMethod, MethodSummary> = BTreeMap::new();

    for entry in entries {
        let summary = map.entry(entry.method).or_default();
        match entry.kind {
            EntryKind::Payment => summary.payments_cents += entry.amount_cents,
            EntryKind::Charge | EntryKind::Adjustment | EntryKind::Refund => {
                summary.charges_cents += entry.amount_cents
            }
        }
        summary.total_cents += entry.amount_cents;
        summary.total_secondary_cents += entry.secondary_cents;
        summary.entry_count += 1;
    }

    map
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(method: PaymentMethod, kind: EntryKind, cents: i64, secondary: i64) -> LedgerEntry {
        LedgerEntry {
            id: uuid::Uuid::new_v4().to_string(),
            folio_id: None,
            guest_id: None,
            amount_cents: cents,
            rate_milli: 35_500,
            secondary_cents: secondary,
            method,
            reference: None,
            kind,
            concept: "test".to_string(),
            recorded_at: Utc::now(),
            user_id: "u-1".to_string(),
            shift_id: None,
        }
    }

    #[test]
    fn test_requires_reference() {
        assert!(PaymentMethod::MobilePayment.requires_reference());
        assert!(PaymentMethod::WireTransfer.requires_reference());
        assert!(PaymentMethod::Zelle.requires_reference());
        assert!(PaymentMethod::Binance.requires_reference());

        assert!(!PaymentMethod::CashUsd.requires_reference());
        assert!(!PaymentMethod::CashBs.requires_reference());
        assert!(!PaymentMethod::Card.requires_reference());
        assert!(!PaymentMethod::Adjustment.requires_reference());
    }

    #[test]
    fn test_is_cash() {
        assert!(PaymentMethod::CashUsd.is_cash());
        assert!(PaymentMethod::CashBs.is_cash());
        assert!(!PaymentMethod::Zelle.is_cash());
        assert!(!PaymentMethod::Adjustment.is_cash());
    }

    #[test]
    fn test_summarize_by_method() {
        let entries = vec![
            entry(PaymentMethod::CashUsd, EntryKind::Payment, 5000, 177_500),
            entry(PaymentMethod::CashUsd, EntryKind::Payment, 2500, 88_750),
            entry(PaymentMethod::Zelle, EntryKind::Payment, 8000, 284_000),
            entry(PaymentMethod::Adjustment, EntryKind::Charge, 4000, 142_000),
        ];

        let summary = summarize_by_method(&entries);

        let cash = &summary[&PaymentMethod::CashUsd];
        assert_eq!(cash.payments_cents, 7500);
        assert_eq!(cash.charges_cents, 0);
        assert_eq!(cash.total_cents, 7500);
        assert_eq!(cash.total_secondary_cents, 266_250);
        assert_eq!(cash.entry_count, 2);

        let zelle = &summary[&PaymentMethod::Zelle];
        assert_eq!(zelle.payments_cents, 8000);
        assert_eq!(zelle.entry_count, 1);

        let adj = &summary[&PaymentMethod::Adjustment];
        assert_eq!(adj.payments_cents, 0);
        assert_eq!(adj.charges_cents, 4000);
    }

    #[test]
    fn test_summarize_adjustments_and_refunds_go_to_charges() {
        let entries = vec![
            entry(PaymentMethod::CashUsd, EntryKind::Refund, -1000, -35_500),
            entry(PaymentMethod::Adjustment, EntryKind::Adjustment, 500, 17_750),
        ];

        let summary = summarize_by_method(&entries);
        assert_eq!(summary[&PaymentMethod::CashUsd].charges_cents, -1000);
        assert_eq!(summary[&PaymentMethod::Adjustment].charges_cents, 500);
        // Combined total still equals the sum of all entries
        let total: i64 = summary.values().map(|s| s.total_cents).sum();
        assert_eq!(total, -500);
    }
}
