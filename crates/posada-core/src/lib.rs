//! # posada-core: Pure Business Logic for Posada
//!
//! This crate is the **heart** of Posada. It contains all front-desk
//! business logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Posada Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Front Desk UI                                │   │
//! │  │   Rooms board ──► Check-in ──► Payments ──► Shift close        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              posada-db services (FrontDesk, Till)               │   │
//! │  │    check_in, add_extra, record_payment, check_out, close_shift  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ posada-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │  ┌────────┐ ┌────────┐ ┌────────┐ ┌────────────┐ ┌──────────┐  │   │
//! │  │  │ money  │ │ folio  │ │ ledger │ │ allocation │ │  shift   │  │   │
//! │  │  │ Money  │ │ Folio  │ │ Entry  │ │ SplitPay   │ │ Variance │  │   │
//! │  │  │ Rate   │ │ Extras │ │ Method │ │ Change     │ │ Totals   │  │   │
//! │  │  └────────┘ └────────┘ └────────┘ └────────────┘ └──────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    posada-db (Database Layer)                   │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Registry entities (Guest, Room, User, HotelConfig)
//! - [`money`] - Money and ExchangeRate with integer arithmetic (no floats!)
//! - [`folio`] - Folio engine: accrual, discounts, settlement
//! - [`ledger`] - Immutable transaction ledger types and summaries
//! - [`allocation`] - Split-tender payment allocation
//! - [`shift`] - Cashier shift totals and cash variance
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//! 5. **Immutable History**: Ledger entries are never edited; corrections are
//!    new compensating entries
//!
//! ## Example Usage
//!
//! ```rust
//! use posada_core::money::{ExchangeRate, Money};
//!
//! // Create money from cents (never from floats!)
//! let nightly = Money::from_cents(4000); // $40.00
//!
//! // Convert through a validated exchange rate
//! let rate = ExchangeRate::from_milli(35_500).unwrap(); // 35.500 Bs/USD
//! let in_bs = rate.to_secondary(nightly);
//! assert_eq!(in_bs.cents(), 142_000); // Bs 1,420.00
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod allocation;
pub mod error;
pub mod folio;
pub mod ledger;
pub mod money;
pub mod shift;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use posada_core::Money` instead of
// `use posada_core::money::Money`

pub use allocation::{AllocationStatus, PaymentAllocation, PaymentLine};
pub use error::{CoreError, CoreResult, ValidationError};
pub use folio::{CarryForward, ExtraCharge, Folio, FolioStatus, Settlement};
pub use ledger::{summarize_by_method, EntryKind, LedgerEntry, MethodSummary, PaymentMethod};
pub use money::{ExchangeRate, Money};
pub use shift::{CashVariance, Shift, ShiftStatus, ShiftTotals};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default exchange rate in milli-units (35.500 Bs/USD).
///
/// ## Why a constant?
/// Used only when provisioning a fresh database; after that the rate lives
/// in the configuration row and is re-posted at every shift opening.
pub const DEFAULT_EXCHANGE_RATE_MILLI: i64 = 35_500;

/// Maximum quantity of a single extra-charge line
///
/// ## Business Reason
/// Prevents accidental over-charging (e.g., typing 1000 instead of 10).
pub const MAX_CHARGE_QUANTITY: i64 = 999;

/// Longest stay accepted at check-in, in nights
///
/// ## Business Reason
/// A fat-fingered year-long stay would accrue an absurd room total; long
/// stays are negotiated and entered month by month.
pub const MAX_STAY_NIGHTS: i64 = 365;
