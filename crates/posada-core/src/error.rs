//! # Error Types
//!
//! Domain-specific error types for posada-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  posada-core errors (this file)                                         │
//! │  ├── CoreError        - Business rule violations                        │
//! │  └── ValidationError  - Input validation failures                       │
//! │                                                                         │
//! │  posada-db errors (separate crate)                                      │
//! │  ├── DbError          - Database operation failures                     │
//! │  └── ServiceError     - What the presentation layer sees                │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ServiceError → UI                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (room number, amounts, etc.)
//! 3. Errors are enum variants, never String
//! 4. A rejected command mutates nothing; callers can retry after fixing
//!    the input

use thiserror::Error;

use crate::types::RoomStatus;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations or domain logic failures.
/// They should be caught and translated to user-friendly messages.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Room exists but is not in a state that allows check-in.
    ///
    /// ## When This Occurs
    /// - Check-in against an Occupied, Cleaning, or Maintenance room
    /// - Two receptionists racing for the same room (the second loses)
    #[error("Room {room} is {status:?}, not available for check-in")]
    RoomNotAvailable { room: i64, status: RoomStatus },

    /// Requested room status change is not in the transition table.
    ///
    /// ## When This Occurs
    /// - Marking a Free room as Cleaning
    /// - Releasing an Occupied room without settling its folio
    #[error("Room {room} cannot go from {from:?} to {to:?}")]
    InvalidRoomTransition {
        room: i64,
        from: RoomStatus,
        to: RoomStatus,
    },

    /// Folio is not Active, so charges/payments/closure are refused.
    ///
    /// ## When This Occurs
    /// - Adding an extra to a folio that was already checked out
    /// - Checking out twice
    #[error("Folio {folio_id} is {status}, operation requires an active folio")]
    FolioNotActive { folio_id: String, status: String },

    /// Money-moving operation attempted with no open cashier shift.
    #[error("No open shift; open a shift before recording transactions")]
    NoOpenShift,

    /// A shift is already open; only one may be open at a time.
    #[error("Shift {shift_id} is already open")]
    ShiftAlreadyOpen { shift_id: String },

    /// Shift is not open, so it cannot be closed or written to.
    #[error("Shift {shift_id} is not open")]
    ShiftNotOpen { shift_id: String },

    /// Payment lines do not cover the amount due.
    ///
    /// ## User Workflow
    /// ```text
    /// Check-in: stay total $80.00
    ///      │
    ///      ▼
    /// Payment lines add up to $75.00
    ///      │
    ///      ▼
    /// InsufficientPayment { required: 8000, paid: 7500 }
    ///      │
    ///      ▼
    /// UI shows: "$5.00 still due" — nothing was written
    /// ```
    #[error("Insufficient payment: required {required_cents} cents, got {paid_cents}")]
    InsufficientPayment {
        required_cents: i64,
        paid_cents: i64,
    },

    /// Discount would push the stay total negative.
    #[error("Discount of {discount_cents} cents exceeds stay total of {stay_total_cents}")]
    DiscountExceedsTotal {
        discount_cents: i64,
        stay_total_cents: i64,
    },

    /// The user's role does not allow this operation.
    ///
    /// ## When This Occurs
    /// - A receptionist tries to close the shift
    #[error("Role {role} is not permitted to {action}")]
    NotPermitted { action: String, role: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID, invalid email).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Exchange rate must be strictly positive.
    ///
    /// A zero rate would silently convert every amount to zero; it is a
    /// configuration fault and is rejected at the boundary.
    #[error("Exchange rate must be positive, got {milli} milli-units")]
    InvalidExchangeRate { milli: i64 },

    /// Payment method requires a reference number and none was provided.
    ///
    /// Electronic methods (mobile payment, wire transfer, Zelle, Binance)
    /// are reconciled against bank statements by reference.
    #[error("Payment method {method} requires a reference number")]
    MissingReference { method: String },

    /// Duplicate value (e.g., duplicate document id or username).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
