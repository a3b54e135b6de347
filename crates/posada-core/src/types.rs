//! # Domain Types
//!
//! Core domain types used throughout Posada.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Guest       │   │      Room       │   │      User       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  number (PK)    │   │  id (UUID)      │       │
//! │  │  document (biz) │   │  category       │   │  username (biz) │       │
//! │  │  balance_cents  │   │  status         │   │  role           │       │
//! │  └─────────────────┘   │  price_cents    │   └─────────────────┘       │
//! │                        └─────────────────┘                              │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   RoomStatus    │   │  RoomCategory   │   │    UserRole     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  Free           │   │  Single         │   │  Admin          │       │
//! │  │  Occupied       │   │  Double         │   │  Receptionist   │       │
//! │  │  Reserved       │   │  Suite          │   │  Manager        │       │
//! │  │  Cleaning       │   │  Presidential   │   └─────────────────┘       │
//! │  │  Maintenance    │   └─────────────────┘                              │
//! │  └─────────────────┘                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Most entities have:
//! - `id`: UUID v4 - immutable, used for database relations
//! - Business ID: (document, username, room number) - human-readable
//!
//! Folio, ledger and shift types live in their own modules; this module
//! holds the registry-style entities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::{ExchangeRate, Money};

// =============================================================================
// Guest
// =============================================================================

/// A registered guest.
///
/// Guests are never deleted: their running balance and visit history are
/// the institutional memory of the front desk.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Guest {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Identity document number - business identifier, unique.
    pub document: String,

    pub first_name: String,
    pub last_name: String,

    pub phone: Option<String>,
    pub email: Option<String>,
    pub nationality: Option<String>,
    pub profession: Option<String>,

    /// Vehicle description, if the guest arrived with one.
    pub vehicle: Option<String>,
    pub plate: Option<String>,

    /// Running balance in home-currency cents.
    ///
    /// Positive = credit the house owes the guest (overpayment carried
    /// forward). Negative = debt the guest owes the house. Mutated only
    /// through adjustment entries recorded in the ledger.
    pub balance_cents: i64,

    pub notes: Option<String>,

    /// When the guest was first registered.
    pub registered_at: DateTime<Utc>,

    /// Last check-in, for returning-guest lookups.
    pub last_visit_at: Option<DateTime<Utc>>,
}

impl Guest {
    /// Returns the balance as Money.
    #[inline]
    pub fn balance(&self) -> Money {
        Money::from_cents(self.balance_cents)
    }

    /// True when the house owes the guest money.
    #[inline]
    pub fn has_credit(&self) -> bool {
        self.balance_cents > 0
    }

    /// True when the guest owes the house money.
    #[inline]
    pub fn has_debt(&self) -> bool {
        self.balance_cents < 0
    }

    /// "First Last" for display and joined queries.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

// =============================================================================
// Room Status
// =============================================================================

/// The housekeeping/occupancy status of a room.
///
/// ## State Machine
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                                                                         │
/// │          ┌──────────── check-in ────────────┐                           │
/// │          │                                  ▼                           │
/// │      ┌───┴───┐ reserve ┌──────────┐    ┌──────────┐                     │
/// │      │ Free  │────────►│ Reserved │───►│ Occupied │                     │
/// │      │       │◄────────│          │    │          │                     │
/// │      └───┬───┘ release └──────────┘    └────┬─────┘                     │
/// │        ▲ │                                  │ check-out / cancel        │
/// │        │ │ maintenance                      ▼                           │
/// │  ready │ │              ┌─────────────┐  ┌──────────┐                   │
/// │        │ └─────────────►│ Maintenance │  │ Cleaning │                   │
/// │        │                └──────┬──────┘  └────┬─────┘                   │
/// │        │                       │ repaired     │                         │
/// │        └───────────────────────┴──────────────┘                         │
/// │                                                                         │
/// │  No timers: every transition is an explicit staff action.              │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum RoomStatus {
    /// Clean and ready to sell.
    Free,
    /// A guest is checked in (an Active folio exists).
    Occupied,
    /// Held for an expected arrival.
    Reserved,
    /// Guest left; housekeeping has not released the room yet.
    Cleaning,
    /// Out of service.
    Maintenance,
}

impl RoomStatus {
    /// Whether `self → to` is a legal transition.
    ///
    /// The table is exhaustive: anything not listed is rejected. In
    /// particular Occupied→Free is impossible without passing through
    /// Cleaning, and an Occupied room is only released by settling or
    /// cancelling its folio.
    pub fn can_transition_to(&self, to: RoomStatus) -> bool {
        use RoomStatus::*;
        matches!(
            (*self, to),
            (Free, Occupied)
                | (Free, Reserved)
                | (Free, Maintenance)
                | (Reserved, Occupied)
                | (Reserved, Free)
                | (Occupied, Cleaning)
                | (Cleaning, Free)
                | (Maintenance, Free)
        )
    }
}

impl Default for RoomStatus {
    fn default() -> Self {
        RoomStatus::Free
    }
}

// =============================================================================
// Room Category
// =============================================================================

/// Room category, which determines the base nightly price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum RoomCategory {
    Single,
    Double,
    Suite,
    Presidential,
}

// =============================================================================
// Room
// =============================================================================

/// A physical room.
///
/// Identified by its door number rather than a UUID: the number is stable,
/// human-facing, and what every other record refers to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Room {
    /// Door number - primary key.
    pub number: i64,

    pub category: RoomCategory,

    pub description: Option<String>,

    /// Nightly price in home-currency cents.
    pub price_cents: i64,

    /// Maximum occupancy.
    pub capacity: i64,

    pub status: RoomStatus,

    /// When housekeeping last released the room.
    pub last_cleaned_at: Option<DateTime<Utc>>,

    pub notes: Option<String>,
}

impl Room {
    /// Returns the nightly price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Whether the room can take a walk-in check-in right now.
    #[inline]
    pub fn is_available(&self) -> bool {
        self.status == RoomStatus::Free
    }
}

// =============================================================================
// User Role
// =============================================================================

/// Role of a staff user, controlling what operations they may perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    Receptionist,
    Manager,
}

impl UserRole {
    /// Receptionists record transactions but cannot close the till.
    pub fn can_close_shift(&self) -> bool {
        matches!(self, UserRole::Admin | UserRole::Manager)
    }

    /// Only admins manage users and edit hotel configuration.
    pub fn can_manage_users(&self) -> bool {
        matches!(self, UserRole::Admin)
    }
}

// =============================================================================
// User
// =============================================================================

/// A staff user of the front-desk system.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct User {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Login name - business identifier, unique.
    pub username: String,

    /// SHA-256 hex digest of the password.
    ///
    /// Never serialized out to the presentation layer.
    #[serde(skip_serializing)]
    pub password_hash: String,

    pub full_name: String,

    pub role: UserRole,

    /// Soft delete: inactive users cannot authenticate.
    pub is_active: bool,

    pub last_access_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Session
// =============================================================================

/// Runtime-only session state for the logged-in user.
///
/// Never persisted: restarting the application requires a fresh login, and
/// the open shift is rediscovered from the database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub username: String,
    pub full_name: String,
    pub role: UserRole,
    /// Shift the user is working against, once one is open.
    pub shift_id: Option<String>,
    pub logged_in_at: DateTime<Utc>,
}

// =============================================================================
// Hotel Configuration
// =============================================================================

/// Hotel-wide configuration. Single row (id = 1) in storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct HotelConfig {
    /// Current exchange rate in milli-units (35_500 = 35.500 Bs/USD).
    pub exchange_rate_milli: i64,

    pub hotel_name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,

    /// Fiscal identifier printed on receipts.
    pub tax_id: Option<String>,

    pub updated_at: DateTime<Utc>,
}

impl HotelConfig {
    /// Returns the configured rate as a validated `ExchangeRate`.
    ///
    /// Fails if the stored value was corrupted to zero or below; callers
    /// surface this as a configuration error rather than converting with
    /// a bogus rate.
    pub fn exchange_rate(&self) -> Result<ExchangeRate, crate::error::ValidationError> {
        ExchangeRate::from_milli(self.exchange_rate_milli)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
