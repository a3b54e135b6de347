//! # posada-db: Database Layer for Posada
//!
//! This crate provides database access for the Posada front-desk system.
//! It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Posada Data Flow                                  │
//! │                                                                         │
//! │  Front-desk command (check_in, close_shift, ...)                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    posada-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────────┐   ┌───────────────┐   ┌──────────────────┐   │   │
//! │  │   │  Database   │   │ Repositories  │   │    Services      │   │   │
//! │  │   │  (pool.rs)  │   │ (guest, room, │   │ FrontDesk, Till  │   │   │
//! │  │   │             │   │  folio, ...)  │   │ (one SQL tx per  │   │   │
//! │  │   │ SqlitePool  │◄──│ single-entity │◄──│  command)        │   │   │
//! │  │   │ Migrations  │   │ reads/writes  │   │                  │   │   │
//! │  │   └─────────────┘   └───────────────┘   └──────────────────┘   │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │        WAL mode, foreign keys on, embedded migrations           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//!
//! 1. **Repositories stay simple**: single-entity reads and writes only
//! 2. **Services own transactions**: every multi-table command commits
//!    atomically or not at all
//! 3. **Domain logic stays in posada-core**: this crate never re-decides
//!    what the pure logic already decided
//! 4. **The ledger is append-only**: no UPDATE or DELETE path exists for
//!    `ledger_entries`

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod service;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use repository::config::ConfigRepository;
pub use repository::folio::{FolioRepository, FolioWithDetails};
pub use repository::guest::GuestRepository;
pub use repository::ledger::LedgerRepository;
pub use repository::room::RoomRepository;
pub use repository::shift::ShiftRepository;
pub use repository::user::{hash_password, UserRepository};
pub use service::frontdesk::{
    CheckInReceipt, CheckInRequest, CheckOutReceipt, CheckOutRequest, FrontDesk, PaymentReceipt,
    TenderLine,
};
pub use service::till::{ShiftReport, Till};
pub use service::{ServiceError, ServiceResult};
