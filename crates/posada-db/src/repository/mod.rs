//! # Repository Module
//!
//! Database repository implementations for Posada.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  The Repository pattern abstracts database access behind a clean API.  │
//! │                                                                         │
//! │  UI command / service                                                   │
//! │       │                                                                 │
//! │       │  db.guests().get_by_document("V-12345678")                      │
//! │       │  ↓                                                              │
//! │       ▼                                                                 │
//! │  GuestRepository                                                        │
//! │  ├── get_by_document(&self, document)                                   │
//! │  ├── insert(&self, guest)                                               │
//! │  ├── update(&self, guest)                                               │
//! │  └── search_by_name(&self, query, limit)                                │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                        │
//! │                                                                         │
//! │  Repositories do single-entity reads and simple writes. Commands        │
//! │  that touch several tables at once (check-in, check-out, shift          │
//! │  close) live in the service layer, which runs them in one SQL           │
//! │  transaction.                                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`guest::GuestRepository`] - Guest registry and balance lookups
//! - [`room::RoomRepository`] - Room inventory and status machine
//! - [`folio::FolioRepository`] - Folios and extra charges
//! - [`ledger::LedgerRepository`] - Transaction ledger (append-only)
//! - [`shift::ShiftRepository`] - Cashier shifts
//! - [`user::UserRepository`] - Staff users and authentication
//! - [`config::ConfigRepository`] - Hotel configuration (single row)

pub mod config;
pub mod folio;
pub mod guest;
pub mod ledger;
pub mod room;
pub mod shift;
pub mod user;
