//! # Service Layer
//!
//! Multi-table commands. Repositories do single-entity reads and simple
//! writes; everything that must move several rows together (check-in,
//! check-out, shift close) lives here, inside one SQL transaction per
//! command.
//!
//! ## Command Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Read everything the command needs (no locks held)                   │
//! │  2. Run the pure domain logic — posada-core decides yes/no              │
//! │  3. A "no" returns here: NOTHING has been written                       │
//! │  4. A "yes" opens ONE transaction and writes every row                  │
//! │  5. Commit; partial writes cannot survive a failure                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::error::DbError;
use posada_core::CoreError;

pub mod frontdesk;
pub mod till;

/// What the presentation layer sees: a business rule said no, or the
/// database failed.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// A domain rule refused the command; nothing was written.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Storage failure.
    #[error(transparent)]
    Db(#[from] DbError),
}

/// Result type for service commands.
pub type ServiceResult<T> = Result<T, ServiceError>;
