//! # Folio Repository
//!
//! Database operations for folios and their extra charges.
//!
//! ## Who Writes What
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  This repository: reads, history queries, and simple inserts.           │
//! │                                                                         │
//! │  The FrontDesk service: every multi-table mutation (check-in,           │
//! │  check-out, cancel, add-extra) runs its SQL inside one transaction,     │
//! │  so a folio row never changes without its room/ledger counterparts.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use posada_core::{ExtraCharge, Folio, RoomCategory};

pub(crate) const FOLIO_COLUMNS: &str = "id, guest_id, room_number, check_in_at, \
     expected_checkout_at, actual_checkout_at, status, room_total_cents, \
     extras_total_cents, discounts_total_cents, paid_total_cents, notes, \
     opened_by, closed_by";

/// A folio joined with the display fields every history screen needs.
///
/// Kept deliberately narrow: guest name and room category, nothing more.
#[derive(Debug, Clone, serde::Serialize, sqlx::FromRow)]
pub struct FolioWithDetails {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub folio: Folio,
    pub guest_name: String,
    pub room_category: RoomCategory,
}

/// Repository for folio database operations.
#[derive(Debug, Clone)]
pub struct FolioRepository {
    pool: SqlitePool,
}

impl FolioRepository {
    /// Creates a new FolioRepository.
    pub fn new(pool: SqlitePool) -> Self {
        FolioRepository { pool }
    }

    /// Gets a folio by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Folio>> {
        let folio = sqlx::query_as::<_, Folio>(&format!(
            "SELECT {FOLIO_COLUMNS} FROM folios WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(folio)
    }

    /// Gets a folio by ID or fails with NotFound.
    pub async fn require(&self, id: &str) -> DbResult<Folio> {
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Folio", id))
    }

    /// The active folio for a room, if any.
    ///
    /// The partial unique index guarantees at most one row.
    pub async fn get_active_by_room(&self, room_number: i64) -> DbResult<Option<Folio>> {
        let folio = sqlx::query_as::<_, Folio>(&format!(
            "SELECT {FOLIO_COLUMNS} FROM folios WHERE room_number = ?1 AND status = 'active'"
        ))
        .bind(room_number)
        .fetch_optional(&self.pool)
        .await?;

        Ok(folio)
    }

    /// All in-house folios with guest and room details, newest first.
    pub async fn list_active(&self) -> DbResult<Vec<FolioWithDetails>> {
        let folios = sqlx::query_as::<_, FolioWithDetails>(
            r#"
            SELECT f.*, g.first_name || ' ' || g.last_name AS guest_name,
                   r.category AS room_category
            FROM folios f
            JOIN guests g ON g.id = f.guest_id
            JOIN rooms r ON r.number = f.room_number
            WHERE f.status = 'active'
            ORDER BY f.check_in_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(folios)
    }

    /// Stay history for one guest, newest first.
    pub async fn list_by_guest(&self, guest_id: &str) -> DbResult<Vec<FolioWithDetails>> {
        let folios = sqlx::query_as::<_, FolioWithDetails>(
            r#"
            SELECT f.*, g.first_name || ' ' || g.last_name AS guest_name,
                   r.category AS room_category
            FROM folios f
            JOIN guests g ON g.id = f.guest_id
            JOIN rooms r ON r.number = f.room_number
            WHERE f.guest_id = ?1
            ORDER BY f.check_in_at DESC
            "#,
        )
        .bind(guest_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(folios)
    }

    /// Folios checked in within a date range, newest first.
    pub async fn list_by_date_range(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DbResult<Vec<FolioWithDetails>> {
        let folios = sqlx::query_as::<_, FolioWithDetails>(
            r#"
            SELECT f.*, g.first_name || ' ' || g.last_name AS guest_name,
                   r.category AS room_category
            FROM folios f
            JOIN guests g ON g.id = f.guest_id
            JOIN rooms r ON r.number = f.room_number
            WHERE f.check_in_at >= ?1 AND f.check_in_at < ?2
            ORDER BY f.check_in_at DESC
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(folios)
    }

    /// The extra-charge lines of a folio in the order they were recorded.
    pub async fn list_extras(&self, folio_id: &str) -> DbResult<Vec<ExtraCharge>> {
        debug!(folio_id = %folio_id, "Listing extra charges");

        let extras = sqlx::query_as::<_, ExtraCharge>(
            r#"
            SELECT id, folio_id, description, unit_amount_cents, quantity,
                   recorded_at, user_id
            FROM extra_charges
            WHERE folio_id = ?1
            ORDER BY recorded_at
            "#,
        )
        .bind(folio_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(extras)
    }

    /// Number of currently active folios (occupancy figure).
    pub async fn count_active(&self) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM folios WHERE status = 'active'")
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }
}
