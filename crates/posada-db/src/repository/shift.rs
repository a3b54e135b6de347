//! # Shift Repository
//!
//! Database operations for cashier shifts.
//!
//! ## One Open Shift
//! The partial unique index `idx_shifts_one_open` makes opening atomic:
//! a second concurrent open fails at INSERT time with a unique violation,
//! which this repository surfaces as `DbError::UniqueViolation`. The
//! service layer turns that into the domain's already-open error.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use posada_core::{Shift, ShiftStatus, ShiftTotals};

pub(crate) const SHIFT_COLUMNS: &str = "id, user_id, opened_at, closed_at, \
     opening_rate_milli, closing_rate_milli, opening_cash_usd_cents, \
     opening_cash_bs_cents, closing_cash_usd_cents, closing_cash_bs_cents, \
     sales_total_cents, payments_total_cents, cash_usd_payments_cents, \
     cash_bs_payments_cents, status, notes";

/// Repository for shift database operations.
#[derive(Debug, Clone)]
pub struct ShiftRepository {
    pool: SqlitePool,
}

impl ShiftRepository {
    /// Creates a new ShiftRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ShiftRepository { pool }
    }

    /// Inserts a freshly opened shift.
    pub async fn insert(&self, shift: &Shift) -> DbResult<()> {
        debug!(id = %shift.id, user_id = %shift.user_id, "Inserting shift");

        sqlx::query(
            r#"
            INSERT INTO shifts (
                id, user_id, opened_at, closed_at,
                opening_rate_milli, closing_rate_milli,
                opening_cash_usd_cents, opening_cash_bs_cents,
                closing_cash_usd_cents, closing_cash_bs_cents,
                sales_total_cents, payments_total_cents,
                cash_usd_payments_cents, cash_bs_payments_cents,
                status, notes
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
            "#,
        )
        .bind(&shift.id)
        .bind(&shift.user_id)
        .bind(shift.opened_at)
        .bind(shift.closed_at)
        .bind(shift.opening_rate_milli)
        .bind(shift.closing_rate_milli)
        .bind(shift.opening_cash_usd_cents)
        .bind(shift.opening_cash_bs_cents)
        .bind(shift.closing_cash_usd_cents)
        .bind(shift.closing_cash_bs_cents)
        .bind(shift.sales_total_cents)
        .bind(shift.payments_total_cents)
        .bind(shift.cash_usd_payments_cents)
        .bind(shift.cash_bs_payments_cents)
        .bind(shift.status)
        .bind(&shift.notes)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a shift by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Shift>> {
        let shift = sqlx::query_as::<_, Shift>(&format!(
            "SELECT {SHIFT_COLUMNS} FROM shifts WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(shift)
    }

    /// Gets a shift by ID or fails with NotFound.
    pub async fn require(&self, id: &str) -> DbResult<Shift> {
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Shift", id))
    }

    /// The currently open shift, if any.
    ///
    /// The partial unique index guarantees at most one row.
    pub async fn get_open(&self) -> DbResult<Option<Shift>> {
        let shift = sqlx::query_as::<_, Shift>(&format!(
            "SELECT {SHIFT_COLUMNS} FROM shifts WHERE status = 'open'"
        ))
        .fetch_optional(&self.pool)
        .await?;

        Ok(shift)
    }

    /// Writes recomputed ledger totals onto an open shift row.
    pub async fn update_totals(&self, id: &str, totals: &ShiftTotals) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE shifts SET
                sales_total_cents = ?2, payments_total_cents = ?3,
                cash_usd_payments_cents = ?4, cash_bs_payments_cents = ?5
            WHERE id = ?1 AND status = 'open'
            "#,
        )
        .bind(id)
        .bind(totals.sales_cents)
        .bind(totals.payments_cents)
        .bind(totals.cash_usd_cents)
        .bind(totals.cash_bs_cents)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Open shift", id));
        }

        Ok(())
    }

    /// Closes a shift: stores the recount, closing rate and final totals.
    ///
    /// The `status = 'open'` guard makes a double close lose cleanly.
    pub async fn close(&self, shift: &Shift) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE shifts SET
                closed_at = ?2, closing_rate_milli = ?3,
                closing_cash_usd_cents = ?4, closing_cash_bs_cents = ?5,
                sales_total_cents = ?6, payments_total_cents = ?7,
                cash_usd_payments_cents = ?8, cash_bs_payments_cents = ?9,
                status = ?10, notes = ?11
            WHERE id = ?1 AND status = 'open'
            "#,
        )
        .bind(&shift.id)
        .bind(shift.closed_at.unwrap_or_else(Utc::now))
        .bind(shift.closing_rate_milli)
        .bind(shift.closing_cash_usd_cents)
        .bind(shift.closing_cash_bs_cents)
        .bind(shift.sales_total_cents)
        .bind(shift.payments_total_cents)
        .bind(shift.cash_usd_payments_cents)
        .bind(shift.cash_bs_payments_cents)
        .bind(ShiftStatus::Closed)
        .bind(&shift.notes)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Open shift", &shift.id));
        }

        info!(id = %shift.id, "Shift closed");
        Ok(())
    }

    /// Recent shifts, newest first (the shift history screen).
    pub async fn list_recent(&self, limit: i64) -> DbResult<Vec<Shift>> {
        let shifts = sqlx::query_as::<_, Shift>(&format!(
            "SELECT {SHIFT_COLUMNS} FROM shifts ORDER BY opened_at DESC LIMIT ?1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(shifts)
    }
}
