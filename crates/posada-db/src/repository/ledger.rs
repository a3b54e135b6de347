//! # Ledger Repository
//!
//! Read access to the append-only transaction ledger.
//!
//! ## Append-Only Discipline
//! Inserts happen in the service layer, inside the transaction that also
//! applies the entry's side effects (folio paid total, guest balance).
//! There is no update or delete path for ledger rows anywhere in the
//! codebase; corrections are new compensating entries.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::collections::BTreeMap;

use crate::error::DbResult;
use posada_core::{EntryKind, LedgerEntry, MethodSummary, PaymentMethod};

pub(crate) const ENTRY_COLUMNS: &str = "id, folio_id, guest_id, amount_cents, rate_milli, \
     secondary_cents, method, reference, kind, concept, recorded_at, user_id, shift_id";

/// Repository for ledger reads and reporting.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    pool: SqlitePool,
}

impl LedgerRepository {
    /// Creates a new LedgerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        LedgerRepository { pool }
    }

    /// Entries against one folio, most recent first.
    pub async fn list_by_folio(&self, folio_id: &str) -> DbResult<Vec<LedgerEntry>> {
        let entries = sqlx::query_as::<_, LedgerEntry>(&format!(
            "SELECT {ENTRY_COLUMNS} FROM ledger_entries WHERE folio_id = ?1 ORDER BY recorded_at DESC"
        ))
        .bind(folio_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// Entries against one guest, most recent first.
    pub async fn list_by_guest(&self, guest_id: &str) -> DbResult<Vec<LedgerEntry>> {
        let entries = sqlx::query_as::<_, LedgerEntry>(&format!(
            "SELECT {ENTRY_COLUMNS} FROM ledger_entries WHERE guest_id = ?1 ORDER BY recorded_at DESC"
        ))
        .bind(guest_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// Entries recorded under one shift, most recent first.
    pub async fn list_by_shift(&self, shift_id: &str) -> DbResult<Vec<LedgerEntry>> {
        let entries = sqlx::query_as::<_, LedgerEntry>(&format!(
            "SELECT {ENTRY_COLUMNS} FROM ledger_entries WHERE shift_id = ?1 ORDER BY recorded_at DESC"
        ))
        .bind(shift_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// Entries within a date range, most recent first (daily reports).
    pub async fn list_by_date_range(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DbResult<Vec<LedgerEntry>> {
        let entries = sqlx::query_as::<_, LedgerEntry>(&format!(
            r#"
            SELECT {ENTRY_COLUMNS} FROM ledger_entries
            WHERE recorded_at >= ?1 AND recorded_at < ?2
            ORDER BY recorded_at DESC
            "#
        ))
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// Per-method totals for one shift, aggregated in SQL.
    ///
    /// Payment entries land in the payments bucket; charges, adjustments
    /// and refunds land in the charges bucket (same reduction as
    /// `posada_core::summarize_by_method`, pushed down to the database).
    pub async fn summary_by_method(
        &self,
        shift_id: &str,
    ) -> DbResult<BTreeMap<PaymentMethod, MethodSummary>> {
        let rows = sqlx::query_as::<_, (PaymentMethod, EntryKind, i64, i64, i64)>(
            r#"
            SELECT method, kind,
                   SUM(amount_cents), SUM(secondary_cents), COUNT(*)
            FROM ledger_entries
            WHERE shift_id = ?1
            GROUP BY method, kind
            ORDER BY method, kind
            "#,
        )
        .bind(shift_id)
        .fetch_all(&self.pool)
        .await?;

        let mut map: BTreeMap<PaymentMethod, MethodSummary> = BTreeMap::new();
        for (method, kind, amount, secondary, count) in rows {
            let summary = map.entry(method).or_default();
            match kind {
                EntryKind::Payment => summary.payments_cents += amount,
                EntryKind::Charge | EntryKind::Adjustment | EntryKind::Refund => {
                    summary.charges_cents += amount
                }
            }
            summary.total_cents += amount;
            summary.total_secondary_cents += secondary;
            summary.entry_count += count;
        }

        Ok(map)
    }

    /// Total number of ledger entries (diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM ledger_entries")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
