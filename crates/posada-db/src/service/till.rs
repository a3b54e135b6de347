//! # Till Service
//!
//! Cashier shift lifecycle: open with a counted drawer, recompute totals
//! from the ledger at any time, close with a recount.
//!
//! ## Closing a Shift
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  close_shift(counted $150, Bs 5,000, rate 36.000)                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Role check ── receptionists cannot close ──► NotPermitted              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Recompute totals from the ledger (never trust running counters)        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  variance = counted − (opening + cash payments), per currency           │
//! │       │                                                                 │
//! │       │  nonzero? ── logged and reported, NEVER blocks the close:       │
//! │       │             the recount is the fact, the explanation is human   │
//! │       ▼                                                                 │
//! │  Store recount + closing rate, status → closed, post new rate           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use std::collections::BTreeMap;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::DbResult;
use crate::repository::config::ConfigRepository;
use crate::repository::ledger::LedgerRepository;
use crate::repository::shift::ShiftRepository;
use crate::repository::user::UserRepository;
use crate::service::ServiceResult;
use posada_core::{
    CashVariance, CoreError, ExchangeRate, MethodSummary, Money, PaymentMethod, Shift, ShiftStatus,
    ShiftTotals,
};

// =============================================================================
// Shift Report
// =============================================================================

/// Everything the end-of-shift printout shows.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ShiftReport {
    pub shift: Shift,
    /// Per-method totals from the ledger.
    pub methods: BTreeMap<PaymentMethod, MethodSummary>,
    /// Present once the drawer has been recounted (always on a closed
    /// shift).
    pub variance: Option<CashVariance>,
}

// =============================================================================
// Till Service
// =============================================================================

/// Shift lifecycle commands.
#[derive(Debug, Clone)]
pub struct Till {
    pool: SqlitePool,
}

impl Till {
    /// Creates a new Till service.
    pub fn new(pool: SqlitePool) -> Self {
        Till { pool }
    }

    fn shifts(&self) -> ShiftRepository {
        ShiftRepository::new(self.pool.clone())
    }

    fn ledger(&self) -> LedgerRepository {
        LedgerRepository::new(self.pool.clone())
    }

    fn users(&self) -> UserRepository {
        UserRepository::new(self.pool.clone())
    }

    fn config(&self) -> ConfigRepository {
        ConfigRepository::new(self.pool.clone())
    }

    /// Opens a shift with the day's exchange rate and a counted drawer.
    ///
    /// Only one shift may be open; the partial unique index backs this up
    /// against races. The opening rate becomes the posted rate.
    pub async fn open_shift(
        &self,
        user_id: &str,
        rate_milli: i64,
        opening_cash_usd_cents: i64,
        opening_cash_bs_cents: i64,
        notes: Option<String>,
    ) -> ServiceResult<Shift> {
        let rate = ExchangeRate::from_milli(rate_milli).map_err(CoreError::from)?;
        self.users().require(user_id).await?;

        if let Some(open) = self.shifts().get_open().await? {
            return Err(CoreError::ShiftAlreadyOpen { shift_id: open.id }.into());
        }

        let shift = Shift {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            opened_at: Utc::now(),
            closed_at: None,
            opening_rate_milli: rate.milli(),
            closing_rate_milli: None,
            opening_cash_usd_cents,
            opening_cash_bs_cents,
            closing_cash_usd_cents: None,
            closing_cash_bs_cents: None,
            sales_total_cents: 0,
            payments_total_cents: 0,
            cash_usd_payments_cents: 0,
            cash_bs_payments_cents: 0,
            status: ShiftStatus::Open,
            notes,
        };

        // The unique index catches a race between the check above and here
        self.shifts().insert(&shift).await?;
        self.config().update_rate(rate.milli()).await?;

        info!(
            shift_id = %shift.id,
            user_id = %shift.user_id,
            rate_milli = shift.opening_rate_milli,
            "Shift opened"
        );
        Ok(shift)
    }

    /// Recomputes a shift's totals from its ledger entries and stores
    /// them. Safe to call any number of times.
    pub async fn recompute_totals(&self, shift_id: &str) -> ServiceResult<ShiftTotals> {
        let shift = self.shifts().require(shift_id).await?;
        if !shift.is_open() {
            return Err(CoreError::ShiftNotOpen { shift_id: shift.id }.into());
        }

        let entries = self.ledger().list_by_shift(shift_id).await?;
        let totals = ShiftTotals::from_entries(&entries);
        self.shifts().update_totals(shift_id, &totals).await?;

        Ok(totals)
    }

    /// Closes the open shift against a drawer recount.
    ///
    /// Requires a role that may close the till. Totals are recomputed
    /// from the ledger first; any variance is logged and reported but
    /// never blocks the close. The closing rate becomes the posted rate.
    pub async fn close_shift(
        &self,
        user_id: &str,
        counted_usd_cents: i64,
        counted_bs_cents: i64,
        closing_rate_milli: i64,
        notes: Option<String>,
    ) -> ServiceResult<ShiftReport> {
        let closing_rate = ExchangeRate::from_milli(closing_rate_milli).map_err(CoreError::from)?;

        let user = self.users().require(user_id).await?;
        if !user.role.can_close_shift() {
            return Err(CoreError::NotPermitted {
                action: "close the shift".to_string(),
                role: format!("{:?}", user.role),
            }
            .into());
        }

        let mut shift = self.shifts().get_open().await?.ok_or(CoreError::NoOpenShift)?;

        let entries = self.ledger().list_by_shift(&shift.id).await?;
        shift.apply_totals(&ShiftTotals::from_entries(&entries));

        let variance = shift.variance(
            Money::from_cents(counted_usd_cents),
            Money::from_cents(counted_bs_cents),
        );
        if !variance.is_balanced() {
            warn!(
                shift_id = %shift.id,
                usd_variance = variance.usd.cents(),
                bs_variance = variance.bs.cents(),
                "Drawer does not match the books"
            );
        }

        shift.closed_at = Some(Utc::now());
        shift.closing_rate_milli = Some(closing_rate.milli());
        shift.closing_cash_usd_cents = Some(counted_usd_cents);
        shift.closing_cash_bs_cents = Some(counted_bs_cents);
        shift.status = ShiftStatus::Closed;
        if notes.is_some() {
            shift.notes = notes;
        }

        self.shifts().close(&shift).await?;
        self.config().update_rate(closing_rate.milli()).await?;

        let methods = self.ledger().summary_by_method(&shift.id).await?;

        info!(
            shift_id = %shift.id,
            payments = shift.payments_total_cents,
            sales = shift.sales_total_cents,
            "Shift closed"
        );

        Ok(ShiftReport {
            shift,
            methods,
            variance: Some(variance),
        })
    }

    /// Report for any shift, open or closed.
    ///
    /// An open shift gets freshly computed totals; variance appears only
    /// once a recount exists.
    pub async fn shift_report(&self, shift_id: &str) -> ServiceResult<ShiftReport> {
        let mut shift = self.shifts().require(shift_id).await?;

        if shift.is_open() {
            let entries = self.ledger().list_by_shift(shift_id).await?;
            shift.apply_totals(&ShiftTotals::from_entries(&entries));
        }

        let variance = match (shift.closing_cash_usd_cents, shift.closing_cash_bs_cents) {
            (Some(usd), Some(bs)) => {
                Some(shift.variance(Money::from_cents(usd), Money::from_cents(bs)))
            }
            _ => None,
        };

        let methods = self.ledger().summary_by_method(shift_id).await?;
        Ok(ShiftReport {
            shift,
            methods,
            variance,
        })
    }

    /// The currently open shift, if any.
    pub async fn current_shift(&self) -> DbResult<Option<Shift>> {
        self.shifts().get_open().await
    }
}
