//! # Guest Repository
//!
//! Database operations for the guest registry.
//!
//! ## Balance Discipline
//! `balance_cents` is only written by the service layer, inside the same
//! transaction that records the matching adjustment ledger entry. The
//! repository exposes reads and registry maintenance.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use posada_core::Guest;

const GUEST_COLUMNS: &str = "id, document, first_name, last_name, phone, email, nationality, \
     profession, vehicle, plate, balance_cents, notes, registered_at, last_visit_at";

/// Repository for guest database operations.
#[derive(Debug, Clone)]
pub struct GuestRepository {
    pool: SqlitePool,
}

impl GuestRepository {
    /// Creates a new GuestRepository.
    pub fn new(pool: SqlitePool) -> Self {
        GuestRepository { pool }
    }

    /// Registers a new guest.
    ///
    /// Callers validate the fields first (`validation::validate_document`
    /// and friends); the UNIQUE index on `document` is the last line of
    /// defense against duplicates.
    ///
    /// ## Returns
    /// The created guest with a generated ID and zero balance.
    pub async fn register(
        &self,
        document: &str,
        first_name: &str,
        last_name: &str,
    ) -> DbResult<Guest> {
        let guest = Guest {
            id: Uuid::new_v4().to_string(),
            document: document.trim().to_string(),
            first_name: first_name.trim().to_string(),
            last_name: last_name.trim().to_string(),
            phone: None,
            email: None,
            nationality: None,
            profession: None,
            vehicle: None,
            plate: None,
            balance_cents: 0,
            notes: None,
            registered_at: Utc::now(),
            last_visit_at: None,
        };

        self.insert(&guest).await?;
        Ok(guest)
    }

    /// Inserts a complete guest record.
    pub async fn insert(&self, guest: &Guest) -> DbResult<()> {
        debug!(id = %guest.id, document = %guest.document, "Inserting guest");

        sqlx::query(
            r#"
            INSERT INTO guests (
                id, document, first_name, last_name, phone, email,
                nationality, profession, vehicle, plate,
                balance_cents, notes, registered_at, last_visit_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            "#,
        )
        .bind(&guest.id)
        .bind(&guest.document)
        .bind(&guest.first_name)
        .bind(&guest.last_name)
        .bind(&guest.phone)
        .bind(&guest.email)
        .bind(&guest.nationality)
        .bind(&guest.profession)
        .bind(&guest.vehicle)
        .bind(&guest.plate)
        .bind(guest.balance_cents)
        .bind(&guest.notes)
        .bind(guest.registered_at)
        .bind(guest.last_visit_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Updates the mutable profile fields of a guest.
    ///
    /// Balance is deliberately NOT touched here; it moves only through
    /// adjustment entries in the service layer.
    pub async fn update_profile(&self, guest: &Guest) -> DbResult<()> {
        debug!(id = %guest.id, "Updating guest profile");

        let result = sqlx::query(
            r#"
            UPDATE guests SET
                first_name = ?2, last_name = ?3, phone = ?4, email = ?5,
                nationality = ?6, profession = ?7, vehicle = ?8, plate = ?9,
                notes = ?10
            WHERE id = ?1
            "#,
        )
        .bind(&guest.id)
        .bind(&guest.first_name)
        .bind(&guest.last_name)
        .bind(&guest.phone)
        .bind(&guest.email)
        .bind(&guest.nationality)
        .bind(&guest.profession)
        .bind(&guest.vehicle)
        .bind(&guest.plate)
        .bind(&guest.notes)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Guest", &guest.id));
        }

        Ok(())
    }

    /// Gets a guest by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Guest>> {
        let guest = sqlx::query_as::<_, Guest>(&format!(
            "SELECT {GUEST_COLUMNS} FROM guests WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(guest)
    }

    /// Gets a guest by identity document (the front-desk lookup).
    pub async fn get_by_document(&self, document: &str) -> DbResult<Option<Guest>> {
        let guest = sqlx::query_as::<_, Guest>(&format!(
            "SELECT {GUEST_COLUMNS} FROM guests WHERE document = ?1"
        ))
        .bind(document.trim())
        .fetch_optional(&self.pool)
        .await?;

        Ok(guest)
    }

    /// Searches guests by partial name or document, most recent visitors
    /// first.
    pub async fn search(&self, query: &str, limit: i64) -> DbResult<Vec<Guest>> {
        let pattern = format!("%{}%", query.trim());

        let guests = sqlx::query_as::<_, Guest>(&format!(
            r#"
            SELECT {GUEST_COLUMNS} FROM guests
            WHERE first_name LIKE ?1 OR last_name LIKE ?1 OR document LIKE ?1
            ORDER BY last_visit_at DESC NULLS LAST, last_name
            LIMIT ?2
            "#
        ))
        .bind(&pattern)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(guests)
    }

    /// Lists guests carrying a nonzero balance (debtors and credit
    /// holders), largest debt first.
    pub async fn list_with_balance(&self) -> DbResult<Vec<Guest>> {
        let guests = sqlx::query_as::<_, Guest>(&format!(
            r#"
            SELECT {GUEST_COLUMNS} FROM guests
            WHERE balance_cents != 0
            ORDER BY balance_cents ASC
            "#
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(guests)
    }

    /// Stamps the guest's last visit.
    pub async fn touch_last_visit(&self, id: &str, at: DateTime<Utc>) -> DbResult<()> {
        sqlx::query("UPDATE guests SET last_visit_at = ?2 WHERE id = ?1")
            .bind(id)
            .bind(at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Total number of registered guests.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM guests")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
