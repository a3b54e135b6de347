//! # Room Repository
//!
//! Database operations for the room inventory.
//!
//! ## Status Updates Go Through the State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  set_status(12, Cleaning)                                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Load current status ──► RoomStatus::can_transition_to?                 │
//! │       │                        │                                        │
//! │       │                        └── no → InvalidRoomTransition           │
//! │       ▼                                                                 │
//! │  UPDATE rooms SET status = ?  WHERE number = ? AND status = <old>       │
//! │       │                                                                 │
//! │       └── 0 rows? Someone else moved the room first → error             │
//! │                                                                         │
//! │  The WHERE-on-old-status makes the read-check-write optimistic:         │
//! │  a concurrent change loses cleanly instead of being overwritten.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use posada_core::validation::validate_price_cents;
use posada_core::{CoreError, Room, RoomStatus};

const ROOM_COLUMNS: &str =
    "number, category, description, price_cents, capacity, status, last_cleaned_at, notes";

/// Repository for room database operations.
#[derive(Debug, Clone)]
pub struct RoomRepository {
    pool: SqlitePool,
}

impl RoomRepository {
    /// Creates a new RoomRepository.
    pub fn new(pool: SqlitePool) -> Self {
        RoomRepository { pool }
    }

    /// Inserts a room (provisioning). The nightly price must not be
    /// negative; zero is allowed for complimentary rooms.
    pub async fn insert(&self, room: &Room) -> DbResult<()> {
        validate_price_cents(room.price_cents)?;

        debug!(number = room.number, "Inserting room");

        sqlx::query(
            r#"
            INSERT INTO rooms (
                number, category, description, price_cents, capacity,
                status, last_cleaned_at, notes
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(room.number)
        .bind(room.category)
        .bind(&room.description)
        .bind(room.price_cents)
        .bind(room.capacity)
        .bind(room.status)
        .bind(room.last_cleaned_at)
        .bind(&room.notes)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a room by door number.
    pub async fn get(&self, number: i64) -> DbResult<Option<Room>> {
        let room = sqlx::query_as::<_, Room>(&format!(
            "SELECT {ROOM_COLUMNS} FROM rooms WHERE number = ?1"
        ))
        .bind(number)
        .fetch_optional(&self.pool)
        .await?;

        Ok(room)
    }

    /// Lists every room in door order (the rooms board).
    pub async fn list_all(&self) -> DbResult<Vec<Room>> {
        let rooms = sqlx::query_as::<_, Room>(&format!(
            "SELECT {ROOM_COLUMNS} FROM rooms ORDER BY number"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rooms)
    }

    /// Lists rooms in a given status.
    pub async fn list_by_status(&self, status: RoomStatus) -> DbResult<Vec<Room>> {
        let rooms = sqlx::query_as::<_, Room>(&format!(
            "SELECT {ROOM_COLUMNS} FROM rooms WHERE status = ?1 ORDER BY number"
        ))
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        Ok(rooms)
    }

    /// Rooms ready to sell right now.
    pub async fn list_available(&self) -> DbResult<Vec<Room>> {
        self.list_by_status(RoomStatus::Free).await
    }

    /// Room counts per status (the dashboard numbers).
    pub async fn count_by_status(&self) -> DbResult<Vec<(RoomStatus, i64)>> {
        let rows = sqlx::query_as::<_, (RoomStatus, i64)>(
            "SELECT status, COUNT(*) FROM rooms GROUP BY status ORDER BY status",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Moves a room through the status state machine.
    ///
    /// Rejects transitions the machine does not allow, and loses cleanly
    /// if another command moved the room first. Cleaning→Free also stamps
    /// `last_cleaned_at`.
    pub async fn set_status(&self, number: i64, to: RoomStatus) -> DbResult<Room> {
        let room = self
            .get(number)
            .await?
            .ok_or_else(|| DbError::not_found("Room", number.to_string()))?;

        if !room.status.can_transition_to(to) {
            let err = CoreError::InvalidRoomTransition {
                room: number,
                from: room.status,
                to,
            };
            return Err(DbError::QueryFailed(err.to_string()));
        }

        let cleaned_at = if room.status == RoomStatus::Cleaning && to == RoomStatus::Free {
            Some(Utc::now())
        } else {
            room.last_cleaned_at
        };

        let result = sqlx::query(
            "UPDATE rooms SET status = ?2, last_cleaned_at = ?3 WHERE number = ?1 AND status = ?4",
        )
        .bind(number)
        .bind(to)
        .bind(cleaned_at)
        .bind(room.status)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            // Someone else changed the room between our read and write
            return Err(DbError::QueryFailed(format!(
                "Room {} status changed concurrently",
                number
            )));
        }

        info!(room = number, from = ?room.status, to = ?to, "Room status changed");

        self.get(number)
            .await?
            .ok_or_else(|| DbError::not_found("Room", number.to_string()))
    }

    /// Updates price, description, capacity and notes.
    pub async fn update_details(&self, room: &Room) -> DbResult<()> {
        validate_price_cents(room.price_cents)?;

        let result = sqlx::query(
            r#"
            UPDATE rooms SET
                category = ?2, description = ?3, price_cents = ?4,
                capacity = ?5, notes = ?6
            WHERE number = ?1
            "#,
        )
        .bind(room.number)
        .bind(room.category)
        .bind(&room.description)
        .bind(room.price_cents)
        .bind(room.capacity)
        .bind(&room.notes)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Room", room.number.to_string()));
        }

        Ok(())
    }

    /// Total number of rooms.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM rooms")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
