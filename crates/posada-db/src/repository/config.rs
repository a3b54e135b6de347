//! # Configuration Repository
//!
//! The single-row hotel configuration (id = 1). Holds the posted exchange
//! rate that every new ledger entry freezes a copy of.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::info;

use crate::error::{DbError, DbResult};
use posada_core::HotelConfig;

const CONFIG_COLUMNS: &str =
    "exchange_rate_milli, hotel_name, address, phone, email, tax_id, updated_at";

/// Repository for the hotel configuration row.
#[derive(Debug, Clone)]
pub struct ConfigRepository {
    pool: SqlitePool,
}

impl ConfigRepository {
    /// Creates a new ConfigRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ConfigRepository { pool }
    }

    /// Gets the configuration, if it has been provisioned.
    pub async fn get(&self) -> DbResult<Option<HotelConfig>> {
        let config = sqlx::query_as::<_, HotelConfig>(&format!(
            "SELECT {CONFIG_COLUMNS} FROM hotel_config WHERE id = 1"
        ))
        .fetch_optional(&self.pool)
        .await?;

        Ok(config)
    }

    /// Gets the configuration or fails with NotFound (unseeded database).
    pub async fn require(&self) -> DbResult<HotelConfig> {
        self.get()
            .await?
            .ok_or_else(|| DbError::not_found("HotelConfig", "1"))
    }

    /// Inserts or replaces the configuration row.
    pub async fn save(&self, config: &HotelConfig) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO hotel_config (
                id, exchange_rate_milli, hotel_name, address, phone, email,
                tax_id, updated_at
            ) VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT (id) DO UPDATE SET
                exchange_rate_milli = excluded.exchange_rate_milli,
                hotel_name = excluded.hotel_name,
                address = excluded.address,
                phone = excluded.phone,
                email = excluded.email,
                tax_id = excluded.tax_id,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(config.exchange_rate_milli)
        .bind(&config.hotel_name)
        .bind(&config.address)
        .bind(&config.phone)
        .bind(&config.email)
        .bind(&config.tax_id)
        .bind(config.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Posts a new exchange rate.
    ///
    /// Callers validate the rate first (`ExchangeRate::from_milli`); the
    /// CHECK constraint rejects anything non-positive that slips through.
    pub async fn update_rate(&self, rate_milli: i64) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE hotel_config SET exchange_rate_milli = ?1, updated_at = ?2 WHERE id = 1",
        )
        .bind(rate_milli)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("HotelConfig", "1"));
        }

        info!(rate_milli, "Exchange rate updated");
        Ok(())
    }
}
