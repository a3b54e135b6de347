//! Provisions a fresh Posada database: configuration row, admin user and
//! the room inventory. Safe to re-run; an already-provisioned database is
//! left alone.
//!
//! ```text
//! Usage: seed [OPTIONS]
//!
//! Options:
//!   -d, --db <PATH>   Database file (default: posada.db)
//!   -h, --help        Print help
//! ```

use std::process::ExitCode;

use tracing::{info, warn};

use posada_core::{RoomCategory, RoomStatus, UserRole, DEFAULT_EXCHANGE_RATE_MILLI};
use posada_db::{Database, DbConfig};

const DEFAULT_DB_PATH: &str = "posada.db";

fn print_help() {
    println!("Provision a fresh Posada database");
    println!();
    println!("Usage: seed [OPTIONS]");
    println!();
    println!("Options:");
    println!("  -d, --db <PATH>   Database file (default: {DEFAULT_DB_PATH})");
    println!("  -h, --help        Print help");
}

fn parse_db_path() -> Result<String, String> {
    let mut args = std::env::args().skip(1);
    let mut path = DEFAULT_DB_PATH.to_string();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-d" | "--db" => {
                path = args
                    .next()
                    .ok_or_else(|| format!("{arg} requires a value"))?;
            }
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            other => return Err(format!("Unknown argument: {other}")),
        }
    }

    Ok(path)
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let path = match parse_db_path() {
        Ok(path) => path,
        Err(msg) => {
            eprintln!("{msg}");
            print_help();
            return ExitCode::FAILURE;
        }
    };

    match seed(&path).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Seeding failed: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn seed(path: &str) -> Result<(), Box<dyn std::error::Error>> {
    info!(path, "Provisioning database");
    let db = Database::new(DbConfig::new(path)).await?;

    if db.config().get().await?.is_none() {
        let config = posada_core::HotelConfig {
            exchange_rate_milli: DEFAULT_EXCHANGE_RATE_MILLI,
            hotel_name: "Posada Las Palmeras".to_string(),
            address: None,
            phone: None,
            email: None,
            tax_id: None,
            updated_at: chrono::Utc::now(),
        };
        db.config().save(&config).await?;
        info!(rate_milli = config.exchange_rate_milli, "Configuration created");
    } else {
        info!("Configuration already present, skipping");
    }

    if db.users().get_by_username("admin").await?.is_none() {
        db.users()
            .create("admin", "admin123", "Administrator", UserRole::Admin)
            .await?;
        warn!("Default admin user created (admin/admin123) - change the password");
    } else {
        info!("Admin user already present, skipping");
    }

    if db.rooms().count().await? > 0 {
        info!("Rooms already present, skipping");
        db.close().await;
        return Ok(());
    }

    // (range, category, nightly price in cents, capacity)
    let blocks: [(std::ops::RangeInclusive<i64>, RoomCategory, i64, i64); 4] = [
        (1..=15, RoomCategory::Single, 2500, 2),
        (16..=30, RoomCategory::Double, 4000, 4),
        (31..=35, RoomCategory::Suite, 8000, 4),
        (36..=39, RoomCategory::Presidential, 15_000, 6),
    ];

    let mut total = 0;
    for (numbers, category, price_cents, capacity) in blocks {
        for number in numbers {
            db.rooms()
                .insert(&posada_core::Room {
                    number,
                    category,
                    description: None,
                    price_cents,
                    capacity,
                    status: RoomStatus::Free,
                    last_cleaned_at: None,
                    notes: None,
                })
                .await?;
            total += 1;
        }
    }

    info!(rooms = total, "Room inventory created");
    db.close().await;
    Ok(())
}
