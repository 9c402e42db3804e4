//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` - Shared utility to open the database
//! - `load_config` - Load the TOML configuration
//! - `parse_now` - Resolve the reference date for a command
//! - `cmd_init` - Initialize the database

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use verba_core::{config::Config, db::Database};

pub fn open_db(db_path: &Path) -> Result<Database> {
    let path_str = db_path
        .to_str()
        .context("Database path is not valid UTF-8")?;
    Database::new(path_str).context("Failed to open database")
}

pub fn load_config(path: Option<&Path>) -> Result<Config> {
    Config::load(path).context("Failed to load configuration")
}

/// The reference instant for a command: `--now` at noon UTC, or the clock
pub fn parse_now(now: Option<&str>) -> Result<DateTime<Utc>> {
    match now {
        Some(s) => {
            let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))?;
            let noon = date
                .and_hms_opt(12, 0, 0)
                .context("Invalid reference time")?;
            Ok(noon.and_utc())
        }
        None => Ok(Utc::now()),
    }
}

pub fn cmd_init(db_path: &Path) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    let db = open_db(db_path)?;

    let created = db
        .seed_default_categories(Utc::now())
        .context("Failed to seed default categories")?;
    println!("   Seeded {} default categories", created);

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Record something: verba say gastei 50 reais no mercado");
    println!("  2. See your month:   verba say balanço do mês");

    Ok(())
}
