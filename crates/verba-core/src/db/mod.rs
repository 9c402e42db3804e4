//! SQLite store with connection pooling and migrations
//!
//! This module is organized by domain:
//! - `categories` - Category creation, lookup and default seeding
//! - `transactions` - Transaction CRUD and filtered queries
//! - `transaction_filter` - WHERE clause builder shared by queries

use chrono::{DateTime, NaiveDate, Utc};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::types::Type;
use tracing::info;

use crate::error::Result;
use crate::text::fold;

mod categories;
mod transaction_filter;
mod transactions;

pub use transaction_filter::{FilterResult, TransactionFilter};

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConn = PooledConnection<SqliteConnectionManager>;

/// Map a parse failure on column `idx` into a rusqlite conversion error
fn conversion_error<E>(idx: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

pub(crate) fn parse_date(idx: usize, s: &str) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| conversion_error(idx, e))
}

pub(crate) fn parse_timestamp(idx: usize, s: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_error(idx, e))
}

/// Database wrapper with connection pooling
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
    /// Path to the database file
    db_path: String,
}

impl Database {
    /// Open (or create) a database file and run migrations
    pub fn new(path: &str) -> Result<Self> {
        let manager = SqliteConnectionManager::file(path).with_init(|conn| {
            conn.execute_batch("PRAGMA foreign_keys = ON;")?;
            Ok(())
        });
        let pool = Pool::builder().max_size(10).build(manager)?;

        let db = Self {
            pool,
            db_path: path.to_string(),
        };
        db.run_migrations()?;

        Ok(db)
    }

    /// Get the path to the database file
    pub fn path(&self) -> &str {
        &self.db_path
    }

    /// Create a throwaway database (for testing)
    ///
    /// Uses a fresh temporary file rather than `:memory:` because every pooled
    /// connection to `:memory:` would see its own empty database.
    pub fn in_memory() -> Result<Self> {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);

        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        let path = std::env::temp_dir().join(format!(
            "verba_test_{}_{}.db",
            std::process::id(),
            id
        ));

        // Remove any leftover file from an earlier run
        let _ = std::fs::remove_file(&path);

        Self::new(&path.to_string_lossy())
    }

    /// Get a connection from the pool
    pub fn conn(&self) -> Result<DbConn> {
        Ok(self.pool.get()?)
    }

    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn()?;

        conn.execute_batch(
            r#"
            -- WAL mode: readers don't block the single writer
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;

            -- Categories (name unique per kind, compared by folded key)
            CREATE TABLE IF NOT EXISTS categories (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                name_key TEXT NOT NULL,
                kind TEXT NOT NULL CHECK (kind IN ('expense', 'income')),
                created_at TEXT NOT NULL,
                UNIQUE (name_key, kind)
            );

            -- Transactions (amount is a positive decimal stored as text)
            CREATE TABLE IF NOT EXISTS transactions (
                id TEXT PRIMARY KEY,
                kind TEXT NOT NULL CHECK (kind IN ('expense', 'income')),
                amount TEXT NOT NULL,
                category_id TEXT NOT NULL REFERENCES categories(id),
                description TEXT,
                description_key TEXT,
                date TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_transactions_date ON transactions(date);
            CREATE INDEX IF NOT EXISTS idx_transactions_category ON transactions(category_id);
            CREATE INDEX IF NOT EXISTS idx_transactions_kind ON transactions(kind);
            "#,
        )?;

        let has_key: i64 = conn.query_row(
            "SELECT COUNT(*) FROM pragma_table_info('transactions') WHERE name = 'description_key'",
            [],
            |row| row.get(0),
        )?;
        if has_key == 0 {
            conn.execute("ALTER TABLE transactions ADD COLUMN description_key TEXT", [])?;
            let described: Vec<(String, String)> = conn
                .prepare("SELECT id, description FROM transactions WHERE description IS NOT NULL")?
                .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
                .collect::<std::result::Result<_, _>>()?;
            for (id, description) in &described {
                conn.execute(
                    "UPDATE transactions SET description_key = ? WHERE id = ?",
                    rusqlite::params![fold(description), id],
                )?;
            }
            info!(backfilled = described.len(), "Added description search key");
        }

        info!("Database schema initialized");
        Ok(())
    }
}

#[cfg(test)]
mod tests;
