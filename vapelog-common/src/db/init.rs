//! Database initialization
//!
//! Opens (or creates) the journal database and makes sure every table,
//! index and migration is in place before the store touches it.

use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;
use tracing::info;

/// Busy timeout applied to every connection
const BUSY_TIMEOUT_MS: u64 = 5000;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Foreign keys are a per-connection setting, so they go on the connect
    // options rather than a one-off PRAGMA
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let options = SqliteConnectOptions::from_str(&db_url)?
        .foreign_keys(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .busy_timeout(std::time::Duration::from_millis(BUSY_TIMEOUT_MS));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    create_schema(&pool).await?;

    Ok(pool)
}

/// Initialize a private in-memory database
///
/// Uses a single connection: every connection to `sqlite::memory:` would
/// otherwise see its own empty database.
pub async fn init_memory_database() -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;

    create_schema(&pool).await?;

    Ok(pool)
}

/// Create tables and indexes, then run migrations (idempotent)
async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_schema_version_table(pool).await?;
    create_products_table(pool).await?;
    create_sessions_table(pool).await?;
    create_check_ins_table(pool).await?;

    crate::db::migrations::run_migrations(pool).await?;

    Ok(())
}

async fn create_schema_version_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the products table
///
/// AUTOINCREMENT keeps ids from ever being reused after a delete.
pub async fn create_products_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS products (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            brand TEXT,
            type TEXT NOT NULL CHECK (type IN ('flower', 'concentrate', 'edible', 'tincture', 'topical', 'vape', 'other')),
            route TEXT NOT NULL CHECK (route IN ('inhalation', 'oral', 'sublingual', 'topical')),
            thcPercent REAL,
            cbdPercent REAL,
            cbgPercent REAL,
            thcvPercent REAL,
            myrcene REAL,
            limonene REAL,
            pinene REAL,
            caryophyllene REAL,
            humulene REAL,
            linalool REAL,
            terpinolene REAL,
            ocimene REAL,
            otherTerpenes TEXT,
            notes TEXT,
            createdAt TEXT NOT NULL,
            updatedAt TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_products_createdAt ON products(createdAt)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Create the sessions table
///
/// Deleting a product removes its sessions.
pub async fn create_sessions_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sessions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            productId INTEGER NOT NULL REFERENCES products(id) ON DELETE CASCADE,
            dateTime TEXT NOT NULL,
            doseMg REAL,
            doseUnits TEXT,
            location TEXT,
            withCompany INTEGER NOT NULL DEFAULT 0,
            hadCaffeine INTEGER NOT NULL DEFAULT 0,
            hadAlcohol INTEGER NOT NULL DEFAULT 0,
            hadFood INTEGER NOT NULL DEFAULT 0,
            sleepQuality INTEGER CHECK (sleepQuality IS NULL OR (sleepQuality >= 1 AND sleepQuality <= 5)),
            preMood INTEGER CHECK (preMood IS NULL OR (preMood >= 1 AND preMood <= 10)),
            preStress INTEGER CHECK (preStress IS NULL OR (preStress >= 1 AND preStress <= 10)),
            notes TEXT,
            createdAt TEXT NOT NULL,
            updatedAt TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_sessions_productId ON sessions(productId)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_sessions_dateTime ON sessions(dateTime)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Create the check_ins table
///
/// Deleting a session removes its check-ins.
pub async fn create_check_ins_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS check_ins (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            sessionId INTEGER NOT NULL REFERENCES sessions(id) ON DELETE CASCADE,
            minutesAfter INTEGER NOT NULL,
            timestamp TEXT NOT NULL,
            awake INTEGER,
            active INTEGER,
            cerebral INTEGER,
            social INTEGER,
            euphoric INTEGER,
            creative INTEGER,
            focused INTEGER,
            tired INTEGER,
            groggy INTEGER,
            anxious INTEGER,
            antisocial INTEGER,
            paranoia INTEGER,
            dryMouth INTEGER,
            dryEyes INTEGER,
            racingHeart INTEGER,
            notes TEXT,
            createdAt TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_check_ins_sessionId ON check_ins(sessionId)")
        .execute(pool)
        .await?;

    Ok(())
}
