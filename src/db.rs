//! SQLite connection setup, schema creation and locker seeding.

use anyhow::Result;
use sqlx::{
    Sqlite, SqlitePool, Transaction,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use std::{path::Path, str::FromStr};
use uuid::Uuid;

/// Schema applied on every startup. Statements are idempotent.
const INIT_SQL: &str = include_str!("../migrations/0001_init.sql");

/// Open (and create if missing) the SQLite database behind `db_url`.
pub async fn connect(db_url: &str) -> Result<SqlitePool> {
    tracing::debug!("Connecting using raw URL => {}", db_url);

    // Create parent directory if needed
    if let Some(db_path) = file_path_from_url(db_url) {
        tracing::debug!("Interpreted SQLite path => {}", db_path);
        if let Some(parent) = Path::new(db_path).parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
                tracing::info!("Created missing directory {:?}", parent);
            }
        }
    }

    let options = SqliteConnectOptions::from_str(db_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    Ok(pool)
}

/// Local file path SQLx will use, or `None` for in-memory databases.
fn file_path_from_url(db_url: &str) -> Option<&str> {
    if db_url.contains(":memory:") || db_url.contains("mode=memory") {
        return None;
    }
    let path = db_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .trim_start_matches("file:");
    let path = path.split('?').next().unwrap_or(path);
    (!path.is_empty()).then_some(path)
}

/// Start a transaction holding SQLite's write lock from its first statement.
///
/// A deferred `BEGIN` that reads before writing fails with `SQLITE_BUSY`
/// instead of waiting when another writer commits in between.
pub async fn begin_write(db: &SqlitePool) -> sqlx::Result<Transaction<'static, Sqlite>> {
    db.begin_with("BEGIN IMMEDIATE").await
}

/// Run the embedded schema statements one by one.
pub async fn run_migrations(db: &SqlitePool) -> Result<()> {
    let statements = INIT_SQL
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>();

    tracing::info!("Running {} migration statements...", statements.len());

    for stmt in statements {
        tracing::debug!("Executing migration SQL: {}", stmt);
        sqlx::query(stmt).execute(db).await?;
    }

    Ok(())
}

/// Insert lockers `L-1 … L-count` when the lockers table is empty.
///
/// Returns the number of lockers inserted.
pub async fn seed_lockers(db: &SqlitePool, count: u32) -> Result<u32> {
    let mut tx = begin_write(db).await?;

    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM lockers")
        .fetch_one(&mut *tx)
        .await?;
    if existing > 0 {
        tracing::debug!("{} lockers present, skipping seed", existing);
        return Ok(0);
    }

    for i in 1..=count {
        sqlx::query("INSERT INTO lockers (id, number, is_available) VALUES (?, ?, 1)")
            .bind(Uuid::new_v4())
            .bind(format!("L-{}", i))
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;

    tracing::info!("Seeded {} lockers", count);
    Ok(count)
}

/// Fresh in-memory database with schema and the default five lockers.
#[cfg(test)]
pub async fn test_pool() -> SqlitePool {
    // An in-memory database lives in a single connection.
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .expect("Failed to connect to test database");
    run_migrations(&pool).await.expect("Failed to run migrations");
    seed_lockers(&pool, 5).await.expect("Failed to seed lockers");
    pool
}

/// File-backed database in the temp dir, for tests that need several
/// connections. The files are removed on drop.
#[cfg(test)]
pub struct TempDb {
    pub pool: SqlitePool,
    path: std::path::PathBuf,
}

#[cfg(test)]
impl TempDb {
    pub async fn new() -> Self {
        let path = std::env::temp_dir().join(format!("locker-booking-{}.db", Uuid::new_v4()));
        let pool = connect(&format!("sqlite://{}", path.display()))
            .await
            .expect("Failed to open temp database");
        run_migrations(&pool).await.expect("Failed to run migrations");
        seed_lockers(&pool, 5).await.expect("Failed to seed lockers");
        Self { pool, path }
    }
}

#[cfg(test)]
impl Drop for TempDb {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{}", self.path.display(), suffix));
        }
    }
}
