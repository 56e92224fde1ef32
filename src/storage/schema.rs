use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};
use std::str::FromStr;
use std::time::Duration;

use super::types::StoreError;

// ============================================================================
// Store
// ============================================================================

/// Handle to the local document store.
///
/// Opened once at process start and passed explicitly to whoever needs
/// it; `Clone` is cheap (shared pool). The store is never explicitly
/// closed; it lives for the life of the process.
#[derive(Clone)]
pub struct Store {
    pub(crate) pool: SqlitePool,
}

impl Store {
    /// Open the store and run migrations.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unavailable` if the database file cannot be
    /// opened or the migration fails.
    pub async fn open(path: &str) -> Result<Self, StoreError> {
        let url = format!("sqlite:{}?mode=rwc", path);

        // busy_timeout=5000: SQLite waits up to 5 seconds for locks to release
        // before returning SQLITE_BUSY. Using pragma() ensures all connections
        // in the pool inherit this setting.
        let options = SqliteConnectOptions::from_str(&url)?.pragma("busy_timeout", "5000");
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(10))
            .connect_with(options)
            .await?;
        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// Run store migrations.
    ///
    /// All statements use `IF NOT EXISTS` for idempotency, so re-running
    /// on an existing database is a no-op.
    async fn migrate(&self) -> Result<(), StoreError> {
        // One document per cached entry: id is the entry link, body is the
        // JSON-encoded record.
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS records (
                id TEXT PRIMARY KEY,
                body TEXT NOT NULL,
                inserted_at INTEGER NOT NULL
            )
        "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_records_inserted ON records(inserted_at DESC)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
