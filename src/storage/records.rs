use chrono::Utc;

use super::schema::Store;
use super::types::{CachedRecord, StoreError};
use crate::feed::FeedEntry;

impl Store {
    // ========================================================================
    // Record Operations
    // ========================================================================

    /// List all cached entries, newest first.
    ///
    /// An empty store yields an empty vector, not an error.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unavailable` if the query fails and
    /// `StoreError::Corrupted` if any record body fails to decode.
    pub async fn list_all(&self) -> Result<Vec<FeedEntry>, StoreError> {
        let rows: Vec<(String, String)> =
            sqlx::query_as("SELECT id, body FROM records ORDER BY inserted_at DESC, rowid DESC")
                .fetch_all(&self.pool)
                .await?;

        let mut entries = Vec::with_capacity(rows.len());
        for (id, body) in rows {
            let record: CachedRecord = serde_json::from_str(&body)
                .map_err(|source| StoreError::Corrupted { id, source })?;
            entries.push(record.entry);
        }
        Ok(entries)
    }

    /// Persist a new record keyed by the entry's link, unless one exists.
    ///
    /// A pre-existing record with the same link is left untouched (no
    /// update semantics). Returns `true` if a new record was written.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Encode` if the entry cannot be serialized
    /// and `StoreError::Unavailable` on write failure. Callers treat
    /// both as non-fatal.
    pub async fn insert_if_absent(&self, entry: &FeedEntry) -> Result<bool, StoreError> {
        let body = serde_json::to_string(&CachedRecord {
            entry: entry.clone(),
        })
        .map_err(|source| StoreError::Encode {
            id: entry.link.clone(),
            source,
        })?;

        let result =
            sqlx::query("INSERT OR IGNORE INTO records (id, body, inserted_at) VALUES (?, ?, ?)")
                .bind(&entry.link)
                .bind(&body)
                .bind(Utc::now().timestamp())
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }
}

// ============================================================================
// Tests
// ============================================================================
