use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::feed::FeedEntry;

// ============================================================================
// Error Types
// ============================================================================

/// Store-specific errors.
///
/// Callers treat every variant as non-fatal: a failed read is a cache
/// miss, a failed write is logged and skipped.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The underlying store could not be reached or the query failed.
    #[error("Store unavailable: {0}")]
    Unavailable(#[from] sqlx::Error),

    /// A persisted record body could not be decoded.
    #[error("Corrupted record '{id}': {source}")]
    Corrupted {
        id: String,
        #[source]
        source: serde_json::Error,
    },

    /// An entry could not be encoded for persistence.
    #[error("Failed to encode entry '{id}': {source}")]
    Encode {
        id: String,
        #[source]
        source: serde_json::Error,
    },
}

// ============================================================================
// Data Structures
// ============================================================================

/// Persisted wrapper around a feed entry.
///
/// Stored as the JSON body of the document whose id is `entry.link`,
/// so the store holds at most one copy per distinct link. Records are
/// written once and never updated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedRecord {
    pub entry: FeedEntry,
}
