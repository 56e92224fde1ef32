//! Local document store for cached feed entries.
//!
//! A thin adapter over SQLite used as a document store: one record per
//! cached entry, keyed by the entry's link, with the entry itself as a
//! JSON body. The store only ever grows: records are inserted once and
//! never updated, deleted, or evicted.

mod records;
mod schema;
mod types;

pub use schema::Store;
pub use types::{CachedRecord, StoreError};
