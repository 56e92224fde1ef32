//! Offline-first feed cache.
//!
//! This crate implements the synchronization core of a feed-reading
//! client: entries are fetched from a feed-aggregation proxy, cached in
//! a local document store, and served cache-first so the reader keeps
//! working offline.
//!
//! # Architecture
//!
//! The crate is organized into four modules:
//!
//! - [`config`] - TOML configuration with validated defaults
//! - [`storage`] - SQLite-backed local document store keyed by entry link
//! - [`feed`] - HTTP client for the feed proxy's JSON envelope
//! - [`sync`] - the cache-first sync controller and connectivity seam
//!
//! # Example
//!
//! ```ignore
//! use feedstash::{Config, FeedClient, Store, SyncController};
//!
//! let config = Config::load(path)?;
//! let store = Store::open("feeds.db").await?;
//! let client = FeedClient::from_config(&config)?;
//! let controller = SyncController::new(store, client, connectivity, &config);
//!
//! // Initial load: cache-first, falls back to the network.
//! let outcome = controller.load().await;
//!
//! // Pull-to-refresh: always goes to the network when online.
//! let outcome = controller.refresh().await;
//! ```

pub mod config;
pub mod feed;
pub mod storage;
pub mod sync;

pub use config::{Config, ConfigError};
pub use feed::{FeedClient, FeedEntry, FetchError};
pub use storage::{CachedRecord, Store, StoreError};
pub use sync::{Connectivity, NetworkType, SyncController, SyncOutcome};
