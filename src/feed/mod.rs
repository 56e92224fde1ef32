//! Remote feed client.
//!
//! Feed parsing is delegated to a third-party aggregation proxy: one
//! HTTP round trip returns pre-parsed entries wrapped in a JSON
//! envelope. This module normalizes that envelope into a flat list of
//! [`FeedEntry`] values and maps the proxy's failure shapes onto
//! [`FetchError`].

mod client;
mod entry;

pub use client::{FeedClient, FetchError};
pub use entry::FeedEntry;
