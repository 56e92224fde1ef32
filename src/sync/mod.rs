//! Cache-first synchronization between the local store and the remote feed.
//!
//! The controller decides, per cycle, whether to serve cached entries
//! or fetch fresh ones, and writes newly seen entries back to the
//! store. Connectivity is an injected seam so the embedding platform
//! supplies the actual network signal.

mod connectivity;
mod controller;

pub use connectivity::{Connectivity, NetworkType};
pub use controller::{SyncController, SyncOutcome};
