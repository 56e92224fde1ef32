use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::config::Config;
use crate::feed::{FeedClient, FeedEntry};
use crate::storage::Store;

use super::connectivity::Connectivity;

/// Terminal state of one sync cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Entries ready for display.
    Displaying(Vec<FeedEntry>),
    /// A remote fetch was required but the device is offline; the
    /// caller should present the blocking offline notice.
    Offline,
    /// Another cycle is already in flight; this one was suppressed
    /// without side effects.
    Suppressed,
}

/// Transient view of one refresh cycle.
struct ViewState {
    /// Entries currently shown to the user.
    displayed: Vec<FeedEntry>,
    /// Last snapshot read from the store; the dedupe identity source.
    /// Only replaced by a store read, never updated after write-back;
    /// repeat offers of an already-written link are no-ops downstream.
    cached: Vec<FeedEntry>,
}

/// Cache-first sync controller.
///
/// Each cycle runs up to three phases, strictly in order: local lookup,
/// connectivity check, remote fetch. [`load`](SyncController::load)
/// starts at the local lookup; a user-triggered
/// [`refresh`](SyncController::refresh) re-enters at the connectivity
/// check, always attempting a remote fetch when online.
///
/// At most one cycle runs at a time; a cycle started while another is
/// in flight returns [`SyncOutcome::Suppressed`].
pub struct SyncController {
    store: Store,
    client: FeedClient,
    connectivity: Arc<dyn Connectivity>,
    feed_url: String,
    page_size: u32,
    state: Mutex<ViewState>,
    in_flight: AtomicBool,
}

impl SyncController {
    pub fn new(
        store: Store,
        client: FeedClient,
        connectivity: Arc<dyn Connectivity>,
        config: &Config,
    ) -> Self {
        Self {
            store,
            client,
            connectivity,
            feed_url: config.feed_url.clone(),
            page_size: config.page_size,
            state: Mutex::new(ViewState {
                displayed: Vec::new(),
                cached: Vec::new(),
            }),
            in_flight: AtomicBool::new(false),
        }
    }

    /// Initial load: serve cached entries when the store has any,
    /// otherwise fall through to a remote fetch.
    ///
    /// A store read failure is treated as a cache miss (logged), per
    /// the rule that no store error is ever fatal.
    pub async fn load(&self) -> SyncOutcome {
        let Some(_guard) = CycleGuard::acquire(&self.in_flight) else {
            tracing::debug!("Sync cycle already in flight, suppressing load");
            return SyncOutcome::Suppressed;
        };

        match self.store.list_all().await {
            Ok(entries) if !entries.is_empty() => {
                tracing::debug!(count = entries.len(), "Serving entries from local cache");
                let mut state = self.state.lock().await;
                state.cached = entries.clone();
                state.displayed = entries.clone();
                SyncOutcome::Displaying(entries)
            }
            Ok(_) => {
                tracing::debug!("Local cache is empty, falling through to remote fetch");
                self.remote_cycle().await
            }
            Err(e) => {
                tracing::warn!(error = %e, "Local cache read failed, falling through to remote fetch");
                self.remote_cycle().await
            }
        }
    }

    /// User-triggered refresh: skip the local lookup and go straight to
    /// the connectivity check and remote fetch.
    pub async fn refresh(&self) -> SyncOutcome {
        let Some(_guard) = CycleGuard::acquire(&self.in_flight) else {
            tracing::debug!("Sync cycle already in flight, suppressing refresh");
            return SyncOutcome::Suppressed;
        };

        self.remote_cycle().await
    }

    /// Entries currently shown to the user.
    pub async fn displayed(&self) -> Vec<FeedEntry> {
        self.state.lock().await.displayed.clone()
    }

    /// Connectivity check followed by the remote fetch.
    ///
    /// A fetch failure of any kind is swallowed: the cycle ends in
    /// `Displaying` with whatever was shown before (possibly nothing).
    async fn remote_cycle(&self) -> SyncOutcome {
        if !self.connectivity.reachable() {
            tracing::info!("Device is offline, skipping remote fetch");
            return SyncOutcome::Offline;
        }

        match self.client.fetch(&self.feed_url, self.page_size).await {
            Ok(entries) => {
                self.write_back(&entries).await;
                let mut state = self.state.lock().await;
                state.displayed = entries.clone();
                SyncOutcome::Displaying(entries)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Remote fetch failed, keeping last known entries");
                let state = self.state.lock().await;
                SyncOutcome::Displaying(state.displayed.clone())
            }
        }
    }

    /// Persist every fetched entry whose link is absent from the cached
    /// snapshot.
    ///
    /// Identity is exact link equality, with no normalization of case,
    /// trailing slashes, or query strings. Each insert stands alone; a
    /// write failure is logged and the loop moves on.
    async fn write_back(&self, fetched: &[FeedEntry]) {
        let known: HashSet<String> = {
            let state = self.state.lock().await;
            state.cached.iter().map(|e| e.link.clone()).collect()
        };

        for entry in fetched {
            if known.contains(&entry.link) {
                continue;
            }
            match self.store.insert_if_absent(entry).await {
                Ok(true) => tracing::debug!(link = %entry.link, "Cached new entry"),
                Ok(false) => {}
                Err(e) => tracing::warn!(link = %entry.link, error = %e, "Failed to cache entry"),
            }
        }
    }
}

/// Clears the in-flight flag when a cycle ends, even on early return.
struct CycleGuard<'a>(&'a AtomicBool);

impl<'a> CycleGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
            .then(|| Self(flag))
    }
}

impl Drop for CycleGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

// ============================================================================
// Tests
// ============================================================================
