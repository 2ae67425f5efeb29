//! Background snapshot writer.
//!
//! All storage writes for a store go through one task. Mutations publish the
//! newest encoded cart into a `watch` channel; the writer wakes, writes the
//! latest value, and reports the generation it finished. Because every write
//! replaces the whole slot, skipping intermediate snapshots is safe.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, error, instrument, warn};

use crate::config::RetryPolicy;
use crate::storage::{KeyValueStore, StorageError};

/// An encoded cart, tagged with the mutation count that produced it.
#[derive(Debug, Clone, Default)]
pub(crate) struct Snapshot {
    pub generation: u64,
    pub payload: Arc<str>,
}

/// Owns the write side of a store's storage slot.
pub(crate) struct SnapshotWriter {
    storage: Arc<dyn KeyValueStore>,
    key: String,
    retry: RetryPolicy,
    snapshots: watch::Receiver<Snapshot>,
    persisted: watch::Sender<u64>,
}

impl SnapshotWriter {
    pub(crate) fn new(
        storage: Arc<dyn KeyValueStore>,
        key: String,
        retry: RetryPolicy,
        snapshots: watch::Receiver<Snapshot>,
        persisted: watch::Sender<u64>,
    ) -> Self {
        Self {
            storage,
            key,
            retry,
            snapshots,
            persisted,
        }
    }

    /// Run the writer until the publishing store is dropped.
    ///
    /// A snapshot published just before the drop is still written.
    pub(crate) fn spawn(self) {
        tokio::spawn(self.run());
    }

    async fn run(mut self) {
        debug!(key = %self.key, "Snapshot writer started");

        while self.snapshots.changed().await.is_ok() {
            let snapshot = self.snapshots.borrow_and_update().clone();
            self.write(&snapshot).await;
            self.persisted.send_replace(snapshot.generation);
        }

        debug!(key = %self.key, "Snapshot writer stopped");
    }

    /// Write one snapshot, retrying with backoff.
    ///
    /// Stops retrying early once a newer snapshot is waiting, since the next
    /// loop iteration will write that one instead.
    #[instrument(skip_all, fields(key = %self.key, generation = snapshot.generation))]
    async fn write(&self, snapshot: &Snapshot) {
        let max_attempts = self.retry.max_attempts.max(1);

        for attempt in 1..=max_attempts {
            let error = match self.storage.set(&self.key, &snapshot.payload).await {
                Ok(()) => {
                    debug!(attempt, bytes = snapshot.payload.len(), "Cart snapshot persisted");
                    return;
                }
                Err(e) => e,
            };

            if attempt == max_attempts {
                report_write_failure(&error, attempt);
                return;
            }

            let delay = self.retry.backoff_after(attempt);
            warn!(error = %error, attempt, ?delay, "Cart snapshot write failed, retrying");
            tokio::time::sleep(delay).await;

            if self.snapshots.has_changed().unwrap_or(false) {
                debug!("Newer cart snapshot pending, abandoning retry");
                return;
            }
        }
    }
}

/// Log and capture a write that exhausted its retries.
///
/// The in-memory cart stays authoritative for the session; only durability
/// is lost.
fn report_write_failure(error: &StorageError, attempts: u32) {
    let event_id = sentry::capture_error(error);
    error!(
        error = %error,
        attempts,
        sentry_event_id = %event_id,
        "Failed to persist cart snapshot"
    );
}
