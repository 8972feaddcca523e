//! Background repair of resources left inconsistent by a failed upload.
//!
//! When the song service times out or answers garbage during an upload, the
//! blob is kept and its id lands here. Each pass re-extracts the metadata from
//! the stored blob and re-issues the create; a conflict means an earlier
//! attempt already landed, which is also a success. Failed compensating
//! deletes and metadata left behind for a deleted blob are retried the same way.

use crate::metrics::{RECONCILE_OUTCOMES, RECONCILE_PENDING};
use bytes::Bytes;
use jukebox_client::{ClientError, MetadataServiceClient};
use jukebox_core::{IdSet, SongMetadata};
use jukebox_storage::{ResourceStore, StorageResult};
use jukebox_tags::MetadataExtractor;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// What a pending id still needs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Repair {
    /// The metadata create outcome is unknown; re-issue it.
    CreateMetadata,
    /// The metadata was never stored but the blob could not be removed.
    RemoveBlob,
    /// Metadata exists for a blob that is gone.
    RemoveMetadata,
}

/// Counts from one reconciliation pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    /// The repair was carried out.
    pub resolved: usize,
    /// The blob is gone; nothing left to repair.
    pub dropped: usize,
    /// Still pending; retried on the next pass.
    pub failed: usize,
}

pub struct Reconciler {
    store: Arc<dyn ResourceStore>,
    extractor: Arc<dyn MetadataExtractor>,
    client: Arc<dyn MetadataServiceClient>,
    pending: Mutex<BTreeMap<i64, Repair>>,
}

impl Reconciler {
    pub fn new(
        store: Arc<dyn ResourceStore>,
        extractor: Arc<dyn MetadataExtractor>,
        client: Arc<dyn MetadataServiceClient>,
    ) -> Self {
        Self {
            store,
            extractor,
            client,
            pending: Mutex::new(BTreeMap::new()),
        }
    }

    /// Queue a resource whose metadata create outcome is unknown.
    pub async fn enqueue(&self, id: i64) {
        self.schedule(id, Repair::CreateMetadata).await;
    }

    /// Queue `repair` for `id`, replacing whatever was pending for it.
    pub async fn schedule(&self, id: i64, repair: Repair) {
        let mut pending = self.pending.lock().await;
        if pending.insert(id, repair) != Some(repair) {
            info!(resource_id = id, ?repair, "Queued resource for reconciliation");
        }
        RECONCILE_PENDING.set(pending.len() as i64);
    }

    /// Queue every stored resource for a metadata check.
    ///
    /// Used at startup: the queue lives in memory, so outcomes left unknown by
    /// a previous process are only found by looking at the blobs themselves.
    pub async fn seed_from_store(&self) -> StorageResult<usize> {
        let ids = self.store.list_ids().await?;
        let mut pending = self.pending.lock().await;
        let before = pending.len();
        for id in ids {
            pending.entry(id).or_insert(Repair::CreateMetadata);
        }
        RECONCILE_PENDING.set(pending.len() as i64);
        Ok(pending.len() - before)
    }

    /// Stop tracking ids whose blobs were deleted.
    pub async fn forget(&self, ids: &[i64]) {
        let mut pending = self.pending.lock().await;
        for id in ids {
            pending.remove(id);
        }
        RECONCILE_PENDING.set(pending.len() as i64);
    }

    /// Ids currently waiting for reconciliation, ascending.
    pub async fn pending(&self) -> Vec<i64> {
        self.pending.lock().await.keys().copied().collect()
    }

    /// Pending ids together with the repair each one needs.
    pub async fn pending_repairs(&self) -> Vec<(i64, Repair)> {
        self.pending
            .lock()
            .await
            .iter()
            .map(|(id, repair)| (*id, *repair))
            .collect()
    }

    /// Run a single pass over the ids pending at the time of the call.
    pub async fn run_once(&self) -> ReconcileStats {
        let repairs = self.pending_repairs().await;
        let mut stats = ReconcileStats::default();

        for (id, repair) in repairs {
            let result = match repair {
                Repair::CreateMetadata => self.recreate_metadata(id).await,
                Repair::RemoveBlob => self.remove_blob(id).await,
                Repair::RemoveMetadata => self.remove_metadata(id).await,
            };
            match result {
                Ok(true) => {
                    self.settle(id, repair).await;
                    stats.resolved += 1;
                    RECONCILE_OUTCOMES.with_label_values(&["resolved"]).inc();
                }
                Ok(false) => {
                    self.settle(id, repair).await;
                    stats.dropped += 1;
                    RECONCILE_OUTCOMES.with_label_values(&["dropped"]).inc();
                }
                Err(e) => {
                    stats.failed += 1;
                    RECONCILE_OUTCOMES.with_label_values(&["failed"]).inc();
                    warn!(resource_id = id, ?repair, error = %e, "Reconciliation attempt failed");
                }
            }
        }

        if stats != ReconcileStats::default() {
            info!(
                resolved = stats.resolved,
                dropped = stats.dropped,
                failed = stats.failed,
                "Reconciliation pass finished"
            );
        }
        stats
    }

    /// Spawn the periodic reconciliation loop.
    /// Returns the task's JoinHandle (caller should keep it to prevent early termination).
    pub fn spawn(self: Arc<Self>, interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval).await;
                self.run_once().await;
            }
        })
    }

    /// Check that the blob still exists once its metadata has been stored.
    ///
    /// A delete running concurrently finds no metadata yet and removes only
    /// the blob. In that case the metadata is deleted again, or queued for
    /// removal if the song service cannot be reached. Returns `false` when the
    /// blob is gone.
    pub(crate) async fn confirm_blob(&self, id: i64) -> StorageResult<bool> {
        if !self.store.filter_existing(&[id]).await?.is_empty() {
            return Ok(true);
        }

        warn!(resource_id = id, "Blob deleted while its metadata was stored");
        let ids: IdSet = vec![id].into();
        if let Err(e) = self.client.delete(&ids).await {
            error!(
                resource_id = id,
                error = %e,
                "Failed to remove metadata of a deleted blob"
            );
            self.schedule(id, Repair::RemoveMetadata).await;
        }
        Ok(false)
    }

    /// Drop `id` from the queue unless a different repair was scheduled meanwhile.
    async fn settle(&self, id: i64, repair: Repair) {
        let mut pending = self.pending.lock().await;
        if pending.get(&id) == Some(&repair) {
            pending.remove(&id);
        }
        RECONCILE_PENDING.set(pending.len() as i64);
    }

    /// Returns `Ok(true)` once metadata exists, `Ok(false)` if the blob is gone.
    async fn recreate_metadata(&self, id: i64) -> Result<bool, String> {
        let Some(data) = self.store.find(id).await.map_err(|e| e.to_string())? else {
            debug!(resource_id = id, "Blob no longer exists, dropping from queue");
            return Ok(false);
        };

        let song = extract_blocking(self.extractor.clone(), data, id)
            .await
            .map_err(|e| e.to_string())?;

        match self.client.create(&song).await {
            Ok(stored) if stored == id => {}
            Ok(stored) => {
                return Err(format!("song service stored resource {id} as {stored}"));
            }
            Err(ClientError::Conflict(_)) => {
                debug!(resource_id = id, "Metadata already present");
            }
            Err(e) => return Err(e.to_string()),
        }

        self.confirm_blob(id).await.map_err(|e| e.to_string())
    }

    async fn remove_blob(&self, id: i64) -> Result<bool, String> {
        let removed = self
            .store
            .delete_all(&[id])
            .await
            .map_err(|e| e.to_string())?;
        Ok(!removed.is_empty())
    }

    async fn remove_metadata(&self, id: i64) -> Result<bool, String> {
        let ids: IdSet = vec![id].into();
        self.client
            .delete(&ids)
            .await
            .map(|_| true)
            .map_err(|e| e.to_string())
    }
}

/// Tag parsing is CPU-bound, so it runs off the async workers.
pub(crate) async fn extract_blocking(
    extractor: Arc<dyn MetadataExtractor>,
    data: Bytes,
    id: i64,
) -> Result<SongMetadata, tokio::task::JoinError> {
    tokio::task::spawn_blocking(move || extractor.extract(&data, id)).await
}
