//! Upload, fetch and delete across the blob store and the song service.
//!
//! The two stores share no transaction. Uploads run as a saga: the blob is
//! saved first, and if the song service definitely did not store the
//! metadata the blob is deleted again. When the outcome is unknown the blob is
//! kept and handed to the [`Reconciler`]. Once the metadata is stored the
//! blob is checked again, since a concurrent delete may have removed it in
//! between. Deletes always mutate the song service first, so an interrupted
//! delete can only leave a blob behind.

use crate::metrics::{
    RESOURCES_DELETED, RESOURCES_UPLOADED, SONG_SERVICE_ERRORS, UPLOAD_DURATION,
    UPLOADS_REJECTED, record_compensation,
};
use crate::reconcile::{Reconciler, Repair, extract_blocking};
use bytes::Bytes;
use jukebox_client::{ClientError, MetadataServiceClient, Outcome};
use jukebox_core::{IdSet, parse_id_set, parse_positive_id};
use jukebox_storage::{ResourceStore, StorageError};
use jukebox_tags::MetadataExtractor;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("Invalid MP3 file")]
    InvalidFormat,

    #[error(transparent)]
    InvalidInput(#[from] jukebox_core::Error),

    #[error("Resource with ID {0} not found")]
    NotFound(i64),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error(transparent)]
    SongService(#[from] ClientError),

    #[error("song service stored resource {expected} as {actual}")]
    IdMismatch { expected: i64, actual: i64 },

    #[error("Resource with ID {0} was deleted while its metadata was being stored")]
    DeletedDuringUpload(i64),

    #[error("metadata extraction failed: {0}")]
    Extraction(String),
}

pub type OrchestratorResult<T> = std::result::Result<T, OrchestratorError>;

pub struct ResourceOrchestrator {
    store: Arc<dyn ResourceStore>,
    extractor: Arc<dyn MetadataExtractor>,
    client: Arc<dyn MetadataServiceClient>,
    reconciler: Arc<Reconciler>,
}

impl ResourceOrchestrator {
    pub fn new(
        store: Arc<dyn ResourceStore>,
        extractor: Arc<dyn MetadataExtractor>,
        client: Arc<dyn MetadataServiceClient>,
    ) -> Self {
        let reconciler = Arc::new(Reconciler::new(
            store.clone(),
            extractor.clone(),
            client.clone(),
        ));
        Self {
            store,
            extractor,
            client,
            reconciler,
        }
    }

    pub fn store(&self) -> &Arc<dyn ResourceStore> {
        &self.store
    }

    pub fn reconciler(&self) -> &Arc<Reconciler> {
        &self.reconciler
    }

    /// Store an MP3 payload and register its metadata. Returns the new id.
    #[instrument(skip(self, data), fields(size = data.len(), client = self.client.name()))]
    pub async fn upload(&self, data: Bytes) -> OrchestratorResult<i64> {
        let start = Instant::now();

        if !jukebox_tags::is_mpeg_audio(&data) {
            UPLOADS_REJECTED.inc();
            return Err(OrchestratorError::InvalidFormat);
        }

        let id = self.store.save(data.clone()).await?;
        debug!(resource_id = id, "Blob stored");

        let song = match extract_blocking(self.extractor.clone(), data, id).await {
            Ok(song) => song,
            Err(e) => {
                self.compensate(id).await;
                return Err(OrchestratorError::Extraction(e.to_string()));
            }
        };

        match self.client.create(&song).await {
            Ok(stored) if stored == id => match self.reconciler.confirm_blob(id).await {
                Ok(true) => {}
                Ok(false) => return Err(OrchestratorError::DeletedDuringUpload(id)),
                Err(e) => {
                    self.reconciler.enqueue(id).await;
                    return Err(e.into());
                }
            },
            Ok(stored) => {
                error!(resource_id = id, stored_id = stored, "Song service echoed a different id");
                self.compensate(id).await;
                return Err(OrchestratorError::IdMismatch {
                    expected: id,
                    actual: stored,
                });
            }
            Err(e) => {
                match e.outcome() {
                    Outcome::NotApplied => {
                        SONG_SERVICE_ERRORS.with_label_values(&["not_applied"]).inc();
                        warn!(resource_id = id, error = %e, "Metadata not stored, removing blob");
                        self.compensate(id).await;
                    }
                    Outcome::Unknown | Outcome::Applied => {
                        SONG_SERVICE_ERRORS.with_label_values(&["unknown"]).inc();
                        warn!(resource_id = id, error = %e, "Metadata outcome unknown, keeping blob");
                        self.reconciler.enqueue(id).await;
                    }
                }
                return Err(e.into());
            }
        }

        RESOURCES_UPLOADED.inc();
        UPLOAD_DURATION.observe(start.elapsed().as_secs_f64());
        info!(resource_id = id, title = %song.name, "Resource uploaded");
        Ok(id)
    }

    /// Fetch the blob for a path id.
    pub async fn get(&self, id_token: &str) -> OrchestratorResult<Bytes> {
        let id = parse_positive_id(id_token)?;
        self.store
            .find(id)
            .await?
            .ok_or(OrchestratorError::NotFound(id))
    }

    /// Delete the resources named in `csv`. Returns the ids that were removed.
    #[instrument(skip(self), fields(client = self.client.name()))]
    pub async fn delete(&self, csv: &str) -> OrchestratorResult<Vec<i64>> {
        let ids = parse_id_set(csv)?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let existing: IdSet = self.store.filter_existing(ids.as_slice()).await?.into();
        if existing.is_empty() {
            debug!("No requested resources exist");
            return Ok(Vec::new());
        }

        let confirmed = self.client.delete(&existing).await.inspect_err(|e| {
            let label = match e.outcome() {
                Outcome::NotApplied => "not_applied",
                _ => "unknown",
            };
            SONG_SERVICE_ERRORS.with_label_values(&[label]).inc();
        })?;
        if confirmed.len() < existing.len() {
            debug!(
                requested = existing.len(),
                confirmed = confirmed.len(),
                "Song service had no metadata for some resources"
            );
        }

        let deleted = self.store.delete_all(existing.as_slice()).await?;
        self.reconciler.forget(&deleted).await;
        RESOURCES_DELETED.inc_by(deleted.len() as u64);
        info!(count = deleted.len(), "Resources deleted");
        Ok(deleted)
    }

    async fn compensate(&self, id: i64) {
        match self.store.delete_all(&[id]).await {
            Ok(_) => record_compensation("deleted"),
            Err(e) => {
                record_compensation("failed");
                error!(resource_id = id, error = %e, "Compensating delete failed, queued for retry");
                self.reconciler.schedule(id, Repair::RemoveBlob).await;
            }
        }
    }
}
