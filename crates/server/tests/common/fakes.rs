//! Scripted song service client and failing storage for orchestration tests.
//! Note: #[allow(dead_code)] because each test file compiles common/ separately.

use async_trait::async_trait;
use bytes::Bytes;
use jukebox_client::{ClientResult, MetadataServiceClient};
use jukebox_core::{IdSet, SongMetadata};
use jukebox_storage::{MemoryBackend, ResourceStore, StorageError, StorageResult};
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Replays queued results; once a queue is empty every call succeeds.
#[allow(dead_code)]
#[derive(Default)]
pub struct ScriptedClient {
    create_results: Mutex<VecDeque<ClientResult<i64>>>,
    delete_results: Mutex<VecDeque<ClientResult<Vec<i64>>>>,
    create_calls: Mutex<Vec<SongMetadata>>,
    delete_calls: Mutex<Vec<Vec<i64>>>,
    /// Removed before the next create lands, like a delete racing the upload.
    racing_delete: Mutex<Option<Arc<dyn ResourceStore>>>,
}

#[allow(dead_code)]
impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_create(&self, result: ClientResult<i64>) {
        self.create_results.lock().unwrap().push_back(result);
    }

    pub fn push_delete(&self, result: ClientResult<Vec<i64>>) {
        self.delete_results.lock().unwrap().push_back(result);
    }

    /// Delete the blob from `store` right before the next create is recorded.
    pub fn delete_blob_before_create(&self, store: Arc<dyn ResourceStore>) {
        *self.racing_delete.lock().unwrap() = Some(store);
    }

    pub fn create_calls(&self) -> Vec<SongMetadata> {
        self.create_calls.lock().unwrap().clone()
    }

    pub fn delete_calls(&self) -> Vec<Vec<i64>> {
        self.delete_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl MetadataServiceClient for ScriptedClient {
    async fn create(&self, song: &SongMetadata) -> ClientResult<i64> {
        let racing_delete = self.racing_delete.lock().unwrap().take();
        if let Some(store) = racing_delete {
            store.delete_all(&[song.id]).await.unwrap();
        }
        self.create_calls.lock().unwrap().push(song.clone());
        self.create_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(song.id))
    }

    async fn delete(&self, ids: &IdSet) -> ClientResult<Vec<i64>> {
        self.delete_calls.lock().unwrap().push(ids.as_slice().to_vec());
        self.delete_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(ids.as_slice().to_vec()))
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

/// In-memory store whose next `delete_all` calls fail.
#[allow(dead_code)]
#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryBackend,
    failing_deletes: AtomicUsize,
}

#[allow(dead_code)]
impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_deletes(&self, count: usize) {
        self.failing_deletes.store(count, Ordering::SeqCst);
    }
}

#[async_trait]
impl ResourceStore for FlakyStore {
    async fn save(&self, data: Bytes) -> StorageResult<i64> {
        self.inner.save(data).await
    }

    async fn find(&self, id: i64) -> StorageResult<Option<Bytes>> {
        self.inner.find(id).await
    }

    async fn filter_existing(&self, ids: &[i64]) -> StorageResult<Vec<i64>> {
        self.inner.filter_existing(ids).await
    }

    async fn delete_all(&self, ids: &[i64]) -> StorageResult<Vec<i64>> {
        let failing = self
            .failing_deletes
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(StorageError::Io(std::io::Error::other("disk unavailable")));
        }
        self.inner.delete_all(ids).await
    }

    async fn list_ids(&self) -> StorageResult<Vec<i64>> {
        self.inner.list_ids().await
    }

    fn backend_name(&self) -> &'static str {
        "flaky"
    }

    async fn health_check(&self) -> StorageResult<()> {
        Ok(())
    }
}
