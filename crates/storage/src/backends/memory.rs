//! In-memory storage backend.

use crate::error::{StorageError, StorageResult};
use crate::traits::ResourceStore;
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use tracing::instrument;

#[derive(Default)]
struct State {
    last_id: i64,
    blobs: BTreeMap<i64, Bytes>,
}

/// Process-local resource store. Contents are lost when the process exits.
#[derive(Default)]
pub struct MemoryBackend {
    state: RwLock<State>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored resources.
    pub async fn len(&self) -> usize {
        self.state.read().await.blobs.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl ResourceStore for MemoryBackend {
    #[instrument(skip(self, data), fields(backend = "memory", size = data.len()))]
    async fn save(&self, data: Bytes) -> StorageResult<i64> {
        let mut state = self.state.write().await;
        let id = state.last_id.checked_add(1).ok_or(StorageError::IdsExhausted)?;
        state.last_id = id;
        state.blobs.insert(id, data);
        Ok(id)
    }

    async fn find(&self, id: i64) -> StorageResult<Option<Bytes>> {
        Ok(self.state.read().await.blobs.get(&id).cloned())
    }

    async fn filter_existing(&self, ids: &[i64]) -> StorageResult<Vec<i64>> {
        let state = self.state.read().await;
        Ok(ids
            .iter()
            .copied()
            .filter(|id| state.blobs.contains_key(id))
            .collect())
    }

    #[instrument(skip(self), fields(backend = "memory", count = ids.len()))]
    async fn delete_all(&self, ids: &[i64]) -> StorageResult<Vec<i64>> {
        let mut state = self.state.write().await;
        Ok(ids
            .iter()
            .copied()
            .filter(|id| state.blobs.remove(id).is_some())
            .collect())
    }

    async fn list_ids(&self) -> StorageResult<Vec<i64>> {
        Ok(self.state.read().await.blobs.keys().copied().collect())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn health_check(&self) -> StorageResult<()> {
        Ok(())
    }
}
