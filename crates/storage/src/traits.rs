//! Storage trait definitions.

use crate::error::StorageResult;
use async_trait::async_trait;
use bytes::Bytes;

/// Blob store for resource payloads, keyed by store-assigned ids.
///
/// Ids are positive, strictly increasing and never reused, even after the
/// resource they named has been deleted.
#[async_trait]
pub trait ResourceStore: Send + Sync + 'static {
    /// Persist a payload and return its newly allocated id.
    ///
    /// The write is atomic: a reader either sees the whole payload or nothing.
    async fn save(&self, data: Bytes) -> StorageResult<i64>;

    /// Fetch a payload, or `None` if no resource has this id.
    async fn find(&self, id: i64) -> StorageResult<Option<Bytes>>;

    /// Return the subset of `ids` that currently exist, in input order.
    async fn filter_existing(&self, ids: &[i64]) -> StorageResult<Vec<i64>>;

    /// Delete every resource in `ids` and return the ids that were removed.
    ///
    /// Ids that do not exist are skipped.
    async fn delete_all(&self, ids: &[i64]) -> StorageResult<Vec<i64>>;

    /// Ids of every stored resource, ascending.
    async fn list_ids(&self) -> StorageResult<Vec<i64>>;

    /// Get the backend name for logging/metrics.
    fn backend_name(&self) -> &'static str;

    /// Check if the backend is healthy and accessible.
    async fn health_check(&self) -> StorageResult<()>;
}
