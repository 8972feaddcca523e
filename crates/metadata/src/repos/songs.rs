//! Song repository trait.

use crate::error::MetadataResult;
use crate::models::SongRow;
use async_trait::async_trait;

/// Repository for song metadata records.
#[async_trait]
pub trait SongRepo: Send + Sync {
    /// Insert a new record.
    ///
    /// Fails with [`MetadataError::AlreadyExists`](crate::MetadataError::AlreadyExists)
    /// if a record with the same id exists; the existing record is left untouched.
    async fn create_song(&self, song: &SongRow) -> MetadataResult<()>;

    /// Get a record by id.
    async fn get_song(&self, id: i64) -> MetadataResult<Option<SongRow>>;

    /// Delete the records with the given ids and return the ids that were
    /// removed, in request order.
    async fn delete_songs(&self, ids: &[i64]) -> MetadataResult<Vec<i64>>;
}
