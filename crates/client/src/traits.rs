//! Client trait definitions.

use crate::error::ClientResult;
use async_trait::async_trait;
use jukebox_core::{IdSet, SongMetadata};

/// Creates and deletes song metadata records in the song service's store.
///
/// Both operations are safe to repeat: a repeated `create` whose earlier
/// attempt was applied reports success, and `delete` skips absent ids.
#[async_trait]
pub trait MetadataServiceClient: Send + Sync + 'static {
    /// Create the record and return the id the service stored it under.
    ///
    /// Fails with [`ClientError::Conflict`](crate::ClientError::Conflict) if a
    /// record for `song.id` already exists.
    async fn create(&self, song: &SongMetadata) -> ClientResult<i64>;

    /// Delete the records for `ids` and return the ids that were removed.
    async fn delete(&self, ids: &IdSet) -> ClientResult<Vec<i64>>;

    /// Client name for logging.
    fn name(&self) -> &'static str;
}
