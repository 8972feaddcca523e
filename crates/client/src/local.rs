//! In-process client over a local metadata store.

use crate::error::{ClientError, ClientResult};
use crate::traits::MetadataServiceClient;
use async_trait::async_trait;
use jukebox_core::{IdSet, SongMetadata};
use jukebox_metadata::{MetadataError, MetadataStore, SongRow};
use std::sync::Arc;

/// Serves both sides from one process: the resource service calls the song
/// store directly instead of going over HTTP.
#[derive(Clone)]
pub struct LocalMetadataClient {
    store: Arc<dyn MetadataStore>,
}

impl LocalMetadataClient {
    pub fn new(store: Arc<dyn MetadataStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl MetadataServiceClient for LocalMetadataClient {
    async fn create(&self, song: &SongMetadata) -> ClientResult<i64> {
        match self.store.create_song(&SongRow::new(song)).await {
            Ok(()) => Ok(song.id),
            Err(MetadataError::AlreadyExists(id)) => Err(ClientError::Conflict(id)),
            Err(e) => Err(ClientError::Store(e.to_string())),
        }
    }

    async fn delete(&self, ids: &IdSet) -> ClientResult<Vec<i64>> {
        self.store
            .delete_songs(ids.as_slice())
            .await
            .map_err(|e| ClientError::Store(e.to_string()))
    }

    fn name(&self) -> &'static str {
        "local"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jukebox_metadata::SqliteStore;

    fn song(id: i64) -> SongMetadata {
        SongMetadata {
            id,
            name: "Song".into(),
            artist: "Artist".into(),
            album: "Album".into(),
            duration: "01:05".into(),
            year: 2023,
        }
    }

    #[tokio::test]
    async fn test_create_conflict_and_delete() {
        let store: Arc<dyn MetadataStore> = Arc::new(SqliteStore::in_memory().await.unwrap());
        let client = LocalMetadataClient::new(store.clone());

        assert_eq!(client.create(&song(4)).await.unwrap(), 4);
        assert!(matches!(
            client.create(&song(4)).await,
            Err(ClientError::Conflict(4))
        ));

        let ids: IdSet = vec![4, 5].into();
        assert_eq!(client.delete(&ids).await.unwrap(), vec![4]);
        assert!(store.get_song(4).await.unwrap().is_none());
    }
}
