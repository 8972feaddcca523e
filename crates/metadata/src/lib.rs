//! Song metadata persistence for the song service.
//!
//! This crate provides the song service's data model:
//! - Song records keyed by the id of the resource they describe
//! - Conflict-on-create enforced by the primary key, never by a pre-check
//! - Bulk delete that reports exactly the ids it removed

pub mod error;
pub mod models;
pub mod repos;
pub mod store;

pub use error::{MetadataError, MetadataResult};
pub use models::SongRow;
pub use repos::SongRepo;
pub use store::{MetadataStore, SqliteStore};

use jukebox_core::config::MetadataConfig;
use std::sync::Arc;

/// Create a metadata store from configuration.
pub async fn from_config(config: &MetadataConfig) -> MetadataResult<Arc<dyn MetadataStore>> {
    match config {
        MetadataConfig::Sqlite {
            path,
            query_timeout_secs,
        } => {
            let store = SqliteStore::new(path, *query_timeout_secs).await?;
            Ok(Arc::new(store) as Arc<dyn MetadataStore>)
        }
    }
}
