//! Blob storage for jukebox resources.
//!
//! This crate provides:
//! - The [`ResourceStore`] abstraction with store-assigned, never reused ids
//! - Atomic writes (temp file, fsync, rename) on the filesystem backend
//! - Backends: local filesystem and in-memory

pub mod backends;
pub mod error;
pub mod traits;

pub use backends::{filesystem::FilesystemBackend, memory::MemoryBackend};
pub use error::{StorageError, StorageResult};
pub use traits::ResourceStore;

use jukebox_core::config::StorageConfig;
use std::sync::Arc;

/// Create a resource store from configuration.
pub async fn from_config(config: &StorageConfig) -> StorageResult<Arc<dyn ResourceStore>> {
    config.validate().map_err(StorageError::Config)?;

    match config {
        StorageConfig::Filesystem { path } => {
            let backend = FilesystemBackend::new(path).await?;
            Ok(Arc::new(backend))
        }
        StorageConfig::Memory => Ok(Arc::new(MemoryBackend::new())),
    }
}
