//! Local filesystem storage backend.
//!
//! Layout under the root directory:
//! - `sequence`: the last allocated id, as decimal text
//! - `resources/<id>`: one file per resource

use crate::error::{StorageError, StorageResult};
use crate::traits::ResourceStore;
use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

const SEQUENCE_FILE: &str = "sequence";
const RESOURCES_DIR: &str = "resources";

/// Local filesystem resource store.
pub struct FilesystemBackend {
    root: PathBuf,
    resources: PathBuf,
    /// Last allocated id. Held across the whole save so ids are handed out in order.
    last_id: Mutex<i64>,
}

impl FilesystemBackend {
    /// Create a new filesystem backend, recovering the id sequence from disk.
    pub async fn new(root: impl AsRef<Path>) -> StorageResult<Self> {
        let root = root.as_ref().to_path_buf();
        let resources = root.join(RESOURCES_DIR);
        fs::create_dir_all(&resources).await?;

        let last_id = match read_sequence(&root.join(SEQUENCE_FILE)).await? {
            Some(id) => id,
            None => {
                let id = max_existing_id(&resources).await?;
                if id > 0 {
                    warn!(last_id = id, "Sequence file missing, recovered from stored resources");
                }
                id
            }
        };
        debug!(root = %root.display(), last_id, "Opened filesystem resource store");

        Ok(Self {
            root,
            resources,
            last_id: Mutex::new(last_id),
        })
    }

    fn resource_path(&self, id: i64) -> PathBuf {
        self.resources.join(id.to_string())
    }
}

async fn read_sequence(path: &Path) -> StorageResult<Option<i64>> {
    match fs::read_to_string(path).await {
        Ok(text) => text
            .trim()
            .parse::<i64>()
            .ok()
            .filter(|id| *id >= 0)
            .map(Some)
            .ok_or_else(|| StorageError::CorruptSequence(format!("{}: {text:?}", path.display()))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(StorageError::Io(e)),
    }
}

async fn max_existing_id(dir: &Path) -> StorageResult<i64> {
    Ok(stored_ids(dir).await?.last().copied().unwrap_or(0))
}

async fn stored_ids(dir: &Path) -> StorageResult<Vec<i64>> {
    let mut ids = Vec::new();
    let mut entries = fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        // Temp files (`<id>.tmp.<uuid>`) do not parse and are ignored
        if let Some(id) = entry
            .file_name()
            .to_str()
            .and_then(|name| name.parse::<i64>().ok())
        {
            ids.push(id);
        }
    }
    ids.sort_unstable();
    Ok(ids)
}

/// Write to a uniquely named temp file, fsync, then rename over `path`.
async fn write_atomic(path: &Path, data: &[u8]) -> StorageResult<()> {
    let temp_name = format!(".tmp.{}", Uuid::new_v4());
    let temp_path = path.with_file_name(
        path.file_name()
            .map(|n| format!("{}{}", n.to_string_lossy(), temp_name))
            .unwrap_or_else(|| temp_name.clone()),
    );

    let written = async {
        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(data).await?;
        file.sync_all().await?;
        fs::rename(&temp_path, path).await
    }
    .await;

    if let Err(e) = written {
        let _ = fs::remove_file(&temp_path).await;
        return Err(StorageError::Io(e));
    }
    Ok(())
}

#[async_trait]
impl ResourceStore for FilesystemBackend {
    #[instrument(skip(self, data), fields(backend = "filesystem", size = data.len()))]
    async fn save(&self, data: Bytes) -> StorageResult<i64> {
        let mut last_id = self.last_id.lock().await;
        let id = last_id.checked_add(1).ok_or(StorageError::IdsExhausted)?;

        // Persist the sequence first so a crash can never hand out `id` twice
        write_atomic(&self.root.join(SEQUENCE_FILE), id.to_string().as_bytes()).await?;
        *last_id = id;

        write_atomic(&self.resource_path(id), &data).await?;
        debug!(resource_id = id, "Stored resource");
        Ok(id)
    }

    #[instrument(skip(self), fields(backend = "filesystem"))]
    async fn find(&self, id: i64) -> StorageResult<Option<Bytes>> {
        match fs::read(self.resource_path(id)).await {
            Ok(data) => Ok(Some(Bytes::from(data))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    #[instrument(skip(self), fields(backend = "filesystem", count = ids.len()))]
    async fn filter_existing(&self, ids: &[i64]) -> StorageResult<Vec<i64>> {
        let mut existing = Vec::with_capacity(ids.len());
        for &id in ids {
            if fs::try_exists(self.resource_path(id)).await? {
                existing.push(id);
            }
        }
        Ok(existing)
    }

    #[instrument(skip(self), fields(backend = "filesystem", count = ids.len()))]
    async fn delete_all(&self, ids: &[i64]) -> StorageResult<Vec<i64>> {
        let mut removed = Vec::with_capacity(ids.len());
        for &id in ids {
            match fs::remove_file(self.resource_path(id)).await {
                Ok(()) => removed.push(id),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    debug!(resource_id = id, "Resource already absent");
                }
                Err(e) => return Err(StorageError::Io(e)),
            }
        }
        Ok(removed)
    }

    #[instrument(skip(self), fields(backend = "filesystem"))]
    async fn list_ids(&self) -> StorageResult<Vec<i64>> {
        stored_ids(&self.resources).await
    }

    fn backend_name(&self) -> &'static str {
        "filesystem"
    }

    #[instrument(skip(self), fields(backend = "filesystem"))]
    async fn health_check(&self) -> StorageResult<()> {
        // Verify the resources directory exists and is accessible
        let metadata = fs::metadata(&self.resources).await.map_err(|e| {
            StorageError::Io(std::io::Error::new(
                e.kind(),
                format!("storage root not accessible: {e}"),
            ))
        })?;

        if !metadata.is_dir() {
            return Err(StorageError::Io(std::io::Error::new(
                std::io::ErrorKind::NotADirectory,
                format!("storage root is not a directory: {:?}", self.resources),
            )));
        }

        Ok(())
    }
}
