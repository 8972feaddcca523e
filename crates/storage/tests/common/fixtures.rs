use bytes::Bytes;
use jukebox_storage::{FilesystemBackend, MemoryBackend, ResourceStore};
use std::sync::Arc;
use tempfile::TempDir;

/// Generate deterministic test data using a seeded pseudo-random generator
/// Same seed produces same output (reproducible tests)
pub fn seeded_bytes(seed: u64, len: usize) -> Bytes {
    let mut data = vec![0u8; len];
    let mut state = seed;

    // Simple LCG (Linear Congruential Generator)
    for chunk in data.chunks_mut(8) {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
        let bytes = state.to_le_bytes();
        for (i, byte) in chunk.iter_mut().enumerate() {
            *byte = bytes[i % 8];
        }
    }

    Bytes::from(data)
}

/// One instance of every backend. The returned `TempDir` must outlive the stores.
pub async fn backends() -> (TempDir, Vec<Arc<dyn ResourceStore>>) {
    let dir = TempDir::new().unwrap();
    let filesystem = FilesystemBackend::new(dir.path()).await.unwrap();
    let stores: Vec<Arc<dyn ResourceStore>> =
        vec![Arc::new(filesystem), Arc::new(MemoryBackend::new())];
    (dir, stores)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_bytes_deterministic() {
        let data1 = seeded_bytes(42, 1000);
        let data2 = seeded_bytes(42, 1000);
        assert_eq!(data1, data2);
    }

    #[test]
    fn test_seeded_bytes_different_seeds() {
        let data1 = seeded_bytes(42, 1000);
        let data2 = seeded_bytes(43, 1000);
        assert_ne!(data1, data2);
    }
}
