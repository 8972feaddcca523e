// Consistency tests for concurrent saves and deletes
// Every backend must hand out unique ids and report each deletion exactly once

mod common;

use common::{backends, seeded_bytes};
use std::collections::HashSet;

#[tokio::test]
async fn test_roundtrip_is_byte_identical() {
    let (_dir, stores) = backends().await;
    for store in stores {
        let data = seeded_bytes(7, 256 * 1024 + 3);
        let id = store.save(data.clone()).await.unwrap();
        assert_eq!(
            store.find(id).await.unwrap(),
            Some(data),
            "backend {}",
            store.backend_name()
        );
    }
}

#[tokio::test]
async fn test_concurrent_saves_get_unique_ids() {
    let (_dir, stores) = backends().await;
    for store in stores {
        let mut handles = Vec::new();
        for i in 0..50u64 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                let data = seeded_bytes(i, 64);
                let id = store.save(data.clone()).await.unwrap();
                (id, data)
            }));
        }

        let mut ids = HashSet::new();
        for handle in handles {
            let (id, data) = handle.await.unwrap();
            assert!(id > 0);
            assert!(ids.insert(id), "id {id} handed out twice");
            assert_eq!(store.find(id).await.unwrap(), Some(data));
        }
        assert_eq!(ids.len(), 50);
        assert_eq!(ids.iter().max(), Some(&50));
    }
}

#[tokio::test]
async fn test_overlapping_deletes_remove_each_id_once() {
    let (_dir, stores) = backends().await;
    for store in stores {
        let mut ids = Vec::new();
        for i in 0..20u64 {
            ids.push(store.save(seeded_bytes(i, 16)).await.unwrap());
        }

        let first = ids[..15].to_vec();
        let second = ids[5..].to_vec();
        let (a, b) = {
            let (s1, s2) = (store.clone(), store.clone());
            tokio::join!(
                tokio::spawn(async move { s1.delete_all(&first).await.unwrap() }),
                tokio::spawn(async move { s2.delete_all(&second).await.unwrap() }),
            )
        };
        let (a, b) = (a.unwrap(), b.unwrap());

        let mut all: Vec<i64> = a.iter().chain(b.iter()).copied().collect();
        all.sort_unstable();
        assert_eq!(all, ids, "backend {}", store.backend_name());
        assert!(store.filter_existing(&ids).await.unwrap().is_empty());
    }
}
