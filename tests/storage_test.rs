use crawl_actor::{Dataset, KeyValueStore};
use serde::{Deserialize, Serialize};

mod common;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Blob {
    pushed: u64,
    label: String,
}

#[tokio::test]
async fn key_value_store_roundtrip() {
    let storage = common::create_storage_dir();
    let kv = KeyValueStore::open(storage.path(), "default")
        .await
        .expect("store should open");

    let blob = Blob {
        pushed: 7,
        label: "counter".to_string(),
    };
    kv.set_value("CRAWLER_STATE", &blob)
        .await
        .expect("set should succeed");

    let read: Option<Blob> = kv.get_value("CRAWLER_STATE").await.expect("get should succeed");
    assert_eq!(read, Some(blob));
}

#[tokio::test]
async fn key_value_store_missing_key_is_none() {
    let storage = common::create_storage_dir();
    let kv = KeyValueStore::open(storage.path(), "default")
        .await
        .expect("store should open");

    let read: Option<Blob> = kv.get_value("NEVER_WRITTEN").await.expect("get should succeed");
    assert!(read.is_none());
    assert!(!kv.has_value("NEVER_WRITTEN").await.expect("has_value"));
}

#[tokio::test]
async fn key_value_store_overwrites_in_place() {
    let storage = common::create_storage_dir();
    let kv = KeyValueStore::open(storage.path(), "default")
        .await
        .expect("store should open");

    kv.set_value("K", &1u64).await.expect("first write");
    kv.set_value("K", &2u64).await.expect("second write");

    let read: Option<u64> = kv.get_value("K").await.expect("get");
    assert_eq!(read, Some(2));
}

#[tokio::test]
async fn key_value_store_rejects_path_like_keys() {
    let storage = common::create_storage_dir();
    let kv = KeyValueStore::open(storage.path(), "default")
        .await
        .expect("store should open");

    assert!(kv.set_value("../escape", &1u64).await.is_err());
    assert!(kv.set_value("a/b", &1u64).await.is_err());
    assert!(kv.set_value("", &1u64).await.is_err());
}

#[tokio::test]
async fn dataset_appends_zero_padded_items() {
    let storage = common::create_storage_dir();
    let dataset = Dataset::open(storage.path(), "default")
        .await
        .expect("dataset should open");

    let first = dataset
        .push_data(&serde_json::json!({"url": "https://example.com/"}))
        .await
        .expect("push");
    let second = dataset
        .push_data(&serde_json::json!({"url": "https://example.com/a"}))
        .await
        .expect("push");

    assert_eq!(first, 1);
    assert_eq!(second, 2);
    assert_eq!(dataset.item_count(), 2);
    assert!(dataset.dir().join("000000001.json").exists());
    assert!(dataset.dir().join("000000002.json").exists());
}

#[tokio::test]
async fn dataset_resumes_numbering_after_reopen() {
    let storage = common::create_storage_dir();
    {
        let dataset = Dataset::open(storage.path(), "default")
            .await
            .expect("dataset should open");
        for i in 0..3 {
            dataset
                .push_data(&serde_json::json!({"n": i}))
                .await
                .expect("push");
        }
    }

    // A rebooted run keeps appending where the previous one stopped
    let reopened = Dataset::open(storage.path(), "default")
        .await
        .expect("dataset should reopen");
    assert_eq!(reopened.item_count(), 3);

    let next = reopened
        .push_data(&serde_json::json!({"n": 3}))
        .await
        .expect("push");
    assert_eq!(next, 4);
    assert!(reopened.dir().join("000000004.json").exists());
}
