use crawl_actor::{KeyValueStore, QueuedRequest, RequestQueue};

mod common;

#[tokio::test]
async fn add_request_deduplicates_by_url() {
    let queue = RequestQueue::new();

    assert!(queue.add_request(QueuedRequest::new("https://example.com/a", 0)).await);
    assert!(!queue.add_request(QueuedRequest::new("https://example.com/a", 1)).await);
    assert!(queue.add_request(QueuedRequest::new("https://example.com/b", 0)).await);

    assert_eq!(queue.pending_count().await, 2);
}

#[tokio::test]
async fn fetch_next_is_fifo() {
    let queue = RequestQueue::new();
    queue.add_request(QueuedRequest::new("https://example.com/1", 0)).await;
    queue.add_request(QueuedRequest::new("https://example.com/2", 0)).await;

    let first = queue.fetch_next().await.expect("first");
    let second = queue.fetch_next().await.expect("second");
    assert_eq!(first.url, "https://example.com/1");
    assert_eq!(second.url, "https://example.com/2");
    assert!(queue.fetch_next().await.is_none());
}

#[tokio::test]
async fn reclaim_bypasses_deduplication() {
    let queue = RequestQueue::new();
    queue.add_request(QueuedRequest::new("https://example.com/a", 0)).await;

    let claimed = queue.fetch_next().await.expect("claimed");
    assert!(queue.is_empty().await);

    // A failed request goes back for another attempt even though its URL
    // is already in the seen-set
    queue.reclaim(claimed.retried()).await;
    let again = queue.fetch_next().await.expect("reclaimed");
    assert_eq!(again.url, "https://example.com/a");
    assert_eq!(again.retry_count, 1);
}

#[tokio::test]
async fn handled_count_tracks_marked_requests() {
    let queue = RequestQueue::new();
    queue.add_request(QueuedRequest::new("https://example.com/a", 0)).await;
    queue.add_request(QueuedRequest::new("https://example.com/b", 0)).await;

    queue.fetch_next().await.expect("a");
    queue.mark_handled();

    assert_eq!(queue.handled_count(), 1);
    assert_eq!(queue.pending_count().await, 1);
}

#[tokio::test]
async fn snapshot_persists_and_restores() {
    let storage = common::create_storage_dir();
    let kv = KeyValueStore::open(storage.path(), "default")
        .await
        .expect("store should open");

    let queue = RequestQueue::new();
    queue.add_request(QueuedRequest::new("https://example.com/done", 0)).await;
    queue.add_request(QueuedRequest::new("https://example.com/pending", 1)).await;
    queue.fetch_next().await.expect("claim done");
    queue.mark_handled();

    queue.persist(&kv).await.expect("persist");

    let restored = RequestQueue::restore(&kv).await.expect("restore");
    assert_eq!(restored.pending_count().await, 1);
    assert_eq!(restored.handled_count(), 1);

    let pending = restored.fetch_next().await.expect("pending survives");
    assert_eq!(pending.url, "https://example.com/pending");
    assert_eq!(pending.depth, 1);

    // The seen-set survives too: a handled URL cannot be re-enqueued
    assert!(
        !restored
            .add_request(QueuedRequest::new("https://example.com/done", 0))
            .await
    );
}

#[tokio::test]
async fn restore_without_snapshot_is_empty() {
    let storage = common::create_storage_dir();
    let kv = KeyValueStore::open(storage.path(), "default")
        .await
        .expect("store should open");

    let queue = RequestQueue::restore(&kv).await.expect("restore");
    assert!(queue.is_empty().await);
    assert_eq!(queue.handled_count(), 0);
}
