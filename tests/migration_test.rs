//! Interruption-handler properties: what must hold after a simulated
//! "migrating" or "aborting" notification.

use crawl_actor::{
    Actor, ActorConfig, HttpCrawler, PlatformEvent, RequestHandler, spawn_interruption_listener,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

mod common;

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct CounterState {
    pushed: u64,
}

fn noop_handler() -> RequestHandler<CounterState> {
    Arc::new(|_ctx| Box::pin(async { Ok::<(), anyhow::Error>(()) }))
}

const GRACE_DELAY_MS: u64 = 150;

/// Actor wired to a mock platform server, with a short grace delay
async fn platform_actor(storage_dir: &std::path::Path, api_base: &str) -> Actor {
    let config = ActorConfig::builder()
        .storage_dir(storage_dir)
        .start_url("https://example.com")
        .persist_delay_ms(GRACE_DELAY_MS)
        .api_base_url(api_base)
        .actor_run_id("run-123")
        .api_token("secret-token")
        .build()
        .expect("valid config");
    Actor::init(config).await.expect("actor init")
}

#[tokio::test]
async fn migrating_persists_all_state_before_rebooting() {
    let mut server = mockito::Server::new_async().await;
    let storage = common::create_storage_dir();
    let actor = platform_actor(storage.path(), &server.url()).await;
    let crawler = Arc::new(
        HttpCrawler::<CounterState>::new(&actor, noop_handler())
            .await
            .expect("crawler init"),
    );

    // Simulate the mismatch window: three records made it into the dataset
    // but the counter was only bumped twice before the notification
    for _ in 0..3 {
        actor
            .dataset()
            .push_data(&serde_json::json!({"url": "https://example.com/"}))
            .await
            .expect("push");
    }
    {
        let state = crawler.use_state().await.expect("state");
        state.write().pushed = 2;
    }

    // The reboot endpoint records whether every component was already
    // persisted at the moment the call arrived
    let kv_dir = actor.key_value_store().dir().to_path_buf();
    let persisted_before_reboot = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&persisted_before_reboot);
    let reboot_mock = server
        .mock("POST", "/v2/actor-runs/run-123/reboot")
        .with_status(200)
        .with_body_from_request(move |_request| {
            let all_persisted = kv_dir.join("CRAWLER_STATE.json").exists()
                && kv_dir.join("CRAWLER_STATISTICS.json").exists()
                && kv_dir.join("REQUEST_QUEUE_STATE.json").exists();
            flag.store(all_persisted, Ordering::SeqCst);
            b"{}".to_vec()
        })
        .create_async()
        .await;

    let abort_fired = Arc::new(AtomicBool::new(false));
    let abort_flag = Arc::clone(&abort_fired);
    let listener = spawn_interruption_listener(
        actor.events(),
        Arc::clone(&crawler),
        actor.client().clone(),
        actor.config_arc(),
        Box::new(move || abort_flag.store(true, Ordering::SeqCst)),
    );

    let started = Instant::now();
    actor
        .events()
        .publish(PlatformEvent::migrating())
        .await
        .expect("publish migrating");
    listener.await.expect("listener task");
    let elapsed = started.elapsed();

    // The grace delay is never skipped
    assert!(
        elapsed >= Duration::from_millis(GRACE_DELAY_MS),
        "persistence ran after {elapsed:?}, before the grace delay elapsed"
    );

    // Reboot was issued, and only after all three persists completed
    reboot_mock.assert_async().await;
    assert!(
        persisted_before_reboot.load(Ordering::SeqCst),
        "reboot was requested before persistence completed"
    );

    // The persisted counter never exceeds the dataset record count
    let persisted: CounterState = actor
        .key_value_store()
        .get_value("CRAWLER_STATE")
        .await
        .expect("read state")
        .expect("state was persisted");
    assert_eq!(persisted.pushed, 2);
    assert!(persisted.pushed as usize <= actor.dataset().item_count());

    // Migration never takes the abort exit path
    assert!(!abort_fired.load(Ordering::SeqCst));
}

#[tokio::test]
async fn aborting_persists_and_exits_without_reboot() {
    let mut server = mockito::Server::new_async().await;
    let storage = common::create_storage_dir();
    let actor = platform_actor(storage.path(), &server.url()).await;
    let crawler = Arc::new(
        HttpCrawler::<CounterState>::new(&actor, noop_handler())
            .await
            .expect("crawler init"),
    );

    actor
        .dataset()
        .push_data(&serde_json::json!({"url": "https://example.com/"}))
        .await
        .expect("push");
    {
        let state = crawler.use_state().await.expect("state");
        state.write().pushed = 1;
    }

    let reboot_mock = server
        .mock("POST", "/v2/actor-runs/run-123/reboot")
        .expect(0)
        .create_async()
        .await;

    let exited = Arc::new(AtomicBool::new(false));
    let exit_flag = Arc::clone(&exited);
    let listener = spawn_interruption_listener(
        actor.events(),
        Arc::clone(&crawler),
        actor.client().clone(),
        actor.config_arc(),
        Box::new(move || exit_flag.store(true, Ordering::SeqCst)),
    );

    let started = Instant::now();
    actor
        .events()
        .publish(PlatformEvent::aborting())
        .await
        .expect("publish aborting");
    listener.await.expect("listener task");
    let elapsed = started.elapsed();

    assert!(
        elapsed >= Duration::from_millis(GRACE_DELAY_MS),
        "persistence ran after {elapsed:?}, before the grace delay elapsed"
    );

    // State was persisted, the terminal action fired, and no reboot call
    // was ever issued
    assert!(exited.load(Ordering::SeqCst), "abort exit action did not run");
    reboot_mock.assert_async().await;

    let persisted: CounterState = actor
        .key_value_store()
        .get_value("CRAWLER_STATE")
        .await
        .expect("read state")
        .expect("state was persisted");
    assert_eq!(persisted.pushed, 1);
    assert!(persisted.pushed as usize <= actor.dataset().item_count());
}

#[tokio::test]
async fn migrating_local_run_persists_without_reboot() {
    let storage = common::create_storage_dir();
    // No platform identity: a local run has no API base, run id or token
    let config = ActorConfig::builder()
        .storage_dir(storage.path())
        .start_url("https://example.com")
        .persist_delay_ms(GRACE_DELAY_MS)
        .build()
        .expect("valid config");
    let actor = Actor::init(config).await.expect("actor init");
    let crawler = Arc::new(
        HttpCrawler::<CounterState>::new(&actor, noop_handler())
            .await
            .expect("crawler init"),
    );

    for _ in 0..5 {
        actor
            .dataset()
            .push_data(&serde_json::json!({"url": "https://example.com/"}))
            .await
            .expect("push");
    }
    {
        let state = crawler.use_state().await.expect("state");
        state.write().pushed = 5;
    }

    let listener = spawn_interruption_listener(
        actor.events(),
        Arc::clone(&crawler),
        actor.client().clone(),
        actor.config_arc(),
        Box::new(|| {}),
    );

    actor
        .events()
        .publish(PlatformEvent::migrating())
        .await
        .expect("publish migrating");
    listener.await.expect("listener task");

    // State is persisted even though there is no platform to reboot
    let persisted: CounterState = actor
        .key_value_store()
        .get_value("CRAWLER_STATE")
        .await
        .expect("read state")
        .expect("state was persisted");
    assert_eq!(persisted.pushed, 5);
}

#[tokio::test]
async fn migration_during_live_crawl_suspends_and_persists() {
    let mut server = mockito::Server::new_async().await;
    let seed = format!("{}/", server.url());

    // A seed page fanning out to slow children keeps the crawl busy long
    // enough for the notification to land mid-run
    let children = ["/p1", "/p2", "/p3", "/p4", "/p5"];
    server
        .mock("GET", "/")
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body(common::page_html("Root", &children))
        .create_async()
        .await;
    for path in children {
        server
            .mock("GET", path)
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body(common::page_html(path, &[]))
            .expect_at_most(1)
            .create_async()
            .await;
    }

    let storage = common::create_storage_dir();
    let config = ActorConfig::builder()
        .storage_dir(storage.path())
        .start_url(&seed)
        .persist_delay_ms(GRACE_DELAY_MS)
        .max_concurrency(1)
        .api_base_url(server.url())
        .actor_run_id("run-123")
        .api_token("secret-token")
        .build()
        .expect("valid config");
    let actor = Actor::init(config).await.expect("actor init");

    let handler: RequestHandler<CounterState> = Arc::new(|ctx| {
        Box::pin(async move {
            ctx.enqueue_links().await?;
            let state = ctx.state();
            ctx.push_data(&serde_json::json!({"url": ctx.loaded_url()}))
                .await?;
            tokio::time::sleep(Duration::from_millis(25)).await;
            state.write().pushed += 1;
            Ok(())
        })
    });
    let crawler = Arc::new(
        HttpCrawler::<CounterState>::new(&actor, handler)
            .await
            .expect("crawler init"),
    );

    let reboot_mock = server
        .mock("POST", "/v2/actor-runs/run-123/reboot")
        .with_status(200)
        .create_async()
        .await;

    let listener = spawn_interruption_listener(
        actor.events(),
        Arc::clone(&crawler),
        actor.client().clone(),
        actor.config_arc(),
        Box::new(|| {}),
    );

    let events = actor.events();
    let notifier = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(40)).await;
        events
            .publish(PlatformEvent::migrating())
            .await
            .expect("publish migrating");
    });

    crawler.run([seed]).await.expect("run returns once suspended");
    assert!(crawler.is_suspended(), "lifecycle event should suspend the crawler");

    notifier.await.expect("notifier task");
    listener.await.expect("listener task");
    reboot_mock.assert_async().await;

    // Whatever was persisted is internally consistent: the counter never
    // exceeds the dataset, and the queue snapshot exists for the rebooted
    // run to resume from
    let persisted: CounterState = actor
        .key_value_store()
        .get_value("CRAWLER_STATE")
        .await
        .expect("read state")
        .expect("state was persisted");
    assert!(persisted.pushed as usize <= actor.dataset().item_count());
    assert!(
        actor
            .key_value_store()
            .has_value("REQUEST_QUEUE_STATE")
            .await
            .expect("check queue snapshot"),
        "pending-work snapshot was not persisted"
    );
    assert!(
        actor
            .key_value_store()
            .has_value("CRAWLER_STATISTICS")
            .await
            .expect("check stats snapshot"),
        "statistics snapshot was not persisted"
    );
}
