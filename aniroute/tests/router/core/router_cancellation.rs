use std::sync::Arc;
use std::time::Duration;

use aniroute::{CancellationToken, with_cancellation};

use crate::helpers::{manager, page_of, TestSource};

fn slow(name: &'static str) -> Arc<TestSource> {
    TestSource::builder()
        .name(name)
        .delay(Duration::from_secs(10))
        .returns_listing_ok(page_of(name, 3))
        .build()
}

#[tokio::test(start_paused = true)]
async fn cancelled_request_returns_default_without_failover() {
    let a = slow("a");
    let b = slow("b");
    let m = manager()
        .call_timeout(Duration::from_secs(30))
        .with_source(a.clone())
        .with_source(b.clone())
        .build()
        .unwrap();

    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let page = with_cancellation(token, m.get_trending(1, None)).await;
    assert!(page.is_empty());
    assert_eq!(a.calls("trending"), 1);
    assert_eq!(b.calls("trending"), 0);

    let report = m.resilience_report();
    assert!(report.sources.iter().all(|s| s.available));
    assert!(report.sources.iter().all(|s| s.circuit.failures == 0));
    assert_eq!(report.in_flight, 0);
}

#[tokio::test(start_paused = true)]
async fn already_cancelled_token_calls_nothing() {
    let a = slow("a");
    let m = manager().with_source(a.clone()).build().unwrap();
    let token = CancellationToken::new();
    token.cancel();

    let found = with_cancellation(token, m.get_anime("a-1")).await;
    assert!(found.is_none());
    assert!(a.log().is_empty());
}

#[tokio::test(start_paused = true)]
async fn scans_stop_on_cancellation() {
    let a = TestSource::builder()
        .name("a")
        .streaming()
        .delay(Duration::from_secs(10))
        .build();
    let b = TestSource::builder().name("b").streaming().build();
    let m = manager()
        .call_timeout(Duration::from_secs(30))
        .with_source(a.clone())
        .with_source(b.clone())
        .build()
        .unwrap();

    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        trigger.cancel();
    });
    let servers = with_cancellation(token, m.get_episode_servers("ep-1")).await;
    assert!(servers.is_empty());
    assert_eq!(servers.episode_id, "ep-1");
    assert_eq!(b.calls("servers"), 0);
}

#[tokio::test(start_paused = true)]
async fn shutdown_aborts_in_flight_requests() {
    let a = slow("a");
    let m = Arc::new(
        manager()
            .call_timeout(Duration::from_secs(30))
            .with_source(a.clone())
            .build()
            .unwrap(),
    );

    let task = {
        let m = Arc::clone(&m);
        tokio::spawn(async move { m.get_latest(1, None).await })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;
    m.shutdown();
    let page = task.await.unwrap();
    assert!(page.is_empty());
    assert_eq!(a.calls("latest"), 1);
}
