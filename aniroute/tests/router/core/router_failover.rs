use aniroute::{AnirouteError, CircuitState};

use crate::helpers::{fast_retry, manager, page_of, TestSource};

#[tokio::test]
async fn failure_fails_over_once_and_marks_source_unavailable() {
    let a = TestSource::builder().name("a").fails_listing("502").build();
    let b = TestSource::builder()
        .name("b")
        .returns_listing_ok(page_of("b", 4))
        .build();
    let m = manager()
        .with_source(a.clone())
        .with_source(b.clone())
        .build()
        .unwrap();

    let page = m.get_trending(1, None).await;
    assert_eq!(page.source, "b");
    assert_eq!(page.results.len(), 4);
    assert_eq!(a.calls("trending"), 1);
    assert!(!m.registry().get("a").unwrap().is_available());

    // the unavailable source is skipped until a health cycle restores it
    let again = m.get_trending(1, None).await;
    assert_eq!(again.source, "b");
    assert_eq!(a.calls("trending"), 1);

    m.check_all_health().await;
    assert!(m.registry().get("a").unwrap().is_available());
}

#[tokio::test]
async fn never_selects_more_than_two_sources_or_one_twice() {
    let sources: Vec<_> = ["a", "b", "c"]
        .into_iter()
        .map(|n| TestSource::builder().name(n).fails_listing("down").build())
        .collect();
    let mut builder = manager();
    for s in &sources {
        builder = builder.with_source(s.clone());
    }
    let m = builder.build().unwrap();

    let page = m.get_latest(1, None).await;
    assert!(page.is_empty());
    assert_eq!(page.source, "none");
    assert_eq!(sources[0].calls("latest"), 1);
    assert_eq!(sources[1].calls("latest"), 1);
    assert_eq!(sources[2].calls("latest"), 0);
}

#[tokio::test]
async fn empty_result_triggers_a_single_failover() {
    let a = TestSource::builder().name("a").build();
    let b = TestSource::builder()
        .name("b")
        .returns_search_ok(page_of("b", 2))
        .build();
    let m = manager()
        .with_source(a.clone())
        .with_source(b.clone())
        .build()
        .unwrap();

    let page = m.search("anything", 1, None).await;
    assert_eq!(page.source, "b");
    assert_eq!(a.calls("search"), 1);
    // an empty answer is not a failure
    assert!(m.registry().get("a").unwrap().is_available());
}

#[tokio::test]
async fn all_empty_returns_the_empty_page() {
    let a = TestSource::builder().name("a").build();
    let b = TestSource::builder().name("b").build();
    let m = manager().with_source(a).with_source(b).build().unwrap();
    let page = m.search("nothing", 3, None).await;
    assert!(page.is_empty());
    assert_eq!(page.current_page, 3);
}

#[tokio::test]
async fn retries_stay_on_the_selected_source() {
    let a = TestSource::builder()
        .name("a")
        .with_listing_fn({
            let n = std::sync::atomic::AtomicUsize::new(0);
            move |_, _| {
                if n.fetch_add(1, std::sync::atomic::Ordering::SeqCst) == 0 {
                    Err(AnirouteError::provider("a", "flaky"))
                } else {
                    Ok(page_of("a", 1))
                }
            }
        })
        .build();
    let b = TestSource::builder()
        .name("b")
        .returns_listing_ok(page_of("b", 1))
        .build();
    let m = manager()
        .retry(fast_retry())
        .with_source(a.clone())
        .with_source(b.clone())
        .build()
        .unwrap();

    let page = m.get_trending(1, None).await;
    assert_eq!(page.source, "a");
    assert_eq!(a.calls("trending"), 2);
    assert_eq!(b.calls("trending"), 0);
}

#[tokio::test]
async fn open_circuit_is_skipped_without_calling_the_source() {
    let a = TestSource::builder().name("a").fails_search("boom").build();
    let b = TestSource::builder()
        .name("b")
        .returns_search_ok(page_of("b", 1))
        .build();
    let m = manager()
        .circuit_breaker(aniroute::CircuitBreakerConfig {
            failure_threshold: 1,
            reset_timeout: std::time::Duration::from_secs(60),
        })
        .with_source(a.clone())
        .with_source(b.clone())
        .build()
        .unwrap();

    assert_eq!(m.search("x", 1, None).await.source, "b");
    assert_eq!(m.resilience_report().sources[0].circuit.state, CircuitState::Open);

    // health restores availability but the breaker still rejects the call
    m.check_all_health().await;
    assert_eq!(m.search("x", 1, None).await.source, "b");
    assert_eq!(a.calls("search"), 1);
    // circuit rejections do not clear the availability flag
    assert!(m.registry().get("a").unwrap().is_available());
}
