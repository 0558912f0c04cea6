use aniroute::{CircuitState, HealthState, SourceKey};

use crate::helpers::{manager, page_of, TestSource};

#[tokio::test]
async fn report_lists_priority_capabilities_and_breakers() {
    let a = TestSource::builder().name("a").fails_search("down").build();
    let b = TestSource::builder()
        .name("b")
        .streaming()
        .returns_search_ok(page_of("b", 1))
        .build();
    let m = manager()
        .with_source(a)
        .with_source(b)
        .priority(&[SourceKey::new("b")])
        .build()
        .unwrap();

    let before = m.resilience_report();
    assert_eq!(before.priority, vec!["b", "a"]);
    assert_eq!(before.sources[0].name, "a");
    assert!(
        before.sources[1]
            .capabilities
            .iter()
            .any(|c| c == "streaming-links")
    );
    assert!(before.sources.iter().all(|s| {
        s.health.as_ref().map(|h| h.state) == Some(HealthState::Online)
    }));

    // prefer a so its failure is recorded before b answers
    let page = m.search("x", 1, Some("a")).await;
    assert_eq!(page.source, "b");

    let after = m.resilience_report();
    let a = &after.sources[0];
    assert!(!a.available);
    assert_eq!(a.circuit.state, CircuitState::Closed);
    assert_eq!(a.circuit.failures, 1);
    assert!(a.circuit.last_failure_age_ms.is_some());
    assert_eq!(after.in_flight, 0);
}

#[tokio::test]
async fn report_serializes_to_json() {
    let m = manager()
        .with_source(TestSource::builder().name("solo").build())
        .build()
        .unwrap();
    let json = serde_json::to_value(m.resilience_report()).unwrap();
    assert_eq!(json["priority"][0], "solo");
    assert_eq!(json["sources"][0]["circuit"]["state"], "Closed");
}
