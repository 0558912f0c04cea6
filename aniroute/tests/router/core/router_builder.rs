use std::sync::Arc;

use aniroute::{AnirouteError, SourceKey, SourceManager};
use aniroute_mock::MockSource;

#[test]
fn build_requires_a_source() {
    let err = SourceManager::builder().build().unwrap_err();
    assert!(matches!(err, AnirouteError::InvalidArg(_)));
}

#[test]
fn build_rejects_duplicate_names() {
    let err = SourceManager::builder()
        .with_source(Arc::new(MockSource::named("a")))
        .with_source(Arc::new(MockSource::named("a")))
        .build()
        .unwrap_err();
    match err {
        AnirouteError::InvalidArg(msg) => assert!(msg.contains("duplicate"), "{msg}"),
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn build_rejects_routes_to_unknown_sources() {
    let err = SourceManager::builder()
        .with_source(Arc::new(MockSource::named("a")))
        .route_prefix("x-", SourceKey::new("a"), Some(SourceKey::new("ghost")))
        .build()
        .unwrap_err();
    match err {
        AnirouteError::InvalidArg(msg) => assert!(msg.contains("ghost"), "{msg}"),
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn build_drops_unknown_and_repeated_priority_keys() {
    let m = SourceManager::builder()
        .with_source(Arc::new(MockSource::named("a")))
        .with_source(Arc::new(MockSource::named("b")))
        .priority(&[
            SourceKey::new("zzz"),
            SourceKey::new("b"),
            SourceKey::new("b"),
        ])
        .build()
        .unwrap();
    assert_eq!(m.registry().priority(), vec!["b", "a"]);
}

#[test]
fn build_rejects_zero_attempts() {
    let err = SourceManager::builder()
        .with_source(Arc::new(MockSource::named("a")))
        .retry(aniroute::RetryConfig {
            max_attempts: 0,
            base_delay: std::time::Duration::from_millis(1),
        })
        .build()
        .unwrap_err();
    assert!(matches!(err, AnirouteError::InvalidArg(_)));
}
