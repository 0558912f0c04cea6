use std::sync::Arc;

use aniroute::SourceKey;

use crate::helpers::{anime, manager, TestSource};

fn knows_everything(name: &'static str) -> Arc<TestSource> {
    TestSource::builder()
        .name(name)
        .with_anime_fn(move |id| Ok(Some(anime(id, "Frieren", name))))
        .build()
}

#[tokio::test]
async fn prefix_routes_to_owner_and_forwards_id_unchanged() {
    let hi = knows_everything("hianime");
    let gogo = knows_everything("gogo");
    let m = manager()
        .with_source(hi.clone())
        .with_source(gogo.clone())
        .route_prefix("gogo-", SourceKey::new("gogo"), Some(SourceKey::new("hianime")))
        .build()
        .unwrap();

    let found = m.get_anime("gogo-frieren-123").await.unwrap();
    assert_eq!(found.source, "gogo");
    assert_eq!(gogo.log(), vec!["anime:gogo-frieren-123"]);
    assert!(hi.log().is_empty());

    let eps = m.get_episodes("gogo-frieren-123").await;
    assert_eq!(eps.len(), 1);
    assert_eq!(gogo.calls("episodes"), 1);

    // unprefixed ids follow the priority order
    let other = m.get_anime("frieren-123").await.unwrap();
    assert_eq!(other.source, "hianime");
}

#[tokio::test]
async fn backup_serves_when_owner_is_unavailable() {
    let hi = knows_everything("hianime");
    let gogo = TestSource::builder()
        .name("gogo")
        .with_anime_fn(|_| Err(aniroute::AnirouteError::provider("gogo", "403")))
        .build();
    let other = knows_everything("other");
    let m = manager()
        .with_source(other.clone())
        .with_source(hi.clone())
        .with_source(gogo.clone())
        .route_prefix("gogo-", SourceKey::new("gogo"), Some(SourceKey::new("hianime")))
        .build()
        .unwrap();

    // the owner fails, failover goes by priority
    let first = m.get_anime("gogo-x").await.unwrap();
    assert_eq!(first.source, "other");
    assert!(!m.registry().get("gogo").unwrap().is_available());

    // while the owner is down its backup is preferred
    let second = m.get_anime("gogo-x").await.unwrap();
    assert_eq!(second.source, "hianime");
    assert_eq!(hi.log(), vec!["anime:gogo-x"]);
    assert_eq!(gogo.calls("anime"), 1);
}

#[tokio::test]
async fn longest_prefix_wins() {
    let a = knows_everything("a");
    let b = knows_everything("b");
    let m = manager()
        .with_source(a.clone())
        .with_source(b.clone())
        .route_prefix("x-", SourceKey::new("a"), None)
        .route_prefix("x-long-", SourceKey::new("b"), None)
        .build()
        .unwrap();

    assert_eq!(m.get_anime("x-long-1").await.unwrap().source, "b");
    assert_eq!(m.get_anime("x-1").await.unwrap().source, "a");
}

#[tokio::test]
async fn unknown_id_fails_over_once_then_settles_to_none() {
    let a = TestSource::builder().name("a").build();
    let b = TestSource::builder().name("b").build();
    let c = TestSource::builder().name("c").build();
    let m = manager()
        .with_source(a.clone())
        .with_source(b.clone())
        .with_source(c.clone())
        .build()
        .unwrap();

    assert!(m.get_anime("missing").await.is_none());
    assert_eq!(a.calls("anime") + b.calls("anime") + c.calls("anime"), 2);
    assert!(m.registry().get("a").unwrap().is_available());
}
