use std::collections::HashSet;
use std::sync::Arc;

use aniroute::{AnimeSource, SourceRegistry};
use aniroute_mock::MockSource;
use proptest::prelude::*;

use crate::helpers::{manager, page_of, TestSource};

const NAMES: [&str; 5] = ["s0", "s1", "s2", "s3", "s4"];

#[tokio::test]
async fn preferred_source_is_tried_first_after_promotion() {
    let a = TestSource::builder()
        .name("a")
        .returns_listing_ok(page_of("a", 3))
        .build();
    let b = TestSource::builder()
        .name("b")
        .returns_listing_ok(page_of("b", 3))
        .build();
    let m = manager()
        .with_source(a.clone())
        .with_source(b.clone())
        .build()
        .unwrap();

    assert_eq!(m.get_trending(1, None).await.source, "a");
    m.set_preferred_source("b").unwrap();
    assert_eq!(m.registry().priority(), vec!["b", "a"]);
    assert_eq!(m.get_trending(1, None).await.source, "b");
    assert_eq!(a.calls("trending"), 1);
    assert_eq!(b.calls("trending"), 1);
}

#[tokio::test]
async fn explicit_source_wins_over_priority() {
    let a = TestSource::builder()
        .name("a")
        .returns_listing_ok(page_of("a", 1))
        .build();
    let b = TestSource::builder()
        .name("b")
        .returns_listing_ok(page_of("b", 1))
        .build();
    let m = manager().with_source(a).with_source(b).build().unwrap();
    assert_eq!(m.get_latest(1, Some("b")).await.source, "b");
    // unknown preference falls back to priority order
    assert_eq!(m.get_latest(1, Some("nope")).await.source, "a");
}

#[test]
fn set_preferred_source_rejects_unknown_names() {
    let m = manager()
        .with_source(Arc::new(MockSource::named("a")))
        .build()
        .unwrap();
    assert!(m.set_preferred_source("ghost").is_err());
    assert_eq!(m.registry().priority(), vec!["a"]);
}

fn registry() -> SourceRegistry {
    let sources: Vec<Arc<dyn AnimeSource>> = NAMES
        .iter()
        .map(|&n| Arc::new(MockSource::named(n)) as Arc<dyn AnimeSource>)
        .collect();
    SourceRegistry::new(sources, &[])
}

proptest! {
    #[test]
    fn promote_keeps_a_duplicate_free_permutation(ops in proptest::collection::vec(0usize..NAMES.len(), 0..30)) {
        let r = registry();
        for &i in &ops {
            r.promote(NAMES[i]).unwrap();
            let order = r.priority();
            prop_assert_eq!(order[0], NAMES[i]);
            prop_assert_eq!(order.len(), NAMES.len());
            let distinct: HashSet<&str> = order.iter().copied().collect();
            prop_assert_eq!(distinct.len(), NAMES.len());
        }
    }

    #[test]
    fn promote_is_idempotent_and_preserves_the_rest(i in 0usize..NAMES.len()) {
        let r = registry();
        let before: Vec<&str> = r.priority().into_iter().filter(|n| *n != NAMES[i]).collect();
        r.promote(NAMES[i]).unwrap();
        let once = r.priority();
        r.promote(NAMES[i]).unwrap();
        prop_assert_eq!(&once, &r.priority());
        let rest: Vec<&str> = once[1..].to_vec();
        prop_assert_eq!(rest, before);
    }
}
