use std::sync::Arc;

use aniroute::AnimePage;
use aniroute_mock::MockSource;

use crate::helpers::{manager, page_of, TestSource};

#[tokio::test]
async fn random_pick_comes_from_top_rated() {
    let m = manager()
        .with_source(Arc::new(MockSource::named("mock")))
        .build()
        .unwrap();

    for _ in 0..5 {
        let picked = m.get_random_anime(None).await.unwrap();
        assert_eq!(picked.source, "mock");
        assert!(!picked.id.is_empty());
    }
}

#[tokio::test]
async fn empty_random_page_retries_first_page() {
    let t = TestSource::builder()
        .name("t")
        .with_listing_fn(|_, page| {
            if page == 1 {
                Ok(page_of("t", 3))
            } else {
                Ok(AnimePage::empty(page, "t"))
            }
        })
        .build();
    let m = manager().with_source(t.clone()).build().unwrap();

    let picked = m.get_random_anime(None).await.unwrap();
    assert!(picked.id.starts_with("t-"));
    assert!(t.log().contains(&"top_rated:1".to_string()));
    assert!(t.calls("top_rated") <= 2);
}

#[tokio::test]
async fn nothing_anywhere_yields_none() {
    let m = manager()
        .with_source(TestSource::builder().name("t").build())
        .build()
        .unwrap();
    assert!(m.get_random_anime(None).await.is_none());
}
