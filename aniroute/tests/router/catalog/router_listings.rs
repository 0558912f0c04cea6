use std::sync::Arc;

use aniroute_mock::{MockSource, PAGE_SIZE};

use crate::helpers::{manager, TestSource};

#[tokio::test]
async fn trending_pages_through_the_fixture_listing() {
    let m = manager()
        .with_source(Arc::new(MockSource::named("mock")))
        .build()
        .unwrap();

    let first = m.get_trending(0, None).await;
    assert_eq!(first.current_page, 1);
    assert_eq!(first.results.len(), PAGE_SIZE);
    assert!(first.has_next_page);

    let last = m.get_trending(3, None).await;
    assert_eq!(last.results.len(), 4);
    assert!(!last.has_next_page);
}

#[tokio::test]
async fn latest_orders_by_year() {
    let m = manager()
        .with_source(Arc::new(MockSource::named("mock")))
        .build()
        .unwrap();
    let page = m.get_latest(1, None).await;
    assert_eq!(page.results[0].title, "Dan Da Dan");
    assert_eq!(page.results[0].year, Some(2024));
}

#[tokio::test]
async fn top_rated_honours_limit_and_default() {
    let m = manager()
        .with_source(Arc::new(MockSource::named("mock")))
        .build()
        .unwrap();

    let three = m.get_top_rated(1, Some(3), None).await;
    assert_eq!(three.results.len(), 3);
    assert_eq!(three.results[0].id, "frieren-18542");

    let all = m.get_top_rated(1, None, None).await;
    assert_eq!(all.results.len(), 16);
}

#[tokio::test]
async fn listing_of_unknown_preference_uses_priority() {
    let t = TestSource::builder()
        .name("t")
        .with_listing_fn(|op, page| Ok(crate::helpers::page_of(op, page as usize)))
        .build();
    let m = manager().with_source(t.clone()).build().unwrap();

    let page = m.get_top_rated(2, None, Some("nope")).await;
    assert_eq!(page.source, "top_rated");
    assert_eq!(page.results.len(), 2);
    assert_eq!(t.log(), vec!["top_rated:2"]);
}
