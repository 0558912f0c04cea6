use crate::helpers::{manager, page_of, TestSource};

#[tokio::test]
async fn blank_query_calls_no_source() {
    let a = TestSource::builder()
        .name("a")
        .returns_search_ok(page_of("a", 3))
        .build();
    let m = manager().with_source(a.clone()).build().unwrap();

    let page = m.search("   ", 2, None).await;
    assert!(page.is_empty());
    assert_eq!(page.current_page, 2);
    assert_eq!(page.source, "none");
    assert!(a.log().is_empty());
}

#[tokio::test]
async fn query_is_trimmed_and_page_clamped() {
    let a = TestSource::builder()
        .name("a")
        .with_search_fn(|q, p| {
            let mut page = page_of("a", 1);
            page.results[0].title = format!("{q}@{p}");
            Ok(page)
        })
        .build();
    let m = manager().with_source(a.clone()).build().unwrap();

    let page = m.search("  one piece ", 0, None).await;
    assert_eq!(page.results[0].title, "one piece@1");
    assert_eq!(a.log(), vec!["search:one piece"]);
}

#[tokio::test]
async fn preferred_source_is_asked_first() {
    let a = TestSource::builder()
        .name("a")
        .returns_search_ok(page_of("a", 1))
        .build();
    let b = TestSource::builder()
        .name("b")
        .returns_search_ok(page_of("b", 1))
        .build();
    let m = manager()
        .with_source(a.clone())
        .with_source(b.clone())
        .build()
        .unwrap();

    assert_eq!(m.search("x", 1, Some("b")).await.source, "b");
    assert_eq!(a.calls("search"), 0);
    assert_eq!(m.search("x", 1, None).await.source, "a");
}

#[tokio::test]
async fn exhausted_search_settles_to_empty_page() {
    let a = TestSource::builder().name("a").fails_search("500").build();
    let m = manager().with_source(a).build().unwrap();
    let page = m.search("x", 4, None).await;
    assert!(page.is_empty());
    assert_eq!(page.current_page, 4);
    assert_eq!(page.source, "none");

    // a is now unavailable, so nothing is eligible
    let again = m.search("x", 1, None).await;
    assert!(again.is_empty());
}
