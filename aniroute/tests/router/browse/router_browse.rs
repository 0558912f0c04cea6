use std::sync::Arc;

use aniroute::{BrowseRequest, MediaFormat, SortKey, SortOrder};
use aniroute_mock::{MockCatalog, MockSource};

use crate::helpers::{manager, page_of, TestSource};

fn mock_manager() -> aniroute::SourceManager {
    manager()
        .with_source(Arc::new(MockSource::named("mock")))
        .build()
        .unwrap()
}

fn titles(page: &aniroute::BrowsePage) -> Vec<&str> {
    page.results.iter().map(|a| a.title.as_str()).collect()
}

#[tokio::test]
async fn filters_sorts_and_paginates_prefetched_listings() {
    let m = mock_manager();
    let req = BrowseRequest::builder()
        .genre("Supernatural")
        .sort(SortKey::Rating, SortOrder::Desc)
        .per_page(3)
        .build()
        .unwrap();

    let page = m.browse_anime(&req).await;
    assert_eq!(titles(&page), vec!["Your Name.", "Mushishi", "Dan Da Dan"]);
    assert_eq!(page.total_results, 5);
    assert_eq!(page.total_pages, 2);
    assert!(page.has_next_page);
    assert_eq!(page.source, "mock");
}

#[tokio::test]
async fn format_filter_with_year_ascending() {
    let m = mock_manager();
    let req = BrowseRequest::builder()
        .format(MediaFormat::Movie)
        .sort(SortKey::Year, SortOrder::Asc)
        .build()
        .unwrap();

    let page = m.browse_anime(&req).await;
    assert_eq!(titles(&page), vec!["Perfect Blue", "Your Name."]);
    assert!(!page.has_next_page);
}

#[tokio::test]
async fn recent_sort_prefetches_latest_and_dedupes_titles() {
    let t = TestSource::builder()
        .name("t")
        .returns_listing_ok(page_of("t", 4))
        .build();
    let m = manager().with_source(t.clone()).build().unwrap();
    let req = BrowseRequest::builder()
        .sort(SortKey::Recent, SortOrder::Desc)
        .build()
        .unwrap();

    let page = m.browse_anime(&req).await;
    // every prefetched page repeats the same titles
    assert_eq!(page.total_results, 4);
    let pages = m.config().browse.prefetch_pages as usize;
    assert_eq!(t.calls("latest"), pages);
    assert_eq!(t.calls("trending"), 0);
}

#[tokio::test]
async fn multi_genre_with_catalog_uses_live_resolution() {
    let m = manager()
        .with_source(Arc::new(MockSource::named("mock")))
        .catalog(Arc::new(MockCatalog))
        .build()
        .unwrap();
    let req = BrowseRequest::builder()
        .genre("Action")
        .genre("Supernatural")
        .build()
        .unwrap();

    let page = m.browse_anime(&req).await;
    assert_eq!(
        titles(&page),
        vec!["Mob Psycho 100", "Chainsaw Man", "Dan Da Dan"]
    );
    assert_eq!(page.source, "aniroute-mock-catalog+mock");
}

#[tokio::test]
async fn exhausted_sources_give_an_empty_page() {
    let t = TestSource::builder().name("t").fails_listing("down").build();
    let m = manager().with_source(t).build().unwrap();
    let req = BrowseRequest::builder().page(2).build().unwrap();

    let page = m.browse_anime(&req).await;
    assert!(page.results.is_empty());
    assert_eq!(page.page, 2);
    assert_eq!(page.total_pages, 0);
    assert_eq!(page.source, "none");
}

#[tokio::test]
async fn prefetch_failures_fall_through_without_demoting() {
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

    let page = m.browse_anime(&BrowseRequest::default()).await;
    assert_eq!(page.total_results, 4);
    assert_eq!(page.source, "b");
    let pages = m.config().browse.prefetch_pages as usize;
    assert_eq!(a.calls("trending"), pages);
    assert!(m.registry().get("a").unwrap().is_available());
}
