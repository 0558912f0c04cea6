use std::sync::Arc;

use aniroute::AnimePage;
use aniroute_mock::{MockCatalog, MockSource};

use crate::helpers::{anime, manager, page_of, TestSource};

#[tokio::test]
async fn catalog_entries_resolve_to_source_records() {
    let m = manager()
        .with_source(Arc::new(MockSource::named("mock")))
        .catalog(Arc::new(MockCatalog))
        .build()
        .unwrap();

    let page = m.get_anime_by_genre("Horror", 1, None).await;
    let ids: Vec<_> = page.results.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, vec!["chainsaw-man-17406", "perfect-blue-437"]);
    assert_eq!(page.source, "aniroute-mock-catalog+mock");
    assert!(page.results.iter().all(|a| a.source == "mock"));
    assert!(page.has_next_page);
}

#[tokio::test]
async fn table_hits_skip_live_search_and_misses_are_dropped() {
    let listing = AnimePage {
        results: vec![anime("t-cm", "Chainsaw Man", "t")],
        ..page_of("t", 0)
    };
    let t = TestSource::builder()
        .name("t")
        .returns_listing_ok(listing)
        .build();
    let m = manager()
        .with_source(t.clone())
        .catalog(Arc::new(MockCatalog))
        .build()
        .unwrap();

    let page = m.get_anime_by_genre("horror", 1, None).await;
    assert_eq!(page.results.len(), 1);
    assert_eq!(page.results[0].id, "t-cm");
    assert_eq!(page.source, "aniroute-mock-catalog+t");
    // only the miss went to live search, with the year stripped
    assert_eq!(t.calls("search"), 1);
    assert!(t.log().contains(&"search:perfect blue".to_string()));
    assert_eq!(t.calls("genre"), 0);
}

#[tokio::test]
async fn lookup_table_is_built_once_within_ttl() {
    let t = TestSource::builder()
        .name("t")
        .returns_listing_ok(AnimePage {
            results: vec![anime("t-cm", "Chainsaw Man", "t")],
            ..page_of("t", 0)
        })
        .build();
    let m = manager()
        .with_source(t.clone())
        .catalog(Arc::new(MockCatalog))
        .build()
        .unwrap();

    let _ = m.get_anime_by_genre("Horror", 1, None).await;
    let _ = m.get_anime_by_genre("Horror", 1, None).await;
    let pages = m.config().enrichment.lookup_pages as usize;
    assert_eq!(t.calls("trending"), pages);
    assert_eq!(t.calls("top_rated"), pages);
}

#[tokio::test]
async fn without_catalog_genre_listing_fails_over_to_genre_sources() {
    let plain = TestSource::builder()
        .name("plain")
        .returns_listing_ok(page_of("plain", 2))
        .build();
    let g = TestSource::builder()
        .name("g")
        .genre()
        .returns_listing_ok(page_of("g", 2))
        .build();
    let m = manager()
        .with_source(plain.clone())
        .with_source(g.clone())
        .build()
        .unwrap();

    let page = m.get_anime_by_genre("Action", 1, None).await;
    assert_eq!(page.source, "g");
    assert_eq!(g.log(), vec!["genre:Action"]);
    assert_eq!(plain.calls("genre"), 0);
}

#[tokio::test]
async fn empty_catalog_page_falls_back_to_source_listings() {
    let g = TestSource::builder()
        .name("g")
        .genre()
        .returns_listing_ok(page_of("g", 2))
        .build();
    let m = manager()
        .with_source(g.clone())
        .catalog(Arc::new(MockCatalog))
        .build()
        .unwrap();

    // the catalog knows no such genre
    let page = m.get_anime_by_genre("Isekai", 1, None).await;
    assert_eq!(page.source, "g");
    assert_eq!(page.results.len(), 2);
    assert_eq!(g.log(), vec!["genre:Isekai"]);
}

#[tokio::test]
async fn failed_live_search_keeps_source_available() {
    let t = TestSource::builder()
        .name("t")
        .returns_listing_ok(AnimePage {
            results: vec![anime("t-cm", "Chainsaw Man", "t")],
            ..page_of("t", 0)
        })
        .fails_search("503")
        .build();
    let m = manager()
        .with_source(t.clone())
        .catalog(Arc::new(MockCatalog))
        .build()
        .unwrap();

    let page = m.get_anime_by_genre("Horror", 1, None).await;
    let ids: Vec<_> = page.results.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, vec!["t-cm"]);
    assert_eq!(t.calls("search"), 1);
    assert!(m.registry().get("t").unwrap().is_available());
}
