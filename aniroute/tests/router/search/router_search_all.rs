use proptest::prelude::*;

use crate::helpers::{manager, page_of, TestSource};

const NAMES: [&str; 4] = ["s0", "s1", "s2", "s3"];

#[tokio::test]
async fn aggregates_in_priority_order_and_records_failures() {
    let a = TestSource::builder().name("a").fails_search("upstream 503").build();
    let b = TestSource::builder()
        .name("b")
        .returns_search_ok(page_of("b", 5))
        .build();
    let c = TestSource::builder()
        .name("c")
        .returns_search_ok(page_of("c", 20))
        .build();
    let d = TestSource::builder()
        .name("d")
        .returns_search_ok(page_of("d", 3))
        .build();
    let m = manager()
        .with_source(a.clone())
        .with_source(b)
        .with_source(c)
        .with_source(d.clone())
        .build()
        .unwrap();

    let report = m.search_all("naruto", 1).await;
    assert_eq!(report.page.source, "b+c");
    assert_eq!(report.sources, vec!["b", "c"]);
    assert_eq!(report.page.results.len(), 25);
    assert_eq!(report.page.results[0].id, "b-0");
    assert_eq!(report.page.results[5].id, "c-0");
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].provider, "a");
    assert!(report.failures[0].message.contains("upstream 503"));
    // the threshold was reached before d
    assert_eq!(d.calls("search"), 0);
    assert!(!m.registry().get("a").unwrap().is_available());
}

#[tokio::test]
async fn unavailable_and_empty_sources_are_reported() {
    let a = TestSource::builder().name("a").fails_search("boom").build();
    let b = TestSource::builder().name("b").build();
    let c = TestSource::builder()
        .name("c")
        .returns_search_ok(page_of("c", 2))
        .build();
    let m = manager()
        .with_source(a.clone())
        .with_source(b)
        .with_source(c)
        .build()
        .unwrap();

    // first call marks a unavailable
    let _ = m.search_all("x", 1).await;
    let report = m.search_all("x", 1).await;
    assert_eq!(a.calls("search"), 1);
    assert_eq!(report.page.source, "c");
    let messages: Vec<_> = report
        .failures
        .iter()
        .map(|f| (f.provider.as_str(), f.message.as_str()))
        .collect();
    assert_eq!(messages, vec![("a", "unavailable"), ("b", "no results")]);
}

#[tokio::test]
async fn custom_threshold_stops_early() {
    let a = TestSource::builder()
        .name("a")
        .returns_search_ok(page_of("a", 3))
        .build();
    let b = TestSource::builder()
        .name("b")
        .returns_search_ok(page_of("b", 3))
        .build();
    let m = manager()
        .search_all_threshold(3)
        .with_source(a)
        .with_source(b.clone())
        .build()
        .unwrap();

    let report = m.search_all("x", 1).await;
    assert_eq!(report.page.source, "a");
    assert_eq!(b.calls("search"), 0);
}

#[tokio::test]
async fn nothing_found_is_labelled_none() {
    let m = manager()
        .with_source(TestSource::builder().name("a").build())
        .build()
        .unwrap();
    let report = m.search_all("x", 1).await;
    assert!(report.page.is_empty());
    assert_eq!(report.page.source, "none");
    assert!(report.sources.is_empty());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn contributors_follow_priority_until_threshold(
        counts in prop::collection::vec(0usize..12, 1..=4),
        threshold in 1usize..30,
    ) {
        let mut expected_total = 0;
        let mut expected: Vec<&str> = Vec::new();
        for (i, &n) in counts.iter().enumerate() {
            if expected_total >= threshold {
                break;
            }
            if n > 0 {
                expected.push(NAMES[i]);
                expected_total += n;
            }
        }

        let report = tokio_test::block_on(async {
            let mut builder = manager().search_all_threshold(threshold);
            for (i, &n) in counts.iter().enumerate() {
                builder = builder.with_source(
                    TestSource::builder()
                        .name(NAMES[i])
                        .returns_search_ok(page_of(NAMES[i], n))
                        .build(),
                );
            }
            builder.build().unwrap().search_all("q", 1).await
        });

        prop_assert_eq!(report.page.results.len(), expected_total);
        prop_assert_eq!(&report.sources, &expected);
        let label = if expected.is_empty() { "none".to_string() } else { expected.join("+") };
        prop_assert_eq!(report.page.source, label);
    }
}
