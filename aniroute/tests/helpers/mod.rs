
#[allow(unused_imports)]
pub use test_source::{TestSource, TestSourceBuilder};

use std::time::Duration;

use aniroute::{Anime, AnimePage, RetryConfig, SourceManagerBuilder};

/// A single-attempt retry policy so call counts equal selections.
#[must_use]
pub fn no_retry() -> RetryConfig {
    RetryConfig {
        max_attempts: 1,
        base_delay: Duration::from_millis(1),
    }
}

/// Two attempts with a short backoff.
#[allow(dead_code)]
#[must_use]
pub fn fast_retry() -> RetryConfig {
    RetryConfig {
        max_attempts: 2,
        base_delay: Duration::from_millis(5),
    }
}

/// Builder with a fast retry policy and short deadlines.
#[must_use]
pub fn manager() -> SourceManagerBuilder {
    aniroute::SourceManager::builder()
        .retry(no_retry())
        .call_timeout(Duration::from_millis(500))
}

/// A minimal record attributed to `source`.
pub fn anime(id: &str, title: &str, source: &str) -> Anime {
    Anime {
        id: id.to_string(),
        title: title.to_string(),
        source: source.to_string(),
        ..Anime::default()
    }
}

/// A page of `n` generated titles attributed to `source`.
#[allow(dead_code)]
pub fn page_of(source: &str, n: usize) -> AnimePage {
    AnimePage {
        results: (0..n)
            .map(|i| anime(&format!("{source}-{i}"), &format!("{source} title {i}"), source))
            .collect(),
        current_page: 1,
        total_pages: 1,
        has_next_page: false,
        source: source.to_string(),
    }
}
