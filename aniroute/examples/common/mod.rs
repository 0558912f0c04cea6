use std::sync::Arc;

use aniroute::AnimeSource;

/// Sources for the examples: the fixture mocks, plus a live HTTP source when
/// `ANIROUTE_EXAMPLES_HTTP_URL` points at a compatible scraper API.
#[must_use]
pub fn get_sources() -> Vec<Arc<dyn AnimeSource>> {
    let mut sources: Vec<Arc<dyn AnimeSource>> = Vec::new();
    if let Ok(url) = std::env::var("ANIROUTE_EXAMPLES_HTTP_URL") {
        match aniroute_http::HttpSource::builder("http", url).build() {
            Ok(source) => sources.push(Arc::new(source)),
            Err(e) => eprintln!("--- (HTTP source disabled: {e}) ---"),
        }
    } else {
        println!("--- (Using mock sources) ---");
    }
    sources.push(Arc::new(aniroute_mock::MockSource::named("mock-a")));
    sources.push(Arc::new(aniroute_mock::MockSource::named("mock-b")));
    sources
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("aniroute=info")),
        )
        .try_init();
}
