mod common;
use aniroute::SourceManager;
use common::{get_sources, init_tracing};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    // 1. Register every source; registration order is the initial priority.
    let mut builder = SourceManager::builder();
    for source in get_sources() {
        builder = builder.with_source(source);
    }
    let manager = builder.build()?;

    // 2. A single-source search fails over once if the first source is empty.
    let page = manager.search("naruto", 1, None).await;
    println!("search 'naruto' via {}:", page.source);
    for anime in &page.results {
        println!("  {:<28} {}", anime.id, anime.title);
    }

    // 3. Aggregate across sources until enough results are collected.
    let report = manager.search_all("attack on titan", 1).await;
    println!(
        "\nsearch_all: {} results from {}",
        report.page.results.len(),
        report.page.source
    );
    for failure in &report.failures {
        println!("  skipped {}: {}", failure.provider, failure.message);
    }

    // 4. Episodes and streaming links for the first hit.
    if let Some(first) = page.results.first() {
        let episodes = manager.get_episodes(&first.id).await;
        if let Some(ep) = episodes.first() {
            let links = manager.get_streaming_links(&ep.id, None, None).await;
            println!("\n{} episodes; episode 1 has {} links", episodes.len(), links.sources.len());
        }
    }

    Ok(())
}
