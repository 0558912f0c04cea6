mod common;
use std::sync::Arc;

use aniroute::{BrowseRequest, SortKey, SortOrder, SourceManager};
use common::{get_sources, init_tracing};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let mut builder = SourceManager::builder().catalog(Arc::new(aniroute_mock::MockCatalog));
    for source in get_sources() {
        builder = builder.with_source(source);
    }
    let manager = builder.build()?;

    // Catalog entries resolved onto streaming sources.
    let horror = manager.get_anime_by_genre("Horror", 1, None).await;
    println!("Horror ({}):", horror.source);
    for anime in &horror.results {
        println!("  {} [{}]", anime.title, anime.source);
    }

    // Local filter/sort over prefetched listings.
    let req = BrowseRequest::builder()
        .genre("Drama")
        .sort(SortKey::Rating, SortOrder::Desc)
        .per_page(5)
        .build()?;
    let page = manager.browse_anime(&req).await;
    println!("\nTop drama, page {} of {}:", page.page, page.total_pages);
    for anime in &page.results {
        println!("  {:.1}  {}", anime.rating.unwrap_or_default(), anime.title);
    }

    if let Some(pick) = manager.get_random_anime(None).await {
        println!("\nRandom pick: {}", pick.title);
    }
    Ok(())
}
