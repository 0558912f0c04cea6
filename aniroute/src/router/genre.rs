//! Genre listing with cross-catalog enrichment.
//!
//! With a catalog attached, a genre page comes from the catalog and every
//! entry is resolved to a playable record on a streaming source: first by a
//! lookup in a cached normalized-title table built from one source's
//! listings, then by a live search scored with token similarity. Entries that
//! resolve nowhere are dropped.

use std::collections::HashSet;
use std::sync::Arc;

use aniroute_core::matching::{LookupTable, best_match, search_query};
use aniroute_core::{
    Anime, AnimePage, AnirouteError, Capability, CatalogEntry, CatalogProvider, RequestContext,
    SourceCapabilities,
};
use futures::future::join_all;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::SourceManager;
use crate::router::util::settle;

struct CachedTable {
    built: Instant,
    source: &'static str,
    table: Arc<LookupTable<Anime>>,
}

/// Lazily built, TTL-bound title table. The lock is held while a table is
/// built so concurrent requests wait for one build instead of racing.
#[derive(Default)]
pub(crate) struct LookupCache {
    slot: Mutex<Option<CachedTable>>,
}

fn anime_titles(a: &Anime) -> Vec<String> {
    std::iter::once(a.title.clone())
        .chain(a.alt_title.clone())
        .collect()
}

fn entry_titles(e: &CatalogEntry) -> Vec<&str> {
    std::iter::once(e.title.as_str())
        .chain(e.alt_titles.iter().map(String::as_str))
        .collect()
}

impl SourceManager {
    /// Titles tagged with `genre`.
    ///
    /// With a catalog attached the page is enriched through the catalog; an
    /// empty or failed enrichment falls back to the sources' own genre
    /// listings, which fail over once like any listing.
    #[tracing::instrument(target = "aniroute::router", skip(self))]
    pub async fn get_anime_by_genre(
        &self,
        genre: &str,
        page: u32,
        source: Option<&str>,
    ) -> AnimePage {
        let ctx = self.context(Capability::Genre);
        let page = page.max(1);

        if let Some(catalog) = &self.catalog {
            match self
                .enrich_genre(&ctx, catalog.as_ref(), genre, page, source)
                .await
            {
                Ok(enriched) if !enriched.is_empty() => return enriched,
                Ok(_) => tracing::debug!(
                    target: "aniroute::router",
                    genre,
                    correlation_id = ctx.correlation_id(),
                    "enrichment produced nothing; using source genre listings"
                ),
                Err(e) if e.is_cancellation() => return AnimePage::empty(page, "none"),
                Err(e) => tracing::warn!(
                    target: "aniroute::router",
                    genre,
                    catalog = catalog.name(),
                    correlation_id = ctx.correlation_id(),
                    error = %e,
                    "enrichment failed; using source genre listings"
                ),
            }
        }

        let prefer: Vec<&str> = source.into_iter().collect();
        let outcome = self
            .failover(&ctx, &prefer, AnimePage::is_empty, |s| async move {
                match s.as_genre_provider() {
                    Some(p) => p.by_genre(genre, page).await,
                    None => Err(AnirouteError::unsupported(Capability::Genre.as_str())),
                }
            })
            .await;
        settle(&ctx, outcome, || AnimePage::empty(page, "none"))
    }

    async fn enrich_genre(
        &self,
        ctx: &RequestContext,
        catalog: &dyn CatalogProvider,
        genre: &str,
        page: u32,
        source: Option<&str>,
    ) -> Result<AnimePage, AnirouteError> {
        let genres = vec![genre.to_string()];
        let entries = self.catalog_page(ctx, catalog, &genres, page).await?;
        if entries.is_empty() {
            return Ok(AnimePage::empty(page, catalog.name()));
        }

        let table = self.lookup_table(ctx, source).await;
        let mut slots: Vec<Option<Anime>> = entries
            .iter()
            .map(|e| {
                let table = table.as_ref()?;
                entry_titles(e).into_iter().find_map(|t| table.get(t)).cloned()
            })
            .collect();

        let hits = slots.iter().filter(|s| s.is_some()).count();
        let misses: Vec<usize> = (0..entries.len()).filter(|&i| slots[i].is_none()).collect();
        tracing::debug!(
            target: "aniroute::router",
            genre,
            correlation_id = ctx.correlation_id(),
            table_hits = hits,
            live_searches = misses.len(),
            "resolving catalog entries"
        );

        let lookups = misses
            .iter()
            .map(|&i| self.resolve_live(ctx, &entries[i], source));
        for (i, found) in misses.iter().zip(join_all(lookups).await) {
            slots[*i] = found;
        }
        if ctx.is_cancelled() {
            return Err(ctx.cancelled_error());
        }

        Ok(self.assemble(catalog.name(), page, slots.into_iter().flatten()))
    }

    /// One catalog page through the invoker, under the catalog's own breaker.
    pub(crate) async fn catalog_page(
        &self,
        ctx: &RequestContext,
        catalog: &dyn CatalogProvider,
        genres: &[String],
        page: u32,
    ) -> Result<Vec<CatalogEntry>, AnirouteError> {
        let catalog_ctx =
            RequestContext::new(Capability::Catalog, ctx.correlation_id(), ctx.token().clone());
        self.invoker
            .invoke(&catalog_ctx, catalog.name(), move |_| catalog.by_genres(genres, page))
            .await
    }

    /// Deduplicate resolved records by id and label the page with the
    /// catalog and every contributing source.
    pub(crate) fn assemble(
        &self,
        catalog: &str,
        page: u32,
        records: impl Iterator<Item = Anime>,
    ) -> AnimePage {
        let mut seen: HashSet<String> = HashSet::new();
        let mut providers: Vec<String> = Vec::new();
        let results: Vec<Anime> = records
            .filter(|a| seen.insert(a.id.clone()))
            .inspect(|a| {
                if !providers.contains(&a.source) {
                    providers.push(a.source.clone());
                }
            })
            .collect();
        let has_next_page = !results.is_empty();
        let source = std::iter::once(catalog.to_string())
            .chain(providers)
            .collect::<Vec<_>>()
            .join("+");
        AnimePage {
            results,
            current_page: page,
            total_pages: if has_next_page { page + 1 } else { page },
            has_next_page,
            source,
        }
    }

    /// Resolve a catalog entry by searching a source for its title and keeping
    /// the best candidate at or above the configured similarity.
    pub(crate) async fn resolve_live(
        &self,
        ctx: &RequestContext,
        entry: &CatalogEntry,
        source: Option<&str>,
    ) -> Option<Anime> {
        let search_ctx =
            RequestContext::new(Capability::Search, ctx.correlation_id(), ctx.token().clone());
        let query = search_query(&entry.title);
        let prefer: Vec<&str> = source.into_iter().collect();
        let found = self
            .failover_quiet(&search_ctx, &prefer, AnimePage::is_empty, |s| {
                let query = query.clone();
                async move { s.search(&query, 1).await }
            })
            .await
            .ok()?;

        let queries = entry_titles(entry);
        let min = self.cfg.enrichment.min_similarity;
        best_match(
            &queries,
            found.results.as_slice(),
            |a| std::iter::once(a.title.as_str()).chain(a.alt_title.as_deref()),
            min,
        )
        .map(|(a, score)| {
            tracing::trace!(
                target: "aniroute::router",
                catalog_title = %entry.title,
                matched = %a.title,
                score,
                "live match"
            );
            a.clone()
        })
    }

    /// The cached lookup table, rebuilt when stale or built from a different
    /// source than the one now requested. `None` when no listing could be
    /// fetched.
    async fn lookup_table(
        &self,
        ctx: &RequestContext,
        source: Option<&str>,
    ) -> Option<Arc<LookupTable<Anime>>> {
        let wanted = self.cfg.enrichment.lookup_source.as_deref().or(source);
        let mut slot = self.lookup.slot.lock().await;
        if let Some(cached) = slot.as_ref()
            && cached.built.elapsed() < self.cfg.enrichment.lookup_ttl
            && wanted.is_none_or(|w| w == cached.source)
        {
            return Some(Arc::clone(&cached.table));
        }

        let prefer: Vec<&str> = wanted.into_iter().collect();
        let required = SourceCapabilities::TRENDING | SourceCapabilities::TOP_RATED;
        let selected = self.pick(&prefer, &HashSet::new(), required)?;
        let name = selected.name();
        let adapter = Arc::clone(selected.source());
        let listing_ctx =
            RequestContext::new(Capability::Trending, ctx.correlation_id(), ctx.token().clone());
        let limit = self.cfg.browse.top_rated_limit.max(1);

        let fetches = (1..=self.cfg.enrichment.lookup_pages.max(1)).map(|page| {
            let adapter = &adapter;
            let listing_ctx = &listing_ctx;
            async move {
                let trending = self
                    .invoker
                    .invoke(listing_ctx, name, move |_| adapter.trending(page))
                    .await;
                let top = self
                    .invoker
                    .invoke(listing_ctx, name, move |_| adapter.top_rated(page, limit))
                    .await;
                [trending, top]
            }
        });

        let mut records: Vec<Anime> = Vec::new();
        for outcome in join_all(fetches).await.into_iter().flatten() {
            match outcome {
                Ok(p) => records.extend(p.results),
                Err(e) => tracing::debug!(
                    target: "aniroute::router",
                    source = name,
                    error = %e,
                    "lookup listing failed"
                ),
            }
        }
        if records.is_empty() {
            return None;
        }

        let table = Arc::new(LookupTable::build(&records, anime_titles));
        tracing::info!(
            target: "aniroute::router",
            source = name,
            records = records.len(),
            keys = table.len(),
            "lookup table built"
        );
        *slot = Some(CachedTable {
            built: Instant::now(),
            source: name,
            table: Arc::clone(&table),
        });
        Some(table)
    }
}
