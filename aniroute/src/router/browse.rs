use std::cmp::Ordering;
use std::collections::HashSet;

use aniroute_core::matching::normalize_title;
use aniroute_core::{
    Anime, AnimePage, BrowsePage, BrowseRequest, Capability, CatalogProvider, RequestContext,
    SortKey, SortOrder,
};
use futures::future::join_all;

use crate::SourceManager;

fn matches_filters(a: &Anime, req: &BrowseRequest, check_genres: bool) -> bool {
    (!check_genres || req.genres().iter().all(|g| a.has_genre(g)))
        && req.format().is_none_or(|f| a.format == f)
        && req.status().is_none_or(|s| a.status == s)
        && req.year().is_none_or(|y| a.year == Some(y))
}

fn sort_results(items: &mut [Anime], key: SortKey, order: SortOrder) {
    let cmp: fn(&Anime, &Anime) -> Ordering = match key {
        // listing order already is the ranking; keep it stable
        SortKey::Popularity | SortKey::Recent => |_, _| Ordering::Equal,
        SortKey::Rating => |a, b| {
            a.rating
                .unwrap_or(0.0)
                .total_cmp(&b.rating.unwrap_or(0.0))
        },
        SortKey::Year => |a, b| a.year.cmp(&b.year),
        SortKey::Title => |a, b| normalize_title(&a.title).cmp(&normalize_title(&b.title)),
        SortKey::Episodes => |a, b| a.episodes.total().cmp(&b.episodes.total()),
    };
    match (key, order) {
        (SortKey::Popularity | SortKey::Recent, SortOrder::Desc) => {}
        (SortKey::Popularity | SortKey::Recent, SortOrder::Asc) => items.reverse(),
        (_, SortOrder::Asc) => items.sort_by(cmp),
        (_, SortOrder::Desc) => items.sort_by(|a, b| cmp(b, a)),
    }
}

fn paginate(items: Vec<Anime>, req: &BrowseRequest, source: String) -> BrowsePage {
    let per_page = req.per_page().max(1);
    let page = req.page().max(1);
    let total_results = items.len();
    let total_pages = u32::try_from(total_results.div_ceil(per_page as usize)).unwrap_or(u32::MAX);
    let start = (page as usize - 1).saturating_mul(per_page as usize);
    BrowsePage {
        results: items
            .into_iter()
            .skip(start)
            .take(per_page as usize)
            .collect(),
        page,
        per_page,
        total_results,
        total_pages,
        has_next_page: page < total_pages,
        source,
    }
}

fn provenance(labels: impl IntoIterator<Item = String>) -> String {
    let mut seen: Vec<String> = Vec::new();
    for label in labels {
        for part in label.split('+') {
            if !part.is_empty() && part != "none" && !seen.iter().any(|s| s == part) {
                seen.push(part.to_string());
            }
        }
    }
    if seen.is_empty() {
        "none".to_string()
    } else {
        seen.join("+")
    }
}

impl SourceManager {
    /// Filtered, sorted, paginated browsing.
    ///
    /// With two or more genres and a catalog attached, the catalog's
    /// multi-genre page is resolved entry by entry through live search.
    /// Otherwise the first configured listing pages (latest for
    /// [`SortKey::Recent`], trending for every other key) are fetched
    /// concurrently, deduplicated by normalized title, then filtered, sorted
    /// and paginated locally.
    #[tracing::instrument(target = "aniroute::router", skip(self, req), fields(page = req.page(), genres = ?req.genres()))]
    pub async fn browse_anime(&self, req: &BrowseRequest) -> BrowsePage {
        let ctx = self.context(Capability::Browse);

        if req.genres().len() > 1
            && let Some(catalog) = &self.catalog
        {
            match self.browse_catalog(&ctx, catalog.as_ref(), req).await {
                Some(found) if !found.results.is_empty() => return found,
                _ if ctx.is_cancelled() => return paginate(Vec::new(), req, "none".into()),
                _ => tracing::debug!(
                    target: "aniroute::router",
                    correlation_id = ctx.correlation_id(),
                    "catalog browse produced nothing; filtering source listings"
                ),
            }
        }

        let (pool, labels) = self.prefetch(&ctx, req).await;
        let mut seen: HashSet<String> = HashSet::new();
        let mut items: Vec<Anime> = pool
            .into_iter()
            .filter(|a| seen.insert(normalize_title(&a.title)))
            .filter(|a| matches_filters(a, req, true))
            .collect();
        sort_results(&mut items, req.sort(), req.order());
        paginate(items, req, provenance(labels))
    }

    async fn browse_catalog(
        &self,
        ctx: &RequestContext,
        catalog: &dyn CatalogProvider,
        req: &BrowseRequest,
    ) -> Option<BrowsePage> {
        let entries = match self
            .catalog_page(ctx, catalog, req.genres(), req.page())
            .await
        {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(
                    target: "aniroute::router",
                    catalog = catalog.name(),
                    correlation_id = ctx.correlation_id(),
                    error = %e,
                    "catalog browse failed"
                );
                return None;
            }
        };

        let source = req.source();
        let resolved = join_all(entries.iter().map(|e| self.resolve_live(ctx, e, source))).await;
        let assembled = self.assemble(catalog.name(), req.page(), resolved.into_iter().flatten());

        // the catalog already filtered by genre; source genre tags are not comparable
        let mut items: Vec<Anime> = assembled
            .results
            .into_iter()
            .filter(|a| matches_filters(a, req, false))
            .collect();
        sort_results(&mut items, req.sort(), req.order());
        items.truncate(req.per_page() as usize);

        let count = items.len();
        Some(BrowsePage {
            results: items,
            page: req.page(),
            per_page: req.per_page(),
            total_results: count,
            total_pages: assembled.total_pages,
            has_next_page: assembled.has_next_page,
            source: assembled.source,
        })
    }

    /// Fetch the configured number of listing pages concurrently. Each page
    /// fails over on its own without demoting sources; pages that fail
    /// everywhere are skipped.
    async fn prefetch(&self, ctx: &RequestContext, req: &BrowseRequest) -> (Vec<Anime>, Vec<String>) {
        let recent = req.sort() == SortKey::Recent;
        let listing = if recent {
            Capability::Latest
        } else {
            Capability::Trending
        };
        let listing_ctx = RequestContext::new(listing, ctx.correlation_id(), ctx.token().clone());
        let prefer: Vec<&str> = req.source().into_iter().collect();

        let pages = (1..=self.cfg.browse.prefetch_pages.max(1)).map(|page| {
            let listing_ctx = &listing_ctx;
            let prefer = &prefer;
            async move {
                self.failover_quiet(listing_ctx, prefer, AnimePage::is_empty, |s| async move {
                    if recent {
                        s.latest(page).await
                    } else {
                        s.trending(page).await
                    }
                })
                .await
            }
        });

        let mut pool = Vec::new();
        let mut labels = Vec::new();
        for outcome in join_all(pages).await {
            match outcome {
                Ok(p) => {
                    labels.push(p.source);
                    pool.extend(p.results);
                }
                Err(e) => tracing::debug!(
                    target: "aniroute::router",
                    correlation_id = ctx.correlation_id(),
                    error = %e,
                    "prefetch page skipped"
                ),
            }
        }
        (pool, labels)
    }
}
