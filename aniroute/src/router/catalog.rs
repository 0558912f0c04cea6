use aniroute_core::{Anime, AnimePage, Capability};
use rand::Rng;
use rand::seq::IndexedRandom;

use crate::SourceManager;
use crate::router::macros::aniroute_router_listing;
use crate::router::util::settle;

impl SourceManager {
    aniroute_router_listing! {
        /// Trending titles from the selected source, failing over once.
        method: get_trending(page: u32),
        capability: Capability::Trending,
        page: page,
        call: trending(page)
    }

    aniroute_router_listing! {
        /// Recently updated titles from the selected source, failing over once.
        method: get_latest(page: u32),
        capability: Capability::Latest,
        page: page,
        call: latest(page)
    }

    /// Highest-rated titles, `limit` per page (the configured default when
    /// `None`), failing over once.
    #[tracing::instrument(target = "aniroute::router", skip(self))]
    pub async fn get_top_rated(
        &self,
        page: u32,
        limit: Option<u32>,
        source: Option<&str>,
    ) -> AnimePage {
        let ctx = self.context(Capability::TopRated);
        let page = page.max(1);
        let limit = limit.unwrap_or(self.cfg.browse.top_rated_limit).max(1);
        let prefer: Vec<&str> = source.into_iter().collect();
        let outcome = self
            .failover(&ctx, &prefer, AnimePage::is_empty, |s| async move {
                s.top_rated(page, limit).await
            })
            .await;
        settle(&ctx, outcome, || AnimePage::empty(page, "none"))
    }

    /// One random title from a random top-rated page.
    ///
    /// The page is drawn from `1..=random_page_span`; when that page turns out
    /// empty on every source the first page is used instead.
    #[tracing::instrument(target = "aniroute::router", skip(self))]
    pub async fn get_random_anime(&self, source: Option<&str>) -> Option<Anime> {
        let ctx = self.context(Capability::Random);
        let span = self.cfg.browse.random_page_span.max(1);
        let limit = self.cfg.browse.top_rated_limit.max(1);
        let prefer: Vec<&str> = source.into_iter().collect();

        let mut page = rand::rng().random_range(1..=span);
        loop {
            let outcome = self
                .failover(&ctx, &prefer, AnimePage::is_empty, |s| async move {
                    s.top_rated(page, limit).await
                })
                .await;
            let listing = settle(&ctx, outcome, || AnimePage::empty(page, "none"));
            if listing.is_empty() && page > 1 && !ctx.is_cancelled() {
                page = 1;
                continue;
            }
            return listing.results.choose(&mut rand::rng()).cloned();
        }
    }
}
