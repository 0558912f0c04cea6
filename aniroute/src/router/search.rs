use std::sync::Arc;

use aniroute_core::{AnimePage, Capability, SearchAllReport, SourceFailure};

use crate::SourceManager;
use crate::router::util::settle;

impl SourceManager {
    /// Search one source, failing over once on error or an empty page.
    ///
    /// A blank query returns an empty page without calling any source.
    #[tracing::instrument(target = "aniroute::router", skip(self))]
    pub async fn search(&self, query: &str, page: u32, source: Option<&str>) -> AnimePage {
        let page = page.max(1);
        let query = query.trim();
        if query.is_empty() {
            return AnimePage::empty(page, "none");
        }
        let ctx = self.context(Capability::Search);
        let prefer: Vec<&str> = source.into_iter().collect();
        let outcome = self
            .failover(&ctx, &prefer, AnimePage::is_empty, |s| async move {
                s.search(query, page).await
            })
            .await;
        settle(&ctx, outcome, || AnimePage::empty(page, "none"))
    }

    /// Search every source sequentially in priority order until the combined
    /// results reach the configured threshold.
    ///
    /// Sources currently marked unavailable are skipped and reported. A failing
    /// source is marked unavailable and reported with its error message.
    /// Results are concatenated in the order sources were queried; the page's
    /// `source` is the `+`-joined list of contributors (`"none"` when empty).
    #[tracing::instrument(target = "aniroute::router", skip(self))]
    pub async fn search_all(&self, query: &str, page: u32) -> SearchAllReport {
        let page = page.max(1);
        let query = query.trim();
        let ctx = self.context(Capability::SearchAll);
        let threshold = self.cfg.search_all_threshold;

        let mut results = Vec::new();
        let mut contributors: Vec<String> = Vec::new();
        let mut failures: Vec<SourceFailure> = Vec::new();
        let mut total_pages = 0;
        let mut has_next_page = false;

        if query.is_empty() {
            return SearchAllReport {
                page: AnimePage::empty(page, "none"),
                sources: contributors,
                failures,
            };
        }

        for registered in self.registry.ordered() {
            if results.len() >= threshold || ctx.is_cancelled() {
                break;
            }
            let name = registered.name();
            if !registered.is_available() {
                tracing::debug!(
                    target: "aniroute::router",
                    source = name,
                    correlation_id = ctx.correlation_id(),
                    "skipping unavailable source"
                );
                failures.push(SourceFailure::new(name, "unavailable"));
                continue;
            }

            let adapter = Arc::clone(registered.source());
            let outcome = self
                .invoker
                .invoke(&ctx, name, |_| {
                    let adapter = Arc::clone(&adapter);
                    async move { adapter.search(query, page).await }
                })
                .await;
            match outcome {
                Ok(found) if found.is_empty() => {
                    failures.push(SourceFailure::new(name, "no results"));
                }
                Ok(found) => {
                    total_pages = total_pages.max(found.total_pages);
                    has_next_page |= found.has_next_page;
                    contributors.push(name.to_string());
                    results.extend(found.results);
                }
                Err(e) if e.is_cancellation() => break,
                Err(e) => {
                    self.demote(&ctx, name, &e);
                    failures.push(SourceFailure::new(name, e.to_string()));
                }
            }
        }

        tracing::debug!(
            target: "aniroute::router",
            correlation_id = ctx.correlation_id(),
            results = results.len(),
            contributors = ?contributors,
            failed = failures.len(),
            "search-all complete"
        );

        let source = if contributors.is_empty() {
            "none".to_string()
        } else {
            contributors.join("+")
        };
        SearchAllReport {
            page: AnimePage {
                results,
                current_page: page,
                total_pages,
                has_next_page,
                source,
            },
            sources: contributors,
            failures,
        }
    }
}
