use aniroute_core::{Anime, Capability, Episode};

use crate::SourceManager;
use crate::router::util::settle;

impl SourceManager {
    /// Look up a title by id.
    ///
    /// The id prefix picks the owning source (or its backup); otherwise the
    /// priority order applies. The id is forwarded unchanged. A source that
    /// does not know the id counts as empty and triggers the single failover.
    #[tracing::instrument(target = "aniroute::router", skip(self))]
    pub async fn get_anime(&self, id: &str) -> Option<Anime> {
        let ctx = self.context(Capability::Anime);
        let prefer: Vec<&str> = self.route_for(id).into_iter().collect();
        let outcome = self
            .failover(&ctx, &prefer, Option::is_none, |s| async move {
                s.anime(id).await
            })
            .await;
        settle(&ctx, outcome, || None)
    }

    /// Episode list of a title, routed like [`get_anime`](Self::get_anime).
    #[tracing::instrument(target = "aniroute::router", skip(self))]
    pub async fn get_episodes(&self, anime_id: &str) -> Vec<Episode> {
        let ctx = self.context(Capability::Episodes);
        let prefer: Vec<&str> = self.route_for(anime_id).into_iter().collect();
        let outcome = self
            .failover(
                &ctx,
                &prefer,
                |eps: &Vec<Episode>| eps.is_empty(),
                |s| async move { s.episodes(anime_id).await },
            )
            .await;
        settle(&ctx, outcome, Vec::new)
    }
}
