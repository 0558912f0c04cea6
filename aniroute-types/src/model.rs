//! Content records exchanged between sources, the orchestrator, and callers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Release format of a title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[non_exhaustive]
pub enum MediaFormat {
    /// Television series.
    Tv,
    /// Feature film.
    Movie,
    /// Original video animation.
    Ova,
    /// Original net animation.
    Ona,
    /// Special or recap.
    Special,
    /// Music video.
    Music,
    /// Not reported by the source.
    #[default]
    Unknown,
}

/// Airing status of a title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[non_exhaustive]
pub enum AiringStatus {
    /// Currently releasing episodes.
    Airing,
    /// Finished airing.
    Completed,
    /// Announced, not yet aired.
    Upcoming,
    /// Not reported by the source.
    #[default]
    Unknown,
}

/// Available episode counts per audio track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EpisodeCounts {
    /// Subtitled episodes.
    pub sub: u32,
    /// Dubbed episodes.
    pub dub: u32,
}

impl EpisodeCounts {
    /// Largest of the two counts.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.sub.max(self.dub)
    }
}

/// A catalog entry as served by one source.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Anime {
    /// Source-specific identifier.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Alternative (romanized or native) title.
    pub alt_title: Option<String>,
    /// Poster image URL.
    pub poster: Option<String>,
    /// Synopsis.
    pub description: Option<String>,
    /// Release format.
    pub format: MediaFormat,
    /// Airing status.
    pub status: AiringStatus,
    /// Score on a 0–10 scale.
    pub rating: Option<f32>,
    /// First-air year.
    pub year: Option<u16>,
    /// Genre names as reported by the source.
    pub genres: Vec<String>,
    /// Episode counts per audio track.
    pub episodes: EpisodeCounts,
    /// Name of the source that served this record.
    pub source: String,
}

impl Anime {
    /// Case-insensitive genre membership test.
    #[must_use]
    pub fn has_genre(&self, genre: &str) -> bool {
        self.genres.iter().any(|g| g.eq_ignore_ascii_case(genre))
    }
}

/// One page of listing or search results.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnimePage {
    /// Results on this page.
    pub results: Vec<Anime>,
    /// 1-based page number.
    pub current_page: u32,
    /// Total pages reported by the source.
    pub total_pages: u32,
    /// Whether another page exists.
    pub has_next_page: bool,
    /// Provenance label; `+`-joined when several sources contributed.
    pub source: String,
}

impl AnimePage {
    /// An empty page attributed to `source`.
    pub fn empty(page: u32, source: impl Into<String>) -> Self {
        Self {
            results: Vec::new(),
            current_page: page,
            total_pages: 0,
            has_next_page: false,
            source: source.into(),
        }
    }

    /// True when the page carries no results.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// A single episode of a title.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Episode {
    /// Source-specific episode identifier.
    pub id: String,
    /// 1-based episode number.
    pub number: u32,
    /// Episode title, when known.
    pub title: Option<String>,
    /// Whether the episode is marked filler.
    pub is_filler: bool,
    /// Subtitled track available.
    pub has_sub: bool,
    /// Dubbed track available.
    pub has_dub: bool,
}

/// Audio track category of a streaming server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ServerCategory {
    /// Original audio with subtitles.
    #[default]
    Sub,
    /// Dubbed audio.
    Dub,
    /// Original audio without subtitles.
    Raw,
}

impl ServerCategory {
    /// Lowercase wire label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sub => "sub",
            Self::Dub => "dub",
            Self::Raw => "raw",
        }
    }
}

/// A named streaming server for an episode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeServer {
    /// Server name as understood by the source (e.g. "hd-1").
    pub name: String,
    /// Audio track category.
    pub category: ServerCategory,
}

/// Servers available for an episode, grouped by category.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EpisodeServers {
    /// Episode these servers belong to.
    pub episode_id: String,
    /// Subtitled servers.
    pub sub: Vec<EpisodeServer>,
    /// Dubbed servers.
    pub dub: Vec<EpisodeServer>,
    /// Raw servers.
    pub raw: Vec<EpisodeServer>,
    /// Source that served the list; `None` for the default (empty) list.
    pub source: Option<String>,
}

impl EpisodeServers {
    /// An empty server list for `episode_id`, attributed to no source.
    pub fn default_for(episode_id: impl Into<String>) -> Self {
        Self {
            episode_id: episode_id.into(),
            ..Self::default()
        }
    }

    /// The default server list returned when no source could serve one:
    /// `servers` grouped by category, attributed to no source. With no
    /// configured servers this is [`default_for`](Self::default_for).
    pub fn fallback(episode_id: impl Into<String>, servers: &[EpisodeServer]) -> Self {
        let mut out = Self::default_for(episode_id);
        for server in servers {
            match server.category {
                ServerCategory::Sub => out.sub.push(server.clone()),
                ServerCategory::Dub => out.dub.push(server.clone()),
                ServerCategory::Raw => out.raw.push(server.clone()),
            }
        }
        out
    }

    /// True when no category lists any server.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sub.is_empty() && self.dub.is_empty() && self.raw.is_empty()
    }
}

/// A playable video resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoSource {
    /// Media URL.
    pub url: String,
    /// Quality label (e.g. "1080p", "auto").
    pub quality: Option<String>,
    /// Whether the URL is an HLS playlist.
    pub is_m3u8: bool,
}

/// A subtitle track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtitle {
    /// Subtitle file URL.
    pub url: String,
    /// Language label.
    pub lang: String,
}

/// Resolved streaming links for an episode.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StreamingLinks {
    /// Playable resources.
    pub sources: Vec<VideoSource>,
    /// Subtitle tracks.
    pub subtitles: Vec<Subtitle>,
    /// Request headers required by the media host (e.g. Referer).
    pub headers: BTreeMap<String, String>,
    /// Source that resolved the links; `None` for the empty result.
    pub source: Option<String>,
}

impl StreamingLinks {
    /// True when there is nothing to play.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

/// A record from a higher-fidelity metadata catalog used for enrichment.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Catalog-specific identifier.
    pub catalog_id: String,
    /// Primary title.
    pub title: String,
    /// Other known titles (English, romaji, synonyms).
    pub alt_titles: Vec<String>,
    /// Genre names.
    pub genres: Vec<String>,
    /// First-air year.
    pub year: Option<u16>,
    /// Average score on a 0–100 scale.
    pub score: Option<u8>,
    /// Cover image URL.
    pub cover: Option<String>,
}
