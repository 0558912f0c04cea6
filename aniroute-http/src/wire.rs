//! JSON payloads served by the REST backend and their conversion into the
//! shared content records.

use std::collections::BTreeMap;

use serde::Deserialize;

use aniroute_core::{
    AiringStatus, Anime, AnimePage, Episode, EpisodeCounts, EpisodeServer, EpisodeServers,
    MediaFormat, ServerCategory, StreamingLinks, Subtitle, VideoSource,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageDto {
    #[serde(default)]
    pub results: Vec<AnimeDto>,
    #[serde(default = "first_page")]
    pub current_page: u32,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub has_next_page: bool,
}

const fn first_page() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimeDto {
    pub id: String,
    pub title: String,
    #[serde(default, alias = "japaneseTitle")]
    pub alt_title: Option<String>,
    #[serde(default, alias = "image")]
    pub poster: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub rating: Option<f32>,
    #[serde(default, alias = "releaseDate")]
    pub year: Option<serde_json::Value>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub sub: u32,
    #[serde(default)]
    pub dub: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeDto {
    pub id: String,
    pub number: u32,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub is_filler: bool,
    #[serde(default = "yes")]
    pub has_sub: bool,
    #[serde(default)]
    pub has_dub: bool,
}

const fn yes() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct ServerDto {
    pub name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServersDto {
    #[serde(default)]
    pub sub: Vec<ServerDto>,
    #[serde(default)]
    pub dub: Vec<ServerDto>,
    #[serde(default)]
    pub raw: Vec<ServerDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoDto {
    pub url: String,
    #[serde(default)]
    pub quality: Option<String>,
    #[serde(default, alias = "isM3U8")]
    pub is_m3u8: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct SubtitleDto {
    pub url: String,
    #[serde(default)]
    pub lang: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinksDto {
    #[serde(default)]
    pub sources: Vec<VideoDto>,
    #[serde(default)]
    pub subtitles: Vec<SubtitleDto>,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

fn parse_format(raw: Option<&str>) -> MediaFormat {
    match raw.map(str::to_ascii_lowercase).as_deref() {
        Some("tv" | "tv series") => MediaFormat::Tv,
        Some("movie") => MediaFormat::Movie,
        Some("ova") => MediaFormat::Ova,
        Some("ona") => MediaFormat::Ona,
        Some("special") => MediaFormat::Special,
        Some("music") => MediaFormat::Music,
        _ => MediaFormat::Unknown,
    }
}

fn parse_status(raw: Option<&str>) -> AiringStatus {
    match raw.map(str::to_ascii_lowercase).as_deref() {
        Some("airing" | "ongoing" | "currently airing") => AiringStatus::Airing,
        Some("completed" | "finished" | "finished airing") => AiringStatus::Completed,
        Some("upcoming" | "not yet aired") => AiringStatus::Upcoming,
        _ => AiringStatus::Unknown,
    }
}

// Years arrive as numbers or as date-ish strings ("2013", "Apr 7, 2013").
fn parse_year(raw: Option<&serde_json::Value>) -> Option<u16> {
    match raw? {
        serde_json::Value::Number(n) => n.as_u64().and_then(|y| u16::try_from(y).ok()),
        serde_json::Value::String(s) => s
            .split(|c: char| !c.is_ascii_digit())
            .find(|chunk| chunk.len() == 4)
            .and_then(|chunk| chunk.parse().ok()),
        _ => None,
    }
}

impl AnimeDto {
    pub fn into_anime(self, source: &str) -> Anime {
        Anime {
            format: parse_format(self.kind.as_deref()),
            status: parse_status(self.status.as_deref()),
            year: parse_year(self.year.as_ref()),
            id: self.id,
            title: self.title,
            alt_title: self.alt_title.filter(|t| !t.trim().is_empty()),
            poster: self.poster,
            description: self.description,
            rating: self.rating,
            genres: self.genres,
            episodes: EpisodeCounts {
                sub: self.sub,
                dub: self.dub,
            },
            source: source.to_string(),
        }
    }
}

impl PageDto {
    pub fn into_page(self, source: &str) -> AnimePage {
        AnimePage {
            results: self
                .results
                .into_iter()
                .map(|a| a.into_anime(source))
                .collect(),
            current_page: self.current_page,
            total_pages: self.total_pages,
            has_next_page: self.has_next_page,
            source: source.to_string(),
        }
    }
}

impl From<EpisodeDto> for Episode {
    fn from(e: EpisodeDto) -> Self {
        Self {
            id: e.id,
            number: e.number,
            title: e.title,
            is_filler: e.is_filler,
            has_sub: e.has_sub,
            has_dub: e.has_dub,
        }
    }
}

impl ServersDto {
    pub fn into_servers(self, episode_id: &str, source: &str) -> EpisodeServers {
        let tag = |list: Vec<ServerDto>, category| {
            list.into_iter()
                .map(|s| EpisodeServer {
                    name: s.name,
                    category,
                })
                .collect()
        };
        EpisodeServers {
            episode_id: episode_id.to_string(),
            sub: tag(self.sub, ServerCategory::Sub),
            dub: tag(self.dub, ServerCategory::Dub),
            raw: tag(self.raw, ServerCategory::Raw),
            source: Some(source.to_string()),
        }
    }
}

impl LinksDto {
    pub fn into_links(self, source: &str) -> StreamingLinks {
        StreamingLinks {
            sources: self
                .sources
                .into_iter()
                .map(|v| VideoSource {
                    is_m3u8: v.is_m3u8.unwrap_or_else(|| v.url.contains(".m3u8")),
                    url: v.url,
                    quality: v.quality,
                })
                .collect(),
            subtitles: self
                .subtitles
                .into_iter()
                .map(|s| Subtitle {
                    url: s.url,
                    lang: s.lang,
                })
                .collect(),
            headers: self.headers,
            source: Some(source.to_string()),
        }
    }
}
