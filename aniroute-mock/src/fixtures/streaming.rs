use std::collections::BTreeMap;

use aniroute_core::{
    EpisodeServer, EpisodeServers, ServerCategory, StreamingLinks, Subtitle, VideoSource,
};

pub fn servers(episode_id: &str, source: &str) -> EpisodeServers {
    let server = |name: &str, category| EpisodeServer {
        name: name.to_string(),
        category,
    };
    EpisodeServers {
        episode_id: episode_id.to_string(),
        sub: vec![
            server("hd-1", ServerCategory::Sub),
            server("hd-2", ServerCategory::Sub),
        ],
        dub: vec![server("hd-1", ServerCategory::Dub)],
        raw: Vec::new(),
        source: Some(source.to_string()),
    }
}

pub fn links(
    episode_id: &str,
    server: Option<&str>,
    category: Option<ServerCategory>,
    source: &str,
) -> StreamingLinks {
    let server = server.unwrap_or("hd-1");
    let category = category.unwrap_or_default();
    let mut headers = BTreeMap::new();
    headers.insert(
        "Referer".to_string(),
        format!("https://{source}.example.invalid/"),
    );
    StreamingLinks {
        sources: vec![VideoSource {
            url: format!(
                "https://cdn.example.invalid/{source}/{episode_id}/{server}/{}/master.m3u8",
                category.as_str()
            ),
            quality: Some("auto".to_string()),
            is_m3u8: true,
        }],
        subtitles: vec![Subtitle {
            url: format!("https://cdn.example.invalid/{source}/{episode_id}/en.vtt"),
            lang: "English".to_string(),
        }],
        headers,
        source: Some(source.to_string()),
    }
}
