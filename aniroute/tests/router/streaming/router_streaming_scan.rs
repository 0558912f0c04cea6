use aniroute::{
    AnirouteError, EpisodeServer, EpisodeServers, ServerCategory, SourceKey, StreamingLinks,
    VideoSource,
};

use crate::helpers::{manager, TestSource};

fn servers(episode_id: &str, source: &str) -> EpisodeServers {
    EpisodeServers {
        episode_id: episode_id.to_string(),
        sub: vec![EpisodeServer {
            name: "hd-1".into(),
            category: ServerCategory::Sub,
        }],
        source: Some(source.to_string()),
        ..EpisodeServers::default()
    }
}

fn links(source: &str) -> StreamingLinks {
    StreamingLinks {
        sources: vec![VideoSource {
            url: format!("https://{source}.example/master.m3u8"),
            quality: Some("auto".into()),
            is_m3u8: true,
        }],
        source: Some(source.to_string()),
        ..StreamingLinks::default()
    }
}

#[tokio::test]
async fn servers_scan_past_errors_and_empty_lists() {
    let a = TestSource::builder()
        .name("a")
        .with_servers_fn(|_| Err(AnirouteError::provider("a", "blocked")))
        .build();
    let b = TestSource::builder().name("b").streaming().build();
    let c = TestSource::builder()
        .name("c")
        .with_servers_fn(|id| Ok(servers(id, "c")))
        .build();
    let m = manager()
        .with_source(a.clone())
        .with_source(b.clone())
        .with_source(c.clone())
        .build()
        .unwrap();

    let found = m.get_episode_servers("ep-9").await;
    assert_eq!(found.source.as_deref(), Some("c"));
    assert_eq!(a.calls("servers"), 1);
    assert_eq!(b.calls("servers"), 1);
    assert_eq!(c.log(), vec!["servers:ep-9"]);
    // scanning does not take sources out of rotation
    assert!(m.registry().get("a").unwrap().is_available());
}

#[tokio::test]
async fn sources_without_streaming_are_not_asked() {
    let plain = TestSource::builder().name("plain").build();
    let stream = TestSource::builder()
        .name("stream")
        .with_links_fn(|_| Ok(links("stream")))
        .build();
    let m = manager()
        .with_source(plain.clone())
        .with_source(stream)
        .build()
        .unwrap();

    let got = m
        .get_streaming_links("ep-1", Some("hd-1"), Some(ServerCategory::Dub))
        .await;
    assert_eq!(got.source.as_deref(), Some("stream"));
    assert_eq!(plain.calls("links"), 0);
}

#[tokio::test]
async fn route_target_is_scanned_first() {
    let a = TestSource::builder()
        .name("a")
        .with_links_fn(|_| Ok(links("a")))
        .build();
    let b = TestSource::builder()
        .name("b")
        .with_links_fn(|_| Ok(links("b")))
        .build();
    let m = manager()
        .with_source(a.clone())
        .with_source(b.clone())
        .route_prefix("b-", SourceKey::new("b"), None)
        .build()
        .unwrap();

    let got = m.get_streaming_links("b-ep-3", None, None).await;
    assert_eq!(got.source.as_deref(), Some("b"));
    assert_eq!(a.calls("links"), 0);
}

#[tokio::test]
async fn exhausted_scan_returns_defaults() {
    let a = TestSource::builder()
        .name("a")
        .with_links_fn(|_| Err(AnirouteError::provider("a", "x")))
        .build();
    let m = manager().with_source(a).build().unwrap();

    assert!(m.get_streaming_links("ep-1", None, None).await.is_empty());
    let servers = m.get_episode_servers("ep-1").await;
    assert_eq!(servers, EpisodeServers::default_for("ep-1"));
}

#[tokio::test]
async fn no_streaming_source_yields_defaults() {
    let m = manager()
        .with_source(TestSource::builder().name("plain").build())
        .build()
        .unwrap();
    let servers = m.get_episode_servers("ep-2").await;
    assert_eq!(servers.episode_id, "ep-2");
    assert!(servers.is_empty());
}

#[tokio::test]
async fn exhausted_servers_fall_back_to_configured_list() {
    let a = TestSource::builder()
        .name("a")
        .with_servers_fn(|_| Err(AnirouteError::provider("a", "x")))
        .build();
    let m = manager()
        .with_source(a)
        .fallback_servers(vec![
            EpisodeServer {
                name: "hd-1".into(),
                category: ServerCategory::Sub,
            },
            EpisodeServer {
                name: "hd-2".into(),
                category: ServerCategory::Dub,
            },
        ])
        .build()
        .unwrap();

    let got = m.get_episode_servers("ep-9").await;
    assert_eq!(got.episode_id, "ep-9");
    assert_eq!(got.sub.len(), 1);
    assert_eq!(got.dub[0].name, "hd-2");
    assert!(got.raw.is_empty());
    assert_eq!(got.source, None);
}
