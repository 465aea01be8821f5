//! End-to-end browse pipeline tests
//!
//! A wiremock server stands in for the playlist host; everything from the
//! HTTP fetcher through the cache to the browse tree is the real thing.

use std::sync::Arc;
use std::time::Duration;

use iptv_media_source::{
    config::Config,
    errors::BrowseError,
    models::{MediaClass, PlaylistSource, STREAM_MIME_TYPE},
    services::{BrowseService, PlaylistCache},
    sources::HttpPlaylistFetcher,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PLAYLIST: &str = r#"#EXTM3U
#EXTINF:-1 tvg-id="one.us" tvg-logo="http://x/l.png" group-title="News",Channel One
http://stream/1.m3u8
#EXTINF:-1,
http://stream/2.m3u8
#EXTINF:-1 group-title="Sports",Orphaned
#EXTINF:-1 tvg-name="Backup Name" group-title="Sports",
http://stream/3.m3u8
http://stream/unlabelled.m3u8
"#;

fn browse_service(sources: Vec<PlaylistSource>) -> BrowseService {
    let fetcher = HttpPlaylistFetcher::new(reqwest::Client::new(), Duration::from_secs(2));
    let cache = Arc::new(PlaylistCache::new(Duration::from_secs(300)));
    BrowseService::new(sources, cache, Arc::new(fetcher))
}

#[tokio::test]
async fn browse_source_parses_and_sorts_channels() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/us.m3u"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PLAYLIST))
        .mount(&server)
        .await;

    let url = format!("{}/us.m3u", server.uri());
    let service = browse_service(vec![PlaylistSource::custom(&url, "US Lists")]);

    let node = service.browse(Some(&url)).await.unwrap();

    assert_eq!(node.title, "US Lists");
    assert_eq!(node.media_class, MediaClass::Playlist);
    let titles: Vec<_> = node.children.iter().map(|c| c.title.as_str()).collect();
    assert_eq!(titles, ["Backup Name", "Channel One", "Unnamed Channel"]);

    let one = &node.children[1];
    assert_eq!(one.identifier.as_deref(), Some("http://stream/1.m3u8"));
    assert_eq!(one.thumbnail.as_deref(), Some("http://x/l.png"));
    assert_eq!(one.media_content_type, STREAM_MIME_TYPE);
}

#[tokio::test]
async fn repeated_browse_fetches_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/us.m3u"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PLAYLIST))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/us.m3u", server.uri());
    let service = browse_service(vec![
        PlaylistSource::custom(&url, "First"),
        PlaylistSource::custom(&url, "Second"),
    ]);

    for _ in 0..3 {
        service.browse(Some(&url)).await.unwrap();
    }

    server.verify().await;
}

#[tokio::test]
async fn upstream_failure_names_the_source() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/down.m3u"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let url = format!("{}/down.m3u", server.uri());
    let service = browse_service(vec![PlaylistSource::custom(&url, "Flaky Host")]);

    let err = service.browse(Some(&url)).await.unwrap_err();

    assert_eq!(err, BrowseError::unavailable("Flaky Host"));
    assert!(service.cache().is_empty().await);
}

#[tokio::test]
async fn channel_leaf_and_resolve_after_browse() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/us.m3u"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PLAYLIST))
        .mount(&server)
        .await;

    let url = format!("{}/us.m3u", server.uri());
    let service = browse_service(vec![PlaylistSource::custom(&url, "US Lists")]);
    service.browse(Some(&url)).await.unwrap();

    let leaf = service.browse(Some("http://stream/3.m3u8")).await.unwrap();
    assert_eq!(leaf.title, "Backup Name");
    assert!(leaf.can_play);

    let media = service.resolve("http://stream/3.m3u8").unwrap();
    assert_eq!(media.url, "http://stream/3.m3u8");
    assert_eq!(media.mime_type, "application/x-mpegURL");
}

#[tokio::test]
async fn configured_catalog_source_browses_from_directory() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/iptv/countries/fr.m3u"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PLAYLIST))
        .mount(&server)
        .await;

    let toml = format!(
        r#"
[catalog]
streams_base_url = "{}/iptv/countries/"

[[sources]]
source_type = "catalog"
country_code = "FR"
"#,
        server.uri()
    );
    let config = Config::from_toml_str(&toml, "inline").unwrap();
    let sources = config.resolve_sources().unwrap();
    let service = browse_service(sources);

    let root = service.browse(None).await.unwrap();
    assert_eq!(root.children.len(), 1);
    assert_eq!(root.children[0].title, "IPTV.org - FR");
    assert_eq!(
        root.children[0].thumbnail.as_deref(),
        Some("https://flagsapi.com/FR/flat/64.png")
    );

    let url = root.children[0].identifier.clone().unwrap();
    let node = service.browse(Some(&url)).await.unwrap();
    assert_eq!(node.children.len(), 3);
}
