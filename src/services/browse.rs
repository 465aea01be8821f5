//! Browse adapter
//!
//! Maps browse identifiers onto the two-level tree: no identifier is the
//! root, a playlist URL is a source node, a stream URL is a channel leaf.
//! Fetch failures below this layer are either absorbed by the cache or turned
//! into a single [`BrowseError::Unavailable`] naming the source.

use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::errors::{BrowseError, BrowseResult, FetchError};
use crate::models::{BrowseNode, PlayMedia, PlaylistSource};
use crate::services::playlist_cache::{CacheLookup, PlaylistCache};
use crate::sources::{M3uParser, PlaylistFetcher};
use crate::utils::url::UrlUtils;

pub struct BrowseService {
    sources: Vec<PlaylistSource>,
    cache: Arc<PlaylistCache>,
    fetcher: Arc<dyn PlaylistFetcher>,
}

impl BrowseService {
    pub fn new(
        sources: Vec<PlaylistSource>,
        cache: Arc<PlaylistCache>,
        fetcher: Arc<dyn PlaylistFetcher>,
    ) -> Self {
        info!("Browse service configured with {} source(s)", sources.len());
        Self {
            sources,
            cache,
            fetcher,
        }
    }

    pub fn cache(&self) -> &Arc<PlaylistCache> {
        &self.cache
    }

    /// Browse the tree at `identifier`
    pub async fn browse(&self, identifier: Option<&str>) -> BrowseResult<BrowseNode> {
        let Some(identifier) = identifier else {
            return Ok(self.list_sources());
        };

        if let Some(source) = self.find_source(identifier) {
            return self.list_channels(source).await;
        }

        if let Some(channel) = self.cache.find_channel(identifier).await {
            return Ok(BrowseNode::channel(&channel));
        }

        warn!(
            "Browse request for unknown identifier: {}",
            UrlUtils::obfuscate_credentials(identifier)
        );
        Err(BrowseError::source_not_found(identifier))
    }

    /// Root node with one collapsed child per configured source
    pub fn list_sources(&self) -> BrowseNode {
        let children = self
            .sources
            .iter()
            .filter(|source| {
                if source.m3u_url.is_empty() {
                    warn!("Skipping source '{}' with no playlist URL", source.friendly_name);
                    false
                } else {
                    true
                }
            })
            .map(BrowseNode::source)
            .collect();
        BrowseNode::root(children)
    }

    /// Source node expanded with its channels
    pub async fn list_channels(&self, source: &PlaylistSource) -> BrowseResult<BrowseNode> {
        let lookup = self.channels_for(source).await?;
        let mut node = BrowseNode::expanded_source(source, &lookup.entry.channels);
        node.fetched_at = Some(lookup.entry.fetched_at);
        node.stale = lookup.stale;
        Ok(node)
    }

    /// Resolve a channel identifier to something playable
    ///
    /// The identifier is the stream URL, so this never touches the network.
    pub fn resolve(&self, identifier: &str) -> BrowseResult<PlayMedia> {
        if identifier.trim().is_empty() {
            return Err(BrowseError::Unresolvable {
                identifier: identifier.to_string(),
            });
        }
        Ok(PlayMedia::stream(identifier))
    }

    fn find_source(&self, identifier: &str) -> Option<&PlaylistSource> {
        self.sources
            .iter()
            .find(|source| !source.m3u_url.is_empty() && source.m3u_url == identifier)
    }

    async fn channels_for(&self, source: &PlaylistSource) -> BrowseResult<CacheLookup> {
        let url = source.m3u_url.as_str();
        self.cache
            .get_or_refresh(url, || async {
                let content = self.fetcher.fetch(url).await?;
                let channels = M3uParser::parse(&content, url);
                debug!(
                    "Refreshed '{}' with {} channels",
                    source.friendly_name,
                    channels.len()
                );
                Ok::<_, FetchError>(channels)
            })
            .await
            .map_err(|e| {
                error!("No cached channels for '{}': {}", source.friendly_name, e);
                BrowseError::unavailable(source.friendly_name.as_str())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FetchResult;
    use crate::models::{MediaClass, SourceType, STREAM_MIME_TYPE};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    const NEWS_URL: &str = "http://lists.example/news.m3u";
    const NEWS_PLAYLIST: &str = "#EXTM3U\n\
        #EXTINF:-1 tvg-logo=\"http://x/z.png\" group-title=\"News\",Zulu News\n\
        http://stream/z.m3u8\n\
        #EXTINF:-1 group-title=\"News\",Alpha News\n\
        http://stream/a.m3u8\n";

    #[derive(Default)]
    struct MockFetcher {
        responses: Mutex<HashMap<String, FetchResult<String>>>,
        calls: AtomicUsize,
    }

    impl MockFetcher {
        fn respond(&self, url: &str, response: FetchResult<String>) {
            self.responses.lock().unwrap().insert(url.to_string(), response);
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PlaylistFetcher for MockFetcher {
        async fn fetch(&self, url: &str) -> FetchResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.responses
                .lock()
                .unwrap()
                .get(url)
                .cloned()
                .unwrap_or_else(|| Err(FetchError::status(url, 404)))
        }
    }

    fn service(sources: Vec<PlaylistSource>) -> (BrowseService, Arc<MockFetcher>) {
        let fetcher = Arc::new(MockFetcher::default());
        let cache = Arc::new(PlaylistCache::new(Duration::from_secs(300)));
        let service = BrowseService::new(sources, cache, fetcher.clone());
        (service, fetcher)
    }

    fn news_source() -> PlaylistSource {
        PlaylistSource::custom(NEWS_URL, "News Lists")
    }

    #[tokio::test]
    async fn test_root_lists_configured_sources() {
        let flagged = PlaylistSource {
            source_type: SourceType::Catalog,
            m3u_url: "http://lists.example/fr.m3u".to_string(),
            friendly_name: "IPTV.org - FR".to_string(),
            country_code: Some("FR".to_string()),
            flag_url: Some("https://flagsapi.com/FR/flat/64.png".to_string()),
        };
        let empty = PlaylistSource::custom("", "Broken");
        let (service, fetcher) = service(vec![news_source(), flagged, empty]);

        let root = service.browse(None).await.unwrap();

        assert_eq!(root.title, "IPTV Media");
        assert_eq!(root.media_class, MediaClass::Directory);
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.children[0].identifier.as_deref(), Some(NEWS_URL));
        assert_eq!(
            root.children[1].thumbnail.as_deref(),
            Some("https://flagsapi.com/FR/flat/64.png")
        );
        assert_eq!(fetcher.calls(), 0);
    }

    #[tokio::test]
    async fn test_source_children_sorted_by_title() {
        let (service, fetcher) = service(vec![news_source()]);
        fetcher.respond(NEWS_URL, Ok(NEWS_PLAYLIST.to_string()));

        let node = service.browse(Some(NEWS_URL)).await.unwrap();

        let titles: Vec<_> = node.children.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, ["Alpha News", "Zulu News"]);
        assert!(node.can_expand);
        assert!(!node.stale);
        assert!(node.fetched_at.is_some());
        assert_eq!(node.children[1].thumbnail.as_deref(), Some("http://x/z.png"));
        assert!(node.children.iter().all(|c| c.can_play && !c.can_expand));
    }

    #[tokio::test]
    async fn test_second_browse_uses_cache() {
        let (service, fetcher) = service(vec![news_source()]);
        fetcher.respond(NEWS_URL, Ok(NEWS_PLAYLIST.to_string()));

        service.browse(Some(NEWS_URL)).await.unwrap();
        service.browse(Some(NEWS_URL)).await.unwrap();

        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_sources_sharing_url_share_one_fetch() {
        let twin = PlaylistSource::custom(NEWS_URL, "Same List Again");
        let (service, fetcher) = service(vec![news_source(), twin.clone()]);
        fetcher.respond(NEWS_URL, Ok(NEWS_PLAYLIST.to_string()));

        service.list_channels(&news_source()).await.unwrap();
        let node = service.list_channels(&twin).await.unwrap();

        assert_eq!(node.title, "Same List Again");
        assert_eq!(node.children.len(), 2);
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_empty_playlist_is_not_expandable() {
        let (service, fetcher) = service(vec![news_source()]);
        fetcher.respond(NEWS_URL, Ok("#EXTM3U\n".to_string()));

        let node = service.browse(Some(NEWS_URL)).await.unwrap();

        assert!(node.children.is_empty());
        assert!(!node.can_expand);
    }

    #[tokio::test]
    async fn test_fetch_failure_without_cache_is_unavailable() {
        let (service, fetcher) = service(vec![news_source()]);
        fetcher.respond(NEWS_URL, Err(FetchError::timeout(NEWS_URL)));

        let err = service.browse(Some(NEWS_URL)).await.unwrap_err();

        assert_eq!(err, BrowseError::unavailable("News Lists"));
        assert_eq!(err.to_string(), "Could not fetch IPTV playlist: News Lists");
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_failure_after_expiry_serves_stale() {
        let (service, fetcher) = service(vec![news_source()]);
        fetcher.respond(NEWS_URL, Ok(NEWS_PLAYLIST.to_string()));
        let first = service.browse(Some(NEWS_URL)).await.unwrap();

        tokio::time::advance(Duration::from_secs(301)).await;
        fetcher.respond(NEWS_URL, Err(FetchError::status(NEWS_URL, 500)));
        let second = service.browse(Some(NEWS_URL)).await.unwrap();

        assert_eq!(fetcher.calls(), 2);
        assert!(second.stale);
        assert_eq!(second.children, first.children);
        assert_eq!(second.fetched_at, first.fetched_at);
    }

    #[tokio::test]
    async fn test_cached_stream_url_browses_to_leaf() {
        let (service, fetcher) = service(vec![news_source()]);
        fetcher.respond(NEWS_URL, Ok(NEWS_PLAYLIST.to_string()));
        service.browse(Some(NEWS_URL)).await.unwrap();

        let leaf = service.browse(Some("http://stream/a.m3u8")).await.unwrap();

        assert_eq!(leaf.media_class, MediaClass::Channel);
        assert_eq!(leaf.title, "Alpha News");
        assert!(leaf.can_play);
    }

    #[tokio::test]
    async fn test_unknown_identifier_is_not_found() {
        let (service, fetcher) = service(vec![news_source()]);

        let err = service.browse(Some("http://elsewhere/list.m3u")).await.unwrap_err();

        assert!(matches!(err, BrowseError::SourceNotFound { .. }));
        assert_eq!(fetcher.calls(), 0);
    }

    #[tokio::test]
    async fn test_resolve_is_identity_without_network() {
        let (service, fetcher) = service(vec![news_source()]);

        let media = service.resolve("http://stream/1.m3u8").unwrap();

        assert_eq!(media.url, "http://stream/1.m3u8");
        assert_eq!(media.mime_type, STREAM_MIME_TYPE);
        assert_eq!(fetcher.calls(), 0);
    }

    #[test]
    fn test_resolve_rejects_empty_identifier() {
        let (service, _) = service(Vec::new());
        assert!(matches!(
            service.resolve("  "),
            Err(BrowseError::Unresolvable { .. })
        ));
    }
}
