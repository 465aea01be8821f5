//! Time-bounded memo of the last successful parse per playlist URL
//!
//! Entries live for the life of the process and are only ever replaced, never
//! swept. The lock is held for lookups and swaps only, never across the
//! refresh itself, so two concurrent refreshes of the same stale URL both run
//! and the last one to finish wins. Replacement is a single `Arc` swap, so a
//! reader sees either the old or the new channel list.

use std::collections::HashMap;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, error, warn};

use crate::config::CacheConfig;
use crate::models::{CacheEntry, ChannelRecord};
use crate::utils::url::UrlUtils;

/// Result of a cache lookup
#[derive(Debug, Clone)]
pub struct CacheLookup {
    pub entry: Arc<CacheEntry>,
    /// The entry is past its TTL and a refresh just failed
    pub stale: bool,
}

pub struct PlaylistCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, Arc<CacheEntry>>>,
}

impl PlaylistCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.ttl)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return fresh channels for `playlist_url`, refreshing when needed
    ///
    /// A fresh entry is returned without calling `refresh`. Otherwise
    /// `refresh` runs; on success its channels replace the entry, on failure
    /// the previous entry is returned however old it is. The error is only
    /// propagated when nothing was ever cached for the URL.
    pub async fn get_or_refresh<F, Fut, E>(&self, playlist_url: &str, refresh: F) -> Result<CacheLookup, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<ChannelRecord>, E>>,
        E: Display,
    {
        let log_url = UrlUtils::obfuscate_credentials(playlist_url);
        let previous = self.get(playlist_url).await;

        if let Some(entry) = &previous
            && entry.is_fresh(self.ttl)
        {
            debug!(
                "Using cached channels for {} (age {}s)",
                log_url,
                entry.age().as_secs()
            );
            return Ok(CacheLookup {
                entry: Arc::clone(entry),
                stale: false,
            });
        }

        match refresh().await {
            Ok(channels) => {
                let entry = Arc::new(CacheEntry::new(playlist_url, channels));
                self.entries
                    .write()
                    .await
                    .insert(playlist_url.to_string(), Arc::clone(&entry));
                Ok(CacheLookup {
                    entry,
                    stale: false,
                })
            }
            Err(e) => {
                error!("Error refreshing M3U playlist {}: {}", log_url, e);
                match previous {
                    Some(entry) => {
                        warn!(
                            "Returning stale cache for {} ({} channels, age {}s) due to fetch error",
                            log_url,
                            entry.channels.len(),
                            entry.age().as_secs()
                        );
                        Ok(CacheLookup { entry, stale: true })
                    }
                    None => Err(e),
                }
            }
        }
    }

    /// Current entry for a playlist URL, fresh or not
    pub async fn get(&self, playlist_url: &str) -> Option<Arc<CacheEntry>> {
        self.entries.read().await.get(playlist_url).cloned()
    }

    /// First cached channel with this stream URL, across all playlists
    pub async fn find_channel(&self, stream_url: &str) -> Option<ChannelRecord> {
        self.entries.read().await.values().find_map(|entry| {
            entry
                .channels
                .iter()
                .find(|channel| channel.stream_url == stream_url)
                .cloned()
        })
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const URL: &str = "http://lists.example/us.m3u";
    const TTL: Duration = Duration::from_secs(300);

    fn channels(names: &[&str]) -> Vec<ChannelRecord> {
        names
            .iter()
            .map(|name| ChannelRecord {
                name: name.to_string(),
                stream_url: format!("http://stream/{name}"),
                logo_url: None,
                group: "Uncategorized".to_string(),
                tvg_id: None,
                source_playlist_url: URL.to_string(),
            })
            .collect()
    }

    fn names(lookup: &CacheLookup) -> Vec<String> {
        lookup.entry.channels.iter().map(|c| c.name.clone()).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_fresh_entry_skips_refresh() {
        let cache = PlaylistCache::new(TTL);
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let lookup = cache
                .get_or_refresh(URL, || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, String>(channels(&["One"]))
                })
                .await
                .unwrap();
            assert!(!lookup.stale);
            tokio::time::advance(Duration::from_secs(100)).await;
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_entry_is_refreshed() {
        let cache = PlaylistCache::new(TTL);
        let calls = AtomicUsize::new(0);
        let refresh = |list: &'static [&'static str]| {
            let calls = &calls;
            move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, String>(channels(list))
            }
        };

        cache.get_or_refresh(URL, refresh(&["Old"])).await.unwrap();
        tokio::time::advance(TTL).await;
        let lookup = cache.get_or_refresh(URL, refresh(&["New"])).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(names(&lookup), ["New"]);
        assert_eq!(cache.get(URL).await.unwrap().channels[0].name, "New");
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_refresh_serves_stale_entry() {
        let cache = PlaylistCache::new(TTL);

        let first = cache
            .get_or_refresh(URL, || async { Ok::<_, String>(channels(&["A", "B"])) })
            .await
            .unwrap();
        tokio::time::advance(Duration::from_secs(3600)).await;

        let second = cache
            .get_or_refresh(URL, || async { Err::<Vec<ChannelRecord>, _>("connection reset".to_string()) })
            .await
            .unwrap();

        assert!(second.stale);
        assert!(Arc::ptr_eq(&first.entry, &second.entry));
        assert_eq!(names(&second), ["A", "B"]);
    }

    #[tokio::test]
    async fn test_failure_without_entry_propagates() {
        let cache = PlaylistCache::new(TTL);
        let result = cache
            .get_or_refresh(URL, || async { Err::<Vec<ChannelRecord>, _>("timeout".to_string()) })
            .await;

        assert_eq!(result.unwrap_err(), "timeout");
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_keys_are_exact_urls() {
        let cache = PlaylistCache::new(TTL);
        cache
            .get_or_refresh(URL, || async { Ok::<_, String>(channels(&["One"])) })
            .await
            .unwrap();
        cache
            .get_or_refresh("http://lists.example/US.m3u", || async {
                Ok::<_, String>(channels(&["Two"]))
            })
            .await
            .unwrap();

        assert_eq!(cache.len().await, 2);
    }

    #[tokio::test]
    async fn test_empty_playlist_is_cached() {
        let cache = PlaylistCache::new(TTL);
        let calls = AtomicUsize::new(0);
        for _ in 0..2 {
            cache
                .get_or_refresh(URL, || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, String>(Vec::new())
                })
                .await
                .unwrap();
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_find_channel_across_entries() {
        let cache = PlaylistCache::new(TTL);
        cache
            .get_or_refresh(URL, || async { Ok::<_, String>(channels(&["One", "Two"])) })
            .await
            .unwrap();

        let found = cache.find_channel("http://stream/Two").await.unwrap();
        assert_eq!(found.name, "Two");
        assert!(cache.find_channel("http://stream/Three").await.is_none());
    }
}
