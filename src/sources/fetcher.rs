//! Playlist retrieval over HTTP
//!
//! Fetching fails only on transport, status or timeout problems. Bodies that
//! are not valid UTF-8 are re-decoded as ISO-8859-1, so decoding never fails.
//! There are no retries at this layer.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::defaults::DEFAULT_FETCH_TIMEOUT_SECS;
use crate::config::FetchConfig;
use crate::errors::{FetchError, FetchResult};
use crate::utils::url::UrlUtils;
use crate::utils::decompress_body;

const UTF8_BOM: char = '\u{feff}';

/// Retrieves raw playlist text
#[async_trait]
pub trait PlaylistFetcher: Send + Sync {
    /// Fetch `url` and return the decoded document
    async fn fetch(&self, url: &str) -> FetchResult<String>;
}

/// reqwest-backed fetcher with a per-request timeout
#[derive(Clone)]
pub struct HttpPlaylistFetcher {
    client: Client,
    timeout: Duration,
}

impl HttpPlaylistFetcher {
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// Build a client from the `[fetch]` configuration section
    pub fn from_config(config: &FetchConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().user_agent(config.user_agent.as_str()).build()?;
        Ok(Self::new(client, config.timeout))
    }
}

impl Default for HttpPlaylistFetcher {
    fn default() -> Self {
        Self::new(Client::new(), Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS))
    }
}

#[async_trait]
impl PlaylistFetcher for HttpPlaylistFetcher {
    async fn fetch(&self, url: &str) -> FetchResult<String> {
        let log_url = UrlUtils::obfuscate_credentials(url);
        debug!("Fetching M3U playlist from: {}", log_url);

        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::status(url, status.as_u16()));
        }

        let raw = response
            .bytes()
            .await
            .map_err(|e| FetchError::from_reqwest(url, &e))?;
        debug!("Fetched {} bytes from {}", raw.len(), log_url);

        let body = decompress_body(raw)
            .map_err(|e| FetchError::transport(url, format!("{e:#}")))?;

        Ok(decode_playlist_bytes(&body, &log_url))
    }
}

/// Decode a playlist body as UTF-8, falling back to ISO-8859-1
///
/// Every byte maps to a code point under ISO-8859-1, so this cannot fail. A
/// leading byte-order mark is dropped.
pub fn decode_playlist_bytes(bytes: &[u8], log_url: &str) -> String {
    let text = match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(e) => {
            warn!(
                "Failed to decode M3U {} as UTF-8 ({}). Decoding as latin-1.",
                log_url, e
            );
            bytes.iter().copied().map(char::from).collect()
        }
    };

    match text.strip_prefix(UTF8_BOM) {
        Some(stripped) => stripped.to_string(),
        None => text,
    }
}
