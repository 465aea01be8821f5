//! Core data types shared by the parser, cache and browse layers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::time::{Duration, Instant};

pub mod browse;

pub use browse::{BrowseNode, MediaClass, PlayMedia};

/// Name given to channels whose metadata carries no usable display name
pub const UNNAMED_CHANNEL: &str = "Unnamed Channel";

/// Group given to channels without a `group-title`
pub const UNCATEGORIZED_GROUP: &str = "Uncategorized";

/// Content type attached to every resolved stream
pub const STREAM_MIME_TYPE: &str = "application/x-mpegURL";

/// One channel discovered in a playlist
///
/// `stream_url` is not unique within a playlist: duplicates are kept in
/// encounter order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelRecord {
    pub name: String,
    pub stream_url: String,
    pub logo_url: Option<String>,
    pub group: String,
    pub tvg_id: Option<String>,
    /// Playlist this channel was parsed from
    pub source_playlist_url: String,
}

/// Most recent successful parse of one playlist URL
///
/// Entries are replaced whole; readers holding an `Arc<CacheEntry>` never see
/// a partially updated channel list.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub playlist_url: String,
    pub channels: Arc<[ChannelRecord]>,
    /// Wall-clock time of the fetch, for reporting
    pub fetched_at: DateTime<Utc>,
    refreshed_at: Instant,
}

impl CacheEntry {
    pub fn new(playlist_url: impl Into<String>, channels: Vec<ChannelRecord>) -> Self {
        Self {
            playlist_url: playlist_url.into(),
            channels: channels.into(),
            fetched_at: Utc::now(),
            refreshed_at: Instant::now(),
        }
    }

    /// Time since the entry was stored, on the monotonic clock
    pub fn age(&self) -> Duration {
        self.refreshed_at.elapsed()
    }

    pub fn is_fresh(&self, ttl: Duration) -> bool {
        self.age() < ttl
    }
}

/// How a playlist source was configured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    /// A country playlist from the public iptv-org directory
    Catalog,
    /// An arbitrary playlist URL
    Custom,
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceType::Catalog => write!(f, "catalog"),
            SourceType::Custom => write!(f, "custom"),
        }
    }
}

/// A fully resolved playlist source, ready to browse
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistSource {
    pub source_type: SourceType,
    pub m3u_url: String,
    pub friendly_name: String,
    pub country_code: Option<String>,
    pub flag_url: Option<String>,
}

impl PlaylistSource {
    pub fn custom(m3u_url: impl Into<String>, friendly_name: impl Into<String>) -> Self {
        Self {
            source_type: SourceType::Custom,
            m3u_url: m3u_url.into(),
            friendly_name: friendly_name.into(),
            country_code: None,
            flag_url: None,
        }
    }
}
