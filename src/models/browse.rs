//! Browse tree nodes handed to the host media UI

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ChannelRecord, PlaylistSource, STREAM_MIME_TYPE};

/// Title of the browse tree root
pub const ROOT_TITLE: &str = "IPTV Media";

/// Content type reported for playlist (source) nodes
pub const PLAYLIST_CONTENT_TYPE: &str = "playlist";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaClass {
    Directory,
    Playlist,
    Channel,
}

/// One node of the two-level browse tree (sources, then channels)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowseNode {
    /// `None` for the root, the playlist URL for sources, the stream URL for channels
    pub identifier: Option<String>,
    pub media_class: MediaClass,
    pub media_content_type: String,
    pub title: String,
    pub can_play: bool,
    pub can_expand: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub children: Vec<BrowseNode>,
    /// When the channel list behind a source node was fetched
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetched_at: Option<DateTime<Utc>>,
    /// Set when a source node is served from an expired cache entry
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub stale: bool,
}

impl BrowseNode {
    pub fn root(children: Vec<BrowseNode>) -> Self {
        Self {
            identifier: None,
            media_class: MediaClass::Directory,
            media_content_type: STREAM_MIME_TYPE.to_string(),
            title: ROOT_TITLE.to_string(),
            can_play: false,
            can_expand: true,
            thumbnail: None,
            children,
            fetched_at: None,
            stale: false,
        }
    }

    /// Collapsed source node, as listed under the root
    pub fn source(source: &PlaylistSource) -> Self {
        Self {
            identifier: Some(source.m3u_url.clone()),
            media_class: MediaClass::Playlist,
            media_content_type: PLAYLIST_CONTENT_TYPE.to_string(),
            title: source.friendly_name.clone(),
            can_play: false,
            can_expand: true,
            thumbnail: source.flag_url.clone(),
            children: Vec::new(),
            fetched_at: None,
            stale: false,
        }
    }

    /// Playable leaf for one channel
    pub fn channel(channel: &ChannelRecord) -> Self {
        Self {
            identifier: Some(channel.stream_url.clone()),
            media_class: MediaClass::Channel,
            media_content_type: STREAM_MIME_TYPE.to_string(),
            title: channel.name.clone(),
            can_play: true,
            can_expand: false,
            thumbnail: channel.logo_url.clone(),
            children: Vec::new(),
            fetched_at: None,
            stale: false,
        }
    }

    /// Source node expanded with its channels, sorted by title
    ///
    /// A source without channels is reported as not expandable.
    pub fn expanded_source(source: &PlaylistSource, channels: &[ChannelRecord]) -> Self {
        let mut node = Self::source(source);
        node.children = channels.iter().map(Self::channel).collect();
        node.children.sort_by(|a, b| a.title.cmp(&b.title));
        node.can_expand = !node.children.is_empty();
        node
    }
}

/// A resolved, directly playable stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayMedia {
    pub url: String,
    pub mime_type: String,
}

impl PlayMedia {
    pub fn stream(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            mime_type: STREAM_MIME_TYPE.to_string(),
        }
    }
}
