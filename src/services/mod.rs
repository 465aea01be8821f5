//! Service layer
//!
//! Services sit between the HTTP handlers and the playlist sources. The
//! [`PlaylistCache`] is constructed once per process and shared by reference
//! with the [`BrowseService`], which owns the configured sources.
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use iptv_media_source::models::PlaylistSource;
//! use iptv_media_source::services::{BrowseService, PlaylistCache};
//! use iptv_media_source::sources::HttpPlaylistFetcher;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let sources = vec![PlaylistSource::custom("http://lists.example/tv.m3u", "My TV")];
//!     let cache = Arc::new(PlaylistCache::new(Duration::from_secs(300)));
//!     let browse = BrowseService::new(sources, cache, Arc::new(HttpPlaylistFetcher::default()));
//!
//!     let node = browse.browse(Some("http://lists.example/tv.m3u")).await?;
//!     println!("{} channels", node.children.len());
//!     Ok(())
//! }
//! ```

pub mod browse;
pub mod playlist_cache;

pub use browse::BrowseService;
pub use playlist_cache::{CacheLookup, PlaylistCache};
