//! Playlist sources
//!
//! Everything that touches the network or the playlist text format lives
//! here: retrieval ([`fetcher`]), parsing ([`m3u`]) and the public country
//! directory ([`catalog`]).
//!
//! # Usage
//!
//! ```rust,no_run
//! use iptv_media_source::sources::{HttpPlaylistFetcher, M3uParser, PlaylistFetcher};
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let url = "https://iptv-org.github.io/iptv/countries/fr.m3u";
//!     let text = HttpPlaylistFetcher::default().fetch(url).await?;
//!     let channels = M3uParser::parse(&text, url);
//!     println!("Parsed {} channels", channels.len());
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod fetcher;
pub mod m3u;

pub use catalog::{CatalogClient, Country};
pub use fetcher::{HttpPlaylistFetcher, PlaylistFetcher};
pub use m3u::{M3uParser, ParseStats, ParsedPlaylist};
