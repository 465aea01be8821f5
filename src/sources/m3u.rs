//! M3U playlist parser
//!
//! Converts extended M3U text into [`ChannelRecord`]s. Parsing never fails:
//! malformed lines are skipped and counted, and an empty document yields an
//! empty channel list.
//!
//! A channel is an `#EXTINF` metadata line followed, possibly after other
//! lines, by an `http(s)://` stream URL:
//!
//! ```text
//! #EXTM3U
//! #EXTINF:-1 tvg-id="one.fr" tvg-logo="http://x/l.png" group-title="News",Channel One
//! http://stream/1.m3u8
//! ```

use tracing::{debug, info, trace, warn};

use crate::models::{ChannelRecord, UNCATEGORIZED_GROUP, UNNAMED_CHANNEL};
use crate::utils::url::UrlUtils;

const HEADER_MARKER: &str = "#EXTM3U";
const EXTINF_MARKER: &str = "#EXTINF:";

/// Named attributes recognised on an `#EXTINF` line
///
/// Each one is independently optional; attributes outside this set are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtinfAttributes {
    pub tvg_id: Option<String>,
    pub tvg_name: Option<String>,
    pub tvg_logo: Option<String>,
    pub group_title: Option<String>,
}

impl ExtinfAttributes {
    /// Extract the recognised attributes from the attribute section of a line
    ///
    /// Keys are matched case-insensitively and may appear in any order. Values
    /// may be double-quoted (and then contain spaces and commas) or bare. When
    /// a key repeats, the first occurrence wins.
    pub fn parse(section: &str) -> Self {
        let mut attributes = Self::default();

        for (key, value) in AttributeTokenizer::new(section) {
            let slot = match key.to_ascii_lowercase().as_str() {
                "tvg-id" => &mut attributes.tvg_id,
                "tvg-name" => &mut attributes.tvg_name,
                "tvg-logo" => &mut attributes.tvg_logo,
                "group-title" => &mut attributes.group_title,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.to_string());
            }
        }

        attributes
    }
}

/// Iterator over `key=value` / `key="value"` pairs in an attribute section
struct AttributeTokenizer<'a> {
    rest: &'a str,
}

impl<'a> AttributeTokenizer<'a> {
    fn new(section: &'a str) -> Self {
        Self { rest: section }
    }
}

impl<'a> Iterator for AttributeTokenizer<'a> {
    type Item = (&'a str, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let trimmed = self.rest.trim_start();
            if trimmed.is_empty() {
                return None;
            }

            // Key runs up to '=' or whitespace
            let key_end = trimmed
                .find(|c: char| c == '=' || c.is_whitespace())
                .unwrap_or(trimmed.len());
            let key = &trimmed[..key_end];
            let after_key = &trimmed[key_end..];

            let Some(after_eq) = after_key.strip_prefix('=') else {
                // Bare word without a value
                self.rest = after_key;
                continue;
            };

            let (value, rest) = if let Some(quoted) = after_eq.strip_prefix('"') {
                match quoted.find('"') {
                    Some(close) => (&quoted[..close], &quoted[close + 1..]),
                    // Unterminated quote: take the remainder of the section
                    None => (quoted, ""),
                }
            } else {
                let end = after_eq.find(char::is_whitespace).unwrap_or(after_eq.len());
                (&after_eq[..end], &after_eq[end..])
            };
            self.rest = rest;

            if key.is_empty() {
                continue;
            }
            return Some((key, value));
        }
    }
}

/// Parsed `#EXTINF` line awaiting its stream URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtinfMetadata {
    pub duration: i64,
    /// Display name after applying the `tvg-name` and placeholder fallbacks
    pub name: String,
    pub attributes: ExtinfAttributes,
}

impl ExtinfMetadata {
    /// Parse an `#EXTINF` line, or `None` when the line is not one
    ///
    /// The marker is matched case-insensitively and must be followed by an
    /// integer duration (`-1` for live streams; a fractional part is ignored).
    /// The display name is the text after the last comma that is not inside
    /// a quoted attribute value, or after the last comma of all when a quote
    /// is left open.
    pub fn parse(line: &str) -> Option<Self> {
        let marker = line.get(..EXTINF_MARKER.len())?;
        if !marker.eq_ignore_ascii_case(EXTINF_MARKER) {
            return None;
        }
        let body = &line[EXTINF_MARKER.len()..];

        let (info, display_name) = match last_unquoted_comma(body) {
            Some(pos) => (&body[..pos], body[pos + 1..].trim()),
            None => (body, ""),
        };

        let digits_start = usize::from(info.starts_with('-'));
        let digits_len = info[digits_start..]
            .bytes()
            .take_while(u8::is_ascii_digit)
            .count();
        if digits_len == 0 {
            return None;
        }
        let duration_end = digits_start + digits_len;
        let duration = info[..duration_end].parse().ok()?;

        let attributes = ExtinfAttributes::parse(&info[duration_end..]);

        let name = if !display_name.is_empty() {
            display_name.to_string()
        } else {
            attributes
                .tvg_name
                .as_deref()
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .unwrap_or(UNNAMED_CHANNEL)
                .to_string()
        };

        Some(Self {
            duration,
            name,
            attributes,
        })
    }

    fn into_channel(self, stream_url: &str, playlist_url: &str) -> ChannelRecord {
        let group = self
            .attributes
            .group_title
            .as_deref()
            .map(str::trim)
            .filter(|group| !group.is_empty())
            .unwrap_or(UNCATEGORIZED_GROUP)
            .to_string();

        ChannelRecord {
            name: self.name,
            stream_url: stream_url.to_string(),
            logo_url: non_empty(self.attributes.tvg_logo),
            group,
            tvg_id: non_empty(self.attributes.tvg_id),
            source_playlist_url: playlist_url.to_string(),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Position of the last comma outside quotes
///
/// With an unterminated quote every later comma would look quoted, so the
/// plain last comma is used instead.
fn last_unquoted_comma(text: &str) -> Option<usize> {
    let mut in_quotes = false;
    let mut last = None;
    for (pos, ch) in text.char_indices() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => last = Some(pos),
            _ => {}
        }
    }
    if in_quotes { text.rfind(',') } else { last }
}

/// Counters for lines that did not become channels
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseStats {
    pub missing_header: bool,
    /// Metadata lines replaced by a later one before any URL arrived
    pub orphaned_metadata: usize,
    /// Stream URLs with no pending metadata
    pub unmatched_urls: usize,
    /// `#EXTINF` lines without a valid duration
    pub malformed_metadata: usize,
}

/// Parser output: channels in emission order plus degradation counters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedPlaylist {
    pub channels: Vec<ChannelRecord>,
    pub stats: ParseStats,
}

/// Extended M3U parser
pub struct M3uParser;

impl M3uParser {
    /// Parse playlist text into channels, in input order
    pub fn parse(content: &str, playlist_url: &str) -> Vec<ChannelRecord> {
        Self::parse_with_stats(content, playlist_url).channels
    }

    /// Parse playlist text, also reporting the lines that were skipped
    pub fn parse_with_stats(content: &str, playlist_url: &str) -> ParsedPlaylist {
        let log_url = UrlUtils::obfuscate_credentials(playlist_url);
        let mut parsed = ParsedPlaylist::default();
        let mut pending: Option<ExtinfMetadata> = None;
        let mut seen_first_line = false;

        for (index, raw_line) in content.lines().enumerate() {
            let line = raw_line.trim();
            if line.is_empty() {
                continue;
            }

            if !seen_first_line {
                seen_first_line = true;
                if !starts_with_ignore_case(line, HEADER_MARKER) {
                    warn!(
                        "M3U file {} does not start with {}. Attempting to parse anyway.",
                        log_url, HEADER_MARKER
                    );
                    parsed.stats.missing_header = true;
                }
            }

            if starts_with_ignore_case(line, EXTINF_MARKER) {
                match ExtinfMetadata::parse(line) {
                    Some(metadata) => {
                        if let Some(orphan) = pending.replace(metadata) {
                            trace!(
                                "Discarding metadata for '{}' with no stream URL (line {})",
                                orphan.name,
                                index + 1
                            );
                            parsed.stats.orphaned_metadata += 1;
                        }
                    }
                    None => {
                        debug!("Skipping malformed EXTINF at line {}: {}", index + 1, line);
                        parsed.stats.malformed_metadata += 1;
                    }
                }
            } else if UrlUtils::is_stream_url(line) {
                match pending.take() {
                    Some(metadata) => parsed
                        .channels
                        .push(metadata.into_channel(line, playlist_url)),
                    None => {
                        debug!(
                            "Found a URL without preceding #EXTINF at line {}: {}. Skipping.",
                            index + 1,
                            UrlUtils::obfuscate_credentials(line)
                        );
                        parsed.stats.unmatched_urls += 1;
                    }
                }
            }
        }

        if let Some(orphan) = pending {
            trace!("Discarding trailing metadata for '{}'", orphan.name);
            parsed.stats.orphaned_metadata += 1;
        }

        info!(
            "Parsed {} channels from {} ({} orphaned metadata, {} unmatched URLs, {} malformed)",
            parsed.channels.len(),
            log_url,
            parsed.stats.orphaned_metadata,
            parsed.stats.unmatched_urls,
            parsed.stats.malformed_metadata
        );

        parsed
    }
}

fn starts_with_ignore_case(line: &str, prefix: &str) -> bool {
    line.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}
