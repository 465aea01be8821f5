//! Transparent decompression of downloaded playlist bodies
//!
//! Some providers publish `.m3u.gz` files or send gzip bodies without a
//! `Content-Encoding` header, so the HTTP client never decodes them. The body
//! is sniffed by magic bytes instead of trusting headers or the URL suffix.

use anyhow::Result;
use bytes::Bytes;
use tracing::debug;

/// Compression detected on a playlist body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyCompression {
    Gzip,
    None,
}

impl BodyCompression {
    /// Sniff the compression of a body from its leading bytes
    pub fn sniff(data: &[u8]) -> Self {
        match infer::get(data).map(|kind| kind.mime_type()) {
            Some("application/gzip") => Self::Gzip,
            _ => Self::None,
        }
    }
}

/// Return the playlist body with any compression removed
pub fn decompress_body(data: Bytes) -> Result<Bytes> {
    match BodyCompression::sniff(&data) {
        BodyCompression::None => Ok(data),
        BodyCompression::Gzip => {
            debug!("Playlist body is gzip-compressed ({} bytes)", data.len());
            gunzip(&data)
        }
    }
}

#[cfg(feature = "compression-gzip")]
fn gunzip(data: &[u8]) -> Result<Bytes> {
    use anyhow::Context;
    use flate2::read::GzDecoder;
    use std::io::Read;

    let mut text = Vec::with_capacity(data.len() * 4);
    GzDecoder::new(data)
        .read_to_end(&mut text)
        .context("Failed to gunzip playlist body")?;
    Ok(Bytes::from(text))
}

#[cfg(not(feature = "compression-gzip"))]
fn gunzip(_data: &[u8]) -> Result<Bytes> {
    anyhow::bail!("Playlist body is gzip-compressed but the compression-gzip feature is disabled")
}
