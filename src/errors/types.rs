//! Error type definitions for the IPTV media source
//!
//! This module defines the error hierarchy used throughout the crate. Every
//! variant carries enough context to produce a log line on its own, and none
//! of them carry credentials: URLs are obfuscated before they are stored.

use thiserror::Error;

use crate::utils::url::UrlUtils;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Playlist retrieval errors
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Browse layer errors
    #[error("Browse error: {0}")]
    Browse(#[from] BrowseError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// External service errors
    #[error("External service error: {service} - {message}")]
    ExternalService { service: String, message: String },

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Failures retrieving a playlist document
///
/// These are recovered locally by the freshness cache when a stale entry
/// exists; otherwise they surface as [`BrowseError::Unavailable`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The request did not complete within the configured timeout
    #[error("Timed out fetching {url}")]
    Timeout { url: String },

    /// The server answered with a non-success status
    #[error("HTTP {status} fetching {url}")]
    Status { url: String, status: u16 },

    /// Connection, TLS, body read or decompression failure
    #[error("Transport failure fetching {url}: {message}")]
    Transport { url: String, message: String },
}

/// Failures surfaced to the host browsing UI
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BrowseError {
    /// No configured source or cached channel matches the identifier
    #[error("Configured IPTV source not found for: {identifier}")]
    SourceNotFound { identifier: String },

    /// The playlist could not be fetched and nothing was cached for it
    #[error("Could not fetch IPTV playlist: {source_name}")]
    Unavailable { source_name: String },

    /// A resolve request carried nothing to play
    #[error("Cannot resolve media identifier: '{identifier}'")]
    Unresolvable { identifier: String },
}

/// Configuration loading and validation failures
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to access config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to serialize default config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A source or section failed validation
    #[error("Invalid configuration: {field} - {message}")]
    Invalid { field: String, message: String },
}

impl AppError {
    /// Create an external service error
    pub fn external_service<S: Into<String>, M: Into<String>>(service: S, message: M) -> Self {
        Self::ExternalService {
            service: service.into(),
            message: message.into(),
        }
    }
}

impl FetchError {
    /// Create a timeout error
    pub fn timeout(url: &str) -> Self {
        Self::Timeout {
            url: UrlUtils::obfuscate_credentials(url),
        }
    }

    /// Create a status error
    pub fn status(url: &str, status: u16) -> Self {
        Self::Status {
            url: UrlUtils::obfuscate_credentials(url),
            status,
        }
    }

    /// Create a transport error, scrubbing credentials from the message too
    pub fn transport<M: AsRef<str>>(url: &str, message: M) -> Self {
        Self::Transport {
            url: UrlUtils::obfuscate_credentials(url),
            message: UrlUtils::obfuscate_credentials(message.as_ref()),
        }
    }

    /// Classify a reqwest error raised while fetching `url`
    pub fn from_reqwest(url: &str, error: &reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::timeout(url)
        } else if let Some(status) = error.status() {
            Self::status(url, status.as_u16())
        } else {
            Self::transport(url, error.to_string())
        }
    }
}

impl BrowseError {
    /// Create a source not found error
    pub fn source_not_found<S: Into<String>>(identifier: S) -> Self {
        Self::SourceNotFound {
            identifier: identifier.into(),
        }
    }

    /// Create an unavailable error naming the source
    pub fn unavailable<S: Into<String>>(source_name: S) -> Self {
        Self::Unavailable {
            source_name: source_name.into(),
        }
    }
}

impl ConfigError {
    /// Create an invalid configuration error
    pub fn invalid<F: Into<String>, M: Into<String>>(field: F, message: M) -> Self {
        Self::Invalid {
            field: field.into(),
            message: message.into(),
        }
    }
}
