//! Centralized error handling for the IPTV media source
//!
//! Failures below the browse layer are either absorbed (stale cache fallback,
//! skipped playlist lines) or converted into a [`BrowseError`] at the boundary.
//!
//! # Error Categories
//!
//! - **Fetch Errors**: network, status and timeout failures retrieving a playlist
//! - **Browse Errors**: the uniform failures handed to the host UI
//! - **Config Errors**: unreadable or invalid configuration files
//!
//! # Usage
//!
//! ```rust
//! use iptv_media_source::errors::{AppError, AppResult};
//!
//! fn example_function() -> AppResult<String> {
//!     Ok("success".to_string())
//! }
//! ```

pub mod types;

pub use types::*;

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Convenience type alias for playlist retrieval Results
pub type FetchResult<T> = Result<T, FetchError>;

/// Convenience type alias for browse Results
pub type BrowseResult<T> = Result<T, BrowseError>;

/// Convenience type alias for configuration Results
pub type ConfigResult<T> = Result<T, ConfigError>;
