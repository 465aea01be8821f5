/// Configuration default values
///
/// This module contains all the default values for configuration options,
/// making them easily changeable in one central location.
// Web server defaults
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;

// Fetch defaults
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_USER_AGENT: &str = concat!("iptv-media-source/", env!("CARGO_PKG_VERSION"));

// Cache defaults
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;

// Catalog (iptv-org) defaults
pub const DEFAULT_COUNTRIES_URL: &str = "https://iptv-org.github.io/api/countries.json";
pub const DEFAULT_STREAMS_BASE_URL: &str = "https://iptv-org.github.io/iptv/countries/";
pub const DEFAULT_FLAGS_BASE_URL: &str = "https://flagsapi.com/";

// Source naming defaults
pub const DEFAULT_CATALOG_NAME_PREFIX: &str = "IPTV.org - ";
pub const DEFAULT_CUSTOM_FRIENDLY_NAME: &str = "Custom IPTV";
