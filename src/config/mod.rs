use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

pub mod defaults;
pub mod duration_serde;

use defaults::*;

use crate::errors::{ConfigError, ConfigResult};
use crate::models::{PlaylistSource, SourceType};
use crate::utils::url::UrlUtils;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Configured playlist sources, in browse order
    #[serde(default)]
    pub sources: Vec<SourceConfig>,
    #[serde(default)]
    pub web: WebConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Total time allowed for one playlist download
    #[serde(with = "duration_serde::duration", default = "default_fetch_timeout")]
    pub timeout: Duration,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// How long a parsed playlist is served without refetching
    #[serde(with = "duration_serde::duration", default = "default_cache_ttl")]
    pub ttl: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_countries_url")]
    pub countries_url: String,
    #[serde(default = "default_streams_base_url")]
    pub streams_base_url: String,
    #[serde(default = "default_flags_base_url")]
    pub flags_base_url: String,
}

/// One `[[sources]]` entry as written in the config file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    pub source_type: SourceType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub m3u_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub friendly_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    /// Country name used for the default catalog friendly name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flag_url: Option<String>,
}

// Web defaults
fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

// Fetch defaults
fn default_fetch_timeout() -> Duration {
    Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS)
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

// Cache defaults
fn default_cache_ttl() -> Duration {
    Duration::from_secs(DEFAULT_CACHE_TTL_SECS)
}

// Catalog defaults
fn default_countries_url() -> String {
    DEFAULT_COUNTRIES_URL.to_string()
}

fn default_streams_base_url() -> String {
    DEFAULT_STREAMS_BASE_URL.to_string()
}

fn default_flags_base_url() -> String {
    DEFAULT_FLAGS_BASE_URL.to_string()
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: default_fetch_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: default_cache_ttl(),
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            countries_url: default_countries_url(),
            streams_base_url: default_streams_base_url(),
            flags_base_url: default_flags_base_url(),
        }
    }
}

impl CatalogConfig {
    /// `{streams_base_url}{lowercase code}.m3u`
    pub fn playlist_url(&self, country_code: &str) -> String {
        format!(
            "{}{}.m3u",
            self.streams_base_url,
            country_code.to_ascii_lowercase()
        )
    }

    /// `{flags_base_url}{UPPERCASE code}/flat/64.png`
    pub fn flag_url(&self, country_code: &str) -> String {
        format!(
            "{}{}/flat/64.png",
            self.flags_base_url,
            country_code.to_ascii_uppercase()
        )
    }
}

impl SourceConfig {
    /// Fill in catalog-derived defaults and validate the entry
    pub fn resolve(&self, index: usize, catalog: &CatalogConfig) -> ConfigResult<PlaylistSource> {
        let field = |name: &str| format!("sources[{index}].{name}");
        let given = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        match self.source_type {
            SourceType::Catalog => {
                let code = given(&self.country_code)
                    .ok_or_else(|| {
                        ConfigError::invalid(
                            field("country_code"),
                            "catalog sources need a country code",
                        )
                    })?
                    .to_ascii_lowercase();

                let m3u_url = given(&self.m3u_url).unwrap_or_else(|| catalog.playlist_url(&code));
                if !UrlUtils::is_valid_http(&m3u_url) {
                    return Err(ConfigError::invalid(
                        field("m3u_url"),
                        format!(
                            "'{}' is not an http(s) URL",
                            UrlUtils::obfuscate_credentials(&m3u_url)
                        ),
                    ));
                }

                let label = given(&self.country_name).unwrap_or_else(|| code.to_ascii_uppercase());
                Ok(PlaylistSource {
                    source_type: SourceType::Catalog,
                    friendly_name: given(&self.friendly_name)
                        .unwrap_or_else(|| format!("{DEFAULT_CATALOG_NAME_PREFIX}{label}")),
                    flag_url: given(&self.flag_url).or_else(|| Some(catalog.flag_url(&code))),
                    country_code: Some(code),
                    m3u_url,
                })
            }
            SourceType::Custom => {
                let m3u_url = given(&self.m3u_url).ok_or_else(|| {
                    ConfigError::invalid(field("m3u_url"), "custom sources need an M3U URL")
                })?;
                if !UrlUtils::is_valid_http(&m3u_url) {
                    return Err(ConfigError::invalid(
                        field("m3u_url"),
                        format!("'{}' is not an http(s) URL", UrlUtils::obfuscate_credentials(&m3u_url)),
                    ));
                }
                if !UrlUtils::has_playlist_extension(&m3u_url) {
                    return Err(ConfigError::invalid(
                        field("m3u_url"),
                        "URL must end in .m3u or .m3u8",
                    ));
                }

                Ok(PlaylistSource {
                    source_type: SourceType::Custom,
                    m3u_url,
                    friendly_name: given(&self.friendly_name)
                        .unwrap_or_else(|| DEFAULT_CUSTOM_FRIENDLY_NAME.to_string()),
                    country_code: None,
                    flag_url: None,
                })
            }
        }
    }
}

impl Config {
    /// Resolve every `[[sources]]` entry, failing on the first invalid one
    ///
    /// Two entries with the same playlist URL are both kept; they share one
    /// cache slot at runtime.
    pub fn resolve_sources(&self) -> ConfigResult<Vec<PlaylistSource>> {
        let sources = self
            .sources
            .iter()
            .enumerate()
            .map(|(index, source)| source.resolve(index, &self.catalog))
            .collect::<ConfigResult<Vec<_>>>()?;

        for (index, source) in sources.iter().enumerate() {
            if sources[..index].iter().any(|s| s.m3u_url == source.m3u_url) {
                warn!(
                    "Source '{}' shares its playlist URL with an earlier source",
                    source.friendly_name
                );
            }
        }

        Ok(sources)
    }

    /// Check values that serde cannot
    pub fn validate(&self) -> ConfigResult<()> {
        if self.fetch.timeout.is_zero() {
            return Err(ConfigError::invalid("fetch.timeout", "must be greater than zero"));
        }
        self.resolve_sources().map(|_| ())
    }

    pub fn from_toml_str(contents: &str, origin: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: origin.to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load the config file, writing a default one when it does not exist
    pub fn load_from_file(config_file: &str) -> ConfigResult<Self> {
        let io_error = |source| ConfigError::Io {
            path: config_file.to_string(),
            source,
        };

        if Path::new(config_file).exists() {
            let contents = std::fs::read_to_string(config_file).map_err(io_error)?;
            Self::from_toml_str(&contents, config_file)
        } else {
            let default_config = Self::default();
            let contents = toml::to_string_pretty(&default_config)?;
            std::fs::write(config_file, contents).map_err(io_error)?;
            info!("Created default config file: {}", config_file);
            Ok(default_config)
        }
    }
}
