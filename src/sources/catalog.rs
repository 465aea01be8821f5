//! iptv-org public directory helpers
//!
//! Country playlists live at a predictable path,
//! `{streams_base_url}{lowercase code}.m3u`, and flags at
//! `{flags_base_url}{UPPERCASE code}/flat/64.png`. The country list itself is
//! a JSON array fetched from `countries_url`.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::config::CatalogConfig;
use crate::errors::{AppError, AppResult};

/// One entry of the directory's country list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    /// ISO 3166-1 alpha-2 code as published (upper case)
    pub code: String,
    pub name: String,
}

impl Country {
    /// Regional-indicator flag for the country code, empty when not two letters
    pub fn flag_emoji(&self) -> String {
        flag_emoji(&self.code)
    }

    /// Name prefixed with its flag, used to order and label the list
    pub fn display_name(&self) -> String {
        format!("{}{}", self.flag_emoji(), self.name)
    }
}

/// Convert a two-letter country code to a flag emoji
///
/// Returns an empty string for anything that is not exactly two ASCII letters.
pub fn flag_emoji(country_code: &str) -> String {
    const REGIONAL_INDICATOR_A: u32 = 0x1F1E6;

    if country_code.len() != 2 || !country_code.bytes().all(|b| b.is_ascii_alphabetic()) {
        return String::new();
    }

    country_code
        .bytes()
        .map(|b| b.to_ascii_uppercase() - b'A')
        .filter_map(|offset| char::from_u32(REGIONAL_INDICATOR_A + u32::from(offset)))
        .collect()
}

/// Client for the public playlist directory
#[derive(Clone)]
pub struct CatalogClient {
    client: Client,
    config: CatalogConfig,
}

impl CatalogClient {
    pub fn new(client: Client, config: CatalogConfig) -> Self {
        Self { client, config }
    }

    /// Playlist URL for a country code
    pub fn playlist_url(&self, country_code: &str) -> String {
        self.config.playlist_url(country_code)
    }

    /// Flag image URL for a country code
    pub fn flag_url(&self, country_code: &str) -> String {
        self.config.flag_url(country_code)
    }

    /// Fetch the country list, sorted by flag-prefixed display name
    ///
    /// Entries missing a code or a name are dropped.
    pub async fn countries(&self) -> AppResult<Vec<Country>> {
        debug!("Fetching countries from: {}", self.config.countries_url);

        let raw: Vec<RawCountry> = self
            .client
            .get(&self.config.countries_url)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| {
                error!("Error fetching IPTV.org countries: {}", e);
                AppError::external_service("iptv-org", "Could not fetch country list")
            })?
            .json()
            .await?;

        let mut countries: Vec<Country> = raw
            .into_iter()
            .filter_map(|entry| match (entry.code, entry.name) {
                (Some(code), Some(name)) if !code.is_empty() && !name.is_empty() => {
                    Some(Country { code, name })
                }
                _ => None,
            })
            .collect();
        countries.sort_by_cached_key(Country::display_name);

        debug!("Fetched {} countries", countries.len());
        Ok(countries)
    }
}

#[derive(Deserialize)]
struct RawCountry {
    code: Option<String>,
    name: Option<String>,
}
