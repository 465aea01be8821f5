//! Public directory handlers, used by a host UI to offer country sources

use axum::{extract::State, response::Response};
use serde::{Deserialize, Serialize};

use crate::web::{AppState, responses::handle_result};

/// A country as offered for selection, with the URLs a catalog source would use
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountryOption {
    pub code: String,
    pub name: String,
    pub display_name: String,
    pub playlist_url: String,
    pub flag_url: String,
}

/// `GET /api/catalog/countries`
pub async fn list_countries(State(state): State<AppState>) -> Response {
    let result = state.catalog.countries().await.map(|countries| {
        countries
            .into_iter()
            .map(|country| CountryOption {
                display_name: country.display_name(),
                playlist_url: state.catalog.playlist_url(&country.code),
                flag_url: state.catalog.flag_url(&country.code),
                code: country.code,
                name: country.name,
            })
            .collect::<Vec<_>>()
    });
    handle_result(result)
}
