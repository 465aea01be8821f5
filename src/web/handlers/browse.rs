//! Browse and resolve handlers

use axum::{
    extract::{Query, State},
    response::Response,
};
use serde::Deserialize;
use tracing::debug;

use crate::errors::AppError;
use crate::utils::url::UrlUtils;
use crate::web::{AppState, responses::handle_result};

#[derive(Debug, Default, Deserialize)]
pub struct IdentifierParams {
    pub id: Option<String>,
}

/// `GET /api/browse[?id=]`
pub async fn browse(
    State(state): State<AppState>,
    Query(params): Query<IdentifierParams>,
) -> Response {
    if let Some(id) = &params.id {
        debug!("Browse request for {}", UrlUtils::obfuscate_credentials(id));
    }
    let result = state
        .browse
        .browse(params.id.as_deref())
        .await
        .map_err(AppError::from);
    handle_result(result)
}

/// `GET /api/resolve?id=`
pub async fn resolve(
    State(state): State<AppState>,
    Query(params): Query<IdentifierParams>,
) -> Response {
    let identifier = params.id.unwrap_or_default();
    handle_result(state.browse.resolve(&identifier).map_err(AppError::from))
}
