//! Health check handler

use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};

use crate::web::responses::ok;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Liveness probe; touches no upstream
pub async fn health_check() -> impl IntoResponse {
    ok(HealthResponse::healthy())
}
