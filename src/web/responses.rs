//! HTTP response types and utilities
//!
//! Every endpoint answers with the same [`ApiResponse`] envelope. Internal
//! error detail is logged here and replaced by a fixed message before it
//! leaves the process.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::errors::{AppError, AppResult, BrowseError};

/// Standard API response wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the operation was successful
    pub success: bool,
    /// Response data (present on success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Error message (present on failure)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl<T> ApiResponse<T>
where
    T: Serialize,
{
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            timestamp: chrono::Utc::now(),
        }
    }
}

impl ApiResponse<()> {
    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
            timestamp: chrono::Utc::now(),
        }
    }
}

impl<T> IntoResponse for ApiResponse<T>
where
    T: Serialize,
{
    fn into_response(self) -> Response {
        let status = if self.success {
            StatusCode::OK
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };

        (status, Json(self)).into_response()
    }
}

/// Convert an `AppResult` into an HTTP response
pub fn handle_result<T>(result: AppResult<T>) -> Response
where
    T: Serialize,
{
    match result {
        Ok(data) => ok(data).into_response(),
        Err(error) => handle_error(error),
    }
}

/// Status code and client-facing message for an error
pub fn error_status(error: &AppError) -> (StatusCode, String) {
    match error {
        AppError::Browse(browse) => {
            let status = match browse {
                BrowseError::SourceNotFound { .. } => StatusCode::NOT_FOUND,
                BrowseError::Unresolvable { .. } => StatusCode::BAD_REQUEST,
                BrowseError::Unavailable { .. } => StatusCode::BAD_GATEWAY,
            };
            (status, browse.to_string())
        }
        AppError::Fetch(_) | AppError::Http(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "External service communication failed".to_string(),
        ),
        AppError::ExternalService { service, message } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("External service error ({service}): {message}"),
        ),
        AppError::Config(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Configuration error".to_string(),
        ),
    }
}

/// Convert an `AppError` into an HTTP response
pub fn handle_error(error: AppError) -> Response {
    let (status, message) = error_status(&error);
    if status.is_server_error() {
        error!("Request failed: {}", error);
    }
    (status, Json(ApiResponse::error(message))).into_response()
}

pub fn ok<T: Serialize>(data: T) -> impl IntoResponse {
    (StatusCode::OK, Json(ApiResponse::success(data)))
}
