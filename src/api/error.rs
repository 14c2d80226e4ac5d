use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;

use super::ApiResponse;
use crate::services::SearchError;

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),

    ValidationError(String),

    UpstreamError { status: u16, message: String },

    CapabilityUnavailable,

    DatabaseError(String),

    InternalError(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            ApiError::UpstreamError { status, message } => {
                write!(f, "Registry error {}: {}", status, message)
            }
            ApiError::CapabilityUnavailable => {
                write!(f, "Advanced search capability unavailable")
            }
            ApiError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ApiError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::UpstreamError { status, message } => {
                tracing::warn!("Registry API error {}: {}", status, message);
                (
                    StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY),
                    format!("Registry error: {}", message),
                )
            }
            ApiError::CapabilityUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "The advanced search service is currently unavailable".to_string(),
            ),
            ApiError::DatabaseError(msg) => {
                tracing::error!("Database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A database error occurred".to_string(),
                )
            }
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ApiResponse::<()>::error(error_message);
        (status, Json(body)).into_response()
    }
}

impl From<SearchError> for ApiError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::InvalidFilters(msg) => ApiError::ValidationError(msg),
            SearchError::Upstream { status, message } => {
                ApiError::UpstreamError { status, message }
            }
            SearchError::CapabilityUnavailable => ApiError::CapabilityUnavailable,
            SearchError::SnapshotNotFound(token) => {
                ApiError::NotFound(format!("Result set {} not found or expired", token))
            }
            SearchError::Cancelled => ApiError::InternalError("Search cancelled".to_string()),
            SearchError::Snapshot(msg) => ApiError::DatabaseError(msg),
            SearchError::Internal(e) => ApiError::InternalError(e.to_string()),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::InternalError(err.to_string())
    }
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        ApiError::ValidationError(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        ApiError::InternalError(msg.into())
    }
}
