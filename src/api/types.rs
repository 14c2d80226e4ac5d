use serde::{Deserialize, Serialize};

use crate::models::company::CompanyRecord;
use crate::models::filters::SearchFilters;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub filters: SearchFilters,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub items: Vec<CompanyRecord>,
    pub page: u32,
    pub total: i64,
    /// Set when the scan hit the candidate ceiling; `total` is then a
    /// lower bound, not an exact count.
    pub truncated: bool,
    pub result_token: String,
}

#[derive(Debug, Serialize)]
pub struct SicSuggestion {
    pub code: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
    pub registry_configured: bool,
    pub uptime_seconds: u64,
    pub version: &'static str,
}
