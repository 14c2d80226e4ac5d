use axum::{Json, extract::State};
use std::sync::Arc;
use tracing::debug;

use super::{ApiError, ApiResponse, AppState, SearchRequest, SearchResponse, validation};
use crate::services::CancelToken;

pub async fn search_companies(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<ApiResponse<SearchResponse>>, ApiError> {
    let page = request.page.unwrap_or(1);
    let page_size = request.page_size.unwrap_or(50);

    validation::validate_pagination(page, page_size)?;
    validation::validate_search_filters(&request.filters)?;

    // Progress from slow multi-thousand-record scans surfaces in the logs;
    // dropping the request future cancels the scan between batches.
    let progress = |processed: usize, total: usize| {
        debug!("Scan progress: {}/{}", processed, total);
    };
    let cancel = CancelToken::new();

    let outcome = state
        .search_service()
        .resolve(&request.filters, page, page_size, Some(&progress), &cancel)
        .await?;

    Ok(Json(ApiResponse::success(SearchResponse {
        items: outcome.items,
        page,
        total: outcome.total,
        truncated: outcome.truncated,
        result_token: outcome.token,
    })))
}
