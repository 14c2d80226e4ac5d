use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::{ApiResponse, AppState, SicSuggestion};
use crate::sic;

#[derive(Debug, Deserialize)]
pub struct SuggestQuery {
    pub q: Option<String>,
}

pub async fn suggest_codes(
    State(_state): State<Arc<AppState>>,
    Query(query): Query<SuggestQuery>,
) -> Json<ApiResponse<Vec<SicSuggestion>>> {
    let suggestions = query
        .q
        .as_deref()
        .map(sic::suggest)
        .unwrap_or_default()
        .into_iter()
        .map(|entry| SicSuggestion {
            code: entry.code,
            description: entry.description,
        })
        .collect();

    Json(ApiResponse::success(suggestions))
}
