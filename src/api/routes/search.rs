//! `GET /search_listed`

use axum::extract::{Query, State};
use serde::Deserialize;

use crate::api::types::{ApiResponse, ApiResult};
use crate::core::AppState;
use crate::search::ListedSymbol;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub query: String,
    #[serde(default)]
    pub etf: bool,
}

pub async fn search_listed(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Vec<ListedSymbol>> {
    Ok(ApiResponse::ok(state.listed.search(&query.query, query.etf)))
}
