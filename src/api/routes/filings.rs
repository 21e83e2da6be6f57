//! `GET /filings`

use axum::extract::{Query, State};
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::types::{ApiResponse, ApiResult};
use crate::core::AppState;
use crate::filings::archive::{download_to_archive, ArchiveSummary};
use crate::filings::Interval;

#[derive(Debug, Deserialize)]
pub struct FilingsQuery {
    pub tick: String,
    #[serde(default = "default_interval")]
    pub inter: String,
}

fn default_interval() -> String {
    Interval::Quarterly.as_str().to_string()
}

pub async fn get_filings(
    State(state): State<AppState>,
    Query(query): Query<FilingsQuery>,
) -> ApiResult<ArchiveSummary> {
    let interval =
        Interval::from_str(&query.inter).map_err(|e| ApiError::BadRequest(e.to_string()))?;
    if query.tick.trim().is_empty() {
        return Err(ApiError::BadRequest("Ticker is required".to_string()));
    }

    let summary = download_to_archive(
        state.downloader.as_ref(),
        state.layout.data_root(),
        query.tick.trim(),
        interval,
    )
    .await?;
    Ok(ApiResponse::ok(summary))
}
