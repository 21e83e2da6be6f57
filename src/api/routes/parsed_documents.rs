//! `/data/parsed_documents`

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::types::{ApiResponse, ApiResult, Message};
use crate::core::AppState;
use crate::db::repositories::parsed_document::{
    NewParsedDocument, ParsedDocument, ParsedDocumentFilter, ParsedDocumentUpdate,
};

#[derive(Debug, Default, Deserialize)]
pub struct ParsedDocumentQuery {
    pub workspace_id: Option<String>,
    pub documents_id: Option<String>,
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ParsedDocumentQuery>,
) -> ApiResult<Vec<ParsedDocument>> {
    let filter = ParsedDocumentFilter {
        workspace_id: query.workspace_id.as_deref(),
        documents_id: query.documents_id.as_deref(),
    };
    Ok(ApiResponse::ok(state.parsed_documents.list(filter).await?))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<ParsedDocument> {
    let parsed = state
        .parsed_documents
        .get(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Parsed document", &id))?;
    Ok(ApiResponse::ok(parsed))
}

pub async fn create(
    State(state): State<AppState>,
    Json(new): Json<NewParsedDocument>,
) -> ApiResult<ParsedDocument> {
    Ok(ApiResponse::created(state.parsed_documents.create(new).await?))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<ParsedDocumentUpdate>,
) -> ApiResult<ParsedDocument> {
    let parsed = state
        .parsed_documents
        .update(&id, update)
        .await?
        .ok_or_else(|| ApiError::not_found("Parsed document", &id))?;
    Ok(ApiResponse::ok(parsed))
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Message> {
    if !state.parsed_documents.delete(&id).await? {
        return Err(ApiError::not_found("Parsed document", &id));
    }
    Ok(ApiResponse::ok(Message::deleted("Parsed document", &id)))
}
