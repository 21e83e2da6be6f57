//! `/data/documents`

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::types::{ApiResponse, ApiResult, Message};
use crate::core::AppState;
use crate::db::repositories::document::{Document, DocumentUpdate, NewDocument};

#[derive(Debug, Default, Deserialize)]
pub struct DocumentQuery {
    pub workspace_id: Option<String>,
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<DocumentQuery>,
) -> ApiResult<Vec<Document>> {
    Ok(ApiResponse::ok(
        state.documents.list(query.workspace_id.as_deref()).await?,
    ))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Document> {
    let document = state
        .documents
        .get(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Document", &id))?;
    Ok(ApiResponse::ok(document))
}

pub async fn create(
    State(state): State<AppState>,
    Json(new): Json<NewDocument>,
) -> ApiResult<Document> {
    Ok(ApiResponse::created(state.documents.create(new).await?))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<DocumentUpdate>,
) -> ApiResult<Document> {
    let document = state
        .documents
        .update(&id, update)
        .await?
        .ok_or_else(|| ApiError::not_found("Document", &id))?;
    Ok(ApiResponse::ok(document))
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Message> {
    if !state.documents.delete(&id).await? {
        return Err(ApiError::not_found("Document", &id));
    }
    Ok(ApiResponse::ok(Message::deleted("Document", &id)))
}
