//! `/data/activity`

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::types::{ApiResponse, ApiResult, Message};
use crate::core::AppState;
use crate::db::repositories::activity::{Activity, ActivityUpdate, NewActivity};

#[derive(Debug, Default, Deserialize)]
pub struct ActivityQuery {
    pub workspace_id: Option<String>,
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ActivityQuery>,
) -> ApiResult<Vec<Activity>> {
    Ok(ApiResponse::ok(
        state.activities.list(query.workspace_id.as_deref()).await?,
    ))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Activity> {
    let activity = state
        .activities
        .get(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Activity", &id))?;
    Ok(ApiResponse::ok(activity))
}

pub async fn create(
    State(state): State<AppState>,
    Json(new): Json<NewActivity>,
) -> ApiResult<Activity> {
    Ok(ApiResponse::created(state.activities.create(new).await?))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<ActivityUpdate>,
) -> ApiResult<Activity> {
    let activity = state
        .activities
        .update(&id, update)
        .await?
        .ok_or_else(|| ApiError::not_found("Activity", &id))?;
    Ok(ApiResponse::ok(activity))
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Message> {
    if !state.activities.delete(&id).await? {
        return Err(ApiError::not_found("Activity", &id));
    }
    Ok(ApiResponse::ok(Message::deleted("Activity", &id)))
}
