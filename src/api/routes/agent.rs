//! `/data/agent`

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::types::{ApiResponse, ApiResult, Message};
use crate::core::AppState;
use crate::db::repositories::agent::{Agent, AgentUpdate, NewAgent};

#[derive(Debug, Default, Deserialize)]
pub struct AgentListQuery {
    pub workspace_id: Option<String>,
    #[serde(default)]
    pub active_only: bool,
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<AgentListQuery>,
) -> ApiResult<Vec<Agent>> {
    Ok(ApiResponse::ok(
        state
            .agents
            .list(query.workspace_id.as_deref(), query.active_only)
            .await?,
    ))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Agent> {
    let agent = state
        .agents
        .get(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Agent", &id))?;
    Ok(ApiResponse::ok(agent))
}

pub async fn create(State(state): State<AppState>, Json(new): Json<NewAgent>) -> ApiResult<Agent> {
    Ok(ApiResponse::created(state.agents.create(new).await?))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<AgentUpdate>,
) -> ApiResult<Agent> {
    let agent = state
        .agents
        .update(&id, update)
        .await?
        .ok_or_else(|| ApiError::not_found("Agent", &id))?;
    Ok(ApiResponse::ok(agent))
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Message> {
    if !state.agents.delete(&id).await? {
        return Err(ApiError::not_found("Agent", &id));
    }
    Ok(ApiResponse::ok(Message::deleted("Agent", &id)))
}
