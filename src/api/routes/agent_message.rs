//! `/data/agent_message`

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::types::{ApiResponse, ApiResult, Message};
use crate::core::AppState;
use crate::db::repositories::agent_message::{
    AgentMessage, AgentMessageUpdate, NewAgentMessage,
};

#[derive(Debug, Default, Deserialize)]
pub struct AgentMessageQuery {
    pub agent_id: Option<String>,
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<AgentMessageQuery>,
) -> ApiResult<Vec<AgentMessage>> {
    Ok(ApiResponse::ok(
        state.agent_messages.list(query.agent_id.as_deref()).await?,
    ))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<AgentMessage> {
    let message = state
        .agent_messages
        .get(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Agent message", &id))?;
    Ok(ApiResponse::ok(message))
}

pub async fn create(
    State(state): State<AppState>,
    Json(new): Json<NewAgentMessage>,
) -> ApiResult<AgentMessage> {
    Ok(ApiResponse::created(state.agent_messages.create(new).await?))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<AgentMessageUpdate>,
) -> ApiResult<AgentMessage> {
    let message = state
        .agent_messages
        .update(&id, update)
        .await?
        .ok_or_else(|| ApiError::not_found("Agent message", &id))?;
    Ok(ApiResponse::ok(message))
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Message> {
    if !state.agent_messages.delete(&id).await? {
        return Err(ApiError::not_found("Agent message", &id));
    }
    Ok(ApiResponse::ok(Message::deleted("Agent message", &id)))
}
