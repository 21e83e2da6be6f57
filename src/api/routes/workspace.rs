//! `/data/workspace`

use axum::extract::{Path, State};
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::{ApiResponse, ApiResult, Message};
use crate::core::AppState;
use crate::db::repositories::workspace::{NewWorkspace, Workspace, WorkspaceUpdate};

pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Workspace>> {
    Ok(ApiResponse::ok(state.workspaces.list().await?))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Workspace> {
    let workspace = state
        .workspaces
        .get(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Workspace", &id))?;
    Ok(ApiResponse::ok(workspace))
}

pub async fn create(
    State(state): State<AppState>,
    Json(new): Json<NewWorkspace>,
) -> ApiResult<Workspace> {
    let workspace = state.workspaces.create(new).await?;
    state.layout.create_workspace_dir(&workspace.id)?;
    Ok(ApiResponse::created(workspace))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<WorkspaceUpdate>,
) -> ApiResult<Workspace> {
    let workspace = state
        .workspaces
        .update(&id, update)
        .await?
        .ok_or_else(|| ApiError::not_found("Workspace", &id))?;
    Ok(ApiResponse::ok(workspace))
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Message> {
    if !state.orchestrator.delete(&id).await? {
        return Err(ApiError::not_found("Workspace", &id));
    }
    Ok(ApiResponse::ok(Message::deleted("Workspace", &id)))
}
