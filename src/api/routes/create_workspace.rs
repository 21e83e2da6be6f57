//! `POST /create_workspace`

use axum::extract::{Multipart, State};

use crate::api::error::ApiError;
use crate::api::types::{ApiResponse, ApiResult};
use crate::core::AppState;
use crate::pipeline::{CreateWorkspaceRequest, CreatedWorkspace, Upload};

/// Multipart fields: optional `workspace_id`, `ticker` and `file`
pub async fn create_workspace(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<CreatedWorkspace> {
    let request = read_form(multipart).await?;
    let created = state.orchestrator.create(request).await?;
    Ok(ApiResponse::created(created))
}

async fn read_form(mut multipart: Multipart) -> Result<CreateWorkspaceRequest, ApiError> {
    let mut request = CreateWorkspaceRequest::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Multipart read error: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "workspace_id" | "ticker" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Invalid {} field: {}", name, e)))?;
                let value = Some(value).filter(|v| !v.trim().is_empty());
                if name == "workspace_id" {
                    request.workspace_id = value;
                } else {
                    request.ticker = value;
                }
            }
            "file" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {}", e)))?;
                if !file_name.is_empty() {
                    request.upload = Some(Upload::new(file_name, bytes.to_vec()));
                }
            }
            _ => {}
        }
    }

    Ok(request)
}
