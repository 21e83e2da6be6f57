//! Authenticated document listing and download

use std::path::{Path as FsPath, PathBuf};

use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use tracing::debug;

use crate::api::error::ApiError;
use crate::api::types::{ApiResponse, ApiResult};
use crate::core::AppState;
use crate::db::repositories::document::Document;
use crate::db::repositories::parsed_document::ParsedDocumentFilter;

#[derive(Debug, Deserialize)]
pub struct WorkspaceDocumentsQuery {
    pub workspace_id: String,
}

pub async fn list_workspace_documents(
    State(state): State<AppState>,
    Query(query): Query<WorkspaceDocumentsQuery>,
) -> ApiResult<Vec<Document>> {
    Ok(ApiResponse::ok(
        state.documents.list(Some(&query.workspace_id)).await?,
    ))
}

/// Parsed JSON when a finished parse exists on disk, otherwise the raw file
pub async fn download(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let document = state
        .documents
        .get(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Document", &id))?;

    let parsed = state
        .parsed_documents
        .list(ParsedDocumentFilter {
            documents_id: Some(&document.id),
            ..Default::default()
        })
        .await?;

    let path = parsed
        .iter()
        .filter(|p| p.status)
        .map(|p| PathBuf::from(&p.filepath))
        .find(|p| p.is_file())
        .unwrap_or_else(|| PathBuf::from(&document.file_path));

    if !path.is_file() {
        return Err(ApiError::NotFound(format!(
            "File for document '{}' not found",
            id
        )));
    }

    debug!("Serving {:?} for document {}", path, id);
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|e| ApiError::Internal(e.into()))?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| id.clone());

    Ok((
        [
            (CONTENT_TYPE, content_type(&path).to_string()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file_name),
            ),
        ],
        Body::from(bytes),
    )
        .into_response())
}

fn content_type(path: &FsPath) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "json" => "application/json",
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        "htm" | "html" => "text/html",
        "csv" => "text/csv",
        "xml" => "application/xml",
        "zip" => "application/zip",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_by_extension() {
        assert_eq!(content_type(FsPath::new("a/10-K_x_full-submission.txt")), "text/plain");
        assert_eq!(content_type(FsPath::new("report.PDF")), "application/pdf");
        assert_eq!(content_type(FsPath::new("parsed.json")), "application/json");
        assert_eq!(content_type(FsPath::new("README")), "application/octet-stream");
    }
}
