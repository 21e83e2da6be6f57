//! API error type, rendered inside the response envelope

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use super::types::ApiResponse;
use crate::agent::AgentNotFound;
use crate::core::UnsafePathComponent;
use crate::db::repositories::workspace::{DuplicateWorkspaceId, InvalidWorkspaceId};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0:#}")]
    Internal(anyhow::Error),
}

impl ApiError {
    pub fn not_found(kind: &str, id: &str) -> Self {
        ApiError::NotFound(format!("{} with ID '{}' not found", kind, id))
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        if let Some(dup) = err.downcast_ref::<DuplicateWorkspaceId>() {
            return ApiError::BadRequest(dup.to_string());
        }
        if let Some(invalid) = err.downcast_ref::<InvalidWorkspaceId>() {
            return ApiError::BadRequest(invalid.to_string());
        }
        if let Some(unsafe_name) = err.downcast_ref::<UnsafePathComponent>() {
            return ApiError::BadRequest(unsafe_name.to_string());
        }
        if let Some(missing) = err.downcast_ref::<AgentNotFound>() {
            return ApiError::NotFound(missing.to_string());
        }
        ApiError::Internal(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if let ApiError::Internal(err) = &self {
            error!("Request failed: {:#}", err);
        }
        let body = ApiResponse {
            status: status.as_u16(),
            response: json!({ "error": self.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_workspace_maps_to_bad_request() {
        let err: ApiError = anyhow::Error::from(DuplicateWorkspaceId("abc".into())).into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Workspace with ID 'abc' already exists");
    }

    #[test]
    fn malformed_workspace_ids_map_to_bad_request() {
        let err: ApiError = anyhow::Error::from(InvalidWorkspaceId("../x".into())).into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let err: ApiError = anyhow::Error::from(UnsafePathComponent("..".into()))
            .context("Failed to prepare query")
            .into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn missing_agent_maps_to_not_found() {
        let err: ApiError = anyhow::Error::from(AgentNotFound("a1".into())).into();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn other_errors_are_internal() {
        let err: ApiError = anyhow::anyhow!("disk full").into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
