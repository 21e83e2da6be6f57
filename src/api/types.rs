//! Response envelope

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use super::error::ApiError;

/// `{status, response}` body returned by every JSON endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: u16,
    pub response: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(response: T) -> Self {
        Self {
            status: StatusCode::OK.as_u16(),
            response,
        }
    }

    pub fn created(response: T) -> Self {
        Self {
            status: StatusCode::CREATED.as_u16(),
            response,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::OK);
        (status, Json(self)).into_response()
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, ApiError>;

/// Body of delete confirmations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub message: String,
}

impl Message {
    pub fn deleted(kind: &str, id: &str) -> Self {
        Self {
            message: format!("{} '{}' deleted successfully", kind, id),
        }
    }
}
