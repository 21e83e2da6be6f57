//! Bearer token check for the document, filing and search routes

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use sha2::{Digest, Sha256};
use tracing::debug;

use super::error::ApiError;
use crate::core::AppState;

/// Token clients present: the SHA-256 hex digest of the configured secret
pub fn token_digest(secret: &str) -> String {
    hex::encode(Sha256::digest(secret.as_bytes()))
}

pub async fn require_bearer(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .ok_or_else(|| ApiError::Unauthorized("Not authenticated".to_string()))?;

    let Some(secret) = state.api_secret.as_deref() else {
        debug!("Rejecting request: no API secret configured");
        return Err(ApiError::Forbidden("Invalid token".to_string()));
    };

    if token != token_digest(secret) {
        return Err(ApiError::Forbidden("Invalid token".to_string()));
    }

    Ok(next.run(request).await)
}
