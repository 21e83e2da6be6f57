//! `POST /agent/query` and its SSE variant

use std::convert::Infallible;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Json;
use futures::Stream;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;

use crate::agent::{AgentQuery, AgentReply};
use crate::api::error::ApiError;
use crate::api::types::{ApiResponse, ApiResult};
use crate::core::AppState;

pub async fn query(
    State(state): State<AppState>,
    Json(query): Json<AgentQuery>,
) -> ApiResult<AgentReply> {
    Ok(ApiResponse::ok(state.conversation.ask(&query).await?))
}

pub async fn query_stream(
    State(state): State<AppState>,
    Json(query): Json<AgentQuery>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let events = state.conversation.stream(&query).await?;

    let stream = ReceiverStream::new(events).map(|event| {
        let data = serde_json::to_string(&event).unwrap_or_default();
        Ok::<_, Infallible>(Event::default().data(data))
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
