//! Router assembly and server loop

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::auth::require_bearer;
use super::routes::{
    activity, agent, agent_message, agent_query, create_workspace, documents, files, filings,
    health, parsed_documents, search, workspace,
};
use crate::core::AppState;

/// Uploads may be whole filing archives
const UPLOAD_LIMIT: usize = 512 * 1024 * 1024;

pub fn router(state: AppState) -> Router {
    let data = Router::new()
        .route("/workspace", get(workspace::list).post(workspace::create))
        .route(
            "/workspace/:id",
            get(workspace::get)
                .put(workspace::update)
                .delete(workspace::delete),
        )
        .route("/documents", get(documents::list).post(documents::create))
        .route(
            "/documents/:id",
            get(documents::get)
                .put(documents::update)
                .delete(documents::delete),
        )
        .route(
            "/parsed_documents",
            get(parsed_documents::list).post(parsed_documents::create),
        )
        .route(
            "/parsed_documents/:id",
            get(parsed_documents::get)
                .put(parsed_documents::update)
                .delete(parsed_documents::delete),
        )
        .route("/activity", get(activity::list).post(activity::create))
        .route(
            "/activity/:id",
            get(activity::get)
                .put(activity::update)
                .delete(activity::delete),
        )
        .route("/agent", get(agent::list).post(agent::create))
        .route(
            "/agent/:id",
            get(agent::get).put(agent::update).delete(agent::delete),
        )
        .route(
            "/agent_message",
            get(agent_message::list).post(agent_message::create),
        )
        .route(
            "/agent_message/:id",
            get(agent_message::get)
                .put(agent_message::update)
                .delete(agent_message::delete),
        );

    let protected = Router::new()
        .route("/documents", get(files::list_workspace_documents))
        .route("/documents/:id/download", get(files::download))
        .route("/filings", get(filings::get_filings))
        .route("/search_listed", get(search::search_listed))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_bearer));

    Router::new()
        .nest("/data", data)
        .merge(protected)
        .route(
            "/create_workspace",
            post(create_workspace::create_workspace).layer(DefaultBodyLimit::max(UPLOAD_LIMIT)),
        )
        .route("/agent/query", post(agent_query::query))
        .route("/agent/query/stream", post(agent_query::query_stream))
        .route("/health", get(health::health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind and serve until the process is stopped
pub async fn serve(state: AppState, host: &str, port: u16) -> anyhow::Result<()> {
    let app = router(state);
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on http://{}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}
