//! Axum routes for the search API.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::{
    ACCEPT, ACCEPT_ENCODING, AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE, HeaderName,
};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::orchestrator::{QueryOrchestrator, SearchOutcome};

/// Shared state handed to every request.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<QueryOrchestrator>,
}

impl AppState {
    pub fn new(orchestrator: Arc<QueryOrchestrator>) -> Self {
        Self { orchestrator }
    }
}

impl IntoResponse for SearchOutcome {
    fn into_response(self) -> Response {
        let content_type = if self.is_json() {
            "application/json"
        } else {
            "text/plain; charset=utf-8"
        };
        (self.status, [(CONTENT_TYPE, content_type)], self.body).into_response()
    }
}

/// Builds the application router with CORS and request tracing.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/search-query", post(search_query))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::POST,
            Method::GET,
            Method::OPTIONS,
            Method::PUT,
            Method::DELETE,
        ])
        .allow_headers([
            ACCEPT,
            CONTENT_TYPE,
            CONTENT_LENGTH,
            ACCEPT_ENCODING,
            HeaderName::from_static("x-csrf-token"),
            AUTHORIZATION,
        ])
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Runs the orchestrator on the blocking pool; the model call blocks.
async fn search_query(State(state): State<AppState>, body: Bytes) -> Response {
    let orchestrator = Arc::clone(&state.orchestrator);

    match tokio::task::spawn_blocking(move || orchestrator.handle(&body)).await {
        Ok(outcome) => outcome.into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Search worker failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
        }
    }
}
