//! HTTP request handlers

use super::assets::{get_index_html, serve_static};
use super::sse::sse_stream;
use super::types::{ChatRequest, ChatResponse, DraftBody, ErrorResponse};
use super::AppState;
use crate::controller::ChatSnapshot;
use crate::persona::Persona;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Root serves the chat page
        .route("/", get(serve_page))
        // Static assets (embedded or filesystem fallback)
        .route("/assets/*path", get(serve_static))
        // Observable state
        .route("/api/state", get(get_state))
        .route("/api/stream", get(stream_state))
        // User actions
        .route("/api/chat", post(send_chat))
        .route("/api/draft", get(get_draft).put(put_draft))
        // Header strings
        .route("/api/persona", get(get_persona))
        .route("/version", get(get_version))
        .with_state(state)
}

// ============================================================
// Page
// ============================================================

async fn serve_page() -> Result<Html<String>, AppError> {
    get_index_html()
        .map(Html)
        .ok_or_else(|| AppError::NotFound("Chat page not bundled".to_string()))
}

// ============================================================
// State
// ============================================================

async fn get_state(State(state): State<AppState>) -> Json<ChatSnapshot> {
    Json(state.controller.observe_state().await)
}

async fn stream_state(State(state): State<AppState>) -> impl IntoResponse {
    let (snapshot, broadcast_rx) = state.controller.observe_and_subscribe().await;
    sse_stream(snapshot, broadcast_rx)
}

// ============================================================
// User Actions
// ============================================================

/// The exchange runs on its own task so a dropped connection cannot
/// abandon it half way. Progress is observed through the stream.
async fn send_chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> (StatusCode, Json<ChatResponse>) {
    let accepted = state.controller.spawn_submit(&req.text).await;
    (StatusCode::ACCEPTED, Json(ChatResponse { accepted }))
}

/// Kept so a reloaded page can restore what was being typed
async fn get_draft(State(state): State<AppState>) -> Json<DraftBody> {
    Json(DraftBody {
        text: state.controller.draft().await,
    })
}

async fn put_draft(State(state): State<AppState>, Json(req): Json<DraftBody>) -> StatusCode {
    state.controller.set_draft(req.text).await;
    StatusCode::NO_CONTENT
}

// ============================================================
// Metadata
// ============================================================

async fn get_persona() -> Json<Persona> {
    Json(Persona::default())
}

async fn get_version() -> &'static str {
    concat!("chat-widget ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Errors
// ============================================================

#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
