//! HTTP request handlers

use super::assets::get_index_html;
use super::types::{DefaultsResponse, ErrorResponse, TurnRequest};
use super::AppState;
use crate::conversation::{ChatOutcome, ConversationError, SamplingParams, MAX_TURNS_RANGE};
use crate::gateway::GatewayErrorKind;
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
        .route("/", get(serve_index))
        .route("/api/defaults", get(get_defaults))
        .route("/api/chat", post(send_chat))
        .route("/api/regenerate", post(regenerate))
        .route("/api/clear", post(clear_history))
        .route("/version", get(get_version))
        .with_state(state)
}

async fn serve_index() -> impl IntoResponse {
    match get_index_html() {
        Some(content) => Html(content).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Html("<h1>404 - chat page not found</h1>".to_string()),
        )
            .into_response(),
    }
}

async fn get_defaults(State(state): State<AppState>) -> Json<DefaultsResponse> {
    let gateway = state.controller.gateway();
    Json(DefaultsResponse {
        params: SamplingParams::default(),
        max_turns_range: [MAX_TURNS_RANGE.0, MAX_TURNS_RANGE.1],
        backend: gateway.backend_id().to_string(),
        requires_api_key: gateway.requires_api_key(),
    })
}

// ============================================================
// Conversation actions
// ============================================================

async fn send_chat(
    State(state): State<AppState>,
    Json(req): Json<TurnRequest>,
) -> Result<Json<ChatOutcome>, AppError> {
    let outcome = state
        .controller
        .send(&req.input, req.history, &req.params, req.api_key.as_deref())
        .await?;
    Ok(Json(outcome))
}

async fn regenerate(
    State(state): State<AppState>,
    Json(req): Json<TurnRequest>,
) -> Result<Json<ChatOutcome>, AppError> {
    let outcome = state
        .controller
        .regenerate(&req.input, req.history, &req.params, req.api_key.as_deref())
        .await?;
    Ok(Json(outcome))
}

async fn clear_history(State(state): State<AppState>) -> Json<ChatOutcome> {
    Json(state.controller.clear())
}

async fn get_version() -> &'static str {
    concat!("yuan-chat ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    BadRequest(String),
    Unauthorized(String),
    BadGateway(String),
}

impl From<ConversationError> for AppError {
    fn from(err: ConversationError) -> Self {
        match err {
            ConversationError::InvalidParams(e) => AppError::BadRequest(e.to_string()),
            ConversationError::Backend(e) if e.kind == GatewayErrorKind::Auth => {
                AppError::Unauthorized(e.message)
            }
            ConversationError::Backend(e) => AppError::BadGateway(e.message),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
