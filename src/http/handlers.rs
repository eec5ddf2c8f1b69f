use super::state::AppState;
use crate::error::RelayError;
use crate::relay::HistoryTurn;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use tracing::error;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub prompt: String,

    /// Prior turns, oldest first. Lenient: non-conforming entries are
    /// dropped by the relay rather than rejected.
    #[serde(default)]
    pub history: Vec<HistoryTurn>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/chat
/// Forward a prompt plus prior turns to the completion API
pub async fn chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> impl IntoResponse {
    match state.relay.get_reply(&req.prompt, &req.history).await {
        Ok(reply) => (StatusCode::OK, Json(ChatResponse { reply })).into_response(),
        Err(e) => {
            error!("Chat request failed: {}", e);
            (
                error_status(&e),
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// GET /health
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// Map relay errors onto response statuses: an empty prompt is the
/// caller's fault, a missing credential is a server configuration problem,
/// everything else is upstream trouble.
fn error_status(error: &RelayError) -> StatusCode {
    match error {
        RelayError::EmptyPrompt => StatusCode::BAD_REQUEST,
        RelayError::Unconfigured => StatusCode::INTERNAL_SERVER_ERROR,
        RelayError::Network(_) | RelayError::InvalidResponse(_) | RelayError::Upstream { .. } => {
            StatusCode::BAD_GATEWAY
        }
    }
}
