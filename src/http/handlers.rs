use super::state::AppState;
use crate::error::{ConfigError, InvalidStateError};
use crate::session::{Controls, SessionState};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct InitializeRequest {
    /// Stream destination (falls back to the configured target)
    pub target: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct InitializeResponse {
    pub session_id: Uuid,
    pub state: SessionState,
    pub target: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CommandResponse {
    pub state: SessionState,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub session_id: Uuid,
    pub state: SessionState,
    pub message: String,
    pub target: Option<String>,
    pub controls: Option<Controls>,
    /// `MM:SS` while publishing
    pub elapsed: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(status: StatusCode, error: impl ToString) -> axum::response::Response {
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
        .into_response()
}

fn invalid_state(e: InvalidStateError) -> axum::response::Response {
    warn!("Rejected command: {}", e);
    error_response(StatusCode::CONFLICT, e)
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /session/initialize
/// Bind the session to a stream target
pub async fn initialize(
    State(state): State<AppState>,
    body: Option<Json<InitializeRequest>>,
) -> impl IntoResponse {
    let req = body.map(|Json(req)| req).unwrap_or_default();
    let target = req
        .target
        .or_else(|| state.default_target.clone())
        .unwrap_or_default();

    match state.session.initialize(&target) {
        Ok(session_state) => {
            info!("Session initialized ({})", session_state);
            (
                StatusCode::OK,
                Json(InitializeResponse {
                    session_id: state.session.id(),
                    state: session_state,
                    target: state.session.stream_target().map(|t| t.to_string()),
                }),
            )
                .into_response()
        }
        Err(e @ ConfigError::EmptyTarget) => error_response(StatusCode::BAD_REQUEST, e),
        Err(e @ ConfigError::Capability(_)) => {
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e)
        }
    }
}

/// POST /session/toggle
/// Start publishing if idle, stop if live
pub async fn toggle_publish(State(state): State<AppState>) -> impl IntoResponse {
    match state.session.toggle_publish() {
        Ok(()) => {
            let current = state.session.current_state();
            let message = if current == SessionState::Publishing {
                "Stop requested"
            } else {
                "Start requested"
            };
            (
                StatusCode::ACCEPTED,
                Json(CommandResponse {
                    state: current,
                    message: message.to_string(),
                }),
            )
                .into_response()
        }
        Err(e) => invalid_state(e),
    }
}

/// POST /session/switch-source
/// Flip between front and back capture
pub async fn switch_source(State(state): State<AppState>) -> impl IntoResponse {
    match state.session.switch_capture_source() {
        Ok(()) => (
            StatusCode::ACCEPTED,
            Json(CommandResponse {
                state: state.session.current_state(),
                message: "Capture source switched".to_string(),
            }),
        )
            .into_response(),
        Err(e) => invalid_state(e),
    }
}

/// GET /session/status
pub async fn get_status(State(state): State<AppState>) -> impl IntoResponse {
    let session = &state.session;
    let current = session.current_state();

    (
        StatusCode::OK,
        Json(StatusResponse {
            session_id: session.id(),
            state: current,
            message: current.message().to_string(),
            target: session.stream_target().map(|t| t.to_string()),
            controls: session.controls(),
            elapsed: session.elapsed().map(|e| e.to_string()),
        }),
    )
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
