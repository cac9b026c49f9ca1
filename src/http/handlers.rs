use super::state::AppState;
use crate::capture::Recording;
use crate::dialogue::ConversationTurn;
use crate::error::{TranscribeError, TurnError};
use crate::session::{InterviewConfig, InterviewSession, SessionStats};
use crate::transcribe::sniff_mime_type;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct StartInterviewRequest {
    /// Optional session ID (if not provided, generate UUID)
    pub session_id: Option<String>,

    /// Position being interviewed for
    pub role: Option<String>,

    /// Technical domain of the interview
    pub domain: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StartInterviewResponse {
    pub session_id: String,
    pub status: String,
    pub greeting: String,
}

#[derive(Debug, Deserialize)]
pub struct TextAnswerRequest {
    pub transcript: String,
}

#[derive(Debug, Deserialize)]
pub struct AudioAnswerRequest {
    /// Base64-encoded audio payload
    pub audio_base64: String,

    /// MIME type, sniffed from the payload when absent
    pub mime_type: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EndInterviewResponse {
    pub session_id: String,
    pub status: String,
    pub stats: SessionStats,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(status: StatusCode, error: String) -> axum::response::Response {
    (status, Json(ErrorResponse { error })).into_response()
}

/// Map session-level failures onto HTTP statuses
fn answer_error(e: anyhow::Error) -> axum::response::Response {
    if let Some(turn) = e.downcast_ref::<TurnError>() {
        let status = match turn {
            TurnError::EmptyAnswer => StatusCode::BAD_REQUEST,
            TurnError::NotAwaiting { .. } | TurnError::AlreadyComplete => StatusCode::CONFLICT,
        };
        return error_response(status, turn.to_string());
    }

    if let Some(transcribe) = e.downcast_ref::<TranscribeError>() {
        let status = match transcribe {
            TranscribeError::AudioTooShort(_) | TranscribeError::AudioTooLarge { .. } => {
                StatusCode::BAD_REQUEST
            }
            TranscribeError::EmptyTranscription => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::BAD_GATEWAY,
        };
        return error_response(status, transcribe.to_string());
    }

    error!("Answer processing failed: {:#}", e);
    error_response(StatusCode::INTERNAL_SERVER_ERROR, format!("{:#}", e))
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /interviews/start
/// Create a new interview session and speak the greeting
pub async fn start_interview(
    State(state): State<AppState>,
    Json(req): Json<StartInterviewRequest>,
) -> impl IntoResponse {
    let session_id = req
        .session_id
        .unwrap_or_else(|| format!("interview-{}", uuid::Uuid::new_v4()));

    info!("Starting interview session: {}", session_id);

    {
        let sessions = state.sessions.read().await;
        if sessions.contains_key(&session_id) {
            return error_response(
                StatusCode::CONFLICT,
                format!("Interview {} already exists", session_id),
            );
        }
    }

    let config = InterviewConfig {
        session_id: session_id.clone(),
        role: req.role.unwrap_or_else(|| "Software Engineer".to_string()),
        domain: req.domain.unwrap_or_else(|| "General".to_string()),
    };

    let session = Arc::new(InterviewSession::new(
        config,
        Arc::clone(&state.dialogue),
        Arc::clone(&state.transcriber),
        Arc::clone(&state.speech),
        state.termination(),
    ));

    let greeting = match session.start().await {
        Ok(greeting) => greeting,
        Err(e) => {
            error!("Failed to start interview: {:#}", e);
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to start interview: {:#}", e),
            );
        }
    };

    {
        let mut sessions = state.sessions.write().await;
        sessions.insert(session_id.clone(), session);
    }

    info!("Interview started: {}", session_id);

    (
        StatusCode::OK,
        Json(StartInterviewResponse {
            session_id,
            status: "started".to_string(),
            greeting,
        }),
    )
        .into_response()
}

/// POST /interviews/:session_id/answer
/// Submit a text answer and advance the interview by one turn
pub async fn submit_text_answer(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(req): Json<TextAnswerRequest>,
) -> impl IntoResponse {
    let session = {
        let sessions = state.sessions.read().await;
        sessions.get(&session_id).cloned()
    };

    let Some(session) = session else {
        return error_response(
            StatusCode::NOT_FOUND,
            format!("Interview {} not found", session_id),
        );
    };

    match session.submit_text(&req.transcript).await {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(e) => answer_error(e),
    }
}

/// POST /interviews/:session_id/answer/audio
/// Submit a recorded audio answer: decode, transcribe, advance the turn
pub async fn submit_audio_answer(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(req): Json<AudioAnswerRequest>,
) -> impl IntoResponse {
    let session = {
        let sessions = state.sessions.read().await;
        sessions.get(&session_id).cloned()
    };

    let Some(session) = session else {
        return error_response(
            StatusCode::NOT_FOUND,
            format!("Interview {} not found", session_id),
        );
    };

    let bytes = match base64::engine::general_purpose::STANDARD.decode(&req.audio_base64) {
        Ok(bytes) => bytes,
        Err(e) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                format!("Invalid base64 audio payload: {}", e),
            );
        }
    };

    let mime_type = req
        .mime_type
        .unwrap_or_else(|| sniff_mime_type(&bytes).to_string());

    let recording = Recording {
        bytes,
        mime_type,
        duration_secs: 0.0,
        sample_rate: 0,
        channels: 0,
    };

    match session.submit_audio(&recording).await {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(e) => answer_error(e),
    }
}

/// POST /interviews/:session_id/end
/// Close a session and remove it from the registry
pub async fn end_interview(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    info!("Ending interview session: {}", session_id);

    let session = {
        let mut sessions = state.sessions.write().await;
        sessions.remove(&session_id)
    };

    match session {
        Some(session) => {
            session.close().await;
            let stats = session.stats().await;
            (
                StatusCode::OK,
                Json(EndInterviewResponse {
                    session_id,
                    status: "ended".to_string(),
                    stats,
                }),
            )
                .into_response()
        }
        None => error_response(
            StatusCode::NOT_FOUND,
            format!("Interview {} not found", session_id),
        ),
    }
}

/// GET /interviews/:session_id/status
/// Get status of an interview session
pub async fn get_interview_status(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    let sessions = state.sessions.read().await;

    match sessions.get(&session_id) {
        Some(session) => {
            let stats = session.stats().await;
            (StatusCode::OK, Json(stats)).into_response()
        }
        None => error_response(
            StatusCode::NOT_FOUND,
            format!("Interview {} not found", session_id),
        ),
    }
}

/// GET /interviews/:session_id/transcript
/// Get the ordered conversation log accumulated so far
pub async fn get_interview_transcript(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    let sessions = state.sessions.read().await;

    match sessions.get(&session_id) {
        Some(session) => {
            let transcript: Vec<ConversationTurn> = session.transcript().await;
            (StatusCode::OK, Json(transcript)).into_response()
        }
        None => error_response(
            StatusCode::NOT_FOUND,
            format!("Interview {} not found", session_id),
        ),
    }
}

/// GET /interviews/:session_id/feedback
/// Get the comprehensive assessment, once the interview is complete
pub async fn get_interview_feedback(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    let sessions = state.sessions.read().await;

    match sessions.get(&session_id) {
        Some(session) => match session.final_feedback().await {
            Some(feedback) => (StatusCode::OK, Json(feedback)).into_response(),
            None => error_response(
                StatusCode::NOT_FOUND,
                format!("Interview {} has no final feedback yet", session_id),
            ),
        },
        None => error_response(
            StatusCode::NOT_FOUND,
            format!("Interview {} not found", session_id),
        ),
    }
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
