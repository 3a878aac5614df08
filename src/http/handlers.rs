use super::state::{AppState, SharedSession};
use crate::session::{
    ReportView, ScoreRecord, SessionController, SessionSnapshot, Tier, Topic, TurnIssue,
    TurnOutcome,
};
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct CreateSessionRequest {
    /// Optional topic (defaults to the configured one)
    pub topic: Option<Topic>,
}

#[derive(Debug, Serialize)]
pub struct CreateSessionResponse {
    pub session_id: Uuid,
    pub snapshot: SessionSnapshot,
}

#[derive(Debug, Deserialize)]
pub struct SelectTopicRequest {
    pub topic: Topic,
}

#[derive(Debug, Serialize)]
pub struct TopicInfo {
    pub id: Topic,
    pub label: &'static str,
}

#[derive(Debug, Serialize)]
pub struct TransitionResponse {
    /// Whether the operation changed anything
    pub changed: bool,
    pub snapshot: SessionSnapshot,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnStatus {
    Completed,
    TranscriptionFailed,
}

#[derive(Debug, Serialize)]
pub struct TurnResponse {
    pub status: TurnStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<ScoreRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<Tier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply: Option<String>,
    /// Base64-encoded WAV of the spoken reply
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_audio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub issues: Vec<TurnIssue>,
    pub snapshot: SessionSnapshot,
}

impl TurnResponse {
    fn new(outcome: TurnOutcome, snapshot: SessionSnapshot) -> Self {
        let issues = outcome.issues();
        match outcome {
            TurnOutcome::Completed(turn) => Self {
                status: TurnStatus::Completed,
                user_text: Some(turn.user_text),
                score: Some(turn.score),
                tier: Some(turn.tier),
                reply: Some(turn.reply),
                reply_audio: turn
                    .reply_audio
                    .map(|audio| base64::engine::general_purpose::STANDARD.encode(audio)),
                reason: None,
                issues,
                snapshot,
            },
            TurnOutcome::TranscriptionFailed { reason } => Self {
                status: TurnStatus::TranscriptionFailed,
                user_text: None,
                score: None,
                tier: None,
                reply: None,
                reply_audio: None,
                reason: Some(reason),
                issues,
                snapshot,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(status: StatusCode, error: String) -> Response {
    (status, Json(ErrorResponse { error })).into_response()
}

async fn find_session(state: &AppState, session_id: Uuid) -> Result<SharedSession, Response> {
    state.session(&session_id).await.ok_or_else(|| {
        warn!("Session {} not found", session_id);
        error_response(
            StatusCode::NOT_FOUND,
            format!("Session {} not found", session_id),
        )
    })
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// GET /topics
pub async fn list_topics() -> impl IntoResponse {
    let topics: Vec<TopicInfo> = Topic::ALL
        .into_iter()
        .map(|topic| TopicInfo {
            id: topic,
            label: topic.label(),
        })
        .collect();
    Json(topics)
}

/// POST /sessions
/// Start a new practice session
pub async fn create_session(
    State(state): State<AppState>,
    body: Option<Json<CreateSessionRequest>>,
) -> impl IntoResponse {
    let req = body.map(|Json(req)| req).unwrap_or_default();
    let mut config = state.defaults.clone();
    if let Some(topic) = req.topic {
        config = config.with_topic(topic);
    }

    let session_id = Uuid::new_v4();
    let controller = SessionController::new(config, state.providers.clone());
    let snapshot = controller.snapshot();

    {
        let mut sessions = state.sessions.write().await;
        sessions.insert(session_id, Arc::new(Mutex::new(controller)));
    }

    info!("Session {} created on topic {}", session_id, snapshot.topic);

    (
        StatusCode::CREATED,
        Json(CreateSessionResponse {
            session_id,
            snapshot,
        }),
    )
}

/// GET /sessions/:session_id
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Response {
    let session = match find_session(&state, session_id).await {
        Ok(session) => session,
        Err(response) => return response,
    };

    let snapshot = session.lock().await.snapshot();
    (StatusCode::OK, Json(snapshot)).into_response()
}

/// DELETE /sessions/:session_id
pub async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Response {
    let removed = {
        let mut sessions = state.sessions.write().await;
        sessions.remove(&session_id)
    };

    match removed {
        Some(_) => {
            info!("Session {} closed", session_id);
            StatusCode::NO_CONTENT.into_response()
        }
        None => error_response(
            StatusCode::NOT_FOUND,
            format!("Session {} not found", session_id),
        ),
    }
}

/// POST /sessions/:session_id/topic
pub async fn select_topic(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(req): Json<SelectTopicRequest>,
) -> Response {
    let session = match find_session(&state, session_id).await {
        Ok(session) => session,
        Err(response) => return response,
    };

    let mut controller = session.lock().await;
    let changed = controller.select_topic(req.topic);
    let snapshot = controller.snapshot();
    (StatusCode::OK, Json(TransitionResponse { changed, snapshot })).into_response()
}

/// POST /sessions/:session_id/reset
pub async fn reset_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Response {
    let session = match find_session(&state, session_id).await {
        Ok(session) => session,
        Err(response) => return response,
    };

    let mut controller = session.lock().await;
    controller.reset();
    let snapshot = controller.snapshot();
    (
        StatusCode::OK,
        Json(TransitionResponse {
            changed: true,
            snapshot,
        }),
    )
        .into_response()
}

/// POST /sessions/:session_id/turns
/// Body is the captured utterance as a WAV file
pub async fn submit_turn(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    body: Bytes,
) -> Response {
    let session = match find_session(&state, session_id).await {
        Ok(session) => session,
        Err(response) => return response,
    };

    // A second capture must not start while one is still being processed
    let Ok(mut controller) = session.try_lock() else {
        warn!("Session {} rejected a turn: one is already in flight", session_id);
        return error_response(
            StatusCode::CONFLICT,
            format!("Session {} is already processing a turn", session_id),
        );
    };

    match controller.process_turn(&body).await {
        Ok(outcome) => {
            let snapshot = controller.snapshot();
            (StatusCode::OK, Json(TurnResponse::new(outcome, snapshot))).into_response()
        }
        Err(e) => error_response(StatusCode::CONFLICT, e.to_string()),
    }
}

/// POST /sessions/:session_id/report/enter
pub async fn enter_report(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Response {
    let session = match find_session(&state, session_id).await {
        Ok(session) => session,
        Err(response) => return response,
    };

    let mut controller = session.lock().await;
    let changed = controller.enter_report_mode();
    let snapshot = controller.snapshot();
    (StatusCode::OK, Json(TransitionResponse { changed, snapshot })).into_response()
}

/// POST /sessions/:session_id/report/exit
pub async fn exit_report(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Response {
    let session = match find_session(&state, session_id).await {
        Ok(session) => session,
        Err(response) => return response,
    };

    let mut controller = session.lock().await;
    let changed = controller.exit_report_mode();
    let snapshot = controller.snapshot();
    (StatusCode::OK, Json(TransitionResponse { changed, snapshot })).into_response()
}

/// GET /sessions/:session_id/report
pub async fn get_report(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Response {
    let session = match find_session(&state, session_id).await {
        Ok(session) => session,
        Err(response) => return response,
    };

    let mut controller = session.lock().await;
    match controller.report().await {
        Ok(view) => (StatusCode::OK, Json::<ReportView>(view)).into_response(),
        Err(e) => error_response(StatusCode::CONFLICT, e.to_string()),
    }
}
