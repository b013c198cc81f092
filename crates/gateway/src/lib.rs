//! HTTP chat gateway for LogSeek.
//!
//! Exposes the chat pipeline over REST + SSE:
//! - `GET    /health` — status and version
//! - `POST   /v1/chat` — send a message, receive the answer as an SSE stream
//!   of growing-prefix `chunk` events terminated by a `done` event
//! - `GET    /v1/sessions` — session summaries
//! - `GET    /v1/sessions/{id}/history` — a session's transcript
//! - `DELETE /v1/sessions/{id}` — drop a session
//!
//! Built on Axum. Each UI session owns a bounded transcript; a per-session
//! async mutex serializes appends, which is the serialization the core
//! requires of its caller.

use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    response::sse::{Event as SseEvent, Sse},
    routing::{delete, get, post},
};
use chrono::{DateTime, Utc};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tower_http::cors::CorsLayer;
use tracing::{info, warn};
use uuid::Uuid;

use logseek_agent::QueryOrchestrator;
use logseek_config::AppConfig;
use logseek_core::{EngineError, Transcript, Turn};

/// One UI session: a bounded transcript plus bookkeeping.
struct Session {
    id: Uuid,
    transcript: Transcript,
    created_at: DateTime<Utc>,
    last_message_at: DateTime<Utc>,
    message_count: usize,
}

impl Session {
    fn new(max_turns: usize) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            transcript: Transcript::new(max_turns),
            created_at: now,
            last_message_at: now,
            message_count: 0,
        }
    }
}

/// Shared application state for the gateway.
pub struct GatewayState {
    orchestrator: Arc<QueryOrchestrator>,
    sessions: RwLock<HashMap<Uuid, Arc<Mutex<Session>>>>,
    max_turns: usize,
    max_message_len: usize,
}

impl GatewayState {
    pub fn new(orchestrator: QueryOrchestrator, max_turns: usize, max_message_len: usize) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            sessions: RwLock::new(HashMap::new()),
            max_turns,
            max_message_len,
        }
    }

    /// Fetch the requested session, or create a fresh one (also when the
    /// requested id is unknown — e.g. the session was deleted).
    async fn resolve_session(&self, requested: Option<Uuid>) -> Arc<Mutex<Session>> {
        if let Some(sid) = requested {
            if let Some(session) = self.sessions.read().await.get(&sid) {
                return session.clone();
            }
        }
        let session = Arc::new(Mutex::new(Session::new(self.max_turns)));
        let sid = session.lock().await.id;
        self.sessions.write().await.insert(sid, session.clone());
        session
    }
}

type SharedState = Arc<GatewayState>;

/// Build the Axum router with all gateway routes.
pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/v1/chat", post(chat_handler))
        .route("/v1/sessions", get(list_sessions_handler))
        .route("/v1/sessions/{id}/history", get(history_handler))
        .route("/v1/sessions/{id}", delete(delete_session_handler))
        .layer(DefaultBodyLimit::max(1024 * 1024)) // 1 MB body limit
        .layer(CorsLayer::permissive())
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the gateway HTTP server. Binds per config; a bind failure
/// propagates to the caller, which logs it and exits.
pub async fn start(
    config: &AppConfig,
    orchestrator: QueryOrchestrator,
) -> Result<(), Box<dyn std::error::Error>> {
    let state = Arc::new(GatewayState::new(
        orchestrator,
        config.chat.max_turns,
        config.chat.max_message_len,
    ));
    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    info!(addr = %addr, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Wire types ---

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

#[derive(Deserialize)]
struct ChatRequest {
    message: String,

    #[serde(default)]
    session_id: Option<Uuid>,
}

#[derive(Serialize)]
struct ChunkEvent<'a> {
    content: &'a str,
}

#[derive(Serialize)]
struct DoneEvent {
    session_id: Uuid,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Serialize)]
struct SessionSummary {
    id: Uuid,
    created_at: DateTime<Utc>,
    last_message_at: DateTime<Utc>,
    message_count: usize,
}

#[derive(Serialize)]
struct HistoryResponse {
    session_id: Uuid,
    turns: Vec<Turn>,
}

// --- Handlers ---

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `POST /v1/chat` — run one query and stream the answer.
async fn chat_handler(
    State(state): State<SharedState>,
    Json(payload): Json<ChatRequest>,
) -> Result<
    Sse<impl futures::Stream<Item = Result<SseEvent, Infallible>>>,
    (StatusCode, Json<ErrorResponse>),
> {
    if payload.message.is_empty() {
        return Err(error_response(StatusCode::BAD_REQUEST, "message is empty"));
    }
    if payload.message.len() > state.max_message_len {
        return Err(error_response(
            StatusCode::PAYLOAD_TOO_LARGE,
            format!("message exceeds {} bytes", state.max_message_len),
        ));
    }

    info!(message_len = payload.message.len(), "Chat message received");

    let session = state.resolve_session(payload.session_id).await;
    let mut session = session.lock().await;
    let session_id = session.id;

    session.last_message_at = Utc::now();
    session.message_count += 1;

    let answer_stream = state
        .orchestrator
        .handle(&payload.message, &mut session.transcript)
        .await
        .map_err(|e| {
            warn!(error = %e, "Engine call failed");
            let status = match e {
                EngineError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
                _ => StatusCode::BAD_GATEWAY,
            };
            error_response(status, e.to_string())
        })?;

    // The answer is fully recorded; the lock can go before the paced reveal.
    drop(session);

    let stream = answer_stream
        .map(|prefix| {
            let data = serde_json::to_string(&ChunkEvent { content: &prefix }).unwrap_or_default();
            Ok(SseEvent::default().event("chunk").data(data))
        })
        .chain(futures::stream::once(async move {
            let data = serde_json::to_string(&DoneEvent { session_id }).unwrap_or_default();
            Ok(SseEvent::default().event("done").data(data))
        }));

    Ok(Sse::new(stream))
}

async fn list_sessions_handler(State(state): State<SharedState>) -> Json<Vec<SessionSummary>> {
    let sessions = state.sessions.read().await;
    let mut summaries = Vec::with_capacity(sessions.len());
    for session in sessions.values() {
        let session = session.lock().await;
        summaries.push(SessionSummary {
            id: session.id,
            created_at: session.created_at,
            last_message_at: session.last_message_at,
            message_count: session.message_count,
        });
    }
    summaries.sort_by_key(|s| s.created_at);
    Json(summaries)
}

async fn history_handler(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<HistoryResponse>, (StatusCode, Json<ErrorResponse>)> {
    let sessions = state.sessions.read().await;
    let Some(session) = sessions.get(&id) else {
        return Err(error_response(StatusCode::NOT_FOUND, "session not found"));
    };
    let session = session.lock().await;
    Ok(Json(HistoryResponse {
        session_id: session.id,
        turns: session.transcript.turns().cloned().collect(),
    }))
}

async fn delete_session_handler(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    if state.sessions.write().await.remove(&id).is_some() {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(error_response(StatusCode::NOT_FOUND, "session not found"))
    }
}

fn error_response(
    status: StatusCode,
    message: impl Into<String>,
) -> (StatusCode, Json<ErrorResponse>) {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}
