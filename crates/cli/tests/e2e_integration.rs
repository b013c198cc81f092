//! End-to-end integration tests for the LogSeek chat pipeline.
//!
//! These tests exercise the full path from an incoming query to the revealed
//! answer: persona routing, engine fallback, safety screening, transcript
//! recording, and the SSE surface of the gateway.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use futures::StreamExt;
use http_body_util::BodyExt;
use tower::ServiceExt;

use logseek_agent::QueryOrchestrator;
use logseek_core::{DenyListFilter, EngineError, Persona, QueryEngine, Transcript};
use logseek_gateway::{GatewayState, build_router};

// ── Scripted engine ──────────────────────────────────────────────────────

/// An engine that returns a scripted reply and records every question.
struct ScriptedEngine {
    reply: Result<String, EngineError>,
    questions: Mutex<Vec<String>>,
}

impl ScriptedEngine {
    fn answering(text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(text.into()),
            questions: Mutex::new(Vec::new()),
        })
    }

    fn failing(error: EngineError) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(error),
            questions: Mutex::new(Vec::new()),
        })
    }

    fn questions(&self) -> Vec<String> {
        self.questions.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl QueryEngine for ScriptedEngine {
    fn name(&self) -> &str {
        "e2e_mock"
    }

    async fn answer(&self, question: &str) -> Result<String, EngineError> {
        self.questions.lock().unwrap().push(question.to_string());
        self.reply.clone()
    }
}

fn orchestrator(engine: Arc<ScriptedEngine>, pacing: Duration) -> QueryOrchestrator {
    QueryOrchestrator::new(Persona::default(), engine).with_pacing(pacing)
}

fn app(engine: Arc<ScriptedEngine>) -> axum::Router {
    let orch = orchestrator(engine, Duration::ZERO);
    build_router(Arc::new(GatewayState::new(orch, 64, 2000)))
}

fn chat_request(body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/v1/chat")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn sse_chunks(response: axum::response::Response) -> Vec<String> {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let text = String::from_utf8_lossy(&bytes);
    let mut chunks = Vec::new();
    for block in text.split("\n\n") {
        if !block.contains("event: chunk") {
            continue;
        }
        for line in block.lines() {
            if let Some(data) = line.strip_prefix("data: ") {
                let value: serde_json::Value = serde_json::from_str(data).unwrap();
                chunks.push(value["content"].as_str().unwrap().to_string());
            }
        }
    }
    chunks
}

// ── E2E: greeting short-circuit ──────────────────────────────────────────

#[tokio::test]
async fn e2e_greeting_streams_word_by_word_without_engine() {
    let engine = ScriptedEngine::answering("unused");
    let response = app(engine.clone())
        .oneshot(chat_request(serde_json::json!({ "message": "Hello" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let chunks = sse_chunks(response).await;
    assert!(engine.questions().is_empty(), "greeting must not hit the engine");

    // Each chunk grows the previous one by exactly one word
    assert_eq!(chunks[0], " Hello!");
    assert_eq!(chunks[1], " Hello! I");
    for pair in chunks.windows(2) {
        assert!(pair[1].starts_with(pair[0].as_str()));
        assert_eq!(
            pair[1].split_whitespace().count(),
            pair[0].split_whitespace().count() + 1
        );
    }

    let full = chunks.last().unwrap();
    assert!(full.contains("LogSeek"));
    assert!(full.contains("your personal log assistant bot"));
}

// ── E2E: engine fallback ─────────────────────────────────────────────────

#[tokio::test]
async fn e2e_unmatched_query_reaches_engine_and_streams_unchanged() {
    let engine = ScriptedEngine::answering("Average latency is 42ms across 3 regions.");
    let response = app(engine.clone())
        .oneshot(chat_request(serde_json::json!({
            "message": "what is the average latency by region?"
        })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let chunks = sse_chunks(response).await;
    assert_eq!(
        engine.questions(),
        vec!["what is the average latency by region?"]
    );
    assert_eq!(
        chunks.last().unwrap(),
        " Average latency is 42ms across 3 regions."
    );
}

#[tokio::test]
async fn e2e_engine_failure_surfaces_before_the_stream() {
    let engine = ScriptedEngine::failing(EngineError::Unavailable("boom".into()));
    let response = app(engine)
        .oneshot(chat_request(serde_json::json!({ "message": "unmatched" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

// ── E2E: log-metadata substring trigger ──────────────────────────────────

#[tokio::test]
async fn e2e_log_meta_trigger_inside_longer_query_short_circuits() {
    let engine = ScriptedEngine::answering("unused");
    let response = app(engine.clone())
        .oneshot(chat_request(serde_json::json!({
            "message": "please tell me what is the total number of log entries in the dataset? thanks"
        })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let chunks = sse_chunks(response).await;
    assert!(engine.questions().is_empty());
    assert!(
        chunks
            .last()
            .unwrap()
            .contains("log entries and their distribution")
    );
}

// ── E2E: multi-turn session ──────────────────────────────────────────────

#[tokio::test]
async fn e2e_session_accumulates_history_across_turns() {
    let engine = ScriptedEngine::answering("There are 7 entries.");
    let orch = orchestrator(engine, Duration::ZERO);
    let state = Arc::new(GatewayState::new(orch, 64, 2000));
    let app = build_router(state);

    let response = app
        .clone()
        .oneshot(chat_request(serde_json::json!({ "message": "hello" })))
        .await
        .unwrap();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = String::from_utf8_lossy(&bytes);
    let done_data = body
        .split("\n\n")
        .find(|block| block.contains("event: done"))
        .and_then(|block| block.lines().find_map(|l| l.strip_prefix("data: ")))
        .unwrap();
    let done: serde_json::Value = serde_json::from_str(done_data).unwrap();
    let sid = done["session_id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(chat_request(serde_json::json!({
            "message": "how many entries are there?",
            "session_id": sid
        })))
        .await
        .unwrap();
    let _ = response.into_body().collect().await.unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/v1/sessions/{sid}/history"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let history: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    let turns = history["turns"].as_array().unwrap();
    assert_eq!(turns.len(), 4);
    assert_eq!(turns[0]["role"], "user");
    assert_eq!(turns[0]["content"], "hello");
    assert_eq!(turns[3]["role"], "assistant");
    assert_eq!(turns[3]["content"], "There are 7 entries.");
}

// ── E2E: safety screening ────────────────────────────────────────────────

#[tokio::test]
async fn e2e_filtered_engine_answer_is_redacted_in_the_stream() {
    let engine = ScriptedEngine::answering("the secret token is xyz");
    let orch = orchestrator(engine, Duration::ZERO)
        .with_filter(Arc::new(DenyListFilter::new(vec!["secret".into()], "[filtered]")));
    let state = Arc::new(GatewayState::new(orch, 64, 2000));
    let app = build_router(state);

    let response = app
        .oneshot(chat_request(serde_json::json!({ "message": "show me the token" })))
        .await
        .unwrap();
    let chunks = sse_chunks(response).await;
    let full = chunks.last().unwrap();
    assert!(full.contains("[filtered]"));
    assert!(!full.contains("secret"));
}

// ── E2E: pacing (deterministic under a paused clock) ─────────────────────

#[tokio::test(start_paused = true)]
async fn e2e_items_arrive_one_pacing_interval_apart() {
    let engine = ScriptedEngine::answering("unused");
    let orch = orchestrator(engine, Duration::from_millis(100));
    let mut transcript = Transcript::default();

    let mut stream = orch.handle("Hello", &mut transcript).await.unwrap();

    let mut previous = tokio::time::Instant::now();
    let mut count = 0usize;
    while let Some(_prefix) = stream.next().await {
        let now = tokio::time::Instant::now();
        if count > 0 {
            assert_eq!(now - previous, Duration::from_millis(100));
        }
        previous = now;
        count += 1;
    }
    assert!(count > 3);
}
