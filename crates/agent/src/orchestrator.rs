//! Query orchestrator — ties routing, the engine fallback, the safety
//! filter, and the paced reveal together.
//!
//! Per query: record the user turn, try the persona router, fall through to
//! the engine on no match (one attempt, typed failure propagates to the
//! caller — no retry, no fallback answer), screen engine answers through the
//! safety filter, record the assistant turn, return the reveal stream.
//!
//! The transcript is append-only here: nothing in the routing decision reads
//! it back.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use futures::stream::BoxStream;
use tracing::debug;

use logseek_core::{EngineError, Persona, QueryEngine, SafetyFilter, SafetyVerdict, Transcript};

use crate::intent::PersonaRouter;
use crate::stream::reveal;

/// Answer substituted when the safety filter rejects an engine answer.
const REFUSAL: &str = "I can't share that response. Please try asking in a different way.";

/// Default delay between reveal items.
const DEFAULT_PACING: Duration = Duration::from_millis(100);

/// Coordinates one query from classification to reveal stream.
pub struct QueryOrchestrator {
    router: PersonaRouter,
    engine: Arc<dyn QueryEngine>,
    filter: Option<Arc<dyn SafetyFilter>>,
    pacing: Duration,
}

impl QueryOrchestrator {
    pub fn new(persona: Persona, engine: Arc<dyn QueryEngine>) -> Self {
        Self {
            router: PersonaRouter::new(persona),
            engine,
            filter: None,
            pacing: DEFAULT_PACING,
        }
    }

    /// Screen engine answers through a safety filter before revealing them.
    pub fn with_filter(mut self, filter: Arc<dyn SafetyFilter>) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Override the reveal pacing.
    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    /// Handle one query, returning the paced reveal stream of the answer.
    pub async fn handle(
        &self,
        query: &str,
        transcript: &mut Transcript,
    ) -> Result<BoxStream<'static, String>, EngineError> {
        transcript.push_user(query);

        let answer = match self.router.route(query) {
            Some(canned) => {
                debug!("Query answered by persona router");
                canned
            }
            None => {
                debug!(engine = %self.engine.name(), "Query deferred to engine");
                let raw = self.engine.answer(query).await?;
                self.screen(raw)
            }
        };

        transcript.push_assistant(answer.clone());
        Ok(reveal(&answer, self.pacing).boxed())
    }

    /// Apply the safety filter to a generated answer. Canned persona text is
    /// fixed and never goes through here.
    fn screen(&self, raw: String) -> String {
        let Some(filter) = &self.filter else {
            return raw;
        };
        match filter.validate(&raw) {
            SafetyVerdict::Pass => raw,
            SafetyVerdict::Redacted { text, hits } => {
                debug!(hits, filter = filter.name(), "Answer redacted");
                text
            }
            SafetyVerdict::Reject { reason } => {
                debug!(%reason, filter = filter.name(), "Answer rejected");
                REFUSAL.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use logseek_core::{DenyListFilter, Role};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Engine stub that records questions and serves a scripted reply.
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

    #[async_trait]
    impl QueryEngine for ScriptedEngine {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn answer(&self, question: &str) -> Result<String, EngineError> {
            self.questions.lock().unwrap().push(question.to_string());
            self.reply.clone()
        }
    }

    fn orchestrator(engine: Arc<ScriptedEngine>) -> QueryOrchestrator {
        QueryOrchestrator::new(Persona::default(), engine)
            .with_pacing(Duration::from_millis(100))
    }

    async fn collect(stream: BoxStream<'static, String>) -> Vec<String> {
        stream.collect().await
    }

    #[tokio::test(start_paused = true)]
    async fn greeting_short_circuits_without_engine_call() {
        let engine = ScriptedEngine::answering("unused");
        let orch = orchestrator(engine.clone());
        let mut transcript = Transcript::default();

        let stream = orch.handle("Hello", &mut transcript).await.unwrap();
        let items = collect(stream).await;

        assert!(engine.questions().is_empty());
        // word-by-word reconstruction of the full greeting
        assert_eq!(items[0], " Hello!");
        assert_eq!(items[1], " Hello! I");
        assert_eq!(items[2], " Hello! I am");
        let last = items.last().unwrap();
        assert!(last.contains("LogSeek"));
        assert!(last.contains("your personal log assistant bot"));
    }

    #[tokio::test(start_paused = true)]
    async fn unmatched_query_reaches_engine_verbatim() {
        let engine = ScriptedEngine::answering("Average latency is 42ms.");
        let orch = orchestrator(engine.clone());
        let mut transcript = Transcript::default();

        let stream = orch
            .handle("what is the average latency by region?", &mut transcript)
            .await
            .unwrap();
        let items = collect(stream).await;

        assert_eq!(
            engine.questions(),
            vec!["what is the average latency by region?"]
        );
        assert_eq!(items.last().unwrap(), " Average latency is 42ms.");
    }

    #[tokio::test]
    async fn engine_failure_propagates_typed() {
        let engine = ScriptedEngine::failing(EngineError::Timeout { limit_secs: 30 });
        let orch = orchestrator(engine);
        let mut transcript = Transcript::default();

        let err = orch
            .handle("anything unmatched", &mut transcript)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Timeout { limit_secs: 30 }));
        // the user turn is recorded, the failed answer is not
        assert_eq!(transcript.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn both_turns_are_recorded() {
        let engine = ScriptedEngine::answering("There are 7 entries.");
        let orch = orchestrator(engine);
        let mut transcript = Transcript::default();

        let stream = orch.handle("how many entries?", &mut transcript).await.unwrap();
        let _ = collect(stream).await;

        let turns: Vec<_> = transcript.turns().collect();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].role, Role::User);
        assert_eq!(turns[0].content, "how many entries?");
        assert_eq!(turns[1].role, Role::Assistant);
        assert_eq!(turns[1].content, "There are 7 entries.");
    }

    #[tokio::test(start_paused = true)]
    async fn filter_redacts_engine_answers() {
        let engine = ScriptedEngine::answering("the leaked value is here");
        let filter = Arc::new(DenyListFilter::new(vec!["leaked".into()], "[filtered]"));
        let orch = orchestrator(engine).with_filter(filter);
        let mut transcript = Transcript::default();

        let stream = orch.handle("show me the value", &mut transcript).await.unwrap();
        let items = collect(stream).await;
        assert_eq!(items.last().unwrap(), " the [filtered] value is here");
    }

    #[tokio::test(start_paused = true)]
    async fn filter_rejection_substitutes_refusal() {
        let engine = ScriptedEngine::answering("forbidden content");
        let filter = Arc::new(DenyListFilter::rejecting(vec!["forbidden".into()]));
        let orch = orchestrator(engine).with_filter(filter);
        let mut transcript = Transcript::default();

        let stream = orch.handle("show me", &mut transcript).await.unwrap();
        let items = collect(stream).await;
        let full = items.last().unwrap();
        assert!(full.contains("can't share that response"));
        assert!(!full.contains("forbidden"));
    }

    #[tokio::test(start_paused = true)]
    async fn canned_responses_bypass_the_filter() {
        // A filter that would mangle the greeting must never see it.
        let engine = ScriptedEngine::answering("unused");
        let filter = Arc::new(DenyListFilter::rejecting(vec!["hello".into()]));
        let orch = orchestrator(engine).with_filter(filter);
        let mut transcript = Transcript::default();

        let stream = orch.handle("hello", &mut transcript).await.unwrap();
        let items = collect(stream).await;
        assert!(items.last().unwrap().starts_with(" Hello!"));
    }

    #[tokio::test(start_paused = true)]
    async fn reveal_pacing_applies_end_to_end() {
        let engine = ScriptedEngine::answering("one two three");
        let orch = orchestrator(engine).with_pacing(Duration::from_millis(100));
        let mut transcript = Transcript::default();

        let start = tokio::time::Instant::now();
        let stream = orch.handle("count", &mut transcript).await.unwrap();
        let items = collect(stream).await;
        assert_eq!(items.len(), 3);
        assert_eq!(start.elapsed(), Duration::from_millis(200));
    }
}
