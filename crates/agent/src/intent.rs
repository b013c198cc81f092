//! Conversational intent classification and canned responses.
//!
//! Four closed trigger-phrase tables, checked in a fixed priority order:
//! identity, greeting, help (exact membership), then log-metadata (substring
//! containment — the trigger may appear anywhere in the query). The tables
//! are disjoint, so at most one intent matches any query.
//!
//! Queries are lowercased before matching but NOT trimmed: a query with
//! trailing whitespace misses the exact-match sets. That is a documented
//! edge of the contract, not an oversight.

use logseek_core::Persona;

/// A recognized conversational intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// "who are you?" — answered with the persona's name and role
    Identity,
    /// Bare greetings
    Greeting,
    /// Capability questions
    Help,
    /// Meta-questions about the log dataset itself
    LogMeta,
}

// All phrases are stored lowercase so each one is reachable after query
// normalization.
const IDENTITY_PHRASES: &[&str] = &["who is this?", "who are you?", "what is your name?"];

const GREETING_PHRASES: &[&str] = &["hi", "hello", "hey", "howdy", "greetings"];

const HELP_PHRASES: &[&str] = &[
    "how can you help me?",
    "what can you do?",
    "what is your purpose?",
    "how can i use you?",
];

const LOG_META_PHRASES: &[&str] = &[
    "what is the total number of log entries in the dataset?",
    "how is this number distributed across different operation names?",
    "what are the operation names in the dataset?",
];

/// Classify a query into an intent, or `None` to defer to the data engine.
pub fn classify(query: &str) -> Option<Intent> {
    let q = query.to_lowercase();

    if IDENTITY_PHRASES.contains(&q.as_str()) {
        return Some(Intent::Identity);
    }
    if GREETING_PHRASES.contains(&q.as_str()) {
        return Some(Intent::Greeting);
    }
    if HELP_PHRASES.contains(&q.as_str()) {
        return Some(Intent::Help);
    }
    if LOG_META_PHRASES.iter().any(|p| q.contains(p)) {
        return Some(Intent::LogMeta);
    }
    None
}

/// Routes queries to canned responses for known conversational intents.
///
/// Pure function of the query, the immutable persona, and the fixed trigger
/// tables — no side effects, no failure modes.
pub struct PersonaRouter {
    persona: Persona,
}

impl PersonaRouter {
    pub fn new(persona: Persona) -> Self {
        Self { persona }
    }

    /// Produce a canned response, or `None` to fall through to the engine.
    pub fn route(&self, query: &str) -> Option<String> {
        let intent = classify(query)?;
        Some(self.respond(intent))
    }

    fn respond(&self, intent: Intent) -> String {
        match intent {
            Intent::Identity => format!(
                "{}. I am here to assist you with any questions or issues you may have about your logs.",
                self.persona.introduction()
            ),
            Intent::Greeting => format!(
                "Hello! {}. I am here to assist you with any questions or issues you may have about your logs.",
                self.persona.introduction()
            ),
            Intent::Help => concat!(
                "I can assist you with a variety of tasks, including answering questions, ",
                "providing information, and helping with specific tasks based on your needs. ",
                "Just let me know what you need help with, and I'll do my best to assist you."
            )
            .to_string(),
            Intent::LogMeta => concat!(
                "I can provide information on log entries and their distribution. ",
                "Please specify the dataset or log file you're referring to."
            )
            .to_string(),
        }
    }
}
