//! Conversation transcript domain types.
//!
//! A [`Transcript`] is the per-session record of turns. It is owned by the
//! caller (one per UI session), appended to on every user query and every
//! produced answer, and never read back into the routing decision — it is a
//! write-only log as far as query handling is concerned.
//!
//! Retention is a bounded ring: once `max_turns` is reached the oldest turn
//! is evicted, so a long-lived session cannot grow without bound.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The role of a turn's author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The end user
    User,
    /// The assistant
    Assistant,
}

/// A single turn in a conversation. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    /// Who authored this turn
    pub role: Role,

    /// The text content
    pub content: String,

    /// When the turn was recorded
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    /// Create a user turn stamped with the current time.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// Create an assistant turn stamped with the current time.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// An append-only, bounded record of conversation turns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    turns: VecDeque<Turn>,
    max_turns: usize,
}

impl Transcript {
    /// Create an empty transcript retaining at most `max_turns` turns.
    /// A `max_turns` of 0 means unbounded.
    pub fn new(max_turns: usize) -> Self {
        Self {
            turns: VecDeque::new(),
            max_turns,
        }
    }

    /// Append a turn, evicting the oldest one if the bound is reached.
    pub fn push(&mut self, turn: Turn) {
        if self.max_turns > 0 && self.turns.len() >= self.max_turns {
            self.turns.pop_front();
        }
        self.turns.push_back(turn);
    }

    /// Record a user query.
    pub fn push_user(&mut self, content: impl Into<String>) {
        self.push(Turn::user(content));
    }

    /// Record an assistant answer.
    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.push(Turn::assistant(content));
    }

    /// Turns in append order, oldest first.
    pub fn turns(&self) -> impl Iterator<Item = &Turn> {
        self.turns.iter()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Render the transcript as a plain "role: content" text block.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for turn in &self.turns {
            let role = match turn.role {
                Role::User => "user",
                Role::Assistant => "assistant",
            };
            out.push_str(role);
            out.push_str(": ");
            out.push_str(&turn.content);
            out.push('\n');
        }
        out
    }
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new(64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_preserves_append_order() {
        let mut transcript = Transcript::new(10);
        transcript.push_user("first");
        transcript.push_assistant("second");
        transcript.push_user("third");

        let contents: Vec<&str> = transcript.turns().map(|t| t.content.as_str()).collect();
        assert_eq!(contents, vec!["first", "second", "third"]);
        assert_eq!(transcript.turns().next().unwrap().role, Role::User);
    }

    #[test]
    fn bound_evicts_oldest() {
        let mut transcript = Transcript::new(3);
        for i in 0..5 {
            transcript.push_user(format!("turn {i}"));
        }
        assert_eq!(transcript.len(), 3);
        let first = transcript.turns().next().unwrap();
        assert_eq!(first.content, "turn 2");
    }

    #[test]
    fn zero_bound_is_unbounded() {
        let mut transcript = Transcript::new(0);
        for i in 0..100 {
            transcript.push_user(format!("turn {i}"));
        }
        assert_eq!(transcript.len(), 100);
    }

    #[test]
    fn render_labels_roles() {
        let mut transcript = Transcript::new(10);
        transcript.push_user("hello");
        transcript.push_assistant("hi there");
        let rendered = transcript.render();
        assert!(rendered.contains("user: hello"));
        assert!(rendered.contains("assistant: hi there"));
    }

    #[test]
    fn turn_serialization_roundtrip() {
        let turn = Turn::user("how many entries?");
        let json = serde_json::to_string(&turn).unwrap();
        assert!(json.contains(r#""role":"user""#));
        let back: Turn = serde_json::from_str(&json).unwrap();
        assert_eq!(back.content, "how many entries?");
    }
}
