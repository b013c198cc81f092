//! Persona — the fixed identity the assistant presents to users.
//!
//! Created once at startup from configuration and never mutated afterwards;
//! its only job is to be interpolated into canned conversational responses.

use serde::{Deserialize, Serialize};

/// The assistant's presented identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Persona {
    /// Display name (e.g. "LogSeek")
    pub name: String,

    /// One-line role description, phrased to follow the name in a sentence
    pub role: String,
}

impl Persona {
    pub fn new(name: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role: role.into(),
        }
    }

    /// The "I am X, Y" fragment shared by the identity and greeting responses.
    pub fn introduction(&self) -> String {
        format!("I am {}, {}", self.name, self.role)
    }
}

impl Default for Persona {
    fn default() -> Self {
        Self::new("LogSeek", "your personal log assistant bot")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn introduction_contains_name_and_role() {
        let persona = Persona::new("Atlas", "a log explorer");
        let intro = persona.introduction();
        assert!(intro.contains("Atlas"));
        assert!(intro.contains("a log explorer"));
    }

    #[test]
    fn default_persona() {
        let persona = Persona::default();
        assert_eq!(persona.name, "LogSeek");
        assert!(!persona.role.is_empty());
    }
}
