//! Safety filter seam for generated answers.
//!
//! Engine answers pass through a [`SafetyFilter`] before they are revealed to
//! the user; canned persona responses are fixed strings and bypass it. The
//! contract is pass / redact / reject: a filter either lets text through,
//! returns a cleaned copy, or refuses it outright.

use tracing::debug;

/// Decision made by a safety filter about a piece of generated text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SafetyVerdict {
    /// Text is safe to reveal as-is.
    Pass,
    /// Text is safe after redaction; the cleaned version is provided.
    Redacted { text: String, hits: usize },
    /// Text must not be revealed.
    Reject { reason: String },
}

/// A content gate over generated answers.
pub trait SafetyFilter: Send + Sync {
    fn name(&self) -> &str;

    /// Validate a completed answer.
    fn validate(&self, text: &str) -> SafetyVerdict;
}

/// Deny-term filter: case-insensitive substring matching against a fixed term
/// list, masking each occurrence (or rejecting outright when configured to).
pub struct DenyListFilter {
    terms: Vec<String>,
    mask: String,
    reject_on_hit: bool,
}

impl DenyListFilter {
    /// A redacting filter: occurrences of any term are replaced with `mask`.
    pub fn new(terms: Vec<String>, mask: impl Into<String>) -> Self {
        Self {
            terms: terms.into_iter().map(|t| t.to_ascii_lowercase()).collect(),
            mask: mask.into(),
            reject_on_hit: false,
        }
    }

    /// A rejecting filter: any term hit refuses the whole answer.
    pub fn rejecting(terms: Vec<String>) -> Self {
        Self {
            terms: terms.into_iter().map(|t| t.to_ascii_lowercase()).collect(),
            mask: String::new(),
            reject_on_hit: true,
        }
    }

    /// Byte ranges of every term occurrence, sorted, overlaps dropped.
    ///
    /// Matching is ASCII-case-insensitive so byte offsets into the lowered
    /// copy are valid offsets into the original.
    fn hit_ranges(&self, text: &str) -> Vec<(usize, usize)> {
        let lowered = text.to_ascii_lowercase();
        let mut ranges: Vec<(usize, usize)> = Vec::new();
        for term in &self.terms {
            if term.is_empty() {
                continue;
            }
            for (start, matched) in lowered.match_indices(term.as_str()) {
                ranges.push((start, start + matched.len()));
            }
        }
        ranges.sort_unstable();
        let mut merged: Vec<(usize, usize)> = Vec::new();
        for (start, end) in ranges {
            match merged.last() {
                Some(&(_, last_end)) if start < last_end => {}
                _ => merged.push((start, end)),
            }
        }
        merged
    }
}

impl SafetyFilter for DenyListFilter {
    fn name(&self) -> &str {
        "deny_list"
    }

    fn validate(&self, text: &str) -> SafetyVerdict {
        let ranges = self.hit_ranges(text);
        if ranges.is_empty() {
            return SafetyVerdict::Pass;
        }

        if self.reject_on_hit {
            debug!(hits = ranges.len(), "Answer rejected by deny-list filter");
            return SafetyVerdict::Reject {
                reason: format!("{} deny-term match(es)", ranges.len()),
            };
        }

        let mut cleaned = String::with_capacity(text.len());
        let mut cursor = 0;
        for &(start, end) in &ranges {
            cleaned.push_str(&text[cursor..start]);
            cleaned.push_str(&self.mask);
            cursor = end;
        }
        cleaned.push_str(&text[cursor..]);

        debug!(hits = ranges.len(), "Answer redacted by deny-list filter");
        SafetyVerdict::Redacted {
            text: cleaned,
            hits: ranges.len(),
        }
    }
}
