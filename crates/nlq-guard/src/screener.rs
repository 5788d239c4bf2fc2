//! Heuristic screening of the user's natural-language question.
//!
//! This is a coarse pattern match over free text, not a SQL parser: comment
//! markers and SQL keywords followed by whitespace flag the question before
//! it reaches the generator. Some benign questions are flagged too.

use regex::Regex;
use std::sync::LazyLock;

static INJECTION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\s*(--|#))|(\s*(union|select|insert|update|delete|drop|alter)\s+)")
        .expect("injection pattern is a valid regex")
});

/// Screens questions for injection-style tokens.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputScreener;

impl InputScreener {
    pub fn new() -> Self {
        Self
    }

    /// True when `text` looks like an injection attempt.
    pub fn is_potential_injection(&self, text: &str) -> bool {
        if INJECTION_PATTERN.is_match(text) {
            tracing::warn!(input = %text, "Potential SQL injection detected in question");
            return true;
        }
        false
    }
}
