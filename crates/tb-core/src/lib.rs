//! Shared primitives used across Tootboard crates.

use core::fmt;

/// Result alias used across the workspace.
pub type HostResult<T> = Result<T, HostError>;

/// Fault raised by the page host or one of its collaborators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostError {
    pub code: &'static str,
    pub message: String,
}

impl HostError {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for HostError {}

/// Collapses runs of whitespace so multi-line fault text stays on one line.
pub fn normalize_log_whitespace(input: &str) -> String {
    input
        .split_whitespace()
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Clamps log text to `max_chars` characters, appending an ellipsis on cut.
pub fn clamp_log_text(input: &str, max_chars: usize) -> String {
    if max_chars == 0 {
        return String::new();
    }

    if input.chars().count() <= max_chars {
        return input.to_owned();
    }

    let mut clipped = input.chars().take(max_chars).collect::<String>();
    clipped.push_str("...");
    clipped
}
